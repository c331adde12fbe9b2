use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use super::domain::{
    ApplicationStatus, ApplicationWithTask, BrokerId, LoanApplication, SetupTask, TaskStatus,
};

/// Whether the task join excludes applications without a matching task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRequirement {
    Mandatory,
    Optional,
}

/// Join clause over the task collection, always scoped to the acting broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskJoinClause {
    pub assigned_broker_id: BrokerId,
    pub status: TaskStatus,
    pub requirement: JoinRequirement,
}

impl TaskJoinClause {
    /// True when the task is assigned to the acting broker and carries the
    /// status the clause targets.
    pub fn matches(&self, task: &SetupTask) -> bool {
        task.assigned_broker_id == self.assigned_broker_id && task.status == self.status
    }
}

/// Error raised while composing a filter from raw query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("submitted_from {from} is after submitted_until {until}")]
    InvalidRange { from: NaiveDate, until: NaiveDate },
}

/// Combined query specification over the application collection.
///
/// Composing the same inputs twice yields an equal specification; the filter
/// carries no hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub broker_id: BrokerId,
    pub submitted_from: Option<NaiveDate>,
    pub submitted_until: Option<NaiveDate>,
    pub statuses: Option<BTreeSet<ApplicationStatus>>,
    pub task: TaskJoinClause,
}

impl ApplicationFilter {
    /// Build the combined specification for a listing request.
    ///
    /// The acting broker is embedded in both the application predicate and
    /// the task join clause; no query parameter can widen either scope. An
    /// empty status slice means no status constraint. `completed = true`
    /// demands a completed task for the broker (mandatory join), while the
    /// default targets pending tasks without excluding taskless rows.
    pub fn compose(
        broker_id: BrokerId,
        submitted_from: Option<NaiveDate>,
        submitted_until: Option<NaiveDate>,
        completed: bool,
        statuses: &[ApplicationStatus],
    ) -> Result<Self, FilterError> {
        if let (Some(from), Some(until)) = (submitted_from, submitted_until) {
            if from > until {
                return Err(FilterError::InvalidRange { from, until });
            }
        }

        let (task_status, requirement) = if completed {
            (TaskStatus::Completed, JoinRequirement::Mandatory)
        } else {
            (TaskStatus::Pending, JoinRequirement::Optional)
        };

        let statuses = if statuses.is_empty() {
            None
        } else {
            Some(statuses.iter().copied().collect())
        };

        let filter = Self {
            task: TaskJoinClause {
                assigned_broker_id: broker_id.clone(),
                status: task_status,
                requirement,
            },
            broker_id,
            submitted_from,
            submitted_until,
            statuses,
        };

        debug!(
            broker = %filter.broker_id.0,
            from = ?filter.submitted_from,
            until = ?filter.submitted_until,
            completed,
            statuses = ?filter.statuses,
            "composed application filter"
        );

        Ok(filter)
    }

    /// Evaluate the application predicate: ownership, inclusive date range,
    /// and status-set membership.
    pub fn matches_application(&self, application: &LoanApplication) -> bool {
        if application.broker_id != self.broker_id {
            return false;
        }

        let submitted_on = application.submitted_at.date_naive();
        if let Some(from) = self.submitted_from {
            if submitted_on < from {
                return false;
            }
        }
        if let Some(until) = self.submitted_until {
            if submitted_on > until {
                return false;
            }
        }

        match &self.statuses {
            Some(statuses) => statuses.contains(&application.status),
            None => true,
        }
    }

    /// Assemble a listing row, honoring the join requirement: a mandatory
    /// join with no matching task drops the application entirely, while an
    /// optional join keeps the row with an absent task.
    pub fn join_row(
        &self,
        application: LoanApplication,
        task: Option<SetupTask>,
    ) -> Option<ApplicationWithTask> {
        match (self.task.requirement, task) {
            (JoinRequirement::Mandatory, None) => None,
            (_, task) => Some(ApplicationWithTask { application, task }),
        }
    }
}
