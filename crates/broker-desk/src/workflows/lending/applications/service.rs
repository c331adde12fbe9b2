use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationWithTask, BrokerId, LoanApplication,
    LoanApplicationPayload,
};
use super::filter::{ApplicationFilter, FilterError};
use super::repository::{ApplicationStore, StoreError};

/// Service composing the filter builder with the abstract store. Stateless
/// apart from the process-local id sequence; safe to share across requests.
pub struct LoanApplicationService<S> {
    store: Arc<S>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// How a submitted amount compares to the portfolio average as it stood
/// before the submission was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAmountAssessment {
    Above,
    Below,
    AtAverage,
}

impl LoanAmountAssessment {
    pub const fn message(self) -> &'static str {
        match self {
            LoanAmountAssessment::Above => "Loan amount is above average",
            LoanAmountAssessment::Below => "Loan amount is below average",
            LoanAmountAssessment::AtAverage => "Loan amount is at average",
        }
    }

    fn for_amount(amount: u64, average: f64) -> Self {
        match (amount as f64).partial_cmp(&average) {
            Some(Ordering::Greater) => Self::Above,
            Some(Ordering::Less) => Self::Below,
            _ => Self::AtAverage,
        }
    }
}

/// Outcome returned to the transport layer after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub application: LoanApplication,
    pub assessment: LoanAmountAssessment,
    /// Echo of the submitted amount. Suppressed when the amount lands
    /// exactly on the average; callers must treat the absent echo as
    /// intentional, not as a missing field.
    pub echoed_amount: Option<u64>,
}

impl<S> LoanApplicationService<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List the acting broker's applications with their joined tasks.
    pub fn list(
        &self,
        broker_id: &BrokerId,
        submitted_from: Option<NaiveDate>,
        submitted_until: Option<NaiveDate>,
        completed: bool,
        statuses: &[ApplicationStatus],
    ) -> Result<Vec<ApplicationWithTask>, ApplicationServiceError> {
        let filter = ApplicationFilter::compose(
            broker_id.clone(),
            submitted_from,
            submitted_until,
            completed,
            statuses,
        )?;

        Ok(self.store.query(&filter)?)
    }

    /// Persist a new application for the acting broker and report how its
    /// amount compares to the average as it stood before this submission.
    ///
    /// The average is read first, the record is persisted, and only then is
    /// the comparison made, so the new record's own amount never skews its
    /// classification. A failed persist yields no receipt and no record.
    pub fn submit(
        &self,
        broker_id: &BrokerId,
        payload: LoanApplicationPayload,
    ) -> Result<SubmissionReceipt, ApplicationServiceError> {
        let average = self.store.average_loan_amount()?;

        let application = LoanApplication {
            id: next_application_id(),
            broker_id: broker_id.clone(),
            applicant_name: payload.applicant_name,
            loan_amount: payload.loan_amount,
            term_months: payload.term_months,
            status: ApplicationStatus::Submitted,
            submitted_at: Utc::now(),
        };
        let stored = self.store.insert(application)?;

        let assessment = LoanAmountAssessment::for_amount(stored.loan_amount, average);
        let echoed_amount = match assessment {
            LoanAmountAssessment::AtAverage => None,
            _ => Some(stored.loan_amount),
        };

        Ok(SubmissionReceipt {
            application: stored,
            assessment,
            echoed_amount,
        })
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
