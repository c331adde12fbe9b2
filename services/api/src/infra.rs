use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use broker_desk::workflows::lending::applications::{
    ApplicationFilter, ApplicationStatus, ApplicationStore, ApplicationWithTask, LoanApplication,
    SetupTask, StoreError, UnknownStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mutex-guarded store backing `serve` and the CLI demo. Executes composed
/// filters exactly as the service built them, including the conditional
/// task join.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    applications: Arc<Mutex<Vec<LoanApplication>>>,
    tasks: Arc<Mutex<Vec<SetupTask>>>,
}

impl InMemoryApplicationStore {
    pub(crate) fn seed_application(&self, application: LoanApplication) {
        self.applications
            .lock()
            .expect("store mutex poisoned")
            .push(application);
    }

    pub(crate) fn seed_task(&self, task: SetupTask) {
        self.tasks.lock().expect("store mutex poisoned").push(task);
    }
}

impl ApplicationStore for InMemoryApplicationStore {
    fn query(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationWithTask>, StoreError> {
        let applications = self.applications.lock().expect("store mutex poisoned");
        let tasks = self.tasks.lock().expect("store mutex poisoned");

        Ok(applications
            .iter()
            .filter(|application| filter.matches_application(application))
            .filter_map(|application| {
                let joined = tasks
                    .iter()
                    .find(|task| {
                        task.application_id == application.id && filter.task.matches(task)
                    })
                    .cloned();
                filter.join_row(application.clone(), joined)
            })
            .collect())
    }

    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, StoreError> {
        self.applications
            .lock()
            .expect("store mutex poisoned")
            .push(application.clone());
        Ok(application)
    }

    fn average_loan_amount(&self) -> Result<f64, StoreError> {
        let applications = self.applications.lock().expect("store mutex poisoned");
        if applications.is_empty() {
            return Ok(0.0);
        }

        let total: u64 = applications
            .iter()
            .map(|application| application.loan_amount)
            .sum();
        Ok(total as f64 / applications.len() as f64)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    raw.parse()
        .map_err(|err: UnknownStatus| err.to_string())
}
