use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::lending::applications::domain::{
    ApplicationId, ApplicationStatus, ApplicationWithTask, BrokerId, LoanApplication,
    LoanApplicationPayload, SetupTask, TaskId, TaskStatus,
};
use crate::workflows::lending::applications::filter::ApplicationFilter;
use crate::workflows::lending::applications::repository::{ApplicationStore, StoreError};
use crate::workflows::lending::applications::LoanApplicationService;

pub(super) fn broker(id: &str) -> BrokerId {
    BrokerId(id.to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn submitted_at(submitted_on: NaiveDate) -> DateTime<Utc> {
    submitted_on
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) fn application(
    id: &str,
    broker_id: &str,
    status: ApplicationStatus,
    loan_amount: u64,
    submitted_on: NaiveDate,
) -> LoanApplication {
    LoanApplication {
        id: ApplicationId(id.to_string()),
        broker_id: broker(broker_id),
        applicant_name: format!("Applicant {id}"),
        loan_amount,
        term_months: 240,
        status,
        submitted_at: submitted_at(submitted_on),
    }
}

pub(super) fn task(
    id: &str,
    application_id: &str,
    broker_id: &str,
    status: TaskStatus,
) -> SetupTask {
    SetupTask {
        id: TaskId(id.to_string()),
        application_id: ApplicationId(application_id.to_string()),
        assigned_broker_id: broker(broker_id),
        status,
    }
}

pub(super) fn payload(loan_amount: u64) -> LoanApplicationPayload {
    LoanApplicationPayload {
        applicant_name: "Rosa Fuentes".to_string(),
        loan_amount,
        term_months: 240,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    applications: Arc<Mutex<Vec<LoanApplication>>>,
    tasks: Arc<Mutex<Vec<SetupTask>>>,
}

impl MemoryStore {
    pub(super) fn seed_application(&self, application: LoanApplication) {
        self.applications
            .lock()
            .expect("store mutex poisoned")
            .push(application);
    }

    pub(super) fn seed_task(&self, task: SetupTask) {
        self.tasks.lock().expect("store mutex poisoned").push(task);
    }

    pub(super) fn applications(&self) -> Vec<LoanApplication> {
        self.applications
            .lock()
            .expect("store mutex poisoned")
            .clone()
    }
}

impl ApplicationStore for MemoryStore {
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

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn query(&self, _filter: &ApplicationFilter) -> Result<Vec<ApplicationWithTask>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _application: LoanApplication) -> Result<LoanApplication, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn average_loan_amount(&self) -> Result<f64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Reads succeed against an empty collection, writes are rejected. Used to
/// show a failed persist leaves nothing visible.
pub(super) struct WriteRejectedStore;

impl ApplicationStore for WriteRejectedStore {
    fn query(&self, _filter: &ApplicationFilter) -> Result<Vec<ApplicationWithTask>, StoreError> {
        Ok(Vec::new())
    }

    fn insert(&self, _application: LoanApplication) -> Result<LoanApplication, StoreError> {
        Err(StoreError::Unavailable("write rejected".to_string()))
    }

    fn average_loan_amount(&self) -> Result<f64, StoreError> {
        Ok(0.0)
    }
}

pub(super) fn build_service() -> (Arc<LoanApplicationService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(LoanApplicationService::new(store.clone()));
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
