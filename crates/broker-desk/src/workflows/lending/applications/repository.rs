use super::domain::{ApplicationWithTask, LoanApplication};
use super::filter::ApplicationFilter;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `query` executes a composed filter and returns each matching application
/// with its joined task. `average_loan_amount` reports the arithmetic mean
/// over every stored application; an empty collection reports the `0.0`
/// sentinel rather than failing.
pub trait ApplicationStore: Send + Sync {
    fn query(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationWithTask>, StoreError>;
    fn insert(&self, application: LoanApplication) -> Result<LoanApplication, StoreError>;
    fn average_loan_amount(&self) -> Result<f64, StoreError>;
}

/// Error enumeration for store failures. Surfaced to callers as an opaque
/// internal failure; this module never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application store unavailable: {0}")]
    Unavailable(String),
}
