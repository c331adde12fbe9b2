//! Broker loan-application listing and intake.
//!
//! `filter` composes raw query parameters into a single specification over
//! the application collection plus a conditional join clause over setup
//! tasks. `service` executes listings through the abstract store and handles
//! submissions, classifying each new loan amount against the portfolio
//! average as it stood before the record landed.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationWithTask, BrokerId, LoanApplication,
    LoanApplicationPayload, SetupTask, TaskId, TaskStatus, UnknownStatus,
};
pub use filter::{ApplicationFilter, FilterError, JoinRequirement, TaskJoinClause};
pub use repository::{ApplicationStore, StoreError};
pub use router::application_router;
pub use service::{
    ApplicationServiceError, LoanAmountAssessment, LoanApplicationService, SubmissionReceipt,
};
