//! Broker-facing loan application service: filtered listings over submitted
//! applications (with their joined setup tasks) and new-application intake
//! with loan-amount classification.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
