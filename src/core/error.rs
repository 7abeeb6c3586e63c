//! Fault kinds raised by the analytics core.
//!
//! "No result" cases are not errors; they are reported through
//! [`Outcome::Unavailable`](crate::core::outcome::Outcome).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Credit limit must be a positive, finite amount (got {0})")]
    InvalidCreditLimit(f64),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
