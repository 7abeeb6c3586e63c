//! Account-health analytics over balance and movement records

pub mod analysis;
pub mod cache;
pub mod config;
pub mod credit_line;
pub mod error;
pub mod filter;
pub mod log;
pub mod monthly;
pub mod movements;
pub mod outcome;
pub mod overdraft;
pub mod period;
pub mod records;
pub mod turnover;
pub mod usage;

// Re-export main types for cleaner imports
pub use analysis::{AccountReport, AnalysisParams, Analyzer};
pub use error::AnalysisError;
pub use outcome::{Outcome, Unavailable};
pub use period::YearMonth;
pub use records::{BalanceRecord, MovementRecord, RecordStore};
