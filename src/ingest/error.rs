use std::path::PathBuf;
use thiserror::Error;

/// Hard failures while reading source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {column} '{value}' on line {line}")]
    InvalidField {
        column: &'static str,
        value: String,
        line: u64,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
