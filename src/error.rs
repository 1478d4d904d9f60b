use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing required files: {}", .0.join(", "))]
    MissingInputs(Vec<String>),

    #[error("Invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid report window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Failed to load {table} table from {}: {source}", .path.display())]
    Load {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
