use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems reading the source table. None of these are retried.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Line {line}: invalid month '{value}'")]
    InvalidPeriod { line: u64, value: String },

    #[error("Dataset contains no data rows")]
    Empty,
}

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Period-over-period lag must be at least 1, got {0}")]
    InvalidLag(usize),
}
