use analytics::{AnalyticsError, LoadError};
use core_types::{CoreError, Measure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Invalid view request: {0}")]
    Core(#[from] CoreError),

    #[error("Metric '{0}' is not available on this panel (expected price, rate or sales)")]
    UnsupportedMetric(Measure),
}

impl From<LoadError> for ViewError {
    fn from(err: LoadError) -> Self {
        ViewError::Analytics(AnalyticsError::Load(err))
    }
}
