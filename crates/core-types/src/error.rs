use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid month period '{0}': expected YYYYMM, YYYY-MM or YYYY/MM")]
    InvalidPeriod(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}
