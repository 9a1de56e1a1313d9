use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The series is too short for the requested computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A malformed bar or snapshot; the whole request is rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// DCF preconditions violated (missing cash flow, discount <= terminal growth, ...).
    #[error("Valuation undefined: {0}")]
    ValuationUndefined(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Whether this error should abort the whole report rather than degrade one field.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_) | AnalysisError::Config(_))
    }
}
