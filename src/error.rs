use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid rating: {0}")]
    InvalidRating(String),
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),
    #[error("invalid learning step: {0}")]
    InvalidStep(String),
    #[error("invalid review timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("rollback rejected: {0}")]
    RollbackMismatch(String),
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Stable machine-readable code, mirrored in the binary's error objects.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRating(_)
            | Self::InvalidConfig(_)
            | Self::InvalidStep(_)
            | Self::InvalidTimestamp(_) => "VALIDATION_ERROR",
            Self::RollbackMismatch(_) => "CONFLICT",
            Self::Json(_) => "BAD_REQUEST",
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
