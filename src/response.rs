use serde::Serialize;

use crate::error::SchedulerError;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

pub fn json_ok<T: Serialize>(data: T) -> SuccessResponse<T> {
    SuccessResponse {
        success: true,
        data,
    }
}

pub fn json_error(code: impl Into<String>, message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: message.into(),
        code: code.into(),
    }
}

impl From<&SchedulerError> for ErrorResponse {
    fn from(err: &SchedulerError) -> Self {
        json_error(err.code(), err.to_string())
    }
}
