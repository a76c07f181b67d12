use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Classified failure of the backing product store.
///
/// Neither variant has a recovery path; the classification only decides how
/// the failure is logged and reported at the request boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product store unavailable: {0}")]
    Unavailable(String),
    #[error("product schema missing: {0}")]
    SchemaMissing(String),
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: value.to_string(),
        }
    }
}
