//! Error types for workflow-api

use thiserror::Error;

/// Errors raised by the platform API layer.
///
/// Status codes are classified here, at the edge, so callers branch on the
/// variant instead of inspecting response messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The resource does not exist, or is not visible to the token (HTTP 404)
    #[error("Not Found: {message}")]
    NotFound { message: String },

    /// Dispatch was rejected because the workflow is disabled (HTTP 422)
    #[error("workflow {workflow_id} is disabled")]
    WorkflowDisabled { workflow_id: u64 },

    /// Any other non-success status
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Transport-level failure (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Client could not be constructed
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// `true` for the recoverable "not (yet) queryable" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::WorkflowDisabled { .. } => Some(422),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;
