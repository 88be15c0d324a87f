//! Domain-level error taxonomy for return-dispatch.

use std::time::Duration;

use workflow_api::ApiError;

/// Diagnostic attached to every terminal failure. Under-scoped tokens make
/// the API answer 404/403, which looks exactly like "no runs yet".
pub const TOKEN_SCOPE_HINT: &str = "Check that the token can read and dispatch workflows \
     in the target repository (classic PAT: `repo` scope; fine-grained token or \
     GITHUB_TOKEN: `actions: write`). Missing permissions surface as \"Not Found\".";

/// Errors produced while dispatching a workflow and locating its run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no workflow matches '{selector}'")]
    WorkflowNotFound { selector: String },

    #[error("failed to dispatch workflow: {0}")]
    DispatchFailed(#[source] ApiError),

    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("timed out after {}s while {during}", .after.as_secs())]
    Timeout { during: String, after: Duration },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DispatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Timeout { .. })
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
