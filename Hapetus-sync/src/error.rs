use thiserror::Error;

use hapetus_domain::errors::ServiceError;

/// Errors raised by sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No authenticated user")]
    NotAuthenticated,

    /// The request never got an HTTP answer
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Could not decode server response: {0}")]
    Decode(String),

    #[error("{0} is not supported for this record type")]
    Unsupported(&'static str),

    #[error("Local store error: {0}")]
    Local(String),

    #[error("Invalid measurement: {0}")]
    Invalid(String),

    #[error("Invalid sync configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// Whether trying the same request again could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport(_) => true,
            SyncError::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Http { status: 404, .. })
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SyncError::Transport(err.to_string())
        }
    }
}

impl From<ServiceError> for SyncError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => SyncError::Invalid(msg),
            other => SyncError::Local(other.to_string()),
        }
    }
}
