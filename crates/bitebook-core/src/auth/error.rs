use thiserror::Error;

use crate::api::ApiError;
use crate::models::Role;

/// Message used when the backend gives no reason for a failed login.
pub const LOGIN_FAILED: &str = "Login failed";

/// Failures surfaced by session operations.
///
/// A missing credential is not an error: restore simply ends with no
/// identity.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login rejected or the response carried no token.
    #[error("{0}")]
    AuthError(String),

    #[error("Session expired. Please login again.")]
    AuthExpired,

    /// The backend rejected the input.
    #[error("{0}")]
    ValidationFailure(String),

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("{operation} is not supported for the {role} role")]
    UnsupportedOperation { operation: &'static str, role: Role },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl SessionError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::NetworkFailure(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(_) => SessionError::AuthExpired,
            ApiError::NetworkError(e) => SessionError::NetworkFailure(e.to_string()),
            ApiError::InvalidResponse(msg) => SessionError::InvalidResponse(msg),
            other => SessionError::ValidationFailure(
                other
                    .backend_provided()
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            ),
        }
    }
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        SessionError::Storage(format!("{:#}", err))
    }
}
