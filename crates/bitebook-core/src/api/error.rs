use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized(Option<String>),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable `message` (or `error`) field out of a JSON
    /// error body.
    fn backend_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key))
            .find_map(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::backend_message(body).unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized(Self::backend_message(body)),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// The message the backend attached to the failure, if any.
    pub fn backend_provided(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(message) => message.as_deref(),
            ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message)
            | ApiError::Rejected { message, .. } => Some(message.as_str()),
            ApiError::NetworkError(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_backend_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"success":false,"message":"Email already in use"}"#);
        match err {
            ApiError::Rejected { status, ref message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Email already in use");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.backend_provided(), Some("Email already in use"));
    }

    #[test]
    fn test_from_status_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid credentials"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.backend_provided(), Some("Invalid credentials"));

        let bare = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(bare.is_unauthorized());
        assert_eq!(bare.backend_provided(), None);
    }

    #[test]
    fn test_from_status_truncates_plain_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        let ApiError::ServerError(message) = err else {
            panic!("expected server error");
        };
        assert!(message.contains("truncated"));
        assert!(message.len() < body.len() + 40);
    }
}
