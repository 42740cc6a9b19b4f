use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - session token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the failure is transient enough that a later identical
    /// request could succeed (used by status-line messaging, not for
    /// automatic retry).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::NetworkError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        let status = |code: u16| reqwest::StatusCode::from_u16(code).expect("valid status");
        assert!(matches!(
            ApiError::from_status(status(401), ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(status(404), "no such issue"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(status(429), ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(status(503), "maintenance"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(status(418), ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncates_long_bodies() {
        let status = reqwest::StatusCode::from_u16(500).expect("valid status");
        let body = "x".repeat(2000);
        let err = ApiError::from_status(status, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated, 2000 total bytes"));
        assert!(msg.len() < 700);
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::RateLimited.is_transient());
        assert!(ApiError::ServerError("down".to_string()).is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
        assert!(!ApiError::NotFound("gone".to_string()).is_transient());
    }
}
