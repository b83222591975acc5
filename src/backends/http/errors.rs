use thiserror::Error;

/// Typed error enum for course backend API operations
///
/// Separates failure modes so the load path can decide what to retry.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Authentication failed (401, 403)
    /// Permanent, never retried
    #[error("Authentication failed: {message} (status: {status})")]
    Authentication { status: u16, message: String },

    /// Resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limiting error (429)
    #[error("Rate limited: {message} (retry after: {retry_after:?}s)")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server error (500+)
    /// Transient errors that should be retried
    #[error("Server error: {message} (status: {status})")]
    ServerError { status: u16, message: String },

    /// Client error (400-499, excluding auth, not found and rate limit)
    #[error("Client error: {message} (status: {status})")]
    ClientError { status: u16, message: String },

    /// Network/connection errors (timeout, connection refused, etc.)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("API error: {0}")]
    Other(String),
}

impl ApiError {
    /// Check if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::ServerError { .. } | ApiError::RateLimit { .. }
        )
    }

    /// Get the retry-after duration for rate limit errors
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status behind this error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. }
            | ApiError::ServerError { status, .. }
            | ApiError::ClientError { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimit { .. } => Some(429),
            _ => None,
        }
    }

    /// Create an error from a reqwest error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Network(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            ApiError::Network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            ApiError::ParseError(error.to_string())
        } else if error.is_request() {
            ApiError::Network(format!("Request error: {}", error))
        } else {
            ApiError::Other(error.to_string())
        }
    }

    /// Create an error from an HTTP status code and response body
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Authentication {
                status,
                message: body,
            },
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimit {
                message: body,
                retry_after: None,
            },
            400..=499 => ApiError::ClientError {
                status,
                message: body,
            },
            500..=599 => ApiError::ServerError {
                status,
                message: body,
            },
            _ => ApiError::Other(format!("HTTP {}: {}", status, body)),
        }
    }
}
