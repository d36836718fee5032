//! Shared error type across handlr crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// No or unknown credentials.
    Unauthorized,
    /// Credentials present but not allowed.
    Forbidden,
    /// Resource not found.
    NotFound,
    /// State conflict.
    Conflict,
    /// Payload too large.
    PayloadTooLarge,
    /// Rate limited.
    TooManyRequests,
    /// Request cancelled before completion.
    Cancelled,
    /// Internal server error.
    Internal,
    /// Temporarily unavailable.
    Unavailable,
    /// Handler did not finish in time.
    Timeout,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Handler-defined error.
    Custom,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Conflict => "CONFLICT",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::TooManyRequests => "TOO_MANY_REQUESTS",
            ClientCode::Cancelled => "CANCELLED",
            ClientCode::Internal => "INTERNAL",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Custom => "CUSTOM",
        }
    }

    /// Code for a bare HTTP status, e.g. one chosen by an auth checker.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ClientCode::BadRequest,
            401 => ClientCode::Unauthorized,
            403 => ClientCode::Forbidden,
            404 => ClientCode::NotFound,
            409 => ClientCode::Conflict,
            413 => ClientCode::PayloadTooLarge,
            429 => ClientCode::TooManyRequests,
            STATUS_CLIENT_CLOSED => ClientCode::Cancelled,
            500 => ClientCode::Internal,
            503 => ClientCode::Unavailable,
            504 => ClientCode::Timeout,
            _ => ClientCode::Custom,
        }
    }
}

/// Status recorded for requests that were cancelled or dropped mid-flight.
pub const STATUS_CLIENT_CLOSED: u16 = 499;

/// Shared result type.
pub type Result<T> = std::result::Result<T, HandlrError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum HandlrError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("too many requests")]
    TooManyRequests,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal: {0}")]
    Internal(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("handler timed out after {0} ms")]
    Timeout(u64),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("{message}")]
    Custom { status: u16, message: String },
}

impl HandlrError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HandlrError::BadRequest(_) => ClientCode::BadRequest,
            HandlrError::Unauthorized => ClientCode::Unauthorized,
            HandlrError::Forbidden(_) => ClientCode::Forbidden,
            HandlrError::NotFound(_) => ClientCode::NotFound,
            HandlrError::Conflict(_) => ClientCode::Conflict,
            HandlrError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            HandlrError::TooManyRequests => ClientCode::TooManyRequests,
            HandlrError::Cancelled => ClientCode::Cancelled,
            HandlrError::Internal(_) | HandlrError::InvalidConfig(_) => ClientCode::Internal,
            HandlrError::Unavailable(_) => ClientCode::Unavailable,
            HandlrError::Timeout(_) => ClientCode::Timeout,
            HandlrError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            HandlrError::Custom { .. } => ClientCode::Custom,
        }
    }

    /// HTTP status this error is answered and accounted with.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlrError::BadRequest(_) | HandlrError::UnsupportedVersion => 400,
            HandlrError::Unauthorized => 401,
            HandlrError::Forbidden(_) => 403,
            HandlrError::NotFound(_) => 404,
            HandlrError::Conflict(_) => 409,
            HandlrError::PayloadTooLarge => 413,
            HandlrError::TooManyRequests => 429,
            HandlrError::Cancelled => STATUS_CLIENT_CLOSED,
            HandlrError::Internal(_) | HandlrError::InvalidConfig(_) => 500,
            HandlrError::Unavailable(_) => 503,
            HandlrError::Timeout(_) => 504,
            HandlrError::Custom { status, .. } => *status,
        }
    }

    /// Handler-defined error with an explicit status.
    pub fn custom(status: u16, message: impl Into<String>) -> Self {
        HandlrError::Custom {
            status,
            message: message.into(),
        }
    }

    /// True for errors that indicate a server-side fault.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_back_to_matching_code() {
        for err in [
            HandlrError::Unauthorized,
            HandlrError::Forbidden("x".into()),
            HandlrError::TooManyRequests,
            HandlrError::Cancelled,
            HandlrError::Timeout(5),
        ] {
            assert_eq!(ClientCode::from_status(err.status_code()), err.client_code());
        }
        assert_eq!(ClientCode::from_status(418), ClientCode::Custom);
    }
}
