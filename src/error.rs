use std::error::Error;
use std::fmt;
use warp::http::StatusCode;

/// Why an authentication attempt failed.
///
/// Only ever recorded server-side. Every variant reaches the caller as the same
/// [`PostboardError::AuthenticationFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer token on the request
    MissingToken,
    /// Signature mismatch or a token that does not parse
    InvalidSignature,
    /// Signature is fine but the validity window has elapsed
    Expired,
    /// Token subject no longer exists in the store
    UnknownSubject,
    /// Email/password pair did not match a principal
    BadCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingToken => "missing bearer token",
            Self::InvalidSignature => "invalid token signature",
            Self::Expired => "token expired",
            Self::UnknownSubject => "token subject not found",
            Self::BadCredentials => "incorrect email or password",
        };
        f.write_str(reason)
    }
}

#[derive(Debug)]
pub enum PostboardError {
    // Request errors
    ValidationError(String),
    ConstraintViolation(String),

    // Auth errors
    AuthenticationFailure(AuthFailure),
    Forbidden,

    // Lookup errors
    NotFound(String),

    // Storage errors
    StoreFailure(String),

    // Configuration errors
    ConfigError(String),
}

/// Message sent for every authentication failure, whatever the cause
pub const AUTH_FAILURE_MESSAGE: &str = "Unauthorized";

impl PostboardError {
    /// Outward HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreFailure(_) | Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client.
    ///
    /// Internal details of store and configuration failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::AuthenticationFailure(_) => AUTH_FAILURE_MESSAGE.to_string(),
            Self::StoreFailure(_) | Self::ConfigError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for PostboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
            Self::AuthenticationFailure(reason) => write!(f, "Authentication failed: {}", reason),
            Self::Forbidden => write!(f, "Forbidden: you do not own this resource"),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::StoreFailure(msg) => write!(f, "Store failure: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for PostboardError {}

impl warp::reject::Reject for PostboardError {}

impl From<AuthFailure> for PostboardError {
    fn from(reason: AuthFailure) -> Self {
        PostboardError::AuthenticationFailure(reason)
    }
}

impl From<std::io::Error> for PostboardError {
    fn from(err: std::io::Error) -> Self {
        PostboardError::ConfigError(format!("I/O error: {}", err))
    }
}

// Generic result type for Postboard
pub type Result<T> = std::result::Result<T, PostboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_taxonomy() {
        assert_eq!(
            PostboardError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PostboardError::ConstraintViolation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PostboardError::from(AuthFailure::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(PostboardError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            PostboardError::NotFound("Post".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PostboardError::StoreFailure("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_failures_share_public_message() {
        let reasons = [
            AuthFailure::MissingToken,
            AuthFailure::InvalidSignature,
            AuthFailure::Expired,
            AuthFailure::UnknownSubject,
            AuthFailure::BadCredentials,
        ];

        for reason in reasons {
            assert_eq!(PostboardError::from(reason).public_message(), AUTH_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn test_store_failure_hides_details() {
        let err = PostboardError::StoreFailure("lock poisoned at row 7".into());
        assert!(!err.public_message().contains("row 7"));
    }
}
