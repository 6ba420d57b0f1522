//! Error types for geocache.
//!
//! This module provides the single error hierarchy used by every crate, built
//! with `thiserror`. Payloads are plain strings so the error is `Clone`: a
//! failed upstream load is handed to every caller that waited on it.

use thiserror::Error;

/// Result type alias using `GeocodeError`.
pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Main error type for all geocache operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeocodeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Latitude/longitude out of range, not finite, or unparsable.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Malformed locale tag.
    #[error("Invalid locale '{tag}': {reason}")]
    InvalidLocale {
        /// The tag as given
        tag: String,
        /// What is wrong with it
        reason: String,
    },

    /// Place record that cannot be constructed.
    #[error("Invalid place: {0}")]
    InvalidPlace(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSPORT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    /// The provider rejected the request because of its quota.
    #[error("Rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited {
        /// Seconds the provider asked callers to wait, if it said
        retry_after_secs: Option<u64>,
    },

    /// The provider answered with an error status.
    #[error("Upstream returned {status}: {reason}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
        /// Status text or error body
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // PARSING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Provider response could not be interpreted.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {}s", secs),
        None => String::new(),
    }
}

impl GeocodeError {
    /// Creates an [`GeocodeError::InvalidLocale`] for `tag`.
    pub fn invalid_locale(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        GeocodeError::InvalidLocale {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            GeocodeError::HttpError(_)
            | GeocodeError::ConnectionTimeout(_)
            | GeocodeError::RateLimited { .. } => true,
            GeocodeError::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            GeocodeError::ValidationError(_)
                | GeocodeError::InvalidCoordinate(_)
                | GeocodeError::InvalidLocale { .. }
                | GeocodeError::InvalidPlace(_)
        )
    }

    /// Returns true if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, GeocodeError::ConfigError(_))
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(err: serde_json::Error) -> Self {
        GeocodeError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for GeocodeError {
    fn from(err: std::io::Error) -> Self {
        GeocodeError::IoError(err.to_string())
    }
}
