//! Error types for the audit exporter
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use reqwest::StatusCode;
use thiserror::Error;

/// The main error type for the audit exporter
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured error envelope returned with HTTP 400
    #[error(
        "{} {}: {} (error code {})",
        status,
        reason(*status),
        message.as_deref().unwrap_or(""),
        code
    )]
    Api {
        status: u16,
        code: String,
        message: Option<String>,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Malformed paging protocol data: {message}")]
    ProtocolFormat { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an API error from a decoded error envelope
    pub fn api(status: u16, code: impl Into<String>, message: Option<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a paging protocol format error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolFormat {
            message: message.into(),
        }
    }

    /// Whether this is a structured API error (as opposed to a transport failure)
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Whether the upstream response had an incompatible shape
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::ProtocolFormat { .. })
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Result type alias for the audit exporter
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_field("tenant");
        assert_eq!(err.to_string(), "Missing required config field: tenant");

        let err = Error::protocol("cookie is not a tag");
        assert_eq!(
            err.to_string(),
            "Malformed paging protocol data: cookie is not a tag"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::api(
            400,
            "0x0",
            Some("Invalid object provided in the request.".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "400 Bad Request: Invalid object provided in the request. (error code 0x0)"
        );

        let err = Error::api(400, "0x80040217", None);
        assert_eq!(err.to_string(), "400 Bad Request:  (error code 0x80040217)");
    }

    #[test]
    fn test_classification() {
        let api = Error::api(400, "0x0", None);
        assert!(api.is_api());
        assert!(!api.is_protocol());
        assert_eq!(api.status(), Some(400));

        let protocol = Error::protocol("bad");
        assert!(protocol.is_protocol());
        assert!(!protocol.is_api());
        assert_eq!(protocol.status(), None);

        assert!(!Error::Cancelled.is_api());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::missing_field("tenant"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Missing required config field: tenant"));
    }
}
