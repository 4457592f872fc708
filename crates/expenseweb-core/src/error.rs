//! Error types for expenseweb-core
//!
//! Errors carry a stable code for API responses and a severity that picks
//! the level they are logged at.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Session missing or expired on the backend
    Unauthorized,
    /// Backend answered with a non-success status
    BackendError,
    /// Request never produced a response
    TransportError,
    /// Response body could not be decoded
    InvalidResponse,
    /// Form input rejected before sending
    ValidationError,
    /// A submit is already outstanding for this form
    SubmitInFlight,
    /// The form was closed
    FormClosed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::BackendError => write!(f, "BACKEND_ERROR"),
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorCode::InvalidResponse => write!(f, "INVALID_RESPONSE"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::SubmitInFlight => write!(f, "SUBMIT_IN_FLIGHT"),
            ErrorCode::FormClosed => write!(f, "FORM_CLOSED"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

impl ErrorSeverity {
    /// Level an error of this severity is logged at
    pub fn log_level(self) -> log::Level {
        match self {
            ErrorSeverity::Debug => log::Level::Debug,
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for expenseweb-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Backend returned {status}: {message}")]
    BackendStatus { status: u16, message: String },

    #[error("Backend unreachable: {message}")]
    Transport { message: String },

    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("A submit is already in progress")]
    SubmitInFlight,

    #[error("Form is closed")]
    FormClosed,
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::BackendStatus { .. } => ErrorCode::BackendError,
            CoreError::Transport { .. } => ErrorCode::TransportError,
            CoreError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::SubmitInFlight => ErrorCode::SubmitInFlight,
            CoreError::FormClosed => ErrorCode::FormClosed,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Unauthorized => ErrorSeverity::Info,
            CoreError::BackendStatus { .. } => ErrorSeverity::Error,
            CoreError::Transport { .. } => ErrorSeverity::Error,
            CoreError::InvalidResponse { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::SubmitInFlight => ErrorSeverity::Debug,
            CoreError::FormClosed => ErrorSeverity::Debug,
        }
    }

    /// Whether the user has to log in again
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Unauthorized)
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::BackendStatus { status, message } => {
                details = details
                    .with_detail(serde_json::json!({ "status": status, "body": message }))
                    .with_suggestion("Check the values you entered and try again.".to_string());
            }
            CoreError::Transport { .. } => {
                details = details.with_suggestion(
                    "Check that the backend is running and backend.base_url is correct.".to_string(),
                );
            }
            CoreError::ValidationError { field, .. } => {
                details = details.with_detail(serde_json::json!({ "field": field }));
            }
            CoreError::Unauthorized => {
                details = details.with_suggestion("Log in again.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Unauthorized.to_string(), "UNAUTHORIZED");
        assert_eq!(ErrorCode::SubmitInFlight.to_string(), "SUBMIT_IN_FLIGHT");
        assert_eq!(ErrorCode::FormClosed.to_string(), "FORM_CLOSED");
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::Unauthorized.severity(), ErrorSeverity::Info);
        let error = CoreError::Transport { message: "refused".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert_eq!(error.severity().log_level(), log::Level::Error);

        let invalid = CoreError::ValidationError {
            field: "currency".to_string(),
            message: "must be a 3-letter code".to_string(),
        };
        assert_eq!(invalid.severity().log_level(), log::Level::Warn);
        assert_eq!(CoreError::SubmitInFlight.severity().log_level(), log::Level::Debug);
    }

    #[test]
    fn test_backend_status_details() {
        let error = CoreError::BackendStatus {
            status: 400,
            message: "Missing fields".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::BackendError);
        assert!(details.message.contains("400"));
        assert_eq!(details.details.unwrap()["status"], 400);
        assert_eq!(details.suggestions.len(), 1);
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(CoreError::Unauthorized.is_unauthorized());
        assert!(!CoreError::FormClosed.is_unauthorized());
    }
}
