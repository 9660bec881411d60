//! Index error types
//!
//! Error codes:
//! - INDEX_CONFIG_INVALID (REJECT)
//! - INDEX_UNKNOWN_FIELD (REJECT)
//!
//! Only construction can fail. Lookups and mutations are total.

use std::fmt;

use thiserror::Error;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Construction request rejected
    Reject,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Declared key list is malformed
    IndexConfigInvalid,
    /// Configured name does not match an attribute of the record type
    IndexUnknownField,
}

impl IndexErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::IndexConfigInvalid => "INDEX_CONFIG_INVALID",
            IndexErrorCode::IndexUnknownField => "INDEX_UNKNOWN_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Reject
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("[REJECT] INDEX_CONFIG_INVALID: {0}")]
    ConfigInvalid(String),

    #[error("[REJECT] INDEX_UNKNOWN_FIELD: no attribute named '{0}'")]
    UnknownField(String),
}

impl IndexError {
    /// Create a configuration error
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        IndexError::ConfigInvalid(reason.into())
    }

    /// Create an unknown field error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        IndexError::UnknownField(name.into())
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        match self {
            IndexError::ConfigInvalid(_) => IndexErrorCode::IndexConfigInvalid,
            IndexError::UnknownField(_) => IndexErrorCode::IndexUnknownField,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Returns the error message without code prefix
    pub fn message(&self) -> String {
        match self {
            IndexError::ConfigInvalid(reason) => reason.clone(),
            IndexError::UnknownField(name) => format!("no attribute named '{}'", name),
        }
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
