//! Error types and error code constants for propdoc.
//!
//! This module provides a unified error type (`PropdocError`) that bridges
//! domain-specific errors (manifest loading, property lookup) into a common
//! format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (class or property not found)
//! - `4`: Manifest errors (unreadable, malformed, inconsistent hierarchy)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `PropdocError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for PropdocError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

use crate::manifest::ManifestError;
use crate::properties::ReflectionError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (class or property not found).
    ResolutionError = 3,
    /// Manifest could not be loaded or is inconsistent.
    ManifestError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum PropdocError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Class not present in the manifest.
    #[error("class not found: {class_name}")]
    ClassNotFound { class_name: String },

    /// Property not present on the class.
    #[error("property '{property}' not found on class '{class_name}'")]
    PropertyNotFound {
        class_name: String,
        property: String,
    },

    /// Manifest could not be loaded or validated.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl PropdocError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        PropdocError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PropdocError::InternalError {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&PropdocError> for OutputErrorCode {
    fn from(err: &PropdocError) -> Self {
        match err {
            PropdocError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            PropdocError::ClassNotFound { .. } => OutputErrorCode::ResolutionError,
            PropdocError::PropertyNotFound { .. } => OutputErrorCode::ResolutionError,
            PropdocError::Manifest(_) => OutputErrorCode::ManifestError,
            PropdocError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Bridge: ReflectionError -> PropdocError
// ============================================================================

impl From<ReflectionError> for PropdocError {
    fn from(err: ReflectionError) -> Self {
        match err {
            ReflectionError::PropertyNotFound {
                class_name,
                property,
            } => PropdocError::PropertyNotFound {
                class_name,
                property,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            OutputErrorCode::from(&PropdocError::invalid_args("x")).code(),
            2
        );
        assert_eq!(
            OutputErrorCode::from(&PropdocError::ClassNotFound {
                class_name: "A".into()
            })
            .code(),
            3
        );
        assert_eq!(
            OutputErrorCode::from(&PropdocError::Manifest(ManifestError::DuplicateClass {
                class_name: "A".into()
            }))
            .code(),
            4
        );
        assert_eq!(OutputErrorCode::from(&PropdocError::internal("x")).code(), 10);
    }

    #[test]
    fn test_reflection_error_bridge() {
        let err: PropdocError = ReflectionError::not_found("App\\Post", "title").into();
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::ResolutionError);
        assert_eq!(
            err.to_string(),
            "property 'title' not found on class 'App\\Post'"
        );
    }
}
