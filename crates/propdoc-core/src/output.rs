//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** All CLI output is valid JSON
//! 2. **Status first:** Every response has `status` as first field
//! 3. **Deterministic:** Same input -> same output (field order, array ordering)
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, PropdocError};
use crate::properties::{PropertyEntry, PropertyOrigin};
use crate::types::PhpType;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// A resolved property, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    /// Canonical type string (`?int`, `\App\User`).
    #[serde(rename = "type")]
    pub type_string: String,
    /// Structured type.
    pub type_info: PhpType,
    pub readable: bool,
    pub writable: bool,
    pub declaring_class: String,
    pub origin: PropertyOrigin,
    /// `@property`, `@property-read` or `@property-write`; absent for
    /// native properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl From<&PropertyEntry> for PropertyInfo {
    fn from(entry: &PropertyEntry) -> Self {
        let tag = match entry.origin() {
            PropertyOrigin::Annotation => Some(entry.access().tag().to_string()),
            PropertyOrigin::Native => None,
        };
        PropertyInfo {
            name: entry.name().to_string(),
            type_string: entry.ty().to_string(),
            type_info: entry.ty().clone(),
            readable: entry.is_readable(),
            writable: entry.is_writable(),
            declaring_class: entry.declaring_class().to_string(),
            origin: entry.origin(),
            tag,
        }
    }
}

/// Response for `has`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasPropertyResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub class: String,
    pub property: String,
    pub found: bool,
}

impl HasPropertyResponse {
    pub fn new(class: impl Into<String>, property: impl Into<String>, found: bool) -> Self {
        HasPropertyResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            class: class.into(),
            property: property.into(),
            found,
        }
    }
}

/// Response for `get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub class: String,
    pub property: PropertyInfo,
}

impl PropertyResponse {
    pub fn new(class: impl Into<String>, entry: &PropertyEntry) -> Self {
        PropertyResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            class: class.into(),
            property: PropertyInfo::from(entry),
        }
    }
}

/// Response for `list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyListResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub class: String,
    /// `class`, `interface` or `trait`.
    pub kind: String,
    /// Properties in resolution order.
    pub properties: Vec<PropertyInfo>,
}

impl PropertyListResponse {
    pub fn new<'e>(
        class: impl Into<String>,
        kind: impl Into<String>,
        entries: impl IntoIterator<Item = &'e PropertyEntry>,
    ) -> Self {
        PropertyListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            class: class.into(),
            kind: kind.into(),
            properties: entries.into_iter().map(PropertyInfo::from).collect(),
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a PropdocError.
    pub fn from_error(err: &PropdocError) -> Self {
        let details = match err {
            PropdocError::ClassNotFound { class_name } => {
                Some(serde_json::json!({ "class": class_name }))
            }
            PropdocError::PropertyNotFound {
                class_name,
                property,
            } => Some(serde_json::json!({ "class": class_name, "property": property })),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &PropdocError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for CLI, ensuring consistency.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
