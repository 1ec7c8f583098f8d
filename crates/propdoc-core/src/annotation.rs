//! `@property` annotation extraction.
//!
//! Recognizes the three documentation forms
//!
//! ```text
//! @property       <type> $<name>
//! @property-read  <type> $<name>
//! @property-write <type> $<name>
//! ```
//!
//! where `<type>` follows [`TYPE_TOKEN_PATTERN`] and `<name>` is one or more
//! of `[A-Za-z0-9_]`. Anything else in the doc comment is ignored; malformed
//! annotations are simply not matched.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::type_mapper::TYPE_TOKEN_PATTERN;

static PROPERTY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"@property(-read|-write)?\s+({})\s+\$([a-zA-Z0-9_]+)",
        TYPE_TOKEN_PATTERN
    ))
    .expect("property tag pattern is valid")
});

/// Read/write capability granted by an annotation.
///
/// Every variant is readable, writable or both, so an entry built from an
/// annotation can never be neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyAccess {
    /// `@property`
    ReadWrite,
    /// `@property-read`
    ReadOnly,
    /// `@property-write`
    WriteOnly,
}

impl PropertyAccess {
    fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some("-read") => PropertyAccess::ReadOnly,
            Some("-write") => PropertyAccess::WriteOnly,
            _ => PropertyAccess::ReadWrite,
        }
    }

    pub fn is_readable(self) -> bool {
        !matches!(self, PropertyAccess::WriteOnly)
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, PropertyAccess::ReadOnly)
    }

    /// The tag that produces this access (`@property-read`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            PropertyAccess::ReadWrite => "@property",
            PropertyAccess::ReadOnly => "@property-read",
            PropertyAccess::WriteOnly => "@property-write",
        }
    }
}

/// One matched `@property*` annotation, before type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAnnotation {
    pub access: PropertyAccess,
    /// Type token exactly as written.
    pub type_token: String,
    /// Property name without the `$`.
    pub name: String,
}

/// Scan a raw doc comment for property annotations, in order of appearance.
pub fn scan_property_annotations(doc: &str) -> Vec<PropertyAnnotation> {
    PROPERTY_TAG
        .captures_iter(doc)
        .map(|caps| PropertyAnnotation {
            access: PropertyAccess::from_suffix(caps.get(1).map(|m| m.as_str())),
            type_token: caps[2].to_string(),
            name: caps[3].to_string(),
        })
        .collect()
}
