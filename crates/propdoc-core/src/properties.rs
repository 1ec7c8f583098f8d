//! Property entries and the property-resolution extension point.
//!
//! A host reflection system asks one or more [`PropertiesExtension`]s whether
//! a class has a property and, if so, for its [`PropertyEntry`]. Each
//! extension is one resolution strategy (declared storage, documentation
//! annotations, ...); [`PropertyReflectionChain`](crate::chain::PropertyReflectionChain)
//! composes them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::PropertyAccess;
use crate::class::ClassDescriptor;
use crate::types::PhpType;

// ============================================================================
// Property Entry
// ============================================================================

/// Where a property entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOrigin {
    /// A `@property*` annotation in a class doc comment.
    Annotation,
    /// A property declared with storage.
    Native,
}

/// One resolved property. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    name: String,
    ty: PhpType,
    access: PropertyAccess,
    declaring_class: String,
    origin: PropertyOrigin,
}

impl PropertyEntry {
    /// Entry introduced by an annotation in `declaring_class`'s doc comment.
    pub fn annotated(
        name: impl Into<String>,
        ty: PhpType,
        access: PropertyAccess,
        declaring_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            access,
            declaring_class: declaring_class.into(),
            origin: PropertyOrigin::Annotation,
        }
    }

    /// Entry for a property declared with storage. Always read-write.
    pub fn native(name: impl Into<String>, ty: PhpType, declaring_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            access: PropertyAccess::ReadWrite,
            declaring_class: declaring_class.into(),
            origin: PropertyOrigin::Native,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &PhpType {
        &self.ty
    }

    pub fn access(&self) -> PropertyAccess {
        self.access
    }

    pub fn is_readable(&self) -> bool {
        self.access.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.access.is_writable()
    }

    /// The class whose source introduced this property (provenance only).
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    pub fn origin(&self) -> PropertyOrigin {
        self.origin
    }
}

/// Property name -> entry, in resolution order.
pub type PropertyMap = IndexMap<String, PropertyEntry>;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from property lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    /// `get_property` was asked for a property the class does not have.
    #[error("property '{property}' not found on class '{class_name}'")]
    PropertyNotFound {
        class_name: String,
        property: String,
    },
}

impl ReflectionError {
    pub fn not_found(class_name: impl Into<String>, property: impl Into<String>) -> Self {
        ReflectionError::PropertyNotFound {
            class_name: class_name.into(),
            property: property.into(),
        }
    }
}

/// Result type for property lookups.
pub type ReflectionResult<T> = Result<T, ReflectionError>;

// ============================================================================
// Extension Point
// ============================================================================

/// One property-resolution strategy.
///
/// `get_property` is only meaningful after `has_property` returned `true`
/// for the same class and name; otherwise it fails with
/// [`ReflectionError::PropertyNotFound`].
pub trait PropertiesExtension<C: ClassDescriptor> {
    fn has_property(&self, class: &C, name: &str) -> bool;

    fn get_property(&self, class: &C, name: &str) -> ReflectionResult<PropertyEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_entry_flags() {
        let entry = PropertyEntry::annotated(
            "slug",
            PhpType::String,
            PropertyAccess::ReadOnly,
            "App\\Post",
        );
        assert_eq!(entry.name(), "slug");
        assert!(entry.is_readable());
        assert!(!entry.is_writable());
        assert_eq!(entry.declaring_class(), "App\\Post");
        assert_eq!(entry.origin(), PropertyOrigin::Annotation);
    }

    #[test]
    fn test_native_entry_is_read_write() {
        let entry = PropertyEntry::native("id", PhpType::Int, "App\\Post");
        assert!(entry.is_readable() && entry.is_writable());
        assert_eq!(entry.origin(), PropertyOrigin::Native);
    }

    #[test]
    fn test_not_found_message() {
        let err = ReflectionError::not_found("App\\Post", "missing");
        assert_eq!(
            err.to_string(),
            "property 'missing' not found on class 'App\\Post'"
        );
    }
}
