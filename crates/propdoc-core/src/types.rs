//! Resolved type representation.
//!
//! A [`PhpType`] is what a type token from documentation turns into once it
//! has been resolved in the context of the file it appears in. The resolver
//! itself treats types as opaque values: it only stores them on property
//! entries and hands them back to callers.
//!
//! [`TypeMap`] is the per-file mapping from token text to resolved type that
//! a [`FileTypeMapper`](crate::type_mapper::FileTypeMapper) produces.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// PhpType
// ============================================================================

/// A resolved documentation type.
///
/// # Examples
///
/// ```
/// use propdoc_core::types::PhpType;
///
/// // ?int
/// let nullable_int = PhpType::nullable(PhpType::Int);
/// assert_eq!(nullable_int.to_string(), "?int");
///
/// // \App\Model\User[]
/// let users = PhpType::array_of(PhpType::class("App\\Model\\User"));
/// assert_eq!(users.to_string(), "array<\\App\\Model\\User>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhpType {
    Int,
    Float,
    String,
    Bool,
    Null,
    Mixed,
    Void,
    Callable,
    Iterable,
    Object,
    Resource,
    /// An array, optionally with key and value types (`array<K, V>`, `T[]`).
    Array {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        key: Option<Box<PhpType>>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        value: Option<Box<PhpType>>,
    },
    /// A class, interface or trait, by fully-qualified name (no leading `\`).
    Class {
        name: String,
        /// Generic type arguments (`Collection<User>`), if any.
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        args: Vec<PhpType>,
    },
    /// `self`: the class the annotation is written in.
    SelfRef,
    /// `static`: late static binding.
    StaticRef,
    /// `?T`
    Nullable { inner: Box<PhpType> },
    /// `A|B|...`
    Union { members: Vec<PhpType> },
}

impl PhpType {
    /// Create a class type without generic arguments.
    pub fn class(name: impl Into<String>) -> Self {
        PhpType::Class {
            name: name.into(),
            args: vec![],
        }
    }

    /// Create a class type with generic arguments.
    pub fn class_with_args(name: impl Into<String>, args: Vec<PhpType>) -> Self {
        PhpType::Class {
            name: name.into(),
            args,
        }
    }

    /// Create a nullable type.
    pub fn nullable(inner: PhpType) -> Self {
        PhpType::Nullable {
            inner: Box::new(inner),
        }
    }

    /// Create a list-style array (`T[]`).
    pub fn array_of(value: PhpType) -> Self {
        PhpType::Array {
            key: None,
            value: Some(Box::new(value)),
        }
    }

    /// An array with no element information.
    pub fn plain_array() -> Self {
        PhpType::Array {
            key: None,
            value: None,
        }
    }

    /// Create a union. A single member collapses to that member.
    pub fn union(mut members: Vec<PhpType>) -> Self {
        if members.len() == 1 {
            members.remove(0)
        } else {
            PhpType::Union { members }
        }
    }
}

impl fmt::Display for PhpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpType::Int => f.write_str("int"),
            PhpType::Float => f.write_str("float"),
            PhpType::String => f.write_str("string"),
            PhpType::Bool => f.write_str("bool"),
            PhpType::Null => f.write_str("null"),
            PhpType::Mixed => f.write_str("mixed"),
            PhpType::Void => f.write_str("void"),
            PhpType::Callable => f.write_str("callable"),
            PhpType::Iterable => f.write_str("iterable"),
            PhpType::Object => f.write_str("object"),
            PhpType::Resource => f.write_str("resource"),
            PhpType::Array { key, value } => match (key, value) {
                (None, None) => f.write_str("array"),
                (None, Some(value)) => write!(f, "array<{}>", value),
                (Some(key), Some(value)) => write!(f, "array<{}, {}>", key, value),
                (Some(key), None) => write!(f, "array<{}, mixed>", key),
            },
            PhpType::Class { name, args } => {
                write!(f, "\\{}", name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            PhpType::SelfRef => f.write_str("self"),
            PhpType::StaticRef => f.write_str("static"),
            PhpType::Nullable { inner } => write!(f, "?{}", inner),
            PhpType::Union { members } => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// TypeMap
// ============================================================================

/// Mapping from type-token text to resolved type, scoped to one file.
///
/// Tokens are keyed by their literal text as written in the documentation
/// (`"?User"`, `"int[]"`). A token that is not present is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMap {
    entries: HashMap<String, PhpType>,
}

impl TypeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a token.
    pub fn get(&self, token: &str) -> Option<&PhpType> {
        self.entries.get(token)
    }

    /// Whether a token is resolved in this file.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Record a resolution, replacing any previous one for the same token.
    pub fn insert(&mut self, token: impl Into<String>, ty: PhpType) {
        self.entries.insert(token.into(), ty);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, PhpType)> for TypeMap {
    fn from_iter<I: IntoIterator<Item = (S, PhpType)>>(iter: I) -> Self {
        TypeMap {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars_and_composites() {
        assert_eq!(PhpType::Int.to_string(), "int");
        assert_eq!(PhpType::plain_array().to_string(), "array");
        assert_eq!(
            PhpType::union(vec![PhpType::String, PhpType::Null]).to_string(),
            "string|null"
        );
        assert_eq!(
            PhpType::class_with_args("App\\Collection", vec![PhpType::Int]).to_string(),
            "\\App\\Collection<int>"
        );
        assert_eq!(
            PhpType::Array {
                key: Some(Box::new(PhpType::String)),
                value: Some(Box::new(PhpType::Bool)),
            }
            .to_string(),
            "array<string, bool>"
        );
    }

    #[test]
    fn test_union_of_one_collapses() {
        assert_eq!(PhpType::union(vec![PhpType::Float]), PhpType::Float);
    }

    #[test]
    fn test_type_serialization_is_tagged() {
        let json = serde_json::to_value(PhpType::nullable(PhpType::Int)).unwrap();
        assert_eq!(json["kind"], "nullable");
        assert_eq!(json["inner"]["kind"], "int");
    }

    #[test]
    fn test_type_map_lookup() {
        let map: TypeMap = [("int", PhpType::Int), ("?string", PhpType::nullable(PhpType::String))]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("int"), Some(&PhpType::Int));
        assert!(map.contains("?string"));
        assert!(!map.contains("string"));
    }
}
