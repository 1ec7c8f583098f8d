//! Class descriptor interface.
//!
//! The resolver never inspects classes directly. Everything it needs to know
//! about a class's composition (used traits, parents, interfaces) and its
//! source (file path, raw doc comment) comes through [`ClassDescriptor`].
//!
//! Descriptors are cheap handles: relations return new handles by value, so
//! an implementation is typically a reference into some registry (see
//! [`ClassHandle`](crate::manifest::ClassHandle)).

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What kind of class-like declaration a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
        }
    }
}

/// Visibility of a natively declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A property declared with real storage (`public $name;`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredProperty {
    pub name: String,
    /// The `@var` type token from the property's doc comment, if any.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_token: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl DeclaredProperty {
    pub fn new(name: impl Into<String>, type_token: Option<&str>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_token: type_token.map(str::to_string),
            visibility,
        }
    }
}

/// Structural view of a class, trait or interface.
///
/// # Ordering contract
///
/// - [`traits`](Self::traits): traits used *directly* by this class, in
///   declaration order.
/// - [`parents`](Self::parents): all ancestor classes, nearest first.
/// - [`interfaces`](Self::interfaces): all implemented interfaces, in
///   declaration order.
///
/// [`source_file`](Self::source_file) and [`doc_comment`](Self::doc_comment)
/// return `None` for classes with no backing source (built-in or compiled).
pub trait ClassDescriptor: Sized {
    /// Fully-qualified class name. Stable for the whole analysis run.
    fn name(&self) -> &str;

    fn traits(&self) -> Vec<Self>;

    fn parents(&self) -> Vec<Self>;

    fn interfaces(&self) -> Vec<Self>;

    fn source_file(&self) -> Option<&Path>;

    fn doc_comment(&self) -> Option<&str>;

    /// Properties declared with storage in this class body.
    ///
    /// Only the class's own declarations; inherited ones are reached through
    /// [`parents`](Self::parents) and [`traits`](Self::traits).
    fn declared_properties(&self) -> Vec<DeclaredProperty> {
        Vec::new()
    }
}
