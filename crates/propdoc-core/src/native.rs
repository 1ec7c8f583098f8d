//! Properties declared with storage.
//!
//! [`NativePropertiesExtension`] answers for properties that exist in a
//! class body (`public $title;`), including those inherited from used traits
//! and parent classes. Private properties of a parent are not visible on the
//! child; private properties of a trait the class itself uses are.
//!
//! The property type comes from the declaration's `@var` token, resolved
//! through the type map of the declaring class's file. A missing or
//! unresolved token yields `mixed`.

use std::path::PathBuf;

use crate::class::{ClassDescriptor, DeclaredProperty, Visibility};
use crate::properties::{PropertiesExtension, PropertyEntry, ReflectionError, ReflectionResult};
use crate::resolver::MAX_COMPOSITION_DEPTH;
use crate::type_mapper::FileTypeMapper;
use crate::types::PhpType;

/// A declaration found somewhere in a class's composition.
#[derive(Debug)]
struct Declaration {
    class_name: String,
    file: Option<PathBuf>,
    property: DeclaredProperty,
}

/// Resolves properties declared in class, trait and parent bodies.
pub struct NativePropertiesExtension<M> {
    type_mapper: M,
}

impl<M: FileTypeMapper> NativePropertiesExtension<M> {
    pub fn new(type_mapper: M) -> Self {
        Self { type_mapper }
    }

    fn entry_for(&self, declaration: Declaration) -> PropertyEntry {
        let ty = match (&declaration.file, &declaration.property.type_token) {
            (Some(file), Some(token)) => self
                .type_mapper
                .type_map(file)
                .get(token)
                .cloned()
                .unwrap_or(PhpType::Mixed),
            _ => PhpType::Mixed,
        };
        PropertyEntry::native(declaration.property.name, ty, declaration.class_name)
    }
}

fn declared_in<C: ClassDescriptor>(
    class: &C,
    name: &str,
    include_private: bool,
) -> Option<Declaration> {
    class
        .declared_properties()
        .into_iter()
        .find(|property| {
            property.name == name
                && (include_private || property.visibility != Visibility::Private)
        })
        .map(|property| Declaration {
            class_name: class.name().to_string(),
            file: class.source_file().map(|path| path.to_path_buf()),
            property,
        })
}

/// Search the traits used by `class`, and the traits those use.
fn declared_in_traits<C: ClassDescriptor>(
    class: &C,
    name: &str,
    include_private: bool,
    depth: usize,
) -> Option<Declaration> {
    if depth >= MAX_COMPOSITION_DEPTH {
        return None;
    }
    class.traits().iter().find_map(|used_trait| {
        declared_in(used_trait, name, include_private)
            .or_else(|| declared_in_traits(used_trait, name, include_private, depth + 1))
    })
}

fn find_declaration<C: ClassDescriptor>(class: &C, name: &str) -> Option<Declaration> {
    declared_in(class, name, true)
        .or_else(|| declared_in_traits(class, name, true, 0))
        .or_else(|| {
            class.parents().iter().find_map(|parent| {
                declared_in(parent, name, false)
                    .or_else(|| declared_in_traits(parent, name, false, 0))
            })
        })
}

impl<M: FileTypeMapper, C: ClassDescriptor> PropertiesExtension<C> for NativePropertiesExtension<M> {
    fn has_property(&self, class: &C, name: &str) -> bool {
        find_declaration(class, name).is_some()
    }

    fn get_property(&self, class: &C, name: &str) -> ReflectionResult<PropertyEntry> {
        find_declaration(class, name)
            .map(|declaration| self.entry_for(declaration))
            .ok_or_else(|| ReflectionError::not_found(class.name(), name))
    }
}
