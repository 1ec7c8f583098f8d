//! Annotation-based property resolution.
//!
//! [`AnnotationPropertiesExtension`] answers property queries from
//! `@property`, `@property-read` and `@property-write` annotations, merged
//! across a class's composition graph.
//!
//! # Merge order
//!
//! For a class `C` the entry map is built as follows:
//!
//! 1. Each trait used directly by `C`, in declaration order.
//! 2. Each parent, nearest first: the parent's full resolution, then each
//!    trait the parent uses directly.
//! 3. Each implemented interface, in declaration order.
//! 4. `C`'s own doc comment.
//!
//! Steps 1-3 merge insert-if-absent: a name already in the map keeps its
//! entry, so earlier sources win. Step 4 overwrites: the class's own
//! documentation always wins over anything inherited. The two policies must
//! not be unified.
//!
//! An annotation whose type token has no entry in the file's type map is
//! dropped without any diagnostic.
//!
//! # Caching
//!
//! The entry map of a queried class is computed once and kept for the
//! resolver's lifetime. Only top-level queries are memoized; classes reached
//! during traversal are recomputed each time they are visited.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::annotation::scan_property_annotations;
use crate::class::ClassDescriptor;
use crate::properties::{
    PropertiesExtension, PropertyEntry, PropertyMap, ReflectionError, ReflectionResult,
};
use crate::type_mapper::FileTypeMapper;

/// Maximum nesting of traits/parents/interfaces followed during traversal.
pub const MAX_COMPOSITION_DEPTH: usize = 64;

/// Resolves virtual properties from class doc comments.
///
/// Safe to share between threads when the type mapper is: the cache lock is
/// held while a class is computed, so each class is computed at most once.
pub struct AnnotationPropertiesExtension<M> {
    type_mapper: M,
    cache: Mutex<HashMap<String, Arc<PropertyMap>>>,
}

impl<M: FileTypeMapper> AnnotationPropertiesExtension<M> {
    pub fn new(type_mapper: M) -> Self {
        Self {
            type_mapper,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn type_mapper(&self) -> &M {
        &self.type_mapper
    }

    /// All annotation properties visible on `class`, in merge order.
    ///
    /// Computes and memoizes the map on first use.
    pub fn properties_of<C: ClassDescriptor>(&self, class: &C) -> Arc<PropertyMap> {
        let mut cache = self.cache.lock().expect("property cache Mutex poisoned");
        if let Some(properties) = cache.get(class.name()) {
            return Arc::clone(properties);
        }

        let mut active = Vec::new();
        let properties = Arc::new(self.resolve_entries(class, class, &mut active));
        tracing::debug!(
            "Resolved {} annotation properties for {}",
            properties.len(),
            class.name()
        );
        cache.insert(class.name().to_string(), Arc::clone(&properties));
        properties
    }

    /// Number of classes with a memoized entry map.
    pub fn cached_classes(&self) -> usize {
        self.cache.lock().expect("property cache Mutex poisoned").len()
    }

    /// Build the entry map for `class`.
    ///
    /// `scope` is the class that led the traversal here: the class itself at
    /// the top, the using class for its traits, and each parent or interface
    /// for its own subtree. `active` holds the classes currently being
    /// resolved; re-entering one means the composition graph has a cycle.
    fn resolve_entries<C: ClassDescriptor>(
        &self,
        class: &C,
        scope: &C,
        active: &mut Vec<String>,
    ) -> PropertyMap {
        if active.iter().any(|name| name == class.name()) {
            tracing::warn!(
                "Composition cycle through {} (reached from {}), skipping",
                class.name(),
                scope.name()
            );
            return PropertyMap::new();
        }
        if active.len() >= MAX_COMPOSITION_DEPTH {
            tracing::warn!(
                "Composition depth {} exceeded at {}, skipping",
                MAX_COMPOSITION_DEPTH,
                class.name()
            );
            return PropertyMap::new();
        }
        tracing::trace!("Resolving {} in scope of {}", class.name(), scope.name());

        active.push(class.name().to_string());
        let mut properties = PropertyMap::new();

        for used_trait in class.traits() {
            let inherited = self.resolve_entries(&used_trait, class, active);
            merge_absent(&mut properties, inherited);
        }

        for parent in class.parents() {
            let inherited = self.resolve_entries(&parent, &parent, active);
            merge_absent(&mut properties, inherited);
            for parent_trait in parent.traits() {
                let inherited = self.resolve_entries(&parent_trait, &parent, active);
                merge_absent(&mut properties, inherited);
            }
        }

        for interface in class.interfaces() {
            let inherited = self.resolve_entries(&interface, &interface, active);
            merge_absent(&mut properties, inherited);
        }

        self.apply_own_annotations(class, &mut properties);

        active.pop();
        properties
    }

    /// Overwrite `properties` with the annotations in `class`'s doc comment.
    fn apply_own_annotations<C: ClassDescriptor>(&self, class: &C, properties: &mut PropertyMap) {
        let Some(file) = class.source_file() else {
            return;
        };
        let Some(doc) = class.doc_comment() else {
            return;
        };

        let annotations = scan_property_annotations(doc);
        if annotations.is_empty() {
            return;
        }

        let type_map = self.type_mapper.type_map(file);
        for annotation in annotations {
            let Some(ty) = type_map.get(&annotation.type_token) else {
                continue;
            };
            let entry = PropertyEntry::annotated(
                annotation.name.clone(),
                ty.clone(),
                annotation.access,
                class.name(),
            );
            properties.insert(annotation.name, entry);
        }
    }
}

/// Insert every entry of `source` whose name is not yet in `target`.
fn merge_absent(target: &mut PropertyMap, source: PropertyMap) {
    for (name, entry) in source {
        target.entry(name).or_insert(entry);
    }
}

impl<M: FileTypeMapper, C: ClassDescriptor> PropertiesExtension<C>
    for AnnotationPropertiesExtension<M>
{
    fn has_property(&self, class: &C, name: &str) -> bool {
        self.properties_of(class).contains_key(name)
    }

    fn get_property(&self, class: &C, name: &str) -> ReflectionResult<PropertyEntry> {
        self.properties_of(class)
            .get(name)
            .cloned()
            .ok_or_else(|| ReflectionError::not_found(class.name(), name))
    }
}
