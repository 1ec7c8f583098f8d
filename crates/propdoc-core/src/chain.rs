//! Ordered composition of property-resolution strategies.

use crate::class::ClassDescriptor;
use crate::native::NativePropertiesExtension;
use crate::properties::{PropertiesExtension, PropertyEntry, ReflectionError, ReflectionResult};
use crate::resolver::AnnotationPropertiesExtension;
use crate::type_mapper::FileTypeMapper;

/// First-match dispatch over a list of [`PropertiesExtension`]s.
///
/// A property exists if any extension has it; its entry comes from the
/// first extension (in registration order) that has it.
pub struct PropertyReflectionChain<'a, C> {
    extensions: Vec<Box<dyn PropertiesExtension<C> + 'a>>,
}

impl<'a, C: ClassDescriptor> PropertyReflectionChain<'a, C> {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// Declared storage first, then documentation annotations.
    pub fn standard<M>(type_mapper: M) -> Self
    where
        M: FileTypeMapper + Clone + 'a,
    {
        Self::new()
            .with(NativePropertiesExtension::new(type_mapper.clone()))
            .with(AnnotationPropertiesExtension::new(type_mapper))
    }

    /// Append an extension; it is consulted after all earlier ones.
    pub fn with(mut self, extension: impl PropertiesExtension<C> + 'a) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl<C: ClassDescriptor> Default for PropertyReflectionChain<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClassDescriptor> PropertiesExtension<C> for PropertyReflectionChain<'_, C> {
    fn has_property(&self, class: &C, name: &str) -> bool {
        self.extensions
            .iter()
            .any(|extension| extension.has_property(class, name))
    }

    fn get_property(&self, class: &C, name: &str) -> ReflectionResult<PropertyEntry> {
        match self
            .extensions
            .iter()
            .find(|extension| extension.has_property(class, name))
        {
            Some(extension) => extension.get_property(class, name),
            None => Err(ReflectionError::not_found(class.name(), name)),
        }
    }
}
