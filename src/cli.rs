//! CLI front door.
//!
//! Provides the command helpers behind the `propdoc` binary:
//! - `has` - Does a class have a property
//! - `get` - Resolve one property
//! - `list` - All annotation properties of a class, in merge order
//!
//! ## Project
//!
//! Every command runs against a [`Project`]: a validated class registry plus
//! a source type mapper rooted at the directory the manifest's `file` paths
//! are relative to. Explicit type maps from the manifest are preloaded and
//! take the place of reading those files.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, PropdocError>`. The caller (typically the
//! binary) emits the error as JSON and exits with its code.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use propdoc_core::chain::PropertyReflectionChain;
use propdoc_core::error::PropdocError;
use propdoc_core::manifest::{ClassHandle, ClassRegistry};
use propdoc_core::output::{HasPropertyResponse, PropertyListResponse, PropertyResponse};
use propdoc_core::properties::PropertiesExtension;
use propdoc_core::resolver::AnnotationPropertiesExtension;
use propdoc_core::type_mapper::SourceTypeMapper;

/// A loaded manifest and the type mapper for its source files.
pub struct Project {
    registry: ClassRegistry,
    type_mapper: Arc<SourceTypeMapper>,
}

impl Project {
    /// Load `manifest`; source files resolve against `root`, or against the
    /// manifest's directory when `root` is `None`.
    pub fn open(manifest: &Path, root: Option<&Path>) -> Result<Self, PropdocError> {
        let registry = ClassRegistry::load(manifest)?;
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => manifest_dir(manifest),
        };
        Ok(Self::with_registry(registry, root))
    }

    /// Wrap an already validated registry.
    pub fn with_registry(registry: ClassRegistry, root: impl Into<PathBuf>) -> Self {
        let type_mapper = SourceTypeMapper::new(root);
        for (file, map) in registry.type_maps() {
            type_mapper.preload(file.clone(), map.clone());
        }
        tracing::debug!(
            "Opened project at {} ({} classes)",
            type_mapper.root().display(),
            registry.len()
        );
        Project {
            registry,
            type_mapper: Arc::new(type_mapper),
        }
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn type_mapper(&self) -> &SourceTypeMapper {
        &self.type_mapper
    }

    fn class(&self, name: &str) -> Result<ClassHandle<'_>, PropdocError> {
        self.registry
            .get(name)
            .ok_or_else(|| PropdocError::ClassNotFound {
                class_name: name.to_string(),
            })
    }

    fn chain(&self) -> PropertyReflectionChain<'_, ClassHandle<'_>> {
        PropertyReflectionChain::standard(Arc::clone(&self.type_mapper))
    }
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn require_name(what: &str, value: &str) -> Result<(), PropdocError> {
    if value.trim().is_empty() {
        return Err(PropdocError::invalid_args(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Check whether `class` has `property`.
pub fn run_has(
    project: &Project,
    class: &str,
    property: &str,
) -> Result<HasPropertyResponse, PropdocError> {
    require_name("class", class)?;
    require_name("property", property)?;
    let handle = project.class(class)?;
    let found = project.chain().has_property(&handle, property);
    Ok(HasPropertyResponse::new(handle.decl().name.as_str(), property, found))
}

/// Resolve `property` on `class`.
pub fn run_get(
    project: &Project,
    class: &str,
    property: &str,
) -> Result<PropertyResponse, PropdocError> {
    require_name("class", class)?;
    require_name("property", property)?;
    let handle = project.class(class)?;
    let entry = project.chain().get_property(&handle, property)?;
    Ok(PropertyResponse::new(handle.decl().name.as_str(), &entry))
}

/// List the annotation properties of `class` in merge order.
pub fn run_list(project: &Project, class: &str) -> Result<PropertyListResponse, PropdocError> {
    require_name("class", class)?;
    let handle = project.class(class)?;
    let resolver = AnnotationPropertiesExtension::new(Arc::clone(&project.type_mapper));
    let properties = resolver.properties_of(&handle);
    Ok(PropertyListResponse::new(
        handle.decl().name.as_str(),
        handle.kind().as_str(),
        properties.values(),
    ))
}
