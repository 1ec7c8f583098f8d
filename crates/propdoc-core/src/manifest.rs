//! Class manifests and the class registry.
//!
//! A manifest is a JSON description of a set of classes: their kind, source
//! file, doc comment, `extends`/`implements`/`uses` relations and declared
//! properties, plus optional explicit type maps per file:
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "App\\Base", "file": "src/Base.php", "uses": ["App\\HasId"] },
//!     { "name": "App\\HasId", "kind": "trait", "file": "src/HasId.php",
//!       "doc": "/** @property int $id */" }
//!   ],
//!   "type_maps": { "src/HasId.php": { "int": "int" } }
//! }
//! ```
//!
//! For an interface, `implements` lists the interfaces it extends.
//!
//! [`ClassRegistry`] validates a manifest once (duplicate names, cycles,
//! relation kinds) and hands out [`ClassHandle`]s, which implement
//! [`ClassDescriptor`]. Class lookups ignore ASCII case and a leading `\`.
//! References to classes missing from the manifest are skipped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::class::{ClassDescriptor, ClassKind, DeclaredProperty};
use crate::type_mapper::NameContext;
use crate::types::TypeMap;

// ============================================================================
// Manifest Types
// ============================================================================

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassManifest {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    /// File -> (type token -> type expression). Expressions are resolved in
    /// the global namespace, so class names must be fully qualified.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub type_maps: BTreeMap<PathBuf, BTreeMap<String, String>>,
}

/// One class, interface or trait.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<DeclaredProperty>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate class '{class_name}' in manifest")]
    DuplicateClass { class_name: String },

    #[error("inheritance cycle through class '{class_name}'")]
    InheritanceCycle { class_name: String },

    #[error("class '{class_name}' {relation} '{reference}', which is a {found}, not a {expected}")]
    KindMismatch {
        class_name: String,
        relation: &'static str,
        reference: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid type '{type_expr}' for token '{token}' in type map of {}", .file.display())]
    InvalidType {
        file: PathBuf,
        token: String,
        type_expr: String,
    },
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

// ============================================================================
// Registry
// ============================================================================

/// Lookup key: no leading `\`, ASCII-lowercased.
fn class_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Validated set of classes from a manifest.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDecl>,
    index: HashMap<String, usize>,
    type_maps: HashMap<PathBuf, TypeMap>,
}

impl ClassRegistry {
    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: ClassManifest = serde_json::from_str(&text)?;
        Self::from_manifest(manifest)
    }

    /// Validate a parsed manifest.
    pub fn from_manifest(manifest: ClassManifest) -> ManifestResult<Self> {
        let mut registry = ClassRegistry::default();

        for mut decl in manifest.classes {
            decl.name = decl.name.trim_start_matches('\\').to_string();
            let key = class_key(&decl.name);
            if registry.index.contains_key(&key) {
                return Err(ManifestError::DuplicateClass {
                    class_name: decl.name,
                });
            }
            registry.index.insert(key, registry.classes.len());
            registry.classes.push(decl);
        }

        registry.check_relations()?;
        registry.check_cycles()?;

        let global = NameContext::default();
        for (file, entries) in manifest.type_maps {
            let mut map = TypeMap::new();
            for (token, type_expr) in entries {
                let Some(ty) = global.resolve(&type_expr) else {
                    return Err(ManifestError::InvalidType {
                        file,
                        token,
                        type_expr,
                    });
                };
                map.insert(token, ty);
            }
            registry.type_maps.insert(file, map);
        }

        tracing::debug!(
            "Loaded {} classes and {} explicit type maps",
            registry.classes.len(),
            registry.type_maps.len()
        );
        Ok(registry)
    }

    /// Look up a class by name.
    pub fn get(&self, name: &str) -> Option<ClassHandle<'_>> {
        self.index.get(&class_key(name)).map(|&i| ClassHandle {
            registry: self,
            decl: &self.classes[i],
        })
    }

    /// Explicit type maps declared in the manifest, keyed by file.
    pub fn type_maps(&self) -> &HashMap<PathBuf, TypeMap> {
        &self.type_maps
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<&ClassDecl> {
        self.index.get(&class_key(name)).map(|&i| &self.classes[i])
    }

    /// Every relation, resolved: (relation, target name, expected kind).
    fn relations(decl: &ClassDecl) -> impl Iterator<Item = (&'static str, &str, ClassKind)> {
        let interface_relation = if decl.kind == ClassKind::Interface {
            "extends"
        } else {
            "implements"
        };
        let parent_kind = decl.kind;
        decl.extends
            .iter()
            .map(move |name| ("extends", name.as_str(), parent_kind))
            .chain(
                decl.implements
                    .iter()
                    .map(move |name| (interface_relation, name.as_str(), ClassKind::Interface)),
            )
            .chain(
                decl.uses
                    .iter()
                    .map(|name| ("uses", name.as_str(), ClassKind::Trait)),
            )
    }

    fn check_relations(&self) -> ManifestResult<()> {
        for decl in &self.classes {
            for (relation, reference, expected) in Self::relations(decl) {
                match self.lookup(reference) {
                    None => tracing::warn!(
                        "Class {} {} unknown class {}, ignoring",
                        decl.name,
                        relation,
                        reference
                    ),
                    Some(target) if target.kind != expected => {
                        return Err(ManifestError::KindMismatch {
                            class_name: decl.name.clone(),
                            relation,
                            reference: target.name.clone(),
                            expected: expected.as_str(),
                            found: target.kind.as_str(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    fn check_cycles(&self) -> ManifestResult<()> {
        let mut done = HashSet::new();
        let mut in_progress = HashSet::new();
        for i in 0..self.classes.len() {
            self.visit(i, &mut in_progress, &mut done)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        i: usize,
        in_progress: &mut HashSet<usize>,
        done: &mut HashSet<usize>,
    ) -> ManifestResult<()> {
        if done.contains(&i) {
            return Ok(());
        }
        if !in_progress.insert(i) {
            return Err(ManifestError::InheritanceCycle {
                class_name: self.classes[i].name.clone(),
            });
        }
        for (_, reference, _) in Self::relations(&self.classes[i]) {
            if let Some(&target) = self.index.get(&class_key(reference)) {
                self.visit(target, in_progress, done)?;
            }
        }
        in_progress.remove(&i);
        done.insert(i);
        Ok(())
    }
}

// ============================================================================
// Class Handle
// ============================================================================

/// A class in a [`ClassRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ClassHandle<'a> {
    registry: &'a ClassRegistry,
    decl: &'a ClassDecl,
}

impl<'a> ClassHandle<'a> {
    pub fn kind(&self) -> ClassKind {
        self.decl.kind
    }

    pub fn decl(&self) -> &'a ClassDecl {
        self.decl
    }

    fn resolve_all(&self, names: &'a [String]) -> Vec<ClassHandle<'a>> {
        names
            .iter()
            .filter_map(|name| self.registry.get(name))
            .collect()
    }

    /// Depth-first: each interface, then the interfaces it extends.
    fn collect_interfaces(
        &self,
        names: &'a [String],
        seen: &mut HashSet<String>,
        out: &mut Vec<ClassHandle<'a>>,
    ) {
        for interface in self.resolve_all(names) {
            if !seen.insert(class_key(&interface.decl.name)) {
                continue;
            }
            out.push(interface);
            self.collect_interfaces(&interface.decl.implements, seen, out);
        }
    }
}

impl ClassDescriptor for ClassHandle<'_> {
    fn name(&self) -> &str {
        &self.decl.name
    }

    fn traits(&self) -> Vec<Self> {
        self.resolve_all(&self.decl.uses)
    }

    fn parents(&self) -> Vec<Self> {
        let mut parents = Vec::new();
        let mut current = *self;
        while let Some(parent_name) = &current.decl.extends {
            let Some(parent) = self.registry.get(parent_name) else {
                break;
            };
            if parents.len() >= self.registry.len() {
                break;
            }
            parents.push(parent);
            current = parent;
        }
        parents
    }

    fn interfaces(&self) -> Vec<Self> {
        let mut seen = HashSet::new();
        let mut interfaces = Vec::new();
        self.collect_interfaces(&self.decl.implements, &mut seen, &mut interfaces);
        for parent in self.parents() {
            self.collect_interfaces(&parent.decl.implements, &mut seen, &mut interfaces);
        }
        interfaces
    }

    fn source_file(&self) -> Option<&Path> {
        self.decl.file.as_deref()
    }

    fn doc_comment(&self) -> Option<&str> {
        self.decl.doc.as_deref()
    }

    fn declared_properties(&self) -> Vec<DeclaredProperty> {
        self.decl.properties.clone()
    }
}
