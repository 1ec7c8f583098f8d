//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Class Model
// ============================================================================

// class module - descriptor trait and declaration types
use propdoc::class::{ClassDescriptor, ClassKind, DeclaredProperty, Visibility};

// types module - type model and per-file type maps
use propdoc::types::{PhpType, TypeMap};

// type_mapper module - building type maps
use propdoc::type_mapper::{
    type_map_for_source, FileTypeMapper, InMemoryTypeMapper, NameContext, SourceTypeMapper,
    TYPE_TOKEN_PATTERN,
};

// manifest module - class manifests and the registry
use propdoc::manifest::{
    ClassDecl, ClassHandle, ClassManifest, ClassRegistry, ManifestError, ManifestResult,
};

// ============================================================================
// Resolution
// ============================================================================

// annotation module - @property tag scanning
use propdoc::annotation::{scan_property_annotations, PropertyAccess, PropertyAnnotation};

// properties module - entries and the extension trait
use propdoc::properties::{
    PropertiesExtension, PropertyEntry, PropertyMap, PropertyOrigin, ReflectionError,
    ReflectionResult,
};

// resolver module - annotation properties
use propdoc::resolver::{AnnotationPropertiesExtension, MAX_COMPOSITION_DEPTH};

// native module - declared properties
use propdoc::native::NativePropertiesExtension;

// chain module - ordered composition
use propdoc::chain::PropertyReflectionChain;

// ============================================================================
// Front Door
// ============================================================================

// error module - error types and codes
use propdoc::error::{OutputErrorCode, PropdocError};

// output module - JSON output types
use propdoc::output::{
    emit_response, ErrorInfo, ErrorResponse, HasPropertyResponse, PropertyInfo,
    PropertyListResponse, PropertyResponse, SCHEMA_VERSION,
};

// cli module - command helpers
use propdoc::cli::{run_get, run_has, run_list, Project};

#[test]
fn api_surface_compiles() {
    // This test exists only to ensure the imports above compile.
}
