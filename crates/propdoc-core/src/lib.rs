//! Core engine for propdoc.
//!
//! This crate resolves documented virtual properties on classes:
//! - Class model and the descriptor trait the resolvers consume
//! - Type model and per-file type maps built from source headers
//! - `@property` annotation scanning
//! - Annotation property resolution across traits, parents and interfaces
//! - Native declared properties and the ordered reflection chain
//! - Class manifests and the class registry
//! - Error types, error codes and JSON output types for CLI responses

pub mod annotation;
pub mod chain;
pub mod class;
pub mod error;
pub mod manifest;
pub mod native;
pub mod output;
pub mod properties;
pub mod resolver;
pub mod type_mapper;
pub mod types;
