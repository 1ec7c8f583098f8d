//! propdoc: documented virtual property resolution
//!
//! Answers "does class C have property P, and what is its type?" for
//! properties declared through `@property`, `@property-read` and
//! `@property-write` doc annotations, merged across traits, parent classes
//! and interfaces.

// Core infrastructure - re-exported from propdoc-core
pub use propdoc_core::annotation;
pub use propdoc_core::chain;
pub use propdoc_core::class;
pub use propdoc_core::error;
pub use propdoc_core::manifest;
pub use propdoc_core::native;
pub use propdoc_core::output;
pub use propdoc_core::properties;
pub use propdoc_core::resolver;
pub use propdoc_core::type_mapper;
pub use propdoc_core::types;

// Front door
pub mod cli;
