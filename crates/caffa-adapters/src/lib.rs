//! Infrastructure adapters for Caffa.
//!
//! This crate implements the ports defined in `caffa-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_classes;
pub mod serializer;
pub mod storage;

// Re-export commonly used adapters
pub use builtin_classes::register_builtin_classes;
pub use serializer::JsonObjectSerializer;
pub use storage::{LocalDocumentStorage, MemoryDocumentStorage};
