//! Application layer for Caffa.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (DocumentService, ClassService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but holds no
//! reflection rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ClassInfo, // DTOs for class metadata
    ClassService,
    ClassSummary,
    DocumentService,
    DocumentSummary,
    FieldInfo,
    MethodInfo,
};

// Re-export port traits (for adapter implementation)
pub use ports::{DocumentStorage, ObjectSerializer};

pub use error::ApplicationError;
