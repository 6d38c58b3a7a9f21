//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish high-level
//! use cases like "save a document" or "describe a class".

pub mod class_service;
pub mod document_service;

pub use class_service::{ClassInfo, ClassService, ClassSummary, FieldInfo, MethodInfo};
pub use document_service::{DocumentService, DocumentSummary};
