//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports, not
//! reflection rules. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running use cases.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No class is registered under the keyword.
    #[error("Unknown class '{keyword}'")]
    UnknownClass { keyword: String },

    /// Object graph could not be turned into text.
    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    /// Text is not a valid document.
    #[error("Malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("Storage error at {path}: {reason}")]
    StorageError { path: PathBuf, reason: String },

    #[error("Document not found: {path}")]
    DocumentNotFound { path: PathBuf },

    #[error("Document already exists at {path}")]
    DocumentExists { path: PathBuf },

    /// Store access failed (lock poisoned, etc.).
    #[error("Document store error")]
    StoreLockError,

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownClass { keyword } => vec![
                format!("No class is registered as '{}'", keyword),
                "Try: caffa classes to see available classes".into(),
            ],
            Self::MalformedDocument { .. } => vec![
                "Check that the file was written by caffa".into(),
                "Every object needs a \"keyword\" entry".into(),
            ],
            Self::StorageError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
            ],
            Self::DocumentNotFound { path } => {
                vec![format!("Check the path: {}", path.display())]
            }
            Self::DocumentExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
            ],
            Self::StoreLockError => vec![
                "The document store is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownClass { .. } | Self::DocumentNotFound { .. } => ErrorCategory::NotFound,
            Self::MalformedDocument { .. }
            | Self::DocumentExists { .. }
            | Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::Serialization { .. } | Self::StorageError { .. } | Self::StoreLockError => {
                ErrorCategory::Internal
            }
        }
    }
}
