//! Unified error handling for Caffa Core.
//!
//! Wraps domain and application errors into a single type with
//! user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Caffa Core operations.
#[derive(Debug, Error, Clone)]
pub enum CaffaError {
    /// Reflection rules were violated (bad keyword, wrong type, ownership).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A use case or one of its ports failed.
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl CaffaError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Try: caffa config path to locate the active file".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Caffa".into(),
                "Run again with -vv and include the log when reporting it".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StoreLockError))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type CaffaResult<T> = Result<T, CaffaError>;

/// Extension trait for adding context to foreign errors.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> CaffaResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> CaffaResult<T> {
        self.map_err(|e| CaffaError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_are_preserved() {
        let err: CaffaError = DomainError::ObjectNotFound { id: "0v0".into() }.into();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err: CaffaError = DomainError::TypeMismatch {
            expected: "Shape".into(),
            actual: "Point".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Compatibility);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn only_lock_errors_are_retryable() {
        assert!(CaffaError::from(ApplicationError::StoreLockError).is_retryable());
        assert!(
            !CaffaError::Configuration {
                message: "bad".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let parsed: Result<i32, std::num::ParseIntError> = "x".parse();
        let err = parsed.context("reading count").unwrap_err();
        assert!(matches!(err, CaffaError::Internal { .. }));
        assert!(err.to_string().contains("reading count"));
    }
}
