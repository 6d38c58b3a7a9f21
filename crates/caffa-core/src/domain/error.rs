// ============================================================================
// domain/error.rs - REFLECTION CORE ERRORS
// ============================================================================

use thiserror::Error;

use super::validator::FailureSeverity;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so a caller can keep one while reporting it)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Programming errors (invariant violations at registration time)
    // ========================================================================
    #[error("Invalid keyword '{keyword}'")]
    InvalidKeyword { keyword: String },

    #[error("Field keyword '{keyword}' is already in use on this object")]
    DuplicateFieldKeyword { keyword: String },

    #[error("Method keyword '{keyword}' is already in use on this object")]
    DuplicateMethodKeyword { keyword: String },

    #[error("Factory key '{key}' is already registered")]
    DuplicateFactoryKey { key: String },

    // ========================================================================
    // Access errors
    // ========================================================================
    #[error("Failed to access '{keyword}': Field is not accessible")]
    FieldNotAccessible { keyword: String },

    #[error("Field '{keyword}' is not readable")]
    FieldNotReadable { keyword: String },

    #[error("Field '{keyword}' is not writable")]
    FieldNotWritable { keyword: String },

    #[error("Field '{keyword}' is not a {expected} field")]
    WrongFieldKind {
        keyword: String,
        expected: &'static str,
    },

    #[error("Value rejected by '{keyword}': {message}")]
    ValidationFailed {
        keyword: String,
        message: String,
        severity: FailureSeverity,
    },

    #[error("Cannot convert {found} into {data_type}")]
    ValueConversion { data_type: String, found: String },

    #[error("Method '{method}' failed: {reason}")]
    MethodFailed { method: String, reason: String },

    // ========================================================================
    // Ownership errors
    // ========================================================================
    #[error("Type mismatch: expected '{expected}', found '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    #[error("Index out of range {index} (size {size})")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Object {id} already belongs to field '{field}'")]
    AlreadyOwned { id: String, field: String },

    #[error("Adopting object {id} would create an ownership cycle")]
    OwnershipCycle { id: String },

    #[error("Object {id} is not a child of field '{field}'")]
    NotAChild { id: String, field: String },

    #[error("Field '{keyword}' still holds objects")]
    FieldNotEmpty { keyword: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("No object with id {id}")]
    ObjectNotFound { id: String },

    #[error("No field '{keyword}' on class '{class}'")]
    FieldNotFound { class: String, keyword: String },

    #[error("No method '{keyword}' on class '{class}'")]
    MethodNotFound { class: String, keyword: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidKeyword { keyword } => vec![
                format!("'{}' is not a valid keyword", keyword),
                "Keywords use letters, digits, '_' or ':' and must not start with a digit".into(),
                "The word 'keyword' itself is reserved".into(),
            ],
            Self::DuplicateFieldKeyword { keyword } | Self::DuplicateMethodKeyword { keyword } => {
                vec![format!("Rename one of the members called '{}'", keyword)]
            }
            Self::DuplicateFactoryKey { key } => vec![
                format!("'{}' is registered twice", key),
                "Each class must be registered exactly once per factory".into(),
            ],
            Self::FieldNotAccessible { keyword } => vec![
                format!("Field '{}' has no accessor installed", keyword),
                "Install an accessor with set_accessor before reading the field".into(),
            ],
            Self::ValidationFailed { message, .. } => vec![message.clone()],
            Self::TypeMismatch { expected, .. } => {
                vec![format!("Use an object deriving from '{}'", expected)]
            }
            Self::AlreadyOwned { .. } => {
                vec!["Detach the object from its current field before adopting it".into()]
            }
            Self::FieldNotEmpty { keyword } => vec![
                format!("Clear '{}' before replacing its accessor", keyword),
                "Or replace it through the arena, which moves the children over".into(),
            ],
            Self::FieldNotFound { class, .. } => {
                vec![format!("Try: caffa describe {}", class)]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidKeyword { .. }
            | Self::ValidationFailed { .. }
            | Self::ValueConversion { .. }
            | Self::FieldNotReadable { .. }
            | Self::FieldNotWritable { .. }
            | Self::IndexOutOfRange { .. } => ErrorCategory::Validation,
            Self::TypeMismatch { .. }
            | Self::WrongFieldKind { .. }
            | Self::AlreadyOwned { .. }
            | Self::OwnershipCycle { .. }
            | Self::NotAChild { .. }
            | Self::FieldNotEmpty { .. } => ErrorCategory::Compatibility,
            Self::ObjectNotFound { .. }
            | Self::FieldNotFound { .. }
            | Self::MethodNotFound { .. } => ErrorCategory::NotFound,
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
