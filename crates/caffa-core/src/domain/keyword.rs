//! Keyword rules shared by classes, fields and methods.

use crate::domain::error::DomainError;

/// Reserved token that can never name a field, method or class.
pub const RESERVED_KEYWORD: &str = "keyword";

/// Check whether `keyword` may be used as a class, field or method keyword.
///
/// A valid keyword is non-empty, is not the reserved word `keyword`, does not
/// start with a digit, and consists only of ASCII letters, digits, `_` or `:`.
///
/// This is a `const fn` so class keywords can be rejected at compile time.
pub const fn is_valid_keyword(keyword: &str) -> bool {
    let bytes = keyword.as_bytes();
    if bytes.is_empty() || bytes[0].is_ascii_digit() || is_reserved(bytes) {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(b.is_ascii_alphanumeric() || b == b'_' || b == b':') {
            return false;
        }
        i += 1;
    }
    true
}

const fn is_reserved(bytes: &[u8]) -> bool {
    let reserved = RESERVED_KEYWORD.as_bytes();
    if bytes.len() != reserved.len() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != reserved[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Result-returning form of [`is_valid_keyword`].
pub fn validate_keyword(keyword: &str) -> Result<(), DomainError> {
    if is_valid_keyword(keyword) {
        Ok(())
    } else {
        Err(DomainError::InvalidKeyword {
            keyword: keyword.to_string(),
        })
    }
}
