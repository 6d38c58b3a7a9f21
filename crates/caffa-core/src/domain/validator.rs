//! Field value validators.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a consumer should surface a rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureSeverity {
    /// Logged; the value is still written.
    Warning,
    /// The write is refused.
    Error,
    /// The write is refused and the consumer should treat the object as broken.
    Critical,
}

impl FailureSeverity {
    /// Whether a rejection with this severity stops the write.
    pub fn blocks_write(self) -> bool {
        !matches!(self, Self::Warning)
    }
}

impl fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Checks a candidate value before it is written to a field.
pub trait FieldValidator<T> {
    /// `Ok(())` accepts the value; `Err(message)` rejects it.
    fn validate(&self, value: &T) -> Result<(), String>;

    fn failure_severity(&self) -> FailureSeverity;

    /// Human-readable summary for documentation and `describe` output.
    fn describe(&self) -> String {
        String::new()
    }
}

/// Inclusive `[minimum, maximum]` bound on an ordered value.
#[derive(Debug, Clone)]
pub struct RangeValidator<T> {
    minimum: T,
    maximum: T,
    severity: FailureSeverity,
}

impl<T> RangeValidator<T> {
    pub fn new(minimum: T, maximum: T) -> Self {
        Self::with_severity(minimum, maximum, FailureSeverity::Error)
    }

    pub fn with_severity(minimum: T, maximum: T, severity: FailureSeverity) -> Self {
        Self {
            minimum,
            maximum,
            severity,
        }
    }
}

impl<T: PartialOrd + fmt::Display> FieldValidator<T> for RangeValidator<T> {
    /// Values that do not compare with the limits, such as NaN, fail.
    fn validate(&self, value: &T) -> Result<(), String> {
        let inside = matches!(
            value.partial_cmp(&self.minimum),
            Some(Ordering::Greater | Ordering::Equal)
        ) && matches!(
            value.partial_cmp(&self.maximum),
            Some(Ordering::Less | Ordering::Equal)
        );
        if !inside {
            return Err(format!(
                "The value {} is outside the limits [{}, {}]",
                value, self.minimum, self.maximum
            ));
        }
        Ok(())
    }

    fn failure_severity(&self) -> FailureSeverity {
        self.severity
    }

    fn describe(&self) -> String {
        format!("range [{}, {}]", self.minimum, self.maximum)
    }
}

/// Inclusive bound on the number of elements in a vector value.
#[derive(Debug, Clone)]
pub struct VectorSizeValidator {
    minimum: usize,
    maximum: usize,
    severity: FailureSeverity,
}

impl VectorSizeValidator {
    pub fn new(minimum: usize, maximum: usize) -> Self {
        Self {
            minimum,
            maximum,
            severity: FailureSeverity::Error,
        }
    }

    pub fn severity(mut self, severity: FailureSeverity) -> Self {
        self.severity = severity;
        self
    }
}

impl<E> FieldValidator<Vec<E>> for VectorSizeValidator {
    fn validate(&self, value: &Vec<E>) -> Result<(), String> {
        let len = value.len();
        if len < self.minimum || len > self.maximum {
            return Err(format!(
                "The vector has {} elements, expected between {} and {}",
                len, self.minimum, self.maximum
            ));
        }
        Ok(())
    }

    fn failure_severity(&self) -> FailureSeverity {
        self.severity
    }

    fn describe(&self) -> String {
        format!("size [{}, {}]", self.minimum, self.maximum)
    }
}
