//! Enumerations as field values.
//!
//! A field cannot hold a bare Rust enum: the portable form needs a label per
//! option and a default. Implement [`EnumItems`] for the enum and store an
//! [`AppEnum`] in the field.
//!
//! ```rust
//! use caffa_core::domain::{AppEnum, EnumItems, PortableDataType, PortableValue};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Units {
//!     Millimeter,
//!     Inch,
//! }
//!
//! impl EnumItems for Units {
//!     const ITEMS: &'static [(Self, &'static str)] =
//!         &[(Units::Millimeter, "mm"), (Units::Inch, "in")];
//!     const DEFAULT: Self = Units::Millimeter;
//! }
//!
//! assert_eq!(AppEnum::<Units>::name(), "AppEnum(mm,in)");
//! let inch = AppEnum::<Units>::from_portable(&PortableValue::String("in".into())).unwrap();
//! assert_eq!(inch.value(), Units::Inch);
//! ```

use std::fmt;

use crate::domain::data_type::{PortableDataType, PortableValue};
use crate::domain::error::DomainError;

/// Option table of an enum usable through [`AppEnum`].
pub trait EnumItems: Copy + PartialEq + 'static {
    /// Every option with its label, in presentation order. Labels are
    /// unique.
    const ITEMS: &'static [(Self, &'static str)];

    /// Value of a default-constructed [`AppEnum`].
    const DEFAULT: Self;
}

/// An enum value that travels as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppEnum<E: EnumItems> {
    value: E,
}

impl<E: EnumItems> AppEnum<E> {
    pub const fn new(value: E) -> Self {
        Self { value }
    }

    pub fn value(&self) -> E {
        self.value
    }

    pub fn set(&mut self, value: E) {
        self.value = value;
    }

    /// Label of the current value, `None` when the option table misses it.
    pub fn label(&self) -> Option<&'static str> {
        E::ITEMS
            .iter()
            .find(|(item, _)| *item == self.value)
            .map(|(_, label)| *label)
    }

    /// Position of the current value in the option table.
    pub fn index(&self) -> Option<usize> {
        E::ITEMS.iter().position(|(item, _)| *item == self.value)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        E::ITEMS
            .iter()
            .find(|(_, candidate)| *candidate == label)
            .map(|(item, _)| Self::new(*item))
    }

    pub fn from_index(index: usize) -> Option<Self> {
        E::ITEMS.get(index).map(|(item, _)| Self::new(*item))
    }

    pub fn labels() -> Vec<&'static str> {
        E::ITEMS.iter().map(|(_, label)| *label).collect()
    }
}

impl<E: EnumItems> Default for AppEnum<E> {
    fn default() -> Self {
        Self::new(E::DEFAULT)
    }
}

impl<E: EnumItems> From<E> for AppEnum<E> {
    fn from(value: E) -> Self {
        Self::new(value)
    }
}

impl<E: EnumItems> fmt::Display for AppEnum<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("?"))
    }
}

impl<E: EnumItems> PortableDataType for AppEnum<E> {
    /// `AppEnum(` followed by the labels, comma separated, and `)`.
    fn name() -> String {
        format!("AppEnum({})", Self::labels().join(","))
    }

    fn to_portable(&self) -> PortableValue {
        self.label()
            .map_or(PortableValue::Null, |label| PortableValue::String(label.to_string()))
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        match value {
            PortableValue::String(label) => {
                Self::from_label(label).ok_or_else(|| DomainError::ValueConversion {
                    data_type: Self::name(),
                    found: format!("unknown label '{label}'"),
                })
            }
            other => Err(DomainError::ValueConversion {
                data_type: Self::name(),
                found: other.kind().to_string(),
            }),
        }
    }
}
