//! Portable value types.
//!
//! Every value a [`Field`](crate::domain::Field) can hold implements
//! [`PortableDataType`], which fixes a stable type name and a lossless mapping
//! to and from [`PortableValue`]. Generic consumers (serializers, scripting,
//! the CLI) only ever see `PortableValue`; the concrete `T` stays inside the
//! field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Type-erased field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortableValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    String(String),
    List(Vec<PortableValue>),
}

impl PortableValue {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::UInt(_) => "unsigned integer",
            Self::Double(_) => "floating point",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::UInt(v) => Some(i128::from(*v)),
            Self::Double(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i128),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for PortableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A value type with a stable portable name.
pub trait PortableDataType: Clone + 'static {
    /// Stable type name, e.g. `int32` or `string[]`.
    fn name() -> String;

    fn to_portable(&self) -> PortableValue;

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError>;
}

fn conversion_error<T: PortableDataType>(value: &PortableValue) -> DomainError {
    DomainError::ValueConversion {
        data_type: T::name(),
        found: value.kind().to_string(),
    }
}

macro_rules! portable_integer {
    ($ty:ty, $name:literal, $variant:ident, $wide:ty) => {
        impl PortableDataType for $ty {
            fn name() -> String {
                $name.to_string()
            }

            fn to_portable(&self) -> PortableValue {
                PortableValue::$variant(<$wide>::from(*self))
            }

            fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
                value
                    .as_i128()
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or_else(|| conversion_error::<Self>(value))
            }
        }
    };
}

portable_integer!(i32, "int32", Int, i64);
portable_integer!(u32, "uint32", UInt, u64);
portable_integer!(i64, "int64", Int, i64);
portable_integer!(u64, "uint64", UInt, u64);

impl PortableDataType for f64 {
    fn name() -> String {
        "double".to_string()
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::Double(*self)
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        value.as_f64().ok_or_else(|| conversion_error::<Self>(value))
    }
}

impl PortableDataType for f32 {
    fn name() -> String {
        "float".to_string()
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::Double(f64::from(*self))
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| conversion_error::<Self>(value))
    }
}

impl PortableDataType for bool {
    fn name() -> String {
        "bool".to_string()
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::Bool(*self)
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        match value {
            PortableValue::Bool(v) => Ok(*v),
            other => Err(conversion_error::<Self>(other)),
        }
    }
}

impl PortableDataType for char {
    fn name() -> String {
        "char".to_string()
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::String(self.to_string())
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        if let PortableValue::String(s) = value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(conversion_error::<Self>(value))
    }
}

impl PortableDataType for String {
    fn name() -> String {
        "string".to_string()
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::String(self.clone())
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        match value {
            PortableValue::String(v) => Ok(v.clone()),
            other => Err(conversion_error::<Self>(other)),
        }
    }
}

impl<T: PortableDataType> PortableDataType for Vec<T> {
    fn name() -> String {
        format!("{}[]", T::name())
    }

    fn to_portable(&self) -> PortableValue {
        PortableValue::List(self.iter().map(PortableDataType::to_portable).collect())
    }

    fn from_portable(value: &PortableValue) -> Result<Self, DomainError> {
        match value {
            PortableValue::List(items) => items.iter().map(T::from_portable).collect(),
            other => Err(conversion_error::<Self>(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_names_are_stable() {
        assert_eq!(i32::name(), "int32");
        assert_eq!(u32::name(), "uint32");
        assert_eq!(i64::name(), "int64");
        assert_eq!(u64::name(), "uint64");
        assert_eq!(f64::name(), "double");
        assert_eq!(f32::name(), "float");
        assert_eq!(bool::name(), "bool");
        assert_eq!(char::name(), "char");
        assert_eq!(String::name(), "string");
    }

    #[test]
    fn vector_names_nest() {
        assert_eq!(<Vec<String>>::name(), "string[]");
        assert_eq!(<Vec<Vec<i32>>>::name(), "int32[][]");
    }

    #[test]
    fn integers_reject_out_of_range() {
        assert!(i32::from_portable(&PortableValue::Int(i64::from(i32::MAX) + 1)).is_err());
        assert!(u32::from_portable(&PortableValue::Int(-1)).is_err());
        assert_eq!(u64::from_portable(&PortableValue::Int(7)).unwrap(), 7);
    }

    #[test]
    fn integral_double_populates_integer() {
        assert_eq!(i32::from_portable(&PortableValue::Double(4.0)).unwrap(), 4);
        assert!(i32::from_portable(&PortableValue::Double(4.5)).is_err());
    }

    #[test]
    fn integer_populates_double() {
        assert_eq!(f64::from_portable(&PortableValue::Int(3)).unwrap(), 3.0);
    }

    #[test]
    fn conversion_error_names_target_type() {
        let err = bool::from_portable(&PortableValue::String("yes".into())).unwrap_err();
        assert_eq!(
            err,
            DomainError::ValueConversion {
                data_type: "bool".into(),
                found: "string".into()
            }
        );
    }

    #[test]
    fn list_conversion_fails_on_bad_element() {
        let value = PortableValue::List(vec![PortableValue::Int(1), PortableValue::Bool(true)]);
        assert!(<Vec<i32>>::from_portable(&value).is_err());
    }

    #[test]
    fn char_requires_single_character() {
        assert_eq!(char::from_portable(&PortableValue::String("x".into())).unwrap(), 'x');
        assert!(char::from_portable(&PortableValue::String("xy".into())).is_err());
    }

    #[test]
    fn display_formats_lists() {
        let value = PortableValue::List(vec![PortableValue::Int(1), PortableValue::String("a".into())]);
        assert_eq!(value.to_string(), "[1, \"a\"]");
    }
}
