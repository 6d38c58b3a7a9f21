//! Value fields and their accessors.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::{FieldCore, FieldHandle, FieldKind};
use crate::domain::data_type::{PortableDataType, PortableValue};
use crate::domain::error::DomainError;
use crate::domain::validator::{FailureSeverity, FieldValidator};

// ── Accessors ────────────────────────────────────────────────────────────────

/// Strategy deciding where a field's value actually lives.
pub trait DataFieldAccessor<T> {
    /// Current value, or `None` when the accessor has no getter.
    fn value(&self) -> Option<T>;

    /// Store `value`, handing it back when the accessor has no setter.
    fn set_value(&mut self, value: T) -> Result<(), T>;

    fn has_getter(&self) -> bool;

    fn has_setter(&self) -> bool;

    fn clone_accessor(&self) -> Box<dyn DataFieldAccessor<T>>;
}

/// Keeps the value inside the accessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectStorageAccessor<T> {
    value: T,
}

impl<T> DirectStorageAccessor<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + 'static> DataFieldAccessor<T> for DirectStorageAccessor<T> {
    fn value(&self) -> Option<T> {
        Some(self.value.clone())
    }

    fn set_value(&mut self, value: T) -> Result<(), T> {
        self.value = value;
        Ok(())
    }

    fn has_getter(&self) -> bool {
        true
    }

    fn has_setter(&self) -> bool {
        true
    }

    fn clone_accessor(&self) -> Box<dyn DataFieldAccessor<T>> {
        Box::new(self.clone())
    }
}

type Getter<T> = Rc<dyn Fn() -> T>;
type Setter<T> = Rc<dyn Fn(T)>;

/// Delegates reads and writes to closures supplied by the owning class.
///
/// Either side may be missing, which makes the field read-only or
/// write-only.
pub struct ProxyAccessor<T> {
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T> ProxyAccessor<T> {
    pub fn new() -> Self {
        Self {
            getter: None,
            setter: None,
        }
    }

    pub fn with_getter(mut self, getter: impl Fn() -> T + 'static) -> Self {
        self.getter = Some(Rc::new(getter));
        self
    }

    pub fn with_setter(mut self, setter: impl Fn(T) + 'static) -> Self {
        self.setter = Some(Rc::new(setter));
        self
    }
}

impl<T> Default for ProxyAccessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ProxyAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for ProxyAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAccessor")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

impl<T: 'static> DataFieldAccessor<T> for ProxyAccessor<T> {
    fn value(&self) -> Option<T> {
        self.getter.as_ref().map(|get| get())
    }

    fn set_value(&mut self, value: T) -> Result<(), T> {
        match &self.setter {
            Some(set) => {
                set(value);
                Ok(())
            }
            None => Err(value),
        }
    }

    fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    fn clone_accessor(&self) -> Box<dyn DataFieldAccessor<T>> {
        Box::new(self.clone())
    }
}

// ── Field<T> ─────────────────────────────────────────────────────────────────

/// A value field.
pub struct Field<T: PortableDataType> {
    core: FieldCore,
    accessor: Option<Box<dyn DataFieldAccessor<T>>>,
    validators: Vec<Box<dyn FieldValidator<T>>>,
    default_value: Option<T>,
}

impl<T: PortableDataType + Default> Field<T> {
    /// Field with direct storage holding `T::default()`.
    pub fn new() -> Self {
        Self::with_value(T::default())
    }
}

impl<T: PortableDataType + Default> Default for Field<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PortableDataType> Field<T> {
    /// Field with direct storage holding `value`.
    pub fn with_value(value: T) -> Self {
        Self::with_accessor(Box::new(DirectStorageAccessor::new(value)))
    }

    pub fn with_accessor(accessor: Box<dyn DataFieldAccessor<T>>) -> Self {
        Self {
            core: FieldCore::default(),
            accessor: Some(accessor),
            validators: Vec::new(),
            default_value: None,
        }
    }

    pub fn value(&self) -> Result<T, DomainError> {
        let accessor = self.accessor()?;
        accessor
            .value()
            .ok_or_else(|| DomainError::FieldNotReadable {
                keyword: self.keyword().to_string(),
            })
    }

    /// Validate and store `value`.
    ///
    /// Validators run in registration order. A warning-level rejection is
    /// logged and the value is stored anyway; anything stronger leaves the
    /// field unchanged.
    pub fn set_value(&mut self, value: T) -> Result<(), DomainError> {
        for validator in &self.validators {
            if let Err(message) = validator.validate(&value) {
                let severity = validator.failure_severity();
                if severity.blocks_write() {
                    return Err(DomainError::ValidationFailed {
                        keyword: self.keyword().to_string(),
                        message,
                        severity,
                    });
                }
                warn!(field = %self.keyword(), %message, "value accepted with warning");
            }
        }
        self.store(value)
    }

    /// Run the validators without writing.
    pub fn validate(&self, value: &T) -> Vec<(FailureSeverity, String)> {
        self.validators
            .iter()
            .filter_map(|v| v.validate(value).err().map(|m| (v.failure_severity(), m)))
            .collect()
    }

    fn store(&mut self, value: T) -> Result<(), DomainError> {
        let keyword = self.keyword().to_string();
        let accessor = self
            .accessor
            .as_mut()
            .ok_or_else(|| DomainError::FieldNotAccessible {
                keyword: keyword.clone(),
            })?;
        accessor
            .set_value(value)
            .map_err(|_| DomainError::FieldNotWritable { keyword })
    }

    fn accessor(&self) -> Result<&dyn DataFieldAccessor<T>, DomainError> {
        self.accessor
            .as_deref()
            .ok_or_else(|| DomainError::FieldNotAccessible {
                keyword: self.keyword().to_string(),
            })
    }

    /// Replace the accessor. Any value held by the old accessor is dropped.
    pub fn set_accessor(&mut self, accessor: Box<dyn DataFieldAccessor<T>>) {
        self.accessor = Some(accessor);
    }

    /// Remove the accessor, leaving the field inaccessible.
    pub fn take_accessor(&mut self) -> Option<Box<dyn DataFieldAccessor<T>>> {
        self.accessor.take()
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    pub fn add_validator(&mut self, validator: impl FieldValidator<T> + 'static) {
        self.validators.push(Box::new(validator));
    }

    pub fn validators(&self) -> impl Iterator<Item = &dyn FieldValidator<T>> {
        self.validators.iter().map(|v| v.as_ref())
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default_value.as_ref()
    }

    /// Record `value` as the default and write it through the accessor.
    ///
    /// Validators are not consulted; a default is part of the class
    /// definition, not user input.
    pub fn set_default_value(&mut self, value: T) -> Result<(), DomainError> {
        self.default_value = Some(value.clone());
        self.store(value)
    }
}

impl<T: PortableDataType> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("keyword", &self.keyword())
            .field("data_type", &T::name())
            .field("accessor", &self.accessor.is_some())
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl<T: PortableDataType> FieldHandle for Field<T> {
    fn core(&self) -> &FieldCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FieldCore {
        &mut self.core
    }

    fn data_type(&self) -> String {
        T::name()
    }

    fn is_readable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_getter())
    }

    fn is_writable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_setter())
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Data
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_data_field(&self) -> Option<&dyn DataFieldHandle> {
        Some(self)
    }

    fn as_data_field_mut(&mut self) -> Option<&mut dyn DataFieldHandle> {
        Some(self)
    }
}

// ── Type-erased value access ─────────────────────────────────────────────────

/// Value access for consumers that do not know `T`.
pub trait DataFieldHandle: FieldHandle {
    fn portable_value(&self) -> Result<PortableValue, DomainError>;

    /// Convert and store through [`Field::set_value`], validators included.
    fn set_portable_value(&mut self, value: &PortableValue) -> Result<(), DomainError>;

    fn default_portable_value(&self) -> Option<PortableValue>;

    /// Summaries of the attached validators.
    fn validator_descriptions(&self) -> Vec<String>;
}

impl<T: PortableDataType> DataFieldHandle for Field<T> {
    fn portable_value(&self) -> Result<PortableValue, DomainError> {
        self.value().map(|v| v.to_portable())
    }

    fn set_portable_value(&mut self, value: &PortableValue) -> Result<(), DomainError> {
        let value = T::from_portable(value)?;
        self.set_value(value)
    }

    fn default_portable_value(&self) -> Option<PortableValue> {
        self.default_value.as_ref().map(PortableDataType::to_portable)
    }

    fn validator_descriptions(&self) -> Vec<String> {
        self.validators
            .iter()
            .map(|v| v.describe())
            .filter(|d| !d.is_empty())
            .collect()
    }
}
