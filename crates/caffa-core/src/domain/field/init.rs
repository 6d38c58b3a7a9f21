//! Fluent field initialization used from class constructors.

use super::{
    ChildArrayField, ChildArrayFieldAccessor, ChildField, ChildFieldAccessor, DataFieldAccessor,
    Field, FieldHandle, FieldKey, ProxyAccessor,
};
use crate::domain::capabilities::{FieldCapability, FieldScriptingCapability};
use crate::domain::data_type::PortableDataType;
use crate::domain::object::{ClassLineage, ObjectBase};
use crate::domain::validator::FieldValidator;

/// Builder returned by [`ObjectBase::init_field`].
///
/// ```rust
/// use caffa_core::domain::{Field, ObjectBase, RangeValidator};
///
/// let mut base = ObjectBase::new();
/// let x = base
///     .init_field("x", Field::<i32>::new())
///     .with_default(1)
///     .with_validator(RangeValidator::new(0, 10))
///     .with_doc("Horizontal position")
///     .key();
/// assert_eq!(base.field(x).value().unwrap(), 1);
/// ```
pub struct FieldInitHelper<'a, F> {
    base: &'a mut ObjectBase,
    key: FieldKey<F>,
}

impl<'a, F: FieldHandle> FieldInitHelper<'a, F> {
    pub(crate) fn new(base: &'a mut ObjectBase, key: FieldKey<F>) -> Self {
        Self { base, key }
    }

    fn field(&mut self) -> &mut F {
        self.base.field_mut(self.key)
    }

    pub fn with_doc(mut self, documentation: impl Into<String>) -> Self {
        self.field().core_mut().set_documentation(documentation);
        self
    }

    pub fn with_capability<C: FieldCapability>(mut self, capability: C) -> Self {
        self.field().core_mut().capabilities_mut().insert(capability);
        self
    }

    pub fn with_scripting(self, readable: bool, writable: bool) -> Self {
        self.with_capability(FieldScriptingCapability::new(readable, writable))
    }

    pub fn mark_deprecated(mut self) -> Self {
        self.field().core_mut().set_deprecated(true);
        self
    }

    pub fn key(self) -> FieldKey<F> {
        self.key
    }
}

impl<T: PortableDataType> FieldInitHelper<'_, Field<T>> {
    /// Record a default and write it through the current accessor.
    ///
    /// # Panics
    ///
    /// If the current accessor cannot be written; install the accessor
    /// after the default when it has no setter.
    pub fn with_default(mut self, value: T) -> Self {
        let field = self.field();
        if let Err(err) = field.set_default_value(value) {
            panic!("cannot apply default to '{}': {err}", field.keyword());
        }
        self
    }

    pub fn with_validator(mut self, validator: impl FieldValidator<T> + 'static) -> Self {
        self.field().add_validator(validator);
        self
    }

    pub fn with_accessor(mut self, accessor: Box<dyn DataFieldAccessor<T>>) -> Self {
        self.field().set_accessor(accessor);
        self
    }

    pub fn with_proxy_get_accessor(self, getter: impl Fn() -> T + 'static) -> Self {
        self.with_accessor(Box::new(ProxyAccessor::new().with_getter(getter)))
    }

    pub fn with_proxy_set_accessor(self, setter: impl Fn(T) + 'static) -> Self {
        self.with_accessor(Box::new(ProxyAccessor::new().with_setter(setter)))
    }

    pub fn with_proxy_get_set_accessor(
        self,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
    ) -> Self {
        self.with_accessor(Box::new(
            ProxyAccessor::new().with_getter(getter).with_setter(setter),
        ))
    }
}

impl<T: ClassLineage> FieldInitHelper<'_, ChildField<T>> {
    /// # Panics
    ///
    /// If `accessor` already refers to an object.
    pub fn with_accessor(mut self, accessor: Box<dyn ChildFieldAccessor>) -> Self {
        let field = self.field();
        if let Err(err) = field.set_accessor(accessor) {
            panic!("cannot install accessor on '{}': {err}", field.keyword());
        }
        self
    }
}

impl<T: ClassLineage> FieldInitHelper<'_, ChildArrayField<T>> {
    /// # Panics
    ///
    /// If `accessor` already holds objects.
    pub fn with_accessor(mut self, accessor: Box<dyn ChildArrayFieldAccessor>) -> Self {
        let field = self.field();
        if let Err(err) = field.set_accessor(accessor) {
            panic!("cannot install accessor on '{}': {err}", field.keyword());
        }
        self
    }
}
