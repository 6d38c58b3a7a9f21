//! Single owned child.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::{ArenaToken, FieldCore, FieldHandle, FieldKind};
use crate::domain::arena::ObjectId;
use crate::domain::error::DomainError;
use crate::domain::object::ClassLineage;

/// Storage strategy for a [`ChildField`].
pub trait ChildFieldAccessor {
    fn object(&self) -> Option<ObjectId>;

    /// Store `object`, returning what was there before.
    fn set_object(&mut self, object: Option<ObjectId>) -> Option<ObjectId>;

    fn has_getter(&self) -> bool {
        true
    }

    fn has_setter(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildFieldDirectStorageAccessor {
    object: Option<ObjectId>,
}

impl ChildFieldAccessor for ChildFieldDirectStorageAccessor {
    fn object(&self) -> Option<ObjectId> {
        self.object
    }

    fn set_object(&mut self, object: Option<ObjectId>) -> Option<ObjectId> {
        std::mem::replace(&mut self.object, object)
    }
}

/// Kind-specific view of a child field, independent of its declared type.
pub trait ChildFieldHandle: FieldHandle {
    fn accessor(&self) -> Option<&dyn ChildFieldAccessor>;

    /// Writable storage. Changing it unlinks children from their owner
    /// records, so only the arena may call this.
    fn accessor_mut(
        &mut self,
        token: ArenaToken,
    ) -> Option<&mut (dyn ChildFieldAccessor + 'static)>;

    /// Install `accessor` unconditionally, returning the previous one.
    fn replace_accessor(
        &mut self,
        accessor: Box<dyn ChildFieldAccessor>,
        token: ArenaToken,
    ) -> Option<Box<dyn ChildFieldAccessor>>;

    /// The child, or `FieldNotAccessible` when the accessor was removed.
    fn object(&self) -> Result<Option<ObjectId>, DomainError> {
        self.accessor()
            .map(|a| a.object())
            .ok_or_else(|| DomainError::FieldNotAccessible {
                keyword: self.keyword().to_string(),
            })
    }
}

/// Field owning at most one object whose class derives from `T`.
pub struct ChildField<T: ClassLineage> {
    core: FieldCore,
    accessor: Option<Box<dyn ChildFieldAccessor>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ClassLineage> ChildField<T> {
    pub fn new() -> Self {
        Self {
            core: FieldCore::default(),
            accessor: Some(Box::new(ChildFieldDirectStorageAccessor::default())),
            _marker: PhantomData,
        }
    }

    /// Swap the storage strategy of an empty field.
    ///
    /// Fails with `FieldNotEmpty` while the current accessor holds a child
    /// or `accessor` already refers to one. A populated field changes
    /// strategy through [`ObjectArena::set_child_accessor`], which moves
    /// the child over.
    ///
    /// [`ObjectArena::set_child_accessor`]: crate::domain::ObjectArena::set_child_accessor
    pub fn set_accessor(
        &mut self,
        accessor: Box<dyn ChildFieldAccessor>,
    ) -> Result<(), DomainError> {
        self.ensure_empty(Some(&*accessor))?;
        self.accessor = Some(accessor);
        Ok(())
    }

    /// Remove the storage strategy of an empty field.
    pub fn take_accessor(&mut self) -> Result<Option<Box<dyn ChildFieldAccessor>>, DomainError> {
        self.ensure_empty(None)?;
        Ok(self.accessor.take())
    }

    fn ensure_empty(&self, incoming: Option<&dyn ChildFieldAccessor>) -> Result<(), DomainError> {
        let held = self.accessor.as_ref().and_then(|a| a.object());
        if held.is_some() || incoming.and_then(|a| a.object()).is_some() {
            return Err(DomainError::FieldNotEmpty {
                keyword: self.keyword().to_string(),
            });
        }
        Ok(())
    }
}

impl<T: ClassLineage> Default for ChildField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClassLineage> fmt::Debug for ChildField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildField")
            .field("keyword", &self.keyword())
            .field("data_type", &T::keyword())
            .field("object", &self.accessor.as_ref().and_then(|a| a.object()))
            .finish()
    }
}

impl<T: ClassLineage> FieldHandle for ChildField<T> {
    fn core(&self) -> &FieldCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FieldCore {
        &mut self.core
    }

    fn data_type(&self) -> String {
        T::keyword().to_string()
    }

    fn is_readable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_getter())
    }

    fn is_writable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_setter())
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Child
    }

    fn child_objects(&self) -> Vec<ObjectId> {
        self.accessor
            .as_ref()
            .and_then(|a| a.object())
            .into_iter()
            .collect()
    }

    fn child_class_keyword(&self) -> Option<&'static str> {
        Some(T::keyword())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_child_field(&self) -> Option<&dyn ChildFieldHandle> {
        Some(self)
    }

    fn as_child_field_mut(&mut self) -> Option<&mut dyn ChildFieldHandle> {
        Some(self)
    }
}

impl<T: ClassLineage> ChildFieldHandle for ChildField<T> {
    fn accessor(&self) -> Option<&dyn ChildFieldAccessor> {
        self.accessor.as_deref()
    }

    fn accessor_mut(
        &mut self,
        _token: ArenaToken,
    ) -> Option<&mut (dyn ChildFieldAccessor + 'static)> {
        self.accessor.as_deref_mut()
    }

    fn replace_accessor(
        &mut self,
        accessor: Box<dyn ChildFieldAccessor>,
        _token: ArenaToken,
    ) -> Option<Box<dyn ChildFieldAccessor>> {
        self.accessor.replace(accessor)
    }
}
