//! Ordered collection of owned children.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::{ArenaToken, FieldCore, FieldHandle, FieldKind};
use crate::domain::arena::ObjectId;
use crate::domain::error::DomainError;
use crate::domain::object::ClassLineage;

/// Storage strategy for a [`ChildArrayField`].
///
/// Indices are `[0, size())`. Out-of-range `insert` and `remove` return
/// `IndexOutOfRange`; `at` reports absence with `None`.
pub trait ChildArrayFieldAccessor {
    fn size(&self) -> usize;

    fn objects(&self) -> Vec<ObjectId>;

    fn at(&self, index: usize) -> Option<ObjectId>;

    /// Position of `object`, compared by identity.
    fn index(&self, object: ObjectId) -> Option<usize>;

    fn push_back(&mut self, object: ObjectId);

    /// Insert before `index`; `index == size()` appends.
    fn insert(&mut self, index: usize, object: ObjectId) -> Result<(), DomainError>;

    fn remove(&mut self, index: usize) -> Result<ObjectId, DomainError>;

    /// Remove everything, returning what was held in order.
    fn clear(&mut self) -> Vec<ObjectId>;

    fn has_getter(&self) -> bool {
        true
    }

    fn has_setter(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildArrayFieldDirectStorageAccessor {
    objects: Vec<ObjectId>,
}

impl ChildArrayFieldAccessor for ChildArrayFieldDirectStorageAccessor {
    fn size(&self) -> usize {
        self.objects.len()
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.objects.clone()
    }

    fn at(&self, index: usize) -> Option<ObjectId> {
        self.objects.get(index).copied()
    }

    fn index(&self, object: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| *o == object)
    }

    fn push_back(&mut self, object: ObjectId) {
        self.objects.push(object);
    }

    fn insert(&mut self, index: usize, object: ObjectId) -> Result<(), DomainError> {
        if index > self.objects.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                size: self.objects.len(),
            });
        }
        self.objects.insert(index, object);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Result<ObjectId, DomainError> {
        if index >= self.objects.len() {
            return Err(DomainError::IndexOutOfRange {
                index,
                size: self.objects.len(),
            });
        }
        Ok(self.objects.remove(index))
    }

    fn clear(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.objects)
    }
}

/// Kind-specific view of a child array field, independent of its declared type.
pub trait ChildArrayFieldHandle: FieldHandle {
    fn accessor(&self) -> Option<&dyn ChildArrayFieldAccessor>;

    /// Writable storage, reserved for the arena.
    fn accessor_mut(
        &mut self,
        token: ArenaToken,
    ) -> Option<&mut (dyn ChildArrayFieldAccessor + 'static)>;

    /// Install `accessor` unconditionally, returning the previous one.
    fn replace_accessor(
        &mut self,
        accessor: Box<dyn ChildArrayFieldAccessor>,
        token: ArenaToken,
    ) -> Option<Box<dyn ChildArrayFieldAccessor>>;

    fn size(&self) -> Result<usize, DomainError> {
        self.accessor()
            .map(|a| a.size())
            .ok_or_else(|| DomainError::FieldNotAccessible {
                keyword: self.keyword().to_string(),
            })
    }
}

/// Field owning an ordered list of objects whose classes derive from `T`.
pub struct ChildArrayField<T: ClassLineage> {
    core: FieldCore,
    accessor: Option<Box<dyn ChildArrayFieldAccessor>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ClassLineage> ChildArrayField<T> {
    pub fn new() -> Self {
        Self {
            core: FieldCore::default(),
            accessor: Some(Box::new(ChildArrayFieldDirectStorageAccessor::default())),
            _marker: PhantomData,
        }
    }

    /// Swap the storage strategy of an empty field.
    ///
    /// Fails with `FieldNotEmpty` while either accessor holds objects. See
    /// [`ObjectArena::set_child_array_accessor`] for populated fields.
    ///
    /// [`ObjectArena::set_child_array_accessor`]: crate::domain::ObjectArena::set_child_array_accessor
    pub fn set_accessor(
        &mut self,
        accessor: Box<dyn ChildArrayFieldAccessor>,
    ) -> Result<(), DomainError> {
        self.ensure_empty(Some(&*accessor))?;
        self.accessor = Some(accessor);
        Ok(())
    }

    /// Remove the storage strategy of an empty field.
    pub fn take_accessor(
        &mut self,
    ) -> Result<Option<Box<dyn ChildArrayFieldAccessor>>, DomainError> {
        self.ensure_empty(None)?;
        Ok(self.accessor.take())
    }

    fn ensure_empty(
        &self,
        incoming: Option<&dyn ChildArrayFieldAccessor>,
    ) -> Result<(), DomainError> {
        if !self.is_empty() || incoming.is_some_and(|a| a.size() > 0) {
            return Err(DomainError::FieldNotEmpty {
                keyword: self.keyword().to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accessor.as_ref().map_or(0, |a| a.size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ClassLineage> Default for ChildArrayField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClassLineage> fmt::Debug for ChildArrayField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildArrayField")
            .field("keyword", &self.keyword())
            .field("data_type", &self.data_type())
            .field("objects", &self.child_objects())
            .finish()
    }
}

impl<T: ClassLineage> FieldHandle for ChildArrayField<T> {
    fn core(&self) -> &FieldCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FieldCore {
        &mut self.core
    }

    fn data_type(&self) -> String {
        format!("{}[]", T::keyword())
    }

    fn is_readable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_getter())
    }

    fn is_writable(&self) -> bool {
        self.accessor.as_ref().is_some_and(|a| a.has_setter())
    }

    fn kind(&self) -> FieldKind {
        FieldKind::ChildArray
    }

    fn child_objects(&self) -> Vec<ObjectId> {
        self.accessor
            .as_ref()
            .map(|a| a.objects())
            .unwrap_or_default()
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

    fn as_child_array_field(&self) -> Option<&dyn ChildArrayFieldHandle> {
        Some(self)
    }

    fn as_child_array_field_mut(&mut self) -> Option<&mut dyn ChildArrayFieldHandle> {
        Some(self)
    }
}

impl<T: ClassLineage> ChildArrayFieldHandle for ChildArrayField<T> {
    fn accessor(&self) -> Option<&dyn ChildArrayFieldAccessor> {
        self.accessor.as_deref()
    }

    fn accessor_mut(
        &mut self,
        _token: ArenaToken,
    ) -> Option<&mut (dyn ChildArrayFieldAccessor + 'static)> {
        self.accessor.as_deref_mut()
    }

    fn replace_accessor(
        &mut self,
        accessor: Box<dyn ChildArrayFieldAccessor>,
        _token: ArenaToken,
    ) -> Option<Box<dyn ChildArrayFieldAccessor>> {
        self.accessor.replace(accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::object::ObjectRoot;

    fn id(index: u32) -> ObjectId {
        ObjectId::from_raw_parts(index, 0)
    }

    #[test]
    fn keeps_insertion_order() {
        let mut storage = ChildArrayFieldDirectStorageAccessor::default();
        storage.push_back(id(0));
        storage.push_back(id(2));
        storage.insert(1, id(1)).unwrap();
        assert_eq!(storage.objects(), vec![id(0), id(1), id(2)]);
        assert_eq!(storage.index(id(2)), Some(2));
    }

    #[test]
    fn index_of_missing_object_is_none() {
        let mut storage = ChildArrayFieldDirectStorageAccessor::default();
        storage.push_back(id(0));
        assert_eq!(storage.index(id(9)), None);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut storage = ChildArrayFieldDirectStorageAccessor::default();
        assert_eq!(
            storage.remove(0),
            Err(DomainError::IndexOutOfRange { index: 0, size: 0 })
        );
        assert!(storage.insert(1, id(0)).is_err());
        assert_eq!(storage.at(0), None);
    }

    #[test]
    fn clear_returns_previous_contents() {
        let mut storage = ChildArrayFieldDirectStorageAccessor::default();
        storage.push_back(id(3));
        assert_eq!(storage.clear(), vec![id(3)]);
        assert_eq!(storage.size(), 0);
    }

    #[test]
    fn data_type_appends_brackets() {
        let field: ChildArrayField<ObjectRoot> = ChildArrayField::new();
        assert_eq!(field.data_type(), "ObjectHandle[]");
        assert_eq!(field.kind(), FieldKind::ChildArray);
        assert!(field.is_empty());
    }

    #[test]
    fn accessor_swap_needs_an_empty_field() {
        let mut field: ChildArrayField<ObjectRoot> = ChildArrayField::new();
        let mut prefilled = ChildArrayFieldDirectStorageAccessor::default();
        prefilled.push_back(id(1));

        assert!(matches!(
            field.set_accessor(Box::new(prefilled.clone())),
            Err(DomainError::FieldNotEmpty { .. })
        ));
        assert!(field.is_empty());

        field.replace_accessor(Box::new(prefilled), ArenaToken::new());
        assert!(matches!(
            field.set_accessor(Box::new(ChildArrayFieldDirectStorageAccessor::default())),
            Err(DomainError::FieldNotEmpty { .. })
        ));
        assert!(matches!(
            field.take_accessor(),
            Err(DomainError::FieldNotEmpty { .. })
        ));
        assert_eq!(field.child_objects(), vec![id(1)]);
    }
}
