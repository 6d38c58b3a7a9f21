//! Reflectable objects.
//!
//! A concrete class is a plain struct embedding an [`ObjectBase`], plus two
//! trait impls:
//!
//! ```rust
//! use caffa_core::domain::{
//!     ClassIdentity, Field, FieldKey, ObjectBase, ObjectClass, ObjectHandle, ObjectRoot,
//! };
//!
//! pub struct Point {
//!     base: ObjectBase,
//!     x: FieldKey<Field<i32>>,
//! }
//!
//! impl Default for Point {
//!     fn default() -> Self {
//!         let mut base = ObjectBase::new();
//!         let x = base.init_field("x", Field::new()).with_default(0).key();
//!         Self { base, x }
//!     }
//! }
//!
//! impl ObjectClass for Point {
//!     const KEYWORD: &'static str = "Point";
//!     type Parent = ObjectRoot;
//! }
//!
//! impl ObjectHandle for Point {
//!     fn base(&self) -> &ObjectBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
//! }
//!
//! let point = Point::default();
//! assert_eq!(point.class_inheritance_stack(), vec!["Point", "ObjectHandle"]);
//! assert_eq!(point.base().field(point.x).value().unwrap(), 0);
//! ```
//!
//! Derived classes embed their parent struct and add fields to the same base.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::domain::arena::ObjectId;
use crate::domain::capabilities::FieldIoCapability;
use crate::domain::data_type::PortableValue;
use crate::domain::error::DomainError;
use crate::domain::field::{FieldHandle, FieldInitHelper, FieldKey};
use crate::domain::keyword::validate_keyword;
use crate::domain::method::MethodHandle;

// ── Class lineage ────────────────────────────────────────────────────────────

/// Static identity of a class: its keyword and the keywords of its ancestors.
pub trait ClassLineage: 'static {
    fn keyword() -> &'static str;

    /// Keywords from the most-derived class up to `ObjectHandle`.
    fn inheritance_stack() -> Vec<&'static str>;
}

/// Root of every inheritance stack.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRoot;

impl ObjectRoot {
    pub const KEYWORD: &'static str = "ObjectHandle";
}

impl ClassLineage for ObjectRoot {
    fn keyword() -> &'static str {
        Self::KEYWORD
    }

    fn inheritance_stack() -> Vec<&'static str> {
        vec![Self::KEYWORD]
    }
}

/// Class declaration: keyword, documentation and parent.
///
/// `KEYWORD` must satisfy [`is_valid_keyword`](crate::domain::is_valid_keyword);
/// registering a class with a bad keyword fails to compile.
pub trait ObjectClass: 'static {
    const KEYWORD: &'static str;

    const DOCUMENTATION: &'static str = "";

    type Parent: ClassLineage;
}

impl<T: ObjectClass> ClassLineage for T {
    fn keyword() -> &'static str {
        T::KEYWORD
    }

    fn inheritance_stack() -> Vec<&'static str> {
        let mut stack = vec![T::KEYWORD];
        stack.extend(<T::Parent as ClassLineage>::inheritance_stack());
        stack
    }
}

/// Dynamic view of [`ObjectClass`], implemented for every class.
pub trait ClassIdentity {
    fn class_keyword(&self) -> &'static str;

    fn class_inheritance_stack(&self) -> Vec<&'static str>;

    fn class_documentation(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ObjectClass> ClassIdentity for T {
    fn class_keyword(&self) -> &'static str {
        T::KEYWORD
    }

    fn class_inheritance_stack(&self) -> Vec<&'static str> {
        <T as ClassLineage>::inheritance_stack()
    }

    fn class_documentation(&self) -> &'static str {
        T::DOCUMENTATION
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── ObjectHandle ─────────────────────────────────────────────────────────────

/// A reflectable object.
pub trait ObjectHandle: ClassIdentity + Any {
    fn base(&self) -> &ObjectBase;

    fn base_mut(&mut self) -> &mut ObjectBase;

    /// Rebuild transient state after the whole document graph is populated.
    fn init_after_read(&mut self) {}

    fn uuid(&self) -> Option<Uuid> {
        self.base().uuid()
    }

    fn set_uuid(&mut self, uuid: Uuid) {
        self.base_mut().set_uuid(uuid);
    }

    /// Arena slot, once adopted by an [`ObjectArena`](crate::domain::ObjectArena).
    fn id(&self) -> Option<ObjectId> {
        self.base().id()
    }

    fn fields(&self) -> Vec<&dyn FieldHandle> {
        self.base().fields().collect()
    }

    fn find_field(&self, keyword: &str) -> Option<&dyn FieldHandle> {
        self.base().find_field(keyword)
    }

    fn find_field_mut(&mut self, keyword: &str) -> Option<&mut (dyn FieldHandle + 'static)> {
        self.base_mut().find_field_mut(keyword)
    }

    fn methods(&self) -> Vec<&MethodHandle> {
        self.base().methods().collect()
    }

    fn find_method(&self, keyword: &str) -> Option<&MethodHandle> {
        self.base().find_method(keyword)
    }

    /// Second entry of the inheritance stack.
    ///
    /// # Panics
    ///
    /// If the stack holds a single entry, which only `ObjectHandle` itself has.
    fn parent_class_keyword(&self) -> &'static str {
        let stack = self.class_inheritance_stack();
        assert!(stack.len() >= 2, "class '{}' has no parent", self.class_keyword());
        stack[1]
    }

    /// Is-a test against the inheritance stack.
    fn matches_class_keyword(&self, keyword: &str) -> bool {
        self.class_inheritance_stack().contains(&keyword)
    }
}

impl<'a> dyn ObjectHandle + 'a {
    pub fn downcast_ref<T: ObjectHandle>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: ObjectHandle>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Look up `keyword` and call it with `arguments`.
    pub fn execute_method(
        &mut self,
        keyword: &str,
        arguments: &[PortableValue],
    ) -> Result<PortableValue, DomainError> {
        let method = self
            .find_method(keyword)
            .cloned()
            .ok_or_else(|| DomainError::MethodNotFound {
                class: self.class_keyword().to_string(),
                keyword: keyword.to_string(),
            })?;
        method.execute(self, arguments)
    }
}

impl<'a> fmt::Debug for dyn ObjectHandle + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("class", &self.class_keyword())
            .field("uuid", &self.uuid())
            .field("id", &self.id())
            .finish()
    }
}

// ── ObjectBase ───────────────────────────────────────────────────────────────

/// Identity and member tables embedded in every concrete object.
///
/// Fields and methods are kept in insertion order; lookups by keyword go
/// through a sorted index.
pub struct ObjectBase {
    uuid: Option<Uuid>,
    id: Option<ObjectId>,
    fields: Vec<Box<dyn FieldHandle>>,
    field_index: BTreeMap<String, usize>,
    methods: Vec<MethodHandle>,
    method_index: BTreeMap<String, usize>,
}

impl ObjectBase {
    /// Base with a freshly generated UUID.
    pub fn new() -> Self {
        Self {
            uuid: Some(Uuid::new_v4()),
            ..Self::without_uuid()
        }
    }

    /// Base whose UUID is assigned later, e.g. by a deserializer.
    pub fn without_uuid() -> Self {
        Self {
            uuid: None,
            id: None,
            fields: Vec::new(),
            field_index: BTreeMap::new(),
            methods: Vec::new(),
            method_index: BTreeMap::new(),
        }
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    pub fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = Some(uuid);
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub(crate) fn adopt(&mut self, id: ObjectId) {
        self.id = Some(id);
        for field in &mut self.fields {
            field.core_mut().set_owner(id);
        }
    }

    // ── fields ──────────────────────────────────────────────────────────────

    /// Register `field` under `keyword`.
    ///
    /// # Panics
    ///
    /// If the keyword is invalid or already used on this object. Use
    /// [`Self::try_add_field`] to get an error instead.
    pub fn add_field<F: FieldHandle>(&mut self, keyword: &str, field: F) -> FieldKey<F> {
        match self.try_add_field(keyword, field) {
            Ok(key) => key,
            Err(err) => panic!("add_field: {err}"),
        }
    }

    pub fn try_add_field<F: FieldHandle>(
        &mut self,
        keyword: &str,
        mut field: F,
    ) -> Result<FieldKey<F>, DomainError> {
        validate_keyword(keyword)?;
        if self.field_index.contains_key(keyword) {
            return Err(DomainError::DuplicateFieldKeyword {
                keyword: keyword.to_string(),
            });
        }

        field.core_mut().bind(keyword);
        if let Some(id) = self.id {
            field.core_mut().set_owner(id);
        }

        let index = self.fields.len();
        self.fields.push(Box::new(field));
        self.field_index.insert(keyword.to_string(), index);
        Ok(FieldKey::new(index))
    }

    /// Register `field` with serialization enabled and return a builder for
    /// the rest of its setup.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::add_field`].
    pub fn init_field<F: FieldHandle>(&mut self, keyword: &str, field: F) -> FieldInitHelper<'_, F> {
        let key = self.add_field(keyword, field);
        self.field_mut(key)
            .core_mut()
            .capabilities_mut()
            .insert(FieldIoCapability::default());
        FieldInitHelper::new(self, key)
    }

    /// Typed access through a key returned by `add_field`/`init_field`.
    ///
    /// # Panics
    ///
    /// If `key` was issued by a different object.
    pub fn field<F: FieldHandle>(&self, key: FieldKey<F>) -> &F {
        self.fields
            .get(key.index())
            .and_then(|f| f.as_any().downcast_ref::<F>())
            .unwrap_or_else(|| panic!("{key:?} does not belong to this object"))
    }

    /// Mutable form of [`Self::field`].
    ///
    /// # Panics
    ///
    /// If `key` was issued by a different object.
    pub fn field_mut<F: FieldHandle>(&mut self, key: FieldKey<F>) -> &mut F {
        self.fields
            .get_mut(key.index())
            .and_then(|f| f.as_any_mut().downcast_mut::<F>())
            .unwrap_or_else(|| panic!("{key:?} does not belong to this object"))
    }

    /// All fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &dyn FieldHandle> {
        self.fields.iter().map(|f| f.as_ref() as &dyn FieldHandle)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn field_at_mut(&mut self, index: usize) -> Option<&mut (dyn FieldHandle + 'static)> {
        self.fields.get_mut(index).map(|f| f.as_mut())
    }

    pub fn find_field(&self, keyword: &str) -> Option<&dyn FieldHandle> {
        let index = *self.field_index.get(keyword)?;
        self.fields.get(index).map(|f| f.as_ref() as &dyn FieldHandle)
    }

    pub fn find_field_mut(&mut self, keyword: &str) -> Option<&mut (dyn FieldHandle + 'static)> {
        let index = *self.field_index.get(keyword)?;
        self.fields.get_mut(index).map(|f| f.as_mut())
    }

    // ── methods ─────────────────────────────────────────────────────────────

    /// Register `method` under `keyword`.
    ///
    /// # Panics
    ///
    /// If the keyword is invalid or already used on this object.
    pub fn add_method(&mut self, keyword: &str, method: MethodHandle) {
        if let Err(err) = self.try_add_method(keyword, method) {
            panic!("add_method: {err}");
        }
    }

    pub fn try_add_method(&mut self, keyword: &str, mut method: MethodHandle) -> Result<(), DomainError> {
        validate_keyword(keyword)?;
        if self.method_index.contains_key(keyword) {
            return Err(DomainError::DuplicateMethodKeyword {
                keyword: keyword.to_string(),
            });
        }
        method.bind(keyword);
        self.method_index.insert(keyword.to_string(), self.methods.len());
        self.methods.push(method);
        Ok(())
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodHandle> {
        self.methods.iter()
    }

    pub fn find_method(&self, keyword: &str) -> Option<&MethodHandle> {
        let index = *self.method_index.get(keyword)?;
        self.methods.get(index)
    }
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase")
            .field("uuid", &self.uuid)
            .field("id", &self.id)
            .field("fields", &self.field_index.keys().collect::<Vec<_>>())
            .field("methods", &self.method_index.keys().collect::<Vec<_>>())
            .finish()
    }
}
