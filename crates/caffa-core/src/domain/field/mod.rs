//! Fields: named, typed slots on an object.
//!
//! Three concrete kinds exist:
//!
//! - [`Field<T>`]: a scalar or vector value behind a [`DataFieldAccessor`]
//! - [`ChildField<T>`]: at most one owned child object
//! - [`ChildArrayField<T>`]: an ordered sequence of owned child objects
//!
//! Child fields hold [`ObjectId`]s into an
//! [`ObjectArena`](crate::domain::ObjectArena); the arena is the only place
//! that moves objects between owners.

pub mod child;
pub mod child_array;
pub mod data;
mod init;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::domain::arena::ObjectId;
use crate::domain::capabilities::{CapabilitySet, FieldCapability};

pub use child::{ChildField, ChildFieldAccessor, ChildFieldDirectStorageAccessor, ChildFieldHandle};
pub use child_array::{
    ChildArrayField, ChildArrayFieldAccessor, ChildArrayFieldDirectStorageAccessor,
    ChildArrayFieldHandle,
};
pub use data::{DataFieldAccessor, DataFieldHandle, DirectStorageAccessor, Field, ProxyAccessor};
pub use init::FieldInitHelper;

/// Permission to rewrite the storage of a child field.
///
/// Only the arena can create one, so the owner links it records always
/// match what child fields hold. Code outside the crate can read child
/// storage through the handle traits but cannot change it:
///
/// ```compile_fail
/// use caffa_core::domain::field::ArenaToken;
///
/// let _token = ArenaToken { _private: () };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArenaToken {
    _private: (),
}

impl ArenaToken {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

/// Which family a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Data,
    Child,
    ChildArray,
}

impl FieldKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Child => "child",
            Self::ChildArray => "child array",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared by every field kind.
///
/// The keyword is assigned once, when the field is registered with its
/// object, and the owner once the object is adopted by an arena.
#[derive(Debug, Default)]
pub struct FieldCore {
    keyword: String,
    owner: Option<ObjectId>,
    documentation: String,
    deprecated: bool,
    capabilities: CapabilitySet,
}

impl FieldCore {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn set_documentation(&mut self, documentation: impl Into<String>) {
        self.documentation = documentation.into();
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn set_deprecated(&mut self, deprecated: bool) {
        self.deprecated = deprecated;
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut CapabilitySet {
        &mut self.capabilities
    }

    pub(crate) fn bind(&mut self, keyword: &str) {
        debug_assert!(self.keyword.is_empty(), "field registered twice");
        self.keyword = keyword.to_string();
        self.capabilities.bind_owner(keyword);
    }

    pub(crate) fn set_owner(&mut self, owner: ObjectId) {
        self.owner = Some(owner);
    }
}

/// A named, typed slot on an object.
///
/// Generic machinery (serializers, visitors, the CLI) works through this
/// trait only; the `as_*` views give checked access to the kind-specific
/// behaviour.
pub trait FieldHandle: Any {
    fn core(&self) -> &FieldCore;

    fn core_mut(&mut self) -> &mut FieldCore;

    /// Portable type name of the value, e.g. `int32`, `Point`, `Point[]`.
    fn data_type(&self) -> String;

    fn is_readable(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn kind(&self) -> FieldKind;

    /// Children owned through this field, in order. Empty for data fields.
    fn child_objects(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    /// Declared class keyword of the children, for child fields.
    fn child_class_keyword(&self) -> Option<&'static str> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn as_data_field(&self) -> Option<&dyn DataFieldHandle> {
        None
    }

    fn as_data_field_mut(&mut self) -> Option<&mut dyn DataFieldHandle> {
        None
    }

    fn as_child_field(&self) -> Option<&dyn ChildFieldHandle> {
        None
    }

    fn as_child_field_mut(&mut self) -> Option<&mut dyn ChildFieldHandle> {
        None
    }

    fn as_child_array_field(&self) -> Option<&dyn ChildArrayFieldHandle> {
        None
    }

    fn as_child_array_field_mut(&mut self) -> Option<&mut dyn ChildArrayFieldHandle> {
        None
    }

    fn keyword(&self) -> &str {
        self.core().keyword()
    }

    fn owner_object(&self) -> Option<ObjectId> {
        self.core().owner()
    }

    fn documentation(&self) -> &str {
        self.core().documentation()
    }

    fn is_deprecated(&self) -> bool {
        self.core().is_deprecated()
    }

    fn has_child_objects(&self) -> bool {
        !self.child_objects().is_empty()
    }
}

impl<'a> dyn FieldHandle + 'a {
    /// Typed capability lookup.
    pub fn capability<C: FieldCapability>(&self) -> Option<&C> {
        self.core().capabilities().get::<C>()
    }

    pub fn capability_mut<C: FieldCapability>(&mut self) -> Option<&mut C> {
        self.core_mut().capabilities_mut().get_mut::<C>()
    }

    pub fn downcast_ref<F: FieldHandle>(&self) -> Option<&F> {
        self.as_any().downcast_ref::<F>()
    }

    pub fn downcast_mut<F: FieldHandle>(&mut self) -> Option<&mut F> {
        self.as_any_mut().downcast_mut::<F>()
    }
}

impl<'a> fmt::Debug for dyn FieldHandle + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandle")
            .field("keyword", &self.keyword())
            .field("data_type", &self.data_type())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Typed handle to a field registered on an [`ObjectBase`](crate::domain::ObjectBase).
///
/// Returned by `add_field`/`init_field` and stored by the concrete class so
/// it can reach its own fields without a keyword lookup.
pub struct FieldKey<F> {
    index: usize,
    _marker: PhantomData<fn() -> F>,
}

impl<F> FieldKey<F> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl<F> Clone for FieldKey<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for FieldKey<F> {}

impl<F> fmt::Debug for FieldKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey({})", self.index)
    }
}

impl<F> PartialEq for FieldKey<F> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<F> Eq for FieldKey<F> {}
