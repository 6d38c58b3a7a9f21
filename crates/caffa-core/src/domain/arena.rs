//! Ownership of object graphs.
//!
//! Every object lives in a slot of an [`ObjectArena`]. Child fields store
//! [`ObjectId`]s, and the arena records for each object which field of
//! which object owns it. All moves between owners go through the arena,
//! which is what keeps the graph a forest:
//!
//! - an object has at most one owning field;
//! - an object never owns itself or one of its ancestors;
//! - a child matches the declared class of the field holding it.
//!
//! Slots carry a generation. Destroying an object bumps it, so ids that
//! outlive their object resolve to nothing instead of to whatever reuses
//! the slot.

use std::fmt;

use tracing::{debug, trace};

use crate::domain::error::DomainError;
use crate::domain::factory::ObjectFactory;
use crate::domain::field::{
    ArenaToken, ChildArrayFieldAccessor, ChildFieldAccessor, FieldHandle, FieldKind,
};
use crate::domain::object::{ClassIdentity, ObjectClass, ObjectHandle};
use crate::domain::visitor::{Editor, Inspector, ObjectPerformer};

// ── Ids ──────────────────────────────────────────────────────────────────────

/// Generation-checked reference to an object in an [`ObjectArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    pub(crate) const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

/// The field an object is owned through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    object: ObjectId,
    field: String,
}

impl ParentLink {
    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// An object just released from its owning field.
///
/// It is still alive in the arena as a root. Attach it elsewhere with its
/// id, or hand it to [`ObjectArena::remove`].
#[must_use = "a detached object stays in the arena until it is re-attached or removed"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    id: ObjectId,
}

impl Detached {
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl From<Detached> for ObjectId {
    fn from(detached: Detached) -> Self {
        detached.id
    }
}

// ── Arena ────────────────────────────────────────────────────────────────────

struct Entry {
    object: Box<dyn ObjectHandle>,
    parent: Option<ParentLink>,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Owner of every object in one or more object graphs.
#[derive(Default)]
pub struct ObjectArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

fn not_found(id: ObjectId) -> DomainError {
    DomainError::ObjectNotFound { id: id.to_string() }
}

fn wrong_kind(keyword: &str, expected: FieldKind) -> DomainError {
    DomainError::WrongFieldKind {
        keyword: keyword.to_string(),
        expected: expected.as_str(),
    }
}

fn not_accessible(keyword: &str) -> DomainError {
    DomainError::FieldNotAccessible {
        keyword: keyword.to_string(),
    }
}

/// Whether the field still has a storage strategy installed.
fn has_accessor(field: &dyn FieldHandle) -> bool {
    match field.kind() {
        FieldKind::Data => true,
        FieldKind::Child => field
            .as_child_field()
            .is_some_and(|f| f.accessor().is_some()),
        FieldKind::ChildArray => field
            .as_child_array_field()
            .is_some_and(|f| f.accessor().is_some()),
    }
}

fn child_accessor(field: &dyn FieldHandle) -> Result<&dyn ChildFieldAccessor, DomainError> {
    let handle = field
        .as_child_field()
        .ok_or_else(|| wrong_kind(field.keyword(), FieldKind::Child))?;
    let accessor = handle
        .accessor()
        .ok_or_else(|| not_accessible(field.keyword()))?;
    if !accessor.has_getter() {
        return Err(DomainError::FieldNotReadable {
            keyword: field.keyword().to_string(),
        });
    }
    Ok(accessor)
}

fn array_accessor(field: &dyn FieldHandle) -> Result<&dyn ChildArrayFieldAccessor, DomainError> {
    let handle = field
        .as_child_array_field()
        .ok_or_else(|| wrong_kind(field.keyword(), FieldKind::ChildArray))?;
    let accessor = handle
        .accessor()
        .ok_or_else(|| not_accessible(field.keyword()))?;
    if !accessor.has_getter() {
        return Err(DomainError::FieldNotReadable {
            keyword: field.keyword().to_string(),
        });
    }
    Ok(accessor)
}

fn child_accessor_mut(
    field: &mut dyn FieldHandle,
) -> Result<&mut (dyn ChildFieldAccessor + 'static), DomainError> {
    let keyword = field.keyword().to_string();
    field
        .as_child_field_mut()
        .ok_or_else(|| wrong_kind(&keyword, FieldKind::Child))?
        .accessor_mut(ArenaToken::new())
        .ok_or_else(|| not_accessible(&keyword))
}

fn array_accessor_mut(
    field: &mut dyn FieldHandle,
) -> Result<&mut (dyn ChildArrayFieldAccessor + 'static), DomainError> {
    let keyword = field.keyword().to_string();
    field
        .as_child_array_field_mut()
        .ok_or_else(|| wrong_kind(&keyword, FieldKind::ChildArray))?
        .accessor_mut(ArenaToken::new())
        .ok_or_else(|| not_accessible(&keyword))
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ── storage ─────────────────────────────────────────────────────────────

    /// Take ownership of `object` as a new root.
    pub fn insert<T: ObjectHandle>(&mut self, object: T) -> ObjectId {
        self.insert_boxed(Box::new(object))
    }

    pub fn insert_boxed(&mut self, mut object: Box<dyn ObjectHandle>) -> ObjectId {
        let id = match self.free_list.pop() {
            Some(index) => ObjectId::from_raw_parts(index, self.slots[index as usize].generation),
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
                    panic!("object arena is full ({} slots)", u32::MAX)
                });
                self.slots.push(Slot {
                    generation: 0,
                    entry: None,
                });
                ObjectId::from_raw_parts(index, 0)
            }
        };

        object.base_mut().adopt(id);
        trace!(%id, class = object.class_keyword(), "object inserted");
        self.slots[id.index as usize].entry = Some(Entry {
            object,
            parent: None,
        });
        self.len += 1;
        id
    }

    /// Create an object through `factory` and insert it as a root.
    pub fn create(&mut self, factory: &dyn ObjectFactory, class_keyword: &str) -> Option<ObjectId> {
        factory
            .create(class_keyword)
            .map(|object| self.insert_boxed(object))
    }

    fn entry(&self, id: ObjectId) -> Option<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: ObjectId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.entry(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn ObjectHandle> {
        self.entry(id).map(|entry| entry.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn ObjectHandle + 'static)> {
        self.entry_mut(id).map(|entry| entry.object.as_mut())
    }

    /// Typed view of an object. The object must be exactly a `T`.
    pub fn get_as<T: ObjectClass + ObjectHandle>(&self, id: ObjectId) -> Result<&T, DomainError> {
        let object = self.get(id).ok_or_else(|| not_found(id))?;
        let actual = object.class_keyword();
        object
            .downcast_ref::<T>()
            .ok_or_else(|| DomainError::TypeMismatch {
                expected: T::KEYWORD.to_string(),
                actual: actual.to_string(),
            })
    }

    pub fn get_as_mut<T: ObjectClass + ObjectHandle>(
        &mut self,
        id: ObjectId,
    ) -> Result<&mut T, DomainError> {
        let object = self.get_mut(id).ok_or_else(|| not_found(id))?;
        let actual = object.class_keyword();
        object
            .downcast_mut::<T>()
            .ok_or_else(|| DomainError::TypeMismatch {
                expected: T::KEYWORD.to_string(),
                actual: actual.to_string(),
            })
    }

    /// Field that owns `id`, `None` for roots and unknown ids.
    pub fn parent_field(&self, id: ObjectId) -> Option<&ParentLink> {
        self.entry(id).and_then(|entry| entry.parent.as_ref())
    }

    /// Live objects without an owner, in slot order.
    pub fn roots(&self) -> Vec<ObjectId> {
        self.live()
            .filter(|(_, entry)| entry.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Every live object, in slot order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.live().map(|(id, _)| id).collect()
    }

    fn live(&self) -> impl Iterator<Item = (ObjectId, &Entry)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (ObjectId::from_raw_parts(index as u32, slot.generation), entry))
        })
    }

    /// Release `id` from its owning field, if any. The object stays alive.
    pub fn detach(&mut self, id: ObjectId) -> Result<Detached, DomainError> {
        let parent = self
            .entry(id)
            .ok_or_else(|| not_found(id))?
            .parent
            .clone();
        match parent {
            Some(link) => self.remove_child_object(link.object, &link.field, id),
            None => Ok(Detached { id }),
        }
    }

    /// Detach `id` from its owner, then destroy it together with every
    /// object it owns.
    pub fn remove(&mut self, id: ObjectId) -> Result<(), DomainError> {
        let detached = self.detach(id)?;
        self.destroy(detached.id);
        Ok(())
    }

    // ── field lookup ────────────────────────────────────────────────────────

    fn field(&self, owner: ObjectId, keyword: &str) -> Result<&dyn FieldHandle, DomainError> {
        let object = self.get(owner).ok_or_else(|| not_found(owner))?;
        object
            .find_field(keyword)
            .ok_or_else(|| DomainError::FieldNotFound {
                class: object.class_keyword().to_string(),
                keyword: keyword.to_string(),
            })
    }

    fn field_mut(
        &mut self,
        owner: ObjectId,
        keyword: &str,
    ) -> Result<&mut (dyn FieldHandle + 'static), DomainError> {
        let object = self.get_mut(owner).ok_or_else(|| not_found(owner))?;
        let class = object.class_keyword();
        object
            .find_field_mut(keyword)
            .ok_or_else(|| DomainError::FieldNotFound {
                class: class.to_string(),
                keyword: keyword.to_string(),
            })
    }

    /// Check that `keyword` on `owner` is a writable field of `kind` and
    /// return its declared child class.
    fn writable_child_field(
        &self,
        owner: ObjectId,
        keyword: &str,
        kind: FieldKind,
    ) -> Result<&'static str, DomainError> {
        let field = self.field(owner, keyword)?;
        if field.kind() != kind {
            return Err(wrong_kind(keyword, kind));
        }
        if !has_accessor(field) {
            return Err(not_accessible(keyword));
        }
        if !field.is_writable() {
            return Err(DomainError::FieldNotWritable {
                keyword: keyword.to_string(),
            });
        }
        field
            .child_class_keyword()
            .ok_or_else(|| wrong_kind(keyword, kind))
    }

    fn check_adoptable(
        &self,
        owner: ObjectId,
        expected_class: &str,
        child: ObjectId,
    ) -> Result<(), DomainError> {
        let entry = self.entry(child).ok_or_else(|| not_found(child))?;
        if let Some(link) = &entry.parent {
            return Err(DomainError::AlreadyOwned {
                id: child.to_string(),
                field: link.field.clone(),
            });
        }

        let mut cursor = Some(owner);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(DomainError::OwnershipCycle {
                    id: child.to_string(),
                });
            }
            cursor = self.parent_field(ancestor).map(|link| link.object);
        }

        if !entry.object.matches_class_keyword(expected_class) {
            return Err(DomainError::TypeMismatch {
                expected: expected_class.to_string(),
                actual: entry.object.class_keyword().to_string(),
            });
        }
        Ok(())
    }

    fn link(&mut self, child: ObjectId, owner: ObjectId, keyword: &str) {
        if let Some(entry) = self.entry_mut(child) {
            entry.parent = Some(ParentLink {
                object: owner,
                field: keyword.to_string(),
            });
        }
        debug!(%child, %owner, field = keyword, "object attached");
    }

    fn unlink(&mut self, child: ObjectId) -> Detached {
        if let Some(entry) = self.entry_mut(child) {
            entry.parent = None;
        }
        debug!(%child, "object detached");
        Detached { id: child }
    }

    /// Drop `root` and everything below it, invalidating their ids.
    fn destroy(&mut self, root: ObjectId) {
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            let Some(entry) = slot.entry.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(id.index);
            self.len -= 1;
            trace!(%id, class = entry.object.class_keyword(), "object destroyed");

            for field in entry.object.base().fields() {
                pending.extend(field.child_objects());
            }
        }
    }

    // ── child fields ────────────────────────────────────────────────────────

    /// Store `child` in the child field `keyword` of `owner`.
    ///
    /// The previous child, if any, is released and returned; it remains in
    /// the arena as a root. Passing `None` empties the field.
    pub fn set_child(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        child: Option<ObjectId>,
    ) -> Result<Option<Detached>, DomainError> {
        let expected = self.writable_child_field(owner, keyword, FieldKind::Child)?;
        if let Some(child) = child {
            if self.parent_field(child).is_some_and(|link| link.object == owner && link.field == keyword) {
                return Ok(None);
            }
            self.check_adoptable(owner, expected, child)?;
        }

        let previous = child_accessor_mut(self.field_mut(owner, keyword)?)?.set_object(child);
        if let Some(child) = child {
            self.link(child, owner, keyword);
        }
        Ok(previous.map(|previous| self.unlink(previous)))
    }

    /// Empty the child field, returning what it held.
    pub fn take_child(
        &mut self,
        owner: ObjectId,
        keyword: &str,
    ) -> Result<Option<Detached>, DomainError> {
        self.set_child(owner, keyword, None)
    }

    pub fn child(&self, owner: ObjectId, keyword: &str) -> Result<Option<ObjectId>, DomainError> {
        Ok(child_accessor(self.field(owner, keyword)?)?.object())
    }

    /// Typed view of the child held by a child field.
    pub fn child_as<T: ObjectClass + ObjectHandle>(
        &self,
        owner: ObjectId,
        keyword: &str,
    ) -> Result<Option<&T>, DomainError> {
        self.child(owner, keyword)?
            .map(|id| self.get_as::<T>(id))
            .transpose()
    }

    // ── child array fields ──────────────────────────────────────────────────

    pub fn push_back(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        child: ObjectId,
    ) -> Result<(), DomainError> {
        let expected = self.writable_child_field(owner, keyword, FieldKind::ChildArray)?;
        self.check_adoptable(owner, expected, child)?;
        array_accessor_mut(self.field_mut(owner, keyword)?)?.push_back(child);
        self.link(child, owner, keyword);
        Ok(())
    }

    /// Insert `child` before `index`; `index == size` appends.
    pub fn insert_at(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        index: usize,
        child: ObjectId,
    ) -> Result<(), DomainError> {
        let expected = self.writable_child_field(owner, keyword, FieldKind::ChildArray)?;
        self.check_adoptable(owner, expected, child)?;
        array_accessor_mut(self.field_mut(owner, keyword)?)?.insert(index, child)?;
        self.link(child, owner, keyword);
        Ok(())
    }

    /// Remove and destroy the element at `index`. Later elements shift down.
    pub fn erase(&mut self, owner: ObjectId, keyword: &str, index: usize) -> Result<(), DomainError> {
        self.writable_child_field(owner, keyword, FieldKind::ChildArray)?;
        let removed = array_accessor_mut(self.field_mut(owner, keyword)?)?.remove(index)?;
        let detached = self.unlink(removed);
        self.destroy(detached.id);
        Ok(())
    }

    /// Empty a child or child array field, destroying what it held.
    pub fn clear(&mut self, owner: ObjectId, keyword: &str) -> Result<(), DomainError> {
        let kind = self.field(owner, keyword)?.kind();
        let removed: Vec<ObjectId> = match kind {
            FieldKind::Data => return Err(wrong_kind(keyword, FieldKind::ChildArray)),
            FieldKind::Child => {
                self.writable_child_field(owner, keyword, kind)?;
                child_accessor_mut(self.field_mut(owner, keyword)?)?
                    .set_object(None)
                    .into_iter()
                    .collect()
            }
            FieldKind::ChildArray => {
                self.writable_child_field(owner, keyword, kind)?;
                array_accessor_mut(self.field_mut(owner, keyword)?)?.clear()
            }
        };
        debug!(%owner, field = keyword, count = removed.len(), "field cleared");
        for id in removed {
            let detached = self.unlink(id);
            self.destroy(detached.id);
        }
        Ok(())
    }

    pub fn at(
        &self,
        owner: ObjectId,
        keyword: &str,
        index: usize,
    ) -> Result<Option<ObjectId>, DomainError> {
        Ok(array_accessor(self.field(owner, keyword)?)?.at(index))
    }

    pub fn size(&self, owner: ObjectId, keyword: &str) -> Result<usize, DomainError> {
        Ok(array_accessor(self.field(owner, keyword)?)?.size())
    }

    pub fn index_of(
        &self,
        owner: ObjectId,
        keyword: &str,
        child: ObjectId,
    ) -> Result<Option<usize>, DomainError> {
        Ok(array_accessor(self.field(owner, keyword)?)?.index(child))
    }

    /// Children of a child or child array field, in order.
    pub fn child_objects(&self, owner: ObjectId, keyword: &str) -> Result<Vec<ObjectId>, DomainError> {
        let field = self.field(owner, keyword)?;
        match field.kind() {
            FieldKind::Data => Err(wrong_kind(keyword, FieldKind::ChildArray)),
            FieldKind::Child => Ok(child_accessor(field)?.object().into_iter().collect()),
            FieldKind::ChildArray => Ok(array_accessor(field)?.objects()),
        }
    }

    /// Typed views of every child. Fails on the first child that is not a `T`.
    pub fn objects_as<T: ObjectClass + ObjectHandle>(
        &self,
        owner: ObjectId,
        keyword: &str,
    ) -> Result<Vec<&T>, DomainError> {
        self.child_objects(owner, keyword)?
            .into_iter()
            .map(|id| self.get_as::<T>(id))
            .collect()
    }

    /// Release `child` from the field without destroying it.
    pub fn remove_child_object(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        child: ObjectId,
    ) -> Result<Detached, DomainError> {
        let kind = self.field(owner, keyword)?.kind();
        let not_a_child = || DomainError::NotAChild {
            id: child.to_string(),
            field: keyword.to_string(),
        };
        match kind {
            FieldKind::Data => return Err(wrong_kind(keyword, FieldKind::ChildArray)),
            FieldKind::Child => {
                self.writable_child_field(owner, keyword, kind)?;
                let accessor = child_accessor_mut(self.field_mut(owner, keyword)?)?;
                if accessor.object() != Some(child) {
                    return Err(not_a_child());
                }
                accessor.set_object(None);
            }
            FieldKind::ChildArray => {
                self.writable_child_field(owner, keyword, kind)?;
                let accessor = array_accessor_mut(self.field_mut(owner, keyword)?)?;
                let index = accessor.index(child).ok_or_else(not_a_child)?;
                accessor.remove(index)?;
            }
        }
        Ok(self.unlink(child))
    }

    // ── accessor swaps ──────────────────────────────────────────────────────

    /// Give the child field `keyword` a new storage strategy, moving its
    /// child into `accessor`. The child keeps its owner link.
    ///
    /// `accessor` must start empty, and must be writable when there is a
    /// child to move. Returns the accessor that was replaced.
    pub fn set_child_accessor(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        mut accessor: Box<dyn ChildFieldAccessor>,
    ) -> Result<Option<Box<dyn ChildFieldAccessor>>, DomainError> {
        let field = self.field(owner, keyword)?;
        let handle = field
            .as_child_field()
            .ok_or_else(|| wrong_kind(keyword, FieldKind::Child))?;
        if accessor.object().is_some() {
            return Err(DomainError::FieldNotEmpty {
                keyword: keyword.to_string(),
            });
        }
        let current = handle.accessor().and_then(|a| a.object());
        if current.is_some() && !accessor.has_setter() {
            return Err(DomainError::FieldNotWritable {
                keyword: keyword.to_string(),
            });
        }

        accessor.set_object(current);
        let previous = self
            .field_mut(owner, keyword)?
            .as_child_field_mut()
            .ok_or_else(|| wrong_kind(keyword, FieldKind::Child))?
            .replace_accessor(accessor, ArenaToken::new());
        debug!(%owner, field = keyword, moved = current.is_some(), "child accessor replaced");
        Ok(previous.map(|mut old| {
            old.set_object(None);
            old
        }))
    }

    /// Give the child array field `keyword` a new storage strategy, moving
    /// its children into `accessor` in order.
    pub fn set_child_array_accessor(
        &mut self,
        owner: ObjectId,
        keyword: &str,
        mut accessor: Box<dyn ChildArrayFieldAccessor>,
    ) -> Result<Option<Box<dyn ChildArrayFieldAccessor>>, DomainError> {
        let field = self.field(owner, keyword)?;
        let handle = field
            .as_child_array_field()
            .ok_or_else(|| wrong_kind(keyword, FieldKind::ChildArray))?;
        if accessor.size() > 0 {
            return Err(DomainError::FieldNotEmpty {
                keyword: keyword.to_string(),
            });
        }
        let current = handle.accessor().map(|a| a.objects()).unwrap_or_default();
        if !current.is_empty() && !accessor.has_setter() {
            return Err(DomainError::FieldNotWritable {
                keyword: keyword.to_string(),
            });
        }

        for child in &current {
            accessor.push_back(*child);
        }
        let previous = self
            .field_mut(owner, keyword)?
            .as_child_array_field_mut()
            .ok_or_else(|| wrong_kind(keyword, FieldKind::ChildArray))?
            .replace_accessor(accessor, ArenaToken::new());
        debug!(%owner, field = keyword, moved = current.len(), "child array accessor replaced");
        Ok(previous.map(|mut old| {
            old.clear();
            old
        }))
    }

    // ── traversal ───────────────────────────────────────────────────────────

    /// Walk the graph below `root` with a read-only visitor.
    pub fn accept(&self, root: ObjectId, inspector: &mut dyn Inspector) -> Result<(), DomainError> {
        if !self.contains(root) {
            return Err(not_found(root));
        }
        self.walk(root, inspector);
        Ok(())
    }

    fn walk(&self, id: ObjectId, inspector: &mut dyn Inspector) {
        let Some(object) = self.get(id) else {
            return;
        };
        inspector.visit_object(object);
        for field in object.base().fields() {
            inspector.visit_field(field);
            for child in field.child_objects() {
                self.walk(child, inspector);
            }
            inspector.leave_field(field);
        }
        inspector.leave_object(object);
    }

    /// Walk the graph below `root` with a mutating visitor.
    ///
    /// The editor sees one object or field at a time; child lists are read
    /// after `visit_field` returns.
    pub fn accept_editor(&mut self, root: ObjectId, editor: &mut dyn Editor) -> Result<(), DomainError> {
        if !self.contains(root) {
            return Err(not_found(root));
        }
        self.walk_mut(root, editor);
        Ok(())
    }

    fn walk_mut(&mut self, id: ObjectId, editor: &mut dyn Editor) {
        let Some(object) = self.get_mut(id) else {
            return;
        };
        editor.visit_object(object);
        let field_count = object.base().field_count();

        for index in 0..field_count {
            let Some(field) = self
                .get_mut(id)
                .and_then(|object| object.base_mut().field_at_mut(index))
            else {
                break;
            };
            editor.visit_field(field);
            let children = field.child_objects();

            for child in children {
                self.walk_mut(child, editor);
            }

            if let Some(field) = self
                .get_mut(id)
                .and_then(|object| object.base_mut().field_at_mut(index))
            {
                editor.leave_field(field);
            }
        }

        if let Some(object) = self.get_mut(id) {
            editor.leave_object(object);
        }
    }

    /// Run [`ObjectHandle::init_after_read`] once on every object below
    /// `root`, parents before children. Returns the number of objects.
    pub fn init_after_read(&mut self, root: ObjectId) -> Result<usize, DomainError> {
        let mut performer = ObjectPerformer::new(|object: &mut dyn ObjectHandle| object.init_after_read());
        self.accept_editor(root, &mut performer)?;
        debug!(%root, objects = performer.visited(), "init_after_read complete");
        Ok(performer.visited())
    }
}

impl fmt::Debug for ObjectArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectArena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .field("roots", &self.roots())
            .finish()
    }
}
