//! Visitor protocol over object graphs.
//!
//! [`ObjectArena::accept`](crate::domain::ObjectArena::accept) walks an
//! object, each of its fields in order, and the children of each field,
//! depth first:
//!
//! ```text
//! visit_object(root)
//!   visit_field(root.a)
//!     visit_object(child) ... leave_object(child)
//!   leave_field(root.a)
//!   visit_field(root.b)
//!   leave_field(root.b)
//! leave_object(root)
//! ```
//!
//! Every reachable object and field is entered exactly once and left exactly
//! once, after all of its children. There is no early exit; a visitor that
//! wants one keeps its own flag.

use crate::domain::arena::ObjectId;
use crate::domain::field::FieldHandle;
use crate::domain::object::ObjectHandle;

/// Read-only visitor.
pub trait Inspector {
    fn visit_object(&mut self, object: &dyn ObjectHandle);

    fn visit_field(&mut self, field: &dyn FieldHandle);

    fn leave_object(&mut self, _object: &dyn ObjectHandle) {}

    fn leave_field(&mut self, _field: &dyn FieldHandle) {}
}

/// Mutating visitor.
pub trait Editor {
    fn visit_object(&mut self, object: &mut dyn ObjectHandle);

    fn visit_field(&mut self, field: &mut dyn FieldHandle);

    fn leave_object(&mut self, _object: &mut dyn ObjectHandle) {}

    fn leave_field(&mut self, _field: &mut dyn FieldHandle) {}
}

/// Collects the ids of every visited object matching a predicate.
pub struct ObjectCollector<P> {
    predicate: P,
    found: Vec<ObjectId>,
}

impl<P> ObjectCollector<P>
where
    P: FnMut(&dyn ObjectHandle) -> bool,
{
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            found: Vec::new(),
        }
    }

    /// Matches in visiting order.
    pub fn objects(&self) -> &[ObjectId] {
        &self.found
    }

    pub fn into_objects(self) -> Vec<ObjectId> {
        self.found
    }
}

impl<P> Inspector for ObjectCollector<P>
where
    P: FnMut(&dyn ObjectHandle) -> bool,
{
    fn visit_object(&mut self, object: &dyn ObjectHandle) {
        if (self.predicate)(object) {
            if let Some(id) = object.id() {
                self.found.push(id);
            }
        }
    }

    fn visit_field(&mut self, _field: &dyn FieldHandle) {}
}

/// Applies an action to every visited object.
pub struct ObjectPerformer<F> {
    action: F,
    visited: usize,
}

impl<F> ObjectPerformer<F>
where
    F: FnMut(&mut dyn ObjectHandle),
{
    pub fn new(action: F) -> Self {
        Self { action, visited: 0 }
    }

    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl<F> Editor for ObjectPerformer<F>
where
    F: FnMut(&mut dyn ObjectHandle),
{
    fn visit_object(&mut self, object: &mut dyn ObjectHandle) {
        (self.action)(object);
        self.visited += 1;
    }

    fn visit_field(&mut self, _field: &mut dyn FieldHandle) {}
}
