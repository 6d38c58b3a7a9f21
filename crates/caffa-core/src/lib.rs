//! Caffa Core - object reflection behind ports and adapters
//!
//! This crate provides the domain and application layers for Caffa:
//! objects that declare typed, named fields and methods, owned in arenas,
//! inspectable and editable by keyword.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            caffa-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │    (DocumentService, ClassService)      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (ObjectSerializer, DocumentStorage)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     caffa-adapters (Infrastructure)     │
//! │  (JsonObjectSerializer, LocalStorage)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Domain Layer (Reflection)      │
//! │  (ObjectHandle, Field, ObjectArena)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use caffa_core::domain::{
//!     DefaultObjectFactory, Field, FieldKey, ObjectArena, ObjectBase, ObjectClass,
//!     ObjectFactory, ObjectHandle, ObjectRoot,
//! };
//!
//! struct Point {
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
//! let mut factory = DefaultObjectFactory::new();
//! factory.register::<Point>().unwrap();
//!
//! let mut arena = ObjectArena::new();
//! let id = arena.create(&factory, "Point").unwrap();
//! let point = arena.get_as_mut::<Point>(id).unwrap();
//! point.base.field_mut(point.x).set_value(3).unwrap();
//! assert_eq!(point.base.field(point.x).value().unwrap(), 3);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ClassInfo, ClassService, DocumentService,
        ports::{DocumentStorage, ObjectSerializer},
    };
    pub use crate::domain::{
        ChildArrayField, ChildField, ClassIdentity, DefaultObjectFactory, Field, FieldHandle,
        FieldKey, ObjectArena, ObjectBase, ObjectClass, ObjectFactory, ObjectHandle, ObjectId,
        ObjectRoot, PortableValue,
    };
    pub use crate::error::{CaffaError, CaffaResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
