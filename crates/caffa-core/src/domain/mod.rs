//! Reflection core for Caffa.
//!
//! Objects declare their fields and methods at construction time and can
//! then be inspected and edited generically, by keyword, without knowing
//! their concrete type. Nothing here performs I/O; serialization and storage
//! are reached through the ports of the application layer.
//!
//! ## Building blocks
//!
//! - **Keywords**: identifier rules shared by classes, fields and methods
//! - **Values**: [`PortableDataType`] and [`AppEnum`] for enum options
//! - **Fields**: [`Field<T>`], [`ChildField<T>`], [`ChildArrayField<T>`]
//!   behind the object-safe [`FieldHandle`]
//! - **Objects**: [`ObjectBase`] embedded in every class, [`ObjectHandle`]
//!   for generic access, [`ObjectClass`] for the static class identity
//! - **Arena**: [`ObjectArena`] owns object graphs and enforces single
//!   ownership
//! - **Factories**: [`Factory`] and [`ObjectFactory`], explicit values
//!   created by the application
//! - **Visitors**: [`Inspector`] and [`Editor`] walks over a graph

pub mod app_enum;
pub mod arena;
pub mod capabilities;
pub mod data_type;
pub mod error;
pub mod factory;
pub mod field;
pub mod keyword;
pub mod method;
pub mod object;
pub mod validator;
pub mod visitor;

pub use app_enum::{AppEnum, EnumItems};
pub use arena::{Detached, ObjectArena, ObjectId, ParentLink};
pub use capabilities::{
    CapabilityOwner, CapabilitySet, FieldCapability, FieldIoCapability, FieldScriptingCapability,
    FieldUiCapability,
};
pub use data_type::{PortableDataType, PortableValue};
pub use error::{DomainError, ErrorCategory};
pub use factory::{DefaultObjectFactory, Factory, ObjectFactory};
pub use field::{
    ArenaToken, ChildArrayField, ChildArrayFieldAccessor, ChildArrayFieldDirectStorageAccessor,
    ChildArrayFieldHandle, ChildField, ChildFieldAccessor, ChildFieldDirectStorageAccessor,
    ChildFieldHandle, DataFieldAccessor, DataFieldHandle, DirectStorageAccessor, Field,
    FieldCore, FieldHandle, FieldInitHelper, FieldKey, FieldKind, ProxyAccessor,
};
pub use keyword::{RESERVED_KEYWORD, is_valid_keyword, validate_keyword};
pub use method::{MethodHandle, MethodKind};
pub use object::{ClassIdentity, ClassLineage, ObjectBase, ObjectClass, ObjectHandle, ObjectRoot};
pub use validator::{FailureSeverity, FieldValidator, RangeValidator, VectorSizeValidator};
pub use visitor::{Editor, Inspector, ObjectCollector, ObjectPerformer};
