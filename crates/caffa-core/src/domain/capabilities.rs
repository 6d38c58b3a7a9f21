//! Field capability registry.
//!
//! A capability is a piece of cross-cutting behaviour bound to exactly one
//! field: presentation metadata, serialization eligibility, scripting
//! exposure. Fields never know which capabilities exist; consumers look them
//! up by type:
//!
//! ```rust
//! use caffa_core::domain::{CapabilitySet, FieldIoCapability};
//!
//! let mut caps = CapabilitySet::default();
//! caps.insert(FieldIoCapability::new(false));
//! assert!(!caps.get::<FieldIoCapability>().unwrap().is_serializable());
//! ```
//!
//! # Adding a New Capability
//!
//! 1. Define a struct holding its state plus a [`CapabilityOwner`]
//! 2. Implement [`FieldCapability`] for it
//! 3. Attach it with `with_capability` when the field is initialized

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

// ── Capability trait ─────────────────────────────────────────────────────────

/// Behaviour attachable to a field.
pub trait FieldCapability: Any {
    /// Stable display name, e.g. `io` or `scripting`.
    fn name(&self) -> &'static str;

    /// Called once when the capability is attached to a field.
    fn attach(&mut self, owner: CapabilityOwner);

    /// Back-reference to the owning field, if attached.
    fn owner(&self) -> Option<&CapabilityOwner>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Read-only back-reference from a capability to the field that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityOwner {
    field_keyword: String,
}

impl CapabilityOwner {
    pub(crate) fn new(field_keyword: impl Into<String>) -> Self {
        Self {
            field_keyword: field_keyword.into(),
        }
    }

    pub fn field_keyword(&self) -> &str {
        &self.field_keyword
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// The capabilities owned by one field, keyed by capability type.
#[derive(Default)]
pub struct CapabilitySet {
    owner: Option<String>,
    entries: BTreeMap<TypeId, Box<dyn FieldCapability>>,
}

impl CapabilitySet {
    /// Attach `capability`, returning the previous capability of the same type.
    pub fn insert<C: FieldCapability>(&mut self, mut capability: C) -> Option<Box<dyn FieldCapability>> {
        if let Some(owner) = &self.owner {
            capability.attach(CapabilityOwner::new(owner.clone()));
        }
        self.entries.insert(TypeId::of::<C>(), Box::new(capability))
    }

    pub fn get<C: FieldCapability>(&self) -> Option<&C> {
        self.entries
            .get(&TypeId::of::<C>())
            .and_then(|c| c.as_any().downcast_ref::<C>())
    }

    pub fn get_mut<C: FieldCapability>(&mut self) -> Option<&mut C> {
        self.entries
            .get_mut(&TypeId::of::<C>())
            .and_then(|c| c.as_any_mut().downcast_mut::<C>())
    }

    pub fn contains<C: FieldCapability>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<C>())
    }

    pub fn remove<C: FieldCapability>(&mut self) -> Option<Box<dyn FieldCapability>> {
        self.entries.remove(&TypeId::of::<C>())
    }

    /// Names of all attached capabilities, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind the set (and everything already in it) to its field.
    pub(crate) fn bind_owner(&mut self, field_keyword: &str) {
        self.owner = Some(field_keyword.to_string());
        for capability in self.entries.values_mut() {
            capability.attach(CapabilityOwner::new(field_keyword));
        }
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("owner", &self.owner)
            .field("capabilities", &self.names())
            .finish()
    }
}

macro_rules! capability_boilerplate {
    ($name:literal) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn attach(&mut self, owner: CapabilityOwner) {
            self.owner = Some(owner);
        }

        fn owner(&self) -> Option<&CapabilityOwner> {
            self.owner.as_ref()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

// ── Builtin capabilities ─────────────────────────────────────────────────────

/// Serialization eligibility.
#[derive(Debug, Clone)]
pub struct FieldIoCapability {
    serializable: bool,
    owner: Option<CapabilityOwner>,
}

impl FieldIoCapability {
    pub fn new(serializable: bool) -> Self {
        Self {
            serializable,
            owner: None,
        }
    }

    pub fn is_serializable(&self) -> bool {
        self.serializable
    }

    pub fn set_serializable(&mut self, serializable: bool) {
        self.serializable = serializable;
    }
}

impl Default for FieldIoCapability {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FieldCapability for FieldIoCapability {
    capability_boilerplate!("io");
}

/// Exposure of a field to scripting clients.
#[derive(Debug, Clone)]
pub struct FieldScriptingCapability {
    readable: bool,
    writable: bool,
    owner: Option<CapabilityOwner>,
}

impl FieldScriptingCapability {
    pub fn new(readable: bool, writable: bool) -> Self {
        Self {
            readable,
            writable,
            owner: None,
        }
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

impl FieldCapability for FieldScriptingCapability {
    capability_boilerplate!("scripting");
}

/// Presentation metadata for generic UI and CLI tooling.
#[derive(Debug, Clone, Default)]
pub struct FieldUiCapability {
    label: String,
    tooltip: String,
    hidden: bool,
    owner: Option<CapabilityOwner>,
}

impl FieldUiCapability {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tooltip_text(&self) -> &str {
        &self.tooltip
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl FieldCapability for FieldUiCapability {
    capability_boilerplate!("ui");
}
