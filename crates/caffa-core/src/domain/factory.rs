//! Keyed factories.
//!
//! Factories are ordinary values. The application builds one at startup,
//! registers its classes with explicit calls, and passes it to whatever
//! needs to turn a keyword into an object (deserializers, the CLI). Tests
//! build their own.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::keyword::{is_valid_keyword, validate_keyword};
use crate::domain::object::{ClassIdentity, ObjectClass, ObjectHandle};

type Creator<B> = Box<dyn Fn() -> Box<B>>;

/// Maps keys to constructors of a polymorphic base type.
pub struct Factory<B: ?Sized, K = String> {
    creators: BTreeMap<K, Creator<B>>,
}

impl<B: ?Sized, K: Ord> Factory<B, K> {
    pub fn new() -> Self {
        Self {
            creators: BTreeMap::new(),
        }
    }

    /// Associate `key` with `creator`.
    ///
    /// A key can be registered once; a second registration is refused and
    /// the first creator stays in place.
    pub fn register_creator<F>(&mut self, key: K, creator: F) -> Result<(), DomainError>
    where
        K: fmt::Display,
        F: Fn() -> Box<B> + 'static,
    {
        if self.creators.contains_key(&key) {
            return Err(DomainError::DuplicateFactoryKey {
                key: key.to_string(),
            });
        }
        self.creators.insert(key, Box::new(creator));
        Ok(())
    }

    /// New instance for `key`, or `None` if nothing is registered under it.
    pub fn create<Q>(&self, key: &Q) -> Option<Box<B>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.creators.get(key).map(|create| create())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.creators.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.creators.keys()
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl<B: ?Sized, K: Ord> Default for Factory<B, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized, K: fmt::Debug> fmt::Debug for Factory<B, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.creators.keys()).finish()
    }
}

// ── Object factories ─────────────────────────────────────────────────────────

/// Creates objects from class keywords.
///
/// An unknown keyword yields `None`; deciding whether that is an error is
/// the caller's job.
pub trait ObjectFactory {
    fn create(&self, class_keyword: &str) -> Option<Box<dyn ObjectHandle>>;

    /// Every registered class keyword, sorted.
    fn classes(&self) -> Vec<String>;

    /// Documentation of a registered class, `None` if unknown.
    fn class_documentation(&self, class_keyword: &str) -> Option<String> {
        self.create(class_keyword)
            .map(|object| object.class_documentation().to_string())
    }

    fn name(&self) -> &str {
        "ObjectFactory"
    }
}

/// [`ObjectFactory`] backed by a [`Factory`] of default-constructed classes.
#[derive(Debug, Default)]
pub struct DefaultObjectFactory {
    factory: Factory<dyn ObjectHandle, String>,
}

impl DefaultObjectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its class keyword.
    ///
    /// Fails to compile when `T::KEYWORD` is not a valid keyword.
    pub fn register<T>(&mut self) -> Result<(), DomainError>
    where
        T: ObjectClass + ObjectHandle + Default,
    {
        const { assert!(is_valid_keyword(T::KEYWORD), "class keyword is not a valid keyword") };
        validate_keyword(T::KEYWORD)?;
        self.factory
            .register_creator(T::KEYWORD.to_string(), || Box::new(T::default()) as Box<dyn ObjectHandle>)?;
        debug!(class = T::KEYWORD, "class registered");
        Ok(())
    }

    pub fn is_registered(&self, class_keyword: &str) -> bool {
        self.factory.contains(class_keyword)
    }
}

impl ObjectFactory for DefaultObjectFactory {
    fn create(&self, class_keyword: &str) -> Option<Box<dyn ObjectHandle>> {
        self.factory.create(class_keyword)
    }

    fn classes(&self) -> Vec<String> {
        self.factory.keys().cloned().collect()
    }

    fn name(&self) -> &str {
        "DefaultObjectFactory"
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::domain::object::{ObjectBase, ObjectRoot};

    // ------------------------------------------------------------------
    // Generic factory
    // ------------------------------------------------------------------

    trait Shape {
        fn sides(&self) -> u32;
        fn as_any(&self) -> &dyn Any;
    }

    #[derive(Debug)]
    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn create_returns_registered_type() {
        let mut factory: Factory<dyn Shape> = Factory::new();
        factory
            .register_creator("X".to_string(), || Box::new(Square) as Box<dyn Shape>)
            .unwrap();

        let shape = factory.create("X").unwrap();
        assert_eq!(shape.sides(), 4);
        assert!(shape.as_any().downcast_ref::<Square>().is_some());
    }

    #[test]
    fn unknown_key_yields_none() {
        let factory: Factory<dyn Shape> = Factory::new();
        assert!(factory.create("unregistered-key").is_none());
    }

    #[test]
    fn duplicate_key_is_refused() {
        let mut factory: Factory<dyn Shape, u8> = Factory::new();
        factory.register_creator(1, || Box::new(Square) as Box<dyn Shape>).unwrap();
        let err = factory
            .register_creator(1, || Box::new(Square) as Box<dyn Shape>)
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateFactoryKey { key: "1".into() });
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn keys_are_sorted() {
        let mut factory: Factory<dyn Shape> = Factory::new();
        for key in ["b", "a", "c"] {
            factory
                .register_creator(key.to_string(), || Box::new(Square) as Box<dyn Shape>)
                .unwrap();
        }
        let keys: Vec<_> = factory.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    // ------------------------------------------------------------------
    // Object factory
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct Marker {
        base: ObjectBase,
    }

    impl ObjectClass for Marker {
        const KEYWORD: &'static str = "Marker";
        type Parent = ObjectRoot;
    }

    impl ObjectHandle for Marker {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }
    }

    #[test]
    fn object_factory_creates_by_class_keyword() {
        let mut factory = DefaultObjectFactory::new();
        factory.register::<Marker>().unwrap();

        let object = factory.create("Marker").unwrap();
        assert_eq!(object.class_keyword(), "Marker");
        assert!(object.downcast_ref::<Marker>().is_some());
        assert!(factory.create("Unknown").is_none());
        assert_eq!(factory.classes(), vec!["Marker"]);
    }

    #[test]
    fn object_factory_refuses_second_registration() {
        let mut factory = DefaultObjectFactory::new();
        factory.register::<Marker>().unwrap();
        assert!(matches!(
            factory.register::<Marker>(),
            Err(DomainError::DuplicateFactoryKey { .. })
        ));
    }

    #[test]
    fn each_created_object_is_fresh() {
        let mut factory = DefaultObjectFactory::new();
        factory.register::<Marker>().unwrap();
        let a = factory.create("Marker").unwrap();
        let b = factory.create("Marker").unwrap();
        assert_ne!(a.uuid(), b.uuid());
    }
}
