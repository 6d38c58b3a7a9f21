//! JSON object serializer using serde_json.
//!
//! Document layout:
//!
//! ```json
//! {
//!   "keyword": "Drawing",
//!   "uuid": "3f0c...",
//!   "title": "Sketch",
//!   "origin": { "keyword": "Point", "uuid": "...", "x": 0, "y": 0 },
//!   "shapes": [ { "keyword": "Circle", ... } ]
//! }
//! ```
//!
//! Only readable fields carrying a serializable `FieldIoCapability` are
//! written. Keys appear in field declaration order.

use caffa_core::{
    application::{ApplicationError, ports::ObjectSerializer},
    domain::{
        ClassIdentity, DataFieldHandle, DomainError, FieldHandle, FieldIoCapability, FieldKind,
        ObjectArena, ObjectFactory, ObjectHandle, ObjectId, PortableValue,
    },
    error::{CaffaError, CaffaResult},
};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const KEYWORD_KEY: &str = "keyword";
const UUID_KEY: &str = "uuid";

/// Entries that describe the object rather than one of its fields.
const RESERVED_KEYS: &[&str] = &[KEYWORD_KEY, UUID_KEY, "$id", "class"];

/// Serializer producing one JSON object per Caffa object.
#[derive(Debug, Clone, Copy)]
pub struct JsonObjectSerializer {
    pretty: bool,
}

impl JsonObjectSerializer {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Build the JSON value for `id` and everything it owns.
    pub fn to_value(&self, arena: &ObjectArena, id: ObjectId) -> CaffaResult<Value> {
        let object = arena.get(id).ok_or_else(|| DomainError::ObjectNotFound {
            id: id.to_string(),
        })?;

        let mut map = Map::new();
        map.insert(KEYWORD_KEY.into(), Value::from(object.class_keyword()));
        if let Some(uuid) = object.uuid() {
            map.insert(UUID_KEY.into(), Value::from(uuid.to_string()));
        }

        for field in object.fields() {
            if !is_serializable(field) || !field.is_readable() {
                continue;
            }
            let value = match field.kind() {
                FieldKind::Data => {
                    let Some(data) = field.as_data_field() else {
                        continue;
                    };
                    portable_to_json(field.keyword(), &data.portable_value()?)?
                }
                FieldKind::Child => match field.child_objects().first() {
                    Some(&child) => self.to_value(arena, child)?,
                    None => Value::Null,
                },
                FieldKind::ChildArray => Value::Array(
                    field
                        .child_objects()
                        .into_iter()
                        .map(|child| self.to_value(arena, child))
                        .collect::<CaffaResult<_>>()?,
                ),
            };
            map.insert(field.keyword().to_string(), value);
        }
        Ok(Value::Object(map))
    }

    /// Create an object from `map`, populate it and return its id.
    ///
    /// Returns `None` when the class keyword is unknown to `factory`.
    fn read_new(
        &self,
        arena: &mut ObjectArena,
        factory: &dyn ObjectFactory,
        map: &Map<String, Value>,
    ) -> CaffaResult<Option<ObjectId>> {
        let keyword = class_keyword_of(map)?;
        let Some(id) = arena.create(factory, keyword) else {
            return Ok(None);
        };
        if let Err(err) = self.populate(arena, factory, id, map) {
            arena.remove(id)?;
            return Err(err);
        }
        Ok(Some(id))
    }

    fn populate(
        &self,
        arena: &mut ObjectArena,
        factory: &dyn ObjectFactory,
        id: ObjectId,
        map: &Map<String, Value>,
    ) -> CaffaResult<()> {
        let object = arena.get_mut(id).ok_or_else(|| DomainError::ObjectNotFound {
            id: id.to_string(),
        })?;

        let keyword = class_keyword_of(map)?;
        if !object.matches_class_keyword(keyword) {
            return Err(DomainError::TypeMismatch {
                expected: keyword.to_string(),
                actual: object.class_keyword().to_string(),
            }
            .into());
        }
        if let Some(uuid) = map.get(UUID_KEY).and_then(Value::as_str) {
            let uuid = Uuid::parse_str(uuid).map_err(|e| malformed(format!("bad uuid: {e}")))?;
            object.set_uuid(uuid);
        }

        for (key, value) in map {
            if RESERVED_KEYS.contains(&key.as_str()) || value.is_null() {
                continue;
            }

            let object = arena.get(id).ok_or_else(|| DomainError::ObjectNotFound {
                id: id.to_string(),
            })?;
            let Some(field) = object.find_field(key) else {
                warn!(class = object.class_keyword(), field = %key, "unknown field, skipping");
                continue;
            };
            if !is_serializable(field) || !field.is_writable() {
                continue;
            }

            match field.kind() {
                FieldKind::Data => self.read_data(arena, id, key, value)?,
                FieldKind::Child => {
                    let child = self.read_new(arena, factory, as_object(key, value)?)?;
                    if let Some(child) = child {
                        match arena.set_child(id, key, Some(child)) {
                            Ok(Some(previous)) => arena.remove(previous.id())?,
                            Ok(None) => {}
                            Err(err) => return discard(arena, child, err),
                        }
                    } else {
                        skip_unknown(key, value);
                    }
                }
                FieldKind::ChildArray => {
                    let Value::Array(items) = value else {
                        return Err(malformed(format!("'{key}' must be an array")));
                    };
                    arena.clear(id, key)?;
                    for item in items {
                        match self.read_new(arena, factory, as_object(key, item)?)? {
                            Some(child) => {
                                if let Err(err) = arena.push_back(id, key, child) {
                                    return discard(arena, child, err);
                                }
                            }
                            None => skip_unknown(key, item),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn read_data(
        &self,
        arena: &mut ObjectArena,
        id: ObjectId,
        key: &str,
        value: &Value,
    ) -> CaffaResult<()> {
        let portable: PortableValue = serde_json::from_value(value.clone())
            .map_err(|e| malformed(format!("'{key}': {e}")))?;
        let field = arena
            .get_mut(id)
            .and_then(|object| object.find_field_mut(key))
            .and_then(|field| field.as_data_field_mut())
            .ok_or_else(|| DomainError::WrongFieldKind {
                keyword: key.to_string(),
                expected: FieldKind::Data.as_str(),
            })?;
        field.set_portable_value(&portable)?;
        Ok(())
    }
}

impl Default for JsonObjectSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSerializer for JsonObjectSerializer {
    #[instrument(skip_all, fields(root = %root))]
    fn write_object(&self, arena: &ObjectArena, root: ObjectId) -> CaffaResult<String> {
        let value = self.to_value(arena, root)?;
        let text = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(|e| {
            ApplicationError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
    }

    #[instrument(skip_all, fields(bytes = text.len()))]
    fn read_object(
        &self,
        arena: &mut ObjectArena,
        factory: &dyn ObjectFactory,
        text: &str,
    ) -> CaffaResult<ObjectId> {
        let value: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(malformed("document root must be an object"));
        };

        let keyword = class_keyword_of(&map)?;
        let root = self
            .read_new(arena, factory, &map)?
            .ok_or_else(|| ApplicationError::UnknownClass {
                keyword: keyword.to_string(),
            })?;
        debug!(%root, class = keyword, "document read");
        Ok(root)
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

fn is_serializable(field: &dyn FieldHandle) -> bool {
    field
        .capability::<FieldIoCapability>()
        .is_some_and(FieldIoCapability::is_serializable)
}

fn class_keyword_of(map: &Map<String, Value>) -> CaffaResult<&str> {
    map.get(KEYWORD_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("object without a 'keyword' entry"))
}

fn as_object<'v>(key: &str, value: &'v Value) -> CaffaResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("'{key}' must hold objects")))
}

/// JSON has no NaN or infinity. `serde_json` writes them as `null`, which
/// reads back as "keep the default", so they are refused here.
fn portable_to_json(keyword: &str, value: &PortableValue) -> CaffaResult<Value> {
    if let Some(number) = first_non_finite(value) {
        return Err(ApplicationError::Serialization {
            reason: format!("field '{keyword}' holds {number}, which JSON cannot represent"),
        }
        .into());
    }
    serde_json::to_value(value).map_err(|e| {
        ApplicationError::Serialization {
            reason: e.to_string(),
        }
        .into()
    })
}

fn first_non_finite(value: &PortableValue) -> Option<f64> {
    match value {
        PortableValue::Double(number) if !number.is_finite() => Some(*number),
        PortableValue::List(items) => items.iter().find_map(first_non_finite),
        _ => None,
    }
}

fn skip_unknown(field: &str, value: &Value) {
    let class = value.get(KEYWORD_KEY).and_then(Value::as_str).unwrap_or("?");
    warn!(field, class, "unknown class, skipping object");
}

/// Drop a freshly read child that could not be attached.
fn discard(arena: &mut ObjectArena, child: ObjectId, err: DomainError) -> CaffaResult<()> {
    arena.remove(child)?;
    Err(err.into())
}

fn malformed(reason: impl Into<String>) -> CaffaError {
    ApplicationError::MalformedDocument {
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use caffa_core::domain::{DefaultObjectFactory, Field, FieldKey, ObjectBase, ObjectClass, ObjectRoot};

    use super::*;
    use crate::builtin_classes::{Circle, Drawing, Point, register_builtin_classes};

    fn factory() -> DefaultObjectFactory {
        let mut factory = DefaultObjectFactory::new();
        register_builtin_classes(&mut factory).unwrap();
        factory
    }

    fn drawing(arena: &mut ObjectArena, factory: &DefaultObjectFactory) -> ObjectId {
        let drawing = arena.create(factory, "Drawing").unwrap();
        let origin = arena.create(factory, "Point").unwrap();
        arena.set_child(drawing, "origin", Some(origin)).unwrap();
        for radius in [1.5, 2.5] {
            let circle = arena.create(factory, "Circle").unwrap();
            let c = arena.get_as_mut::<Circle>(circle).unwrap();
            let key = c.radius;
            c.base_mut().field_mut(key).set_value(radius).unwrap();
            arena.push_back(drawing, "shapes", circle).unwrap();
        }
        drawing
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    #[test]
    fn writes_keyword_uuid_then_fields_in_order() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let point = arena.create(&factory, "Point").unwrap();
        arena.get_as_mut::<Point>(point).unwrap().set_position(3, 4).unwrap();

        let value = JsonObjectSerializer::new().to_value(&arena, point).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["keyword", "uuid", "x", "y"]);
        assert_eq!(value["keyword"], "Point");
        assert_eq!(value["x"], 3);
        assert_eq!(value["y"], 4);
    }

    #[test]
    fn nests_children_and_arrays() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let root = drawing(&mut arena, &factory);

        let value = JsonObjectSerializer::new().to_value(&arena, root).unwrap();
        assert_eq!(value["origin"]["keyword"], "Point");
        let shapes = value["shapes"].as_array().unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[1]["keyword"], "Circle");
        assert_eq!(shapes[1]["radius"], 2.5);
        assert_eq!(shapes[0]["center"], Value::Null);
    }

    #[test]
    fn compact_output_is_single_line() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let point = arena.create(&factory, "Point").unwrap();

        let text = JsonObjectSerializer::compact().write_object(&arena, point).unwrap();
        assert!(!text.contains('\n'));
        let pretty = JsonObjectSerializer::new().write_object(&arena, point).unwrap();
        assert!(pretty.contains('\n'));
    }

    struct Secretive {
        base: ObjectBase,
        hidden: FieldKey<Field<i32>>,
    }

    impl Default for Secretive {
        fn default() -> Self {
            let mut base = ObjectBase::new();
            base.init_field("shown", Field::<i32>::new());
            let hidden = base
                .init_field("hidden", Field::new())
                .with_capability(FieldIoCapability::new(false))
                .key();
            Self { base, hidden }
        }
    }

    impl ObjectClass for Secretive {
        const KEYWORD: &'static str = "Secretive";
        type Parent = ObjectRoot;
    }

    impl ObjectHandle for Secretive {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }
    }

    #[test]
    fn non_serializable_fields_are_neither_written_nor_read() {
        let mut factory = DefaultObjectFactory::new();
        factory.register::<Secretive>().unwrap();
        let mut arena = ObjectArena::new();
        let id = arena.create(&factory, "Secretive").unwrap();

        let value = JsonObjectSerializer::new().to_value(&arena, id).unwrap();
        assert!(value.get("shown").is_some());
        assert!(value.get("hidden").is_none());

        let text = r#"{"keyword": "Secretive", "shown": 1, "hidden": 9}"#;
        let read = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory, text)
            .unwrap();
        let object = arena.get_as::<Secretive>(read).unwrap();
        assert_eq!(object.base.field(object.hidden).value().unwrap(), 0);
    }

    struct Gauge {
        base: ObjectBase,
        reading: FieldKey<Field<f64>>,
        history: FieldKey<Field<Vec<f64>>>,
    }

    impl Default for Gauge {
        fn default() -> Self {
            let mut base = ObjectBase::new();
            let reading = base.init_field("reading", Field::new()).key();
            let history = base.init_field("history", Field::new()).key();
            Self {
                base,
                reading,
                history,
            }
        }
    }

    impl ObjectClass for Gauge {
        const KEYWORD: &'static str = "Gauge";
        type Parent = ObjectRoot;
    }

    impl ObjectHandle for Gauge {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }
    }

    #[test]
    fn non_finite_doubles_are_refused_on_write() {
        let mut arena = ObjectArena::new();
        let id = arena.insert(Gauge::default());
        let gauge = arena.get_as_mut::<Gauge>(id).unwrap();
        let reading = gauge.reading;
        gauge.base.field_mut(reading).set_value(f64::NAN).unwrap();

        let err = JsonObjectSerializer::new().write_object(&arena, id).unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Application(ApplicationError::Serialization { ref reason })
                if reason.contains("'reading'")
        ));

        let gauge = arena.get_as_mut::<Gauge>(id).unwrap();
        let (reading, history) = (gauge.reading, gauge.history);
        gauge.base.field_mut(reading).set_value(2.5).unwrap();
        gauge
            .base
            .field_mut(history)
            .set_value(vec![1.0, f64::INFINITY])
            .unwrap();
        assert!(JsonObjectSerializer::new().to_value(&arena, id).is_err());

        let gauge = arena.get_as_mut::<Gauge>(id).unwrap();
        gauge.base.field_mut(history).set_value(vec![1.0]).unwrap();
        let value = JsonObjectSerializer::new().to_value(&arena, id).unwrap();
        assert_eq!(value["reading"], 2.5);
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    #[test]
    fn graph_survives_a_round_trip() {
        let factory = factory();
        let serializer = JsonObjectSerializer::new();
        let mut arena = ObjectArena::new();
        let root = drawing(&mut arena, &factory);
        let text = serializer.write_object(&arena, root).unwrap();

        let mut copy = ObjectArena::new();
        let read = serializer.read_object(&mut copy, &factory, &text).unwrap();

        assert_eq!(copy.len(), arena.len());
        assert_eq!(copy.get(read).unwrap().uuid(), arena.get(root).unwrap().uuid());
        assert_eq!(copy.size(read, "shapes").unwrap(), 2);
        assert!(copy.child(read, "origin").unwrap().is_some());
        assert_eq!(serializer.write_object(&copy, read).unwrap(), text);
    }

    #[test]
    fn reserved_entries_and_nulls_are_skipped() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let text = r#"{"keyword": "Drawing", "$id": 7, "class": "Drawing",
                       "title": null, "origin": null}"#;
        let id = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory, text)
            .unwrap();

        let drawing = arena.get_as::<Drawing>(id).unwrap();
        assert_eq!(drawing.base().field(drawing.title).value().unwrap(), "Untitled");
        assert_eq!(arena.child(id, "origin").unwrap(), None);
    }

    #[test]
    fn unknown_fields_and_classes_are_skipped() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let text = r#"{
            "keyword": "Drawing",
            "colour": "red",
            "shapes": [
                {"keyword": "Hexagon"},
                {"keyword": "Circle", "radius": 4.0}
            ]
        }"#;
        let id = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory, text)
            .unwrap();

        let shapes = arena.child_objects(id, "shapes").unwrap();
        assert_eq!(shapes.len(), 1);
        let circle = arena.get_as::<Circle>(shapes[0]).unwrap();
        assert_eq!(circle.base().field(circle.radius).value().unwrap(), 4.0);
    }

    #[test]
    fn unknown_root_class_is_an_error() {
        let mut arena = ObjectArena::new();
        let err = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory(), r#"{"keyword": "Nope"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Application(ApplicationError::UnknownClass { .. })
        ));
        assert!(arena.is_empty());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let factory = factory();
        for text in [
            "not json",
            "[1, 2]",
            r#"{"x": 1}"#,
            r#"{"keyword": "Point", "uuid": "not-a-uuid"}"#,
            r#"{"keyword": "Drawing", "shapes": {"keyword": "Circle"}}"#,
        ] {
            let mut arena = ObjectArena::new();
            let err = JsonObjectSerializer::new()
                .read_object(&mut arena, &factory, text)
                .unwrap_err();
            assert!(
                matches!(err, CaffaError::Application(ApplicationError::MalformedDocument { .. })),
                "{text}: {err:?}"
            );
            assert!(arena.is_empty(), "{text}");
        }
    }

    #[test]
    fn wrong_child_class_fails_and_leaves_nothing_behind() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let text = r#"{"keyword": "Drawing", "origin": {"keyword": "Circle"}}"#;
        let err = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory, text)
            .unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Domain(DomainError::TypeMismatch { .. })
        ));
        assert!(arena.is_empty());
    }

    #[test]
    fn validators_apply_when_reading() {
        let factory = factory();
        let mut arena = ObjectArena::new();
        let text = r#"{"keyword": "Circle", "radius": -2}"#;
        let err = JsonObjectSerializer::new()
            .read_object(&mut arena, &factory, text)
            .unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Domain(DomainError::ValidationFailed { .. })
        ));
    }
}
