//! End-to-end tests: builtin classes through the JSON serializer and storage.

use std::path::Path;
use std::rc::Rc;

use caffa_adapters::{
    JsonObjectSerializer, LocalDocumentStorage, MemoryDocumentStorage, register_builtin_classes,
    builtin_classes::{Drawing, Point, Units},
};
use caffa_core::{
    application::{ApplicationError, DocumentService},
    application::ports::ObjectSerializer,
    domain::{DefaultObjectFactory, ObjectArena, ObjectFactory, ObjectHandle, PortableValue},
    error::CaffaError,
};

fn factory() -> DefaultObjectFactory {
    let mut factory = DefaultObjectFactory::new();
    register_builtin_classes(&mut factory).unwrap();
    factory
}

fn service(storage: MemoryDocumentStorage) -> DocumentService {
    DocumentService::new(
        Box::new(JsonObjectSerializer::new()),
        Box::new(storage),
        Rc::new(factory()),
    )
}

#[test]
fn point_round_trip_keeps_values_and_uuid() {
    let factory = factory();
    let mut point = factory.create("Point").unwrap();
    let original_uuid = point.uuid();

    let typed = point.downcast_mut::<Point>().unwrap();
    typed.set_position(3, 4).unwrap();
    assert_eq!((typed.x().unwrap(), typed.y().unwrap()), (3, 4));

    let mut arena = ObjectArena::new();
    let id = arena.insert_boxed(point);
    let serializer = JsonObjectSerializer::new();
    let text = serializer.write_object(&arena, id).unwrap();

    let mut other = ObjectArena::new();
    let copy = serializer.read_object(&mut other, &factory, &text).unwrap();
    let copy = other.get_as::<Point>(copy).unwrap();
    assert_eq!((copy.x().unwrap(), copy.y().unwrap()), (3, 4));
    assert!(original_uuid.is_some());
    assert_eq!(copy.uuid(), original_uuid);
}

#[test]
fn service_saves_and_loads_through_memory_storage() {
    let storage = MemoryDocumentStorage::new();
    let service = service(storage.clone());
    let path = Path::new("drawings/first.json");

    let mut arena = ObjectArena::new();
    let drawing = service.create(&mut arena, "Drawing").unwrap();
    service
        .set_field(&mut arena, drawing, "title", &PortableValue::String("Sketch".into()))
        .unwrap();
    service
        .set_field(&mut arena, drawing, "units", &PortableValue::String("cm".into()))
        .unwrap();
    let circle = service.create(&mut arena, "Circle").unwrap();
    arena.push_back(drawing, "shapes", circle).unwrap();

    service.save(&arena, drawing, path, false).unwrap();
    assert_eq!(storage.paths(), vec![path.to_path_buf()]);

    let err = service.save(&arena, drawing, path, false).unwrap_err();
    assert!(matches!(
        err,
        CaffaError::Application(ApplicationError::DocumentExists { .. })
    ));

    let mut loaded = ObjectArena::new();
    let root = service.load(&mut loaded, path).unwrap();
    let copy = loaded.get_as::<Drawing>(root).unwrap();
    assert_eq!(copy.base().field(copy.title).value().unwrap(), "Sketch");
    assert_eq!(copy.units().unwrap(), Units::Centimeter);
    assert_eq!(loaded.size(root, "shapes").unwrap(), 1);

    let summary = service.summarize(&loaded, root).unwrap();
    assert_eq!(summary.objects, 2);
    assert_eq!(summary.classes.get("Circle"), Some(&1));
}

#[test]
fn deep_copy_renews_every_uuid() {
    let service = service(MemoryDocumentStorage::new());
    let mut arena = ObjectArena::new();
    let drawing = service.create(&mut arena, "Drawing").unwrap();
    let origin = service.create(&mut arena, "Point").unwrap();
    arena.set_child(drawing, "origin", Some(origin)).unwrap();

    let copy = service.deep_copy(&mut arena, drawing).unwrap();
    let copied_origin = arena.child(copy, "origin").unwrap().unwrap();

    assert_eq!(arena.len(), 4);
    assert_ne!(arena.get(copy).unwrap().uuid(), arena.get(drawing).unwrap().uuid());
    assert_ne!(
        arena.get(copied_origin).unwrap().uuid(),
        arena.get(origin).unwrap().uuid()
    );
}

#[test]
fn local_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/point.json");
    let service = DocumentService::new(
        Box::new(JsonObjectSerializer::compact()),
        Box::new(LocalDocumentStorage::new()),
        Rc::new(factory()),
    );

    let mut arena = ObjectArena::new();
    let point = service.create(&mut arena, "Point").unwrap();
    service
        .set_field(&mut arena, point, "x", &PortableValue::Int(-7))
        .unwrap();
    service.save(&arena, point, &path, false).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(r#"{"keyword":"Point""#));

    let mut loaded = ObjectArena::new();
    let root = service.load(&mut loaded, &path).unwrap();
    assert_eq!(loaded.get_as::<Point>(root).unwrap().x().unwrap(), -7);
}

#[test]
fn loading_a_missing_document_fails() {
    let service = service(MemoryDocumentStorage::new());
    let err = service
        .load(&mut ObjectArena::new(), Path::new("missing.json"))
        .unwrap_err();
    assert!(matches!(
        err,
        CaffaError::Application(ApplicationError::DocumentNotFound { .. })
    ));
}
