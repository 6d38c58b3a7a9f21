//! Builtin demo class library.
//!
//! A small set of classes that exercises every field kind: plain data
//! fields with defaults and validators, a derived class, a single child and
//! a polymorphic child array. The CLI registers these at startup.
//!
//! ```text
//! Drawing
//! ├── title    : string
//! ├── tags     : [string]
//! ├── units    : mm | cm | in
//! ├── origin   : Point          (child)
//! └── shapes   : [Shape]        (child array, accepts Circle)
//!
//! Circle : Shape
//! ├── name, color               (from Shape)
//! ├── center   : Point          (child)
//! └── radius   : double
//! ```

use caffa_core::domain::{
    AppEnum, ChildArrayField, ChildField, ClassIdentity, DefaultObjectFactory, DomainError,
    EnumItems, Field, FieldKey, FieldUiCapability, MethodHandle, MethodKind, ObjectBase,
    ObjectClass, ObjectHandle, ObjectRoot, PortableDataType, PortableValue, RangeValidator,
};

/// Keywords of every builtin class, in registration order.
pub const BUILTIN_CLASSES: &[&str] = &["Point", "Shape", "Circle", "Drawing"];

/// Register the builtin classes with `factory`.
pub fn register_builtin_classes(factory: &mut DefaultObjectFactory) -> Result<(), DomainError> {
    factory.register::<Point>()?;
    factory.register::<Shape>()?;
    factory.register::<Circle>()?;
    factory.register::<Drawing>()?;
    Ok(())
}

// ── Point ────────────────────────────────────────────────────────────────────

/// An integer position.
pub struct Point {
    base: ObjectBase,
    pub x: FieldKey<Field<i32>>,
    pub y: FieldKey<Field<i32>>,
}

impl Point {
    pub fn x(&self) -> Result<i32, DomainError> {
        self.base.field(self.x).value()
    }

    pub fn y(&self) -> Result<i32, DomainError> {
        self.base.field(self.y).value()
    }

    pub fn set_position(&mut self, x: i32, y: i32) -> Result<(), DomainError> {
        self.base.field_mut(self.x).set_value(x)?;
        self.base.field_mut(self.y).set_value(y)
    }
}

impl Default for Point {
    fn default() -> Self {
        let mut base = ObjectBase::new();
        let x = base
            .init_field("x", Field::new())
            .with_default(0)
            .with_doc("Horizontal coordinate")
            .with_scripting(true, true)
            .key();
        let y = base
            .init_field("y", Field::new())
            .with_default(0)
            .with_doc("Vertical coordinate")
            .with_scripting(true, true)
            .key();

        base.add_method(
            "translate",
            MethodHandle::new(MethodKind::ReadWrite, |object, arguments| {
                let point = downcast_point(object)?;
                let dx = i32::from_portable(&arguments[0])?;
                let dy = i32::from_portable(&arguments[1])?;
                let (x, y) = (point.x()?, point.y()?);
                point.set_position(x.saturating_add(dx), y.saturating_add(dy))?;
                Ok(PortableValue::Null)
            })
            .with_arguments(["dx", "dy"])
            .with_doc("Move the point by (dx, dy)"),
        );
        base.add_method(
            "length",
            MethodHandle::new(MethodKind::ReadOnly, |object, _| {
                let point = downcast_point(object)?;
                let (x, y) = (f64::from(point.x()?), f64::from(point.y()?));
                Ok(PortableValue::Double(x.hypot(y)))
            })
            .with_doc("Distance from the origin"),
        );

        Self { base, x, y }
    }
}

fn downcast_point(object: &mut dyn ObjectHandle) -> Result<&mut Point, DomainError> {
    let actual = object.class_keyword();
    object
        .downcast_mut::<Point>()
        .ok_or_else(|| DomainError::TypeMismatch {
            expected: Point::KEYWORD.to_string(),
            actual: actual.to_string(),
        })
}

impl ObjectClass for Point {
    const KEYWORD: &'static str = "Point";
    const DOCUMENTATION: &'static str = "A position on the integer grid";
    type Parent = ObjectRoot;
}

impl ObjectHandle for Point {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}

// ── Shape ────────────────────────────────────────────────────────────────────

pub struct Shape {
    base: ObjectBase,
    pub name: FieldKey<Field<String>>,
    pub color: FieldKey<Field<String>>,
}

impl Default for Shape {
    fn default() -> Self {
        let mut base = ObjectBase::new();
        let name = base
            .init_field("name", Field::new())
            .with_doc("Display name")
            .with_capability(FieldUiCapability::new("Name"))
            .key();
        let color = base
            .init_field("color", Field::new())
            .with_default("black".to_string())
            .with_capability(FieldUiCapability::new("Color").tooltip("Any CSS color name"))
            .key();
        Self { base, name, color }
    }
}

impl ObjectClass for Shape {
    const KEYWORD: &'static str = "Shape";
    const DOCUMENTATION: &'static str = "Something that can be drawn";
    type Parent = ObjectRoot;
}

impl ObjectHandle for Shape {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}

// ── Circle ───────────────────────────────────────────────────────────────────

pub struct Circle {
    shape: Shape,
    pub radius: FieldKey<Field<f64>>,
}

impl Default for Circle {
    fn default() -> Self {
        let mut shape = Shape::default();
        shape.base.init_field("center", ChildField::<Point>::new());
        let radius = shape
            .base
            .init_field("radius", Field::new())
            .with_default(1.0)
            .with_validator(RangeValidator::new(0.0, 1000.0))
            .with_doc("Radius in grid units")
            .key();
        Self { shape, radius }
    }
}

impl ObjectClass for Circle {
    const KEYWORD: &'static str = "Circle";
    const DOCUMENTATION: &'static str = "A shape with a center and a radius";
    type Parent = Shape;
}

impl ObjectHandle for Circle {
    fn base(&self) -> &ObjectBase {
        self.shape.base()
    }
    fn base_mut(&mut self) -> &mut ObjectBase {
        self.shape.base_mut()
    }
}

// ── Drawing ──────────────────────────────────────────────────────────────────

/// Length unit of a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Millimeter,
    Centimeter,
    Inch,
}

impl EnumItems for Units {
    const ITEMS: &'static [(Self, &'static str)] = &[
        (Units::Millimeter, "mm"),
        (Units::Centimeter, "cm"),
        (Units::Inch, "in"),
    ];
    const DEFAULT: Self = Units::Millimeter;
}

pub struct Drawing {
    base: ObjectBase,
    pub title: FieldKey<Field<String>>,
    pub tags: FieldKey<Field<Vec<String>>>,
    pub units: FieldKey<Field<AppEnum<Units>>>,
}

impl Drawing {
    pub fn units(&self) -> Result<Units, DomainError> {
        self.base.field(self.units).value().map(|units| units.value())
    }
}

impl Default for Drawing {
    fn default() -> Self {
        let mut base = ObjectBase::new();
        let title = base
            .init_field("title", Field::new())
            .with_default("Untitled".to_string())
            .key();
        let tags = base.init_field("tags", Field::new()).key();
        let units = base
            .init_field("units", Field::new())
            .with_doc("Length unit of every coordinate")
            .with_capability(FieldUiCapability::new("Units"))
            .key();
        base.init_field("origin", ChildField::<Point>::new())
            .with_doc("Where the drawing is anchored");
        base.init_field("shapes", ChildArrayField::<Shape>::new())
            .with_doc("Shapes in paint order");
        Self {
            base,
            title,
            tags,
            units,
        }
    }
}

impl ObjectClass for Drawing {
    const KEYWORD: &'static str = "Drawing";
    const DOCUMENTATION: &'static str = "A titled collection of shapes";
    type Parent = ObjectRoot;
}

impl ObjectHandle for Drawing {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }
}
