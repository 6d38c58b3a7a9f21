//! Class Service - registered class metadata.
//!
//! Describes classes by instantiating them through the factory and reading
//! their field and method tables, so what is reported is exactly what a
//! created object carries.

use std::rc::Rc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    application::ApplicationError,
    domain::{ClassIdentity, FieldHandle, MethodHandle, MethodKind, ObjectFactory, ObjectHandle},
    error::CaffaResult,
};

/// One line of a class listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub keyword: String,
    pub parent: String,
    pub documentation: String,
    pub field_count: usize,
}

/// Field metadata for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub keyword: String,
    pub data_type: String,
    pub kind: String,
    pub readable: bool,
    pub writable: bool,
    pub documentation: String,
    pub deprecated: bool,
    pub capabilities: Vec<String>,
    pub validators: Vec<String>,
    pub default_value: Option<String>,
}

impl From<&dyn FieldHandle> for FieldInfo {
    fn from(field: &dyn FieldHandle) -> Self {
        let data = field.as_data_field();
        Self {
            keyword: field.keyword().to_string(),
            data_type: field.data_type(),
            kind: field.kind().to_string(),
            readable: field.is_readable(),
            writable: field.is_writable(),
            documentation: field.documentation().to_string(),
            deprecated: field.is_deprecated(),
            capabilities: field
                .core()
                .capabilities()
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
            validators: data.map(|d| d.validator_descriptions()).unwrap_or_default(),
            default_value: data
                .and_then(|d| d.default_portable_value())
                .map(|v| v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInfo {
    pub keyword: String,
    pub read_only: bool,
    pub arguments: Vec<String>,
    pub documentation: String,
}

impl From<&MethodHandle> for MethodInfo {
    fn from(method: &MethodHandle) -> Self {
        Self {
            keyword: method.keyword().to_string(),
            read_only: method.kind() == MethodKind::ReadOnly,
            arguments: method.argument_names().to_vec(),
            documentation: method.documentation().to_string(),
        }
    }
}

/// Full description of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub keyword: String,
    /// From the class itself up to `ObjectHandle`.
    pub inheritance_stack: Vec<String>,
    pub documentation: String,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn parent(&self) -> Option<&str> {
        self.inheritance_stack.get(1).map(String::as_str)
    }
}

/// Service for class metadata queries.
pub struct ClassService {
    factory: Rc<dyn ObjectFactory>,
}

impl ClassService {
    pub fn new(factory: Rc<dyn ObjectFactory>) -> Self {
        Self { factory }
    }

    /// Every registered class, sorted by keyword.
    pub fn list_classes(&self) -> Vec<ClassSummary> {
        self.factory
            .classes()
            .into_iter()
            .filter_map(|keyword| self.factory.create(&keyword))
            .map(|object| ClassSummary {
                keyword: object.class_keyword().to_string(),
                parent: object.parent_class_keyword().to_string(),
                documentation: object.class_documentation().to_string(),
                field_count: object.base().field_count(),
            })
            .collect()
    }

    #[instrument(skip(self))]
    pub fn describe_class(&self, class_keyword: &str) -> CaffaResult<ClassInfo> {
        let object = self.instantiate(class_keyword)?;
        Ok(ClassInfo {
            keyword: object.class_keyword().to_string(),
            inheritance_stack: object
                .class_inheritance_stack()
                .into_iter()
                .map(String::from)
                .collect(),
            documentation: object.class_documentation().to_string(),
            fields: object.fields().into_iter().map(FieldInfo::from).collect(),
            methods: object.methods().into_iter().map(MethodInfo::from).collect(),
        })
    }

    pub fn exists(&self, class_keyword: &str) -> bool {
        self.factory.classes().iter().any(|k| k == class_keyword)
    }

    fn instantiate(&self, class_keyword: &str) -> CaffaResult<Box<dyn ObjectHandle>> {
        self.factory.create(class_keyword).ok_or_else(|| {
            ApplicationError::UnknownClass {
                keyword: class_keyword.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChildField, DefaultObjectFactory, Field, FieldUiCapability, ObjectBase, ObjectClass,
        ObjectRoot, PortableValue, RangeValidator,
    };
    use crate::error::CaffaError;

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    struct Base {
        base: ObjectBase,
    }

    impl Default for Base {
        fn default() -> Self {
            let mut base = ObjectBase::new();
            base.init_field("label", Field::<String>::new())
                .with_doc("Display label")
                .with_capability(FieldUiCapability::new("Label"));
            Self { base }
        }
    }

    impl ObjectClass for Base {
        const KEYWORD: &'static str = "Base";
        const DOCUMENTATION: &'static str = "Common ancestor";
        type Parent = ObjectRoot;
    }

    impl ObjectHandle for Base {
        fn base(&self) -> &ObjectBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            &mut self.base
        }
    }

    struct Gauge {
        inner: Base,
    }

    impl Default for Gauge {
        fn default() -> Self {
            let mut inner = Base::default();
            inner
                .base
                .init_field("level", Field::<f64>::new())
                .with_default(0.5)
                .with_validator(RangeValidator::new(0.0, 1.0))
                .mark_deprecated();
            inner.base.init_field("next", ChildField::<Gauge>::new());
            inner.base.add_method(
                "reset",
                MethodHandle::new(MethodKind::ReadWrite, |_, _| Ok(PortableValue::Null))
                    .with_doc("Back to defaults"),
            );
            Self { inner }
        }
    }

    impl ObjectClass for Gauge {
        const KEYWORD: &'static str = "Gauge";
        type Parent = Base;
    }

    impl ObjectHandle for Gauge {
        fn base(&self) -> &ObjectBase {
            self.inner.base()
        }
        fn base_mut(&mut self) -> &mut ObjectBase {
            self.inner.base_mut()
        }
    }

    fn service() -> ClassService {
        let mut factory = DefaultObjectFactory::new();
        factory.register::<Gauge>().unwrap();
        factory.register::<Base>().unwrap();
        ClassService::new(Rc::new(factory))
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    #[test]
    fn list_is_sorted_with_parents() {
        let classes = service().list_classes();
        let keywords: Vec<_> = classes.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["Base", "Gauge"]);
        assert_eq!(classes[0].parent, "ObjectHandle");
        assert_eq!(classes[0].documentation, "Common ancestor");
        assert_eq!(classes[1].parent, "Base");
        assert_eq!(classes[1].field_count, 3);
    }

    // ------------------------------------------------------------------
    // Description
    // ------------------------------------------------------------------

    #[test]
    fn describe_reports_fields_in_declaration_order() {
        let info = service().describe_class("Gauge").unwrap();
        assert_eq!(info.inheritance_stack, vec!["Gauge", "Base", "ObjectHandle"]);
        assert_eq!(info.parent(), Some("Base"));

        let keywords: Vec<_> = info.fields.iter().map(|f| f.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["label", "level", "next"]);

        let label = &info.fields[0];
        assert_eq!(label.documentation, "Display label");
        assert!(label.capabilities.contains(&"ui".to_string()));
        assert!(label.capabilities.contains(&"io".to_string()));

        let level = &info.fields[1];
        assert_eq!(level.data_type, "double");
        assert!(level.deprecated);
        assert_eq!(level.default_value.as_deref(), Some("0.5"));
        assert_eq!(level.validators, vec!["range [0, 1]"]);

        let next = &info.fields[2];
        assert_eq!(next.kind, "child");
        assert_eq!(next.data_type, "Gauge");
        assert!(next.validators.is_empty());
    }

    #[test]
    fn describe_reports_methods() {
        let info = service().describe_class("Gauge").unwrap();
        assert_eq!(info.methods.len(), 1);
        assert_eq!(info.methods[0].keyword, "reset");
        assert!(!info.methods[0].read_only);
        assert_eq!(info.methods[0].documentation, "Back to defaults");
    }

    #[test]
    fn describe_unknown_class_fails() {
        let err = service().describe_class("Missing").unwrap_err();
        assert!(matches!(
            err,
            CaffaError::Application(ApplicationError::UnknownClass { .. })
        ));
        assert!(!service().exists("Missing"));
        assert!(service().exists("Gauge"));
    }
}
