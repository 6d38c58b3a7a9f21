//! Implementation of the `caffa new` command.
//!
//! Creates one object of the requested class, applies `--set` assignments
//! through the generic field interface and writes the result as a JSON
//! document.

use caffa_core::{
    application::DocumentService,
    domain::{
        ClassIdentity, DataFieldHandle, FieldHandle, ObjectArena, ObjectHandle, ObjectId,
        PortableValue,
    },
};
use tracing::{debug, instrument};

use crate::{
    cli::NewArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(class = %args.class))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = super::document_service(&config)?;
    let mut arena = ObjectArena::new();
    let root = service.create(&mut arena, &args.class)?;

    for (field, raw) in &args.set {
        apply_assignment(&service, &mut arena, root, field, raw)?;
    }

    match &args.output {
        Some(path) => {
            let replacing = args.force && path.exists();
            service.save(&arena, root, path, args.force)?;
            if replacing {
                output.warning(&format!("Replaced existing document {}", path.display()))?;
            }
            output.success(&format!("Created {} at {}", args.class, path.display()))?;
        }
        None => output.data(&service.to_text(&arena, root)?)?,
    }

    Ok(())
}

/// Set one data field from its command-line text.
fn apply_assignment(
    service: &DocumentService,
    arena: &mut ObjectArena,
    object: ObjectId,
    field: &str,
    raw: &str,
) -> CliResult<()> {
    let handle = arena.get(object).ok_or_else(|| CliError::InvalidInput {
        message: format!("object {object} vanished while editing"),
        source: None,
    })?;

    let Some(target) = handle.find_field(field) else {
        return Err(CliError::UnknownField {
            class: handle.class_keyword().to_string(),
            field: field.to_string(),
            available: handle
                .fields()
                .into_iter()
                .map(|f| format!("{} ({})", f.keyword(), f.data_type()))
                .collect(),
        });
    };

    // String fields take the text verbatim, so `--set name=42` stays a name.
    let takes_text = target
        .as_data_field()
        .and_then(|data| data.portable_value().ok())
        .is_some_and(|current| matches!(current, PortableValue::String(_)));
    let value = if takes_text {
        PortableValue::String(raw.to_string())
    } else {
        parse_value(raw)
    };

    debug!(field, %value, "assigning field");
    service.set_field(arena, object, field, &value)?;
    Ok(())
}

/// Read `raw` as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> PortableValue {
    serde_json::from_str(raw).unwrap_or_else(|_| PortableValue::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caffa_adapters::builtin_classes::{Point, Shape};

    fn service() -> DocumentService {
        super::super::document_service(&AppConfig::default()).unwrap()
    }

    #[test]
    fn values_parse_as_json_first() {
        assert_eq!(parse_value("3"), PortableValue::Int(3));
        assert_eq!(parse_value("true"), PortableValue::Bool(true));
        assert_eq!(parse_value("2.5"), PortableValue::Double(2.5));
        assert_eq!(
            parse_value(r#"["a","b"]"#),
            PortableValue::List(vec![
                PortableValue::String("a".into()),
                PortableValue::String("b".into())
            ])
        );
    }

    #[test]
    fn unparseable_values_become_strings() {
        assert_eq!(parse_value("red"), PortableValue::String("red".into()));
        assert_eq!(parse_value(""), PortableValue::String(String::new()));
    }

    #[test]
    fn assignment_sets_integer_field() {
        let service = service();
        let mut arena = ObjectArena::new();
        let id = service.create(&mut arena, "Point").unwrap();
        apply_assignment(&service, &mut arena, id, "x", "12").unwrap();
        assert_eq!(arena.get_as::<Point>(id).unwrap().x().unwrap(), 12);
    }

    #[test]
    fn numeric_text_stays_a_string_for_string_fields() {
        let service = service();
        let mut arena = ObjectArena::new();
        let id = service.create(&mut arena, "Shape").unwrap();
        apply_assignment(&service, &mut arena, id, "name", "42").unwrap();
        let shape = arena.get_as::<Shape>(id).unwrap();
        assert_eq!(shape.base().field(shape.name).value().unwrap(), "42");
    }

    #[test]
    fn unknown_field_lists_alternatives() {
        let service = service();
        let mut arena = ObjectArena::new();
        let id = service.create(&mut arena, "Point").unwrap();
        let err = apply_assignment(&service, &mut arena, id, "z", "1").unwrap_err();
        match err {
            CliError::UnknownField {
                class, available, ..
            } => {
                assert_eq!(class, "Point");
                assert!(available.iter().any(|f| f.starts_with("x ")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
