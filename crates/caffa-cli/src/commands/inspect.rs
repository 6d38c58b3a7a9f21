//! Implementation of the `caffa inspect` command.

use caffa_core::{
    domain::{
        ClassIdentity, DataFieldHandle, FieldHandle, FieldKind, Inspector, ObjectArena,
        ObjectHandle,
    },
    error::CaffaError,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    cli::{InspectArgs, OutputFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    file: String,
    root: &'a str,
    #[serde(flatten)]
    summary: caffa_core::application::DocumentSummary,
}

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn execute(args: InspectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = super::document_service(&config)?;
    let mut arena = ObjectArena::new();
    let root = service.load(&mut arena, &args.file)?;
    let summary = service.summarize(&arena, root)?;

    if args.json || output.format() == OutputFormat::Json {
        let root_class = arena
            .get(root)
            .map(|object| object.class_keyword())
            .unwrap_or_default();
        return output.json(&InspectReport {
            file: args.file.display().to_string(),
            root: root_class,
            summary,
        });
    }

    let mut tree = TreePrinter::default();
    arena.accept(root, &mut tree).map_err(CaffaError::from)?;
    for line in tree.lines() {
        output.data(line)?;
    }

    output.data("")?;
    output.print(&format!(
        "{} objects, {} fields",
        summary.objects, summary.fields
    ))?;
    for (class, count) in &summary.classes {
        output.print(&format!("  {class}: {count}"))?;
    }
    Ok(())
}

/// Renders a graph as indented lines: objects with their UUID, data fields
/// with their value, child fields as headings for the objects below them.
#[derive(Debug, Default)]
struct TreePrinter {
    depth: usize,
    lines: Vec<String>,
}

impl TreePrinter {
    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, text: String) {
        self.lines.push(format!("{}{text}", "  ".repeat(self.depth)));
    }
}

impl Inspector for TreePrinter {
    fn visit_object(&mut self, object: &dyn ObjectHandle) {
        let uuid = object
            .uuid()
            .map(|uuid| format!(" {uuid}"))
            .unwrap_or_default();
        self.push(format!("{}{uuid}", object.class_keyword()));
        self.depth += 1;
    }

    fn visit_field(&mut self, field: &dyn FieldHandle) {
        match field.kind() {
            FieldKind::Data => {
                let value = field
                    .as_data_field()
                    .and_then(|data| data.portable_value().ok())
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "<unreadable>".into());
                self.push(format!("{} = {value}", field.keyword()));
            }
            FieldKind::Child | FieldKind::ChildArray => {
                let count = field.child_objects().len();
                let label = match (field.kind(), count) {
                    (FieldKind::Child, 0) => " (empty)".to_string(),
                    (FieldKind::Child, _) => String::new(),
                    (_, n) => format!(" [{n}]"),
                };
                self.push(format!("{}:{label}", field.keyword()));
            }
        }
        self.depth += 1;
    }

    fn leave_field(&mut self, _field: &dyn FieldHandle) {
        self.depth -= 1;
    }

    fn leave_object(&mut self, _object: &dyn ObjectHandle) {
        self.depth -= 1;
    }
}
