//! Implementation of the `caffa describe` command.

use caffa_core::application::{ClassInfo, FieldInfo};

use crate::{
    cli::{DescribeArgs, OutputFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: DescribeArgs, output: OutputManager) -> CliResult<()> {
    let info = super::class_service()?.describe_class(&args.class)?;

    if output.format() == OutputFormat::Json {
        return output.json(&info);
    }

    render(&info, &output)
}

fn render(info: &ClassInfo, output: &OutputManager) -> CliResult<()> {
    output.header(&info.keyword)?;
    output.data(&format!(
        "  {}",
        output.dim(&info.inheritance_stack.join(" \u{2192} "))
    ))?;
    if !info.documentation.is_empty() {
        output.data(&format!("  {}", info.documentation))?;
    }

    output.data("")?;
    if info.fields.is_empty() {
        output.data("  (no fields)")?;
    } else {
        let rows: Vec<Vec<String>> = info.fields.iter().map(field_row).collect();
        output.table(
            &["FIELD", "TYPE", "KIND", "ACCESS", "DEFAULT", "VALIDATORS", "DESCRIPTION"],
            &rows,
        )?;
    }

    if !info.methods.is_empty() {
        output.data("")?;
        let rows: Vec<Vec<String>> = info
            .methods
            .iter()
            .map(|m| {
                vec![
                    format!("{}({})", m.keyword, m.arguments.join(", ")),
                    if m.read_only { "read-only" } else { "read-write" }.to_string(),
                    m.documentation.clone(),
                ]
            })
            .collect();
        output.table(&["METHOD", "KIND", "DESCRIPTION"], &rows)?;
    }

    Ok(())
}

fn field_row(field: &FieldInfo) -> Vec<String> {
    let mut documentation = field.documentation.clone();
    if field.deprecated {
        documentation = format!("[deprecated] {documentation}").trim_end().to_string();
    }
    vec![
        field.keyword.clone(),
        field.data_type.clone(),
        field.kind.clone(),
        access(field).to_string(),
        field.default_value.clone().unwrap_or_else(|| "-".into()),
        if field.validators.is_empty() {
            "-".into()
        } else {
            field.validators.join("; ")
        },
        documentation,
    ]
}

fn access(field: &FieldInfo) -> &'static str {
    match (field.readable, field.writable) {
        (true, true) => "rw",
        (true, false) => "r",
        (false, true) => "w",
        (false, false) => "-",
    }
}
