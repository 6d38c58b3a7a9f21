//! Implementation of the `caffa classes` command.

use caffa_core::application::ClassSummary;

use crate::{
    cli::{ClassesArgs, ListFormat, OutputFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ClassesArgs, output: OutputManager) -> CliResult<()> {
    let classes = super::class_service()?.list_classes();
    tracing::debug!(count = classes.len(), "classes listed");

    // `--output-format json` applies to the default table view too.
    let format = match (args.format, output.format()) {
        (ListFormat::Table, OutputFormat::Json) => ListFormat::Json,
        (format, _) => format,
    };

    match format {
        ListFormat::Table => {
            output.header("Registered classes:")?;
            let rows: Vec<Vec<String>> = classes
                .iter()
                .map(|c| {
                    vec![
                        c.keyword.clone(),
                        c.parent.clone(),
                        c.field_count.to_string(),
                        c.documentation.clone(),
                    ]
                })
                .collect();
            output.table(&["CLASS", "PARENT", "FIELDS", "DESCRIPTION"], &rows)?;
        }
        ListFormat::List => {
            for class in &classes {
                output.data(&class.keyword)?;
            }
        }
        ListFormat::Json => output.json(&classes)?,
        ListFormat::Csv => {
            output.data("keyword,parent,fields,documentation")?;
            for class in &classes {
                output.data(&csv_row(class))?;
            }
        }
    }

    Ok(())
}

fn csv_row(class: &ClassSummary) -> String {
    format!(
        "{},{},{},{}",
        csv_cell(&class.keyword),
        csv_cell(&class.parent),
        class.field_count,
        csv_cell(&class.documentation)
    )
}

/// Quote a cell when it holds a separator or a quote.
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
