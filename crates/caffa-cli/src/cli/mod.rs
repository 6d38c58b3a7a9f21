//! CLI argument definitions using the clap derive API.
//!
//! Argument names, aliases, help text and value enums live here. No business
//! logic does.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "caffa",
    bin_name = "caffa",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Inspect reflected classes and object documents",
    long_about = "Caffa lists the registered object classes, describes their \
                  fields and methods, creates objects and reads JSON object documents.",
    after_help = "EXAMPLES:\n\
        \x20 caffa classes\n\
        \x20 caffa describe Circle\n\
        \x20 caffa new Point --set x=3 --set y=4 -o point.json\n\
        \x20 caffa inspect point.json\n\
        \x20 caffa completions bash > /usr/share/bash-completion/completions/caffa",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(
        visible_alias = "ls",
        about = "List registered classes",
        after_help = "EXAMPLES:\n\
            \x20 caffa classes\n\
            \x20 caffa classes --format csv"
    )]
    Classes(ClassesArgs),

    #[command(
        about = "Describe a class: inheritance, fields and methods",
        after_help = "EXAMPLES:\n\
            \x20 caffa describe Drawing\n\
            \x20 caffa --output-format json describe Circle"
    )]
    Describe(DescribeArgs),

    #[command(
        visible_alias = "n",
        about = "Create an object and write it as JSON",
        after_help = "EXAMPLES:\n\
            \x20 caffa new Point\n\
            \x20 caffa new Point --set x=3 --set y=4 -o point.json\n\
            \x20 caffa new Drawing --set 'tags=[\"draft\"]' -o drawing.json --force"
    )]
    New(NewArgs),

    #[command(
        about = "Load a document and show its object tree",
        after_help = "EXAMPLES:\n\
            \x20 caffa inspect drawing.json\n\
            \x20 caffa inspect drawing.json --json"
    )]
    Inspect(InspectArgs),

    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 caffa init\n\
            \x20 caffa --config ./caffa.toml init --force"
    )]
    Init(InitArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 caffa completions bash > ~/.local/share/bash-completion/completions/caffa\n\
            \x20 caffa completions zsh  > ~/.zfunc/_caffa\n\
            \x20 caffa completions fish > ~/.config/fish/completions/caffa.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 caffa config get io.pretty\n\
            \x20 caffa config list\n\
            \x20 caffa config path"
    )]
    Config(ConfigCommands),
}

// ── classes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClassesArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for `caffa classes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Keyword, parent and documentation in columns.
    Table,
    /// One keyword per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── describe ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DescribeArgs {
    #[arg(value_name = "CLASS", help = "Class keyword, e.g. Point")]
    pub class: String,
}

// ── new ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NewArgs {
    #[arg(value_name = "CLASS", help = "Class keyword of the new object")]
    pub class: String,

    /// `FIELD=VALUE`. The value is read as JSON when it parses, as a
    /// string otherwise.
    #[arg(
        short = 's',
        long = "set",
        value_name = "FIELD=VALUE",
        value_parser = parse_assignment,
        help = "Set a data field (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Write the document to FILE instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "force", help = "Overwrite an existing document")]
    pub force: bool,
}

/// Split `FIELD=VALUE` at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}

// ── inspect ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[arg(value_name = "FILE", help = "Document to load")]
    pub file: PathBuf,

    #[arg(long = "json", help = "Print the summary as JSON")]
    pub json: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.format`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_new_with_assignments() {
        let cli = Cli::parse_from([
            "caffa", "new", "Point", "--set", "x=3", "-s", "y=4", "-o", "p.json",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.class, "Point");
        assert_eq!(
            args.set,
            vec![("x".to_string(), "3".to_string()), ("y".to_string(), "4".to_string())]
        );
        assert_eq!(args.output, Some(PathBuf::from("p.json")));
        assert!(!args.force);
    }

    #[test]
    fn assignment_keeps_everything_after_first_equals() {
        assert_eq!(
            parse_assignment("name=a=b").unwrap(),
            ("name".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_assignment("name=").unwrap(), ("name".to_string(), String::new()));
    }

    #[test]
    fn assignment_without_field_is_rejected() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=3").is_err());
        assert!(Cli::try_parse_from(["caffa", "new", "Point", "--set", "x"]).is_err());
    }

    #[test]
    fn classes_format_defaults_to_table() {
        let cli = Cli::parse_from(["caffa", "ls"]);
        let Commands::Classes(args) = cli.command else {
            panic!("expected Classes command");
        };
        assert_eq!(args.format, ListFormat::Table);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["caffa", "describe", "Point", "-vv", "--no-color"]);
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.no_color);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["caffa", "--quiet", "--verbose", "classes"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_format_from_config() {
        assert_eq!(OutputFormat::from_config("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_config("fancy"), None);
    }
}
