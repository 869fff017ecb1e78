//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// virtxml - Load, check and rewrite libvirt XML documents
#[derive(Parser, Debug)]
#[command(name = "virtxml")]
#[command(about = "virtxml - Load, check and rewrite libvirt XML documents")]
#[command(version)]
pub struct Args {
    /// Path to configuration file (optional, defaults used if not found)
    #[arg(short, long, global = true, env = "VIRTXML_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Fail on elements the schema does not know instead of skipping them
    #[arg(long, global = true)]
    pub deny_unknown: bool,

    /// Maximum element nesting accepted while loading
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a document and report whether it is valid
    Check {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = DocumentKind::Auto)]
        kind: DocumentKind,
    },

    /// Load a document and write it back in canonical order
    Format {
        file: PathBuf,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = DocumentKind::Auto)]
        kind: DocumentKind,
    },

    /// Load a document and print it as JSON
    Show {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = DocumentKind::Auto)]
        kind: DocumentKind,
    },

    /// Print the slot layout of a schema type, or list the known types
    Schema {
        #[arg(value_name = "TYPE")]
        type_name: Option<String>,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Which schema a document is loaded with.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Pick the schema from the root element
    Auto,
    Domain,
    Snapshot,
    Filter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Auto => "auto",
            DocumentKind::Domain => "domain",
            DocumentKind::Snapshot => "snapshot",
            DocumentKind::Filter => "filter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "virtxml",
            "check",
            "vm.xml",
            "--kind",
            "domain",
            "--deny-unknown",
            "--max-depth",
            "16",
        ]);
        assert!(args.deny_unknown);
        assert_eq!(args.max_depth, Some(16));
        assert_eq!(args.log_level, "warn");
        match args.command {
            Command::Check { file, kind } => {
                assert_eq!(file, PathBuf::from("vm.xml"));
                assert_eq!(kind, DocumentKind::Domain);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_kind_defaults_to_auto() {
        let args = Args::parse_from(["virtxml", "format", "vm.xml", "-o", "out.xml"]);
        match args.command {
            Command::Format { output, kind, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.xml")));
                assert_eq!(kind, DocumentKind::Auto);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_schema_type_is_optional() {
        let args = Args::parse_from(["virtxml", "schema"]);
        assert!(matches!(args.command, Command::Schema { type_name: None, json: false }));
    }
}
