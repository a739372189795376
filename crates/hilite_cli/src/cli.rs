//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hilite_ast::Span;

/// hilite - Parallel multi-visitor highlighter
#[derive(Parser)]
#[command(name = "hilite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Highlight files and report diagnostics
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Simulate unavailable indices (only dumb-aware visitors run)
        #[arg(long)]
        dumb: bool,

        /// Keep visiting parents of elements with errors
        #[arg(long)]
        force_parents: bool,

        /// Only report diagnostics inside this byte range (START..END)
        #[arg(long, value_parser = parse_range)]
        range: Option<Span>,

        /// Number of worker threads (0 = all CPUs)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print the syntax tree of a file
    Tree {
        /// File to parse
        file: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parses `START..END` into a span.
pub fn parse_range(s: &str) -> Result<Span, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", s))?;
    let start: u32 = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid range start '{}': {}", start, e))?;
    let end: u32 = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid range end '{}': {}", end, e))?;
    if start > end {
        return Err(format!("range start {} is after end {}", start, end));
    }
    Ok(Span::new(start, end))
}
