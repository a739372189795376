//! Check command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use hilite_ast::{LineIndex, Span};
use hilite_core::{
    CollectingSink, HighlightInfo, Highlighter, HostState, PassRequest, ProgressIndicator,
    RunnerConfig, RunnerError, SourceFile, ToolId,
};
use hilite_parser::{BracketParser, ParseError, Parser};

use crate::cli::{Cli, OutputFormat};
use crate::output::output_results;
use crate::visitors;

/// Flags of the `check` subcommand.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub format: OutputFormat,
    pub dumb: bool,
    pub force_parents: bool,
    pub range: Option<Span>,
    pub threads: Option<usize>,
}

/// Errors that prevent a single file from being checked.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Diagnostics of one checked file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<HighlightInfo>,
    pub lines: LineIndex,
    /// False when a visitor reported an incomplete pass.
    pub complete: bool,
    pub visitors: Vec<ToolId>,
    pub elapsed: Duration,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(HighlightInfo::is_error)
    }
}

pub fn run_check(cli: &Cli, files: &[PathBuf], options: CheckOptions) -> Result<bool> {
    let mut config = if let Some(ref path) = cli.config {
        RunnerConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };

    if options.force_parents {
        config.force_highlight_parents = true;
    }
    if let Some(threads) = options.threads {
        config.threads = threads;
    }

    let highlighter = Highlighter::new(config, visitors::builtin()).into_diagnostic()?;
    let host = HostState {
        dumb_mode: options.dumb,
    };
    let parser = BracketParser::new();

    let results: Vec<(&PathBuf, Result<Option<FileReport>, CheckError>)> = files
        .par_iter()
        .map(|path| {
            let result = check_file(&highlighter, &parser, path, &host, options.range);
            (path, result)
        })
        .collect();

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => {}
            Err(e) => failures.push((path, e)),
        }
    }

    if !failures.is_empty() {
        eprintln!("\n{} file(s) failed to check:", failures.len());
        for (path, error) in &failures {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    let has_errors = output_results(&reports, options.format)?;

    Ok(has_errors || !failures.is_empty())
}

/// Parses and highlights one file. Returns `Ok(None)` for files no parser
/// handles.
fn check_file(
    highlighter: &Highlighter,
    parser: &BracketParser,
    path: &Path,
    host: &HostState,
    range: Option<Span>,
) -> Result<Option<FileReport>, CheckError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !parser.can_parse(extension) {
        warn!("Skipping {}: no parser for this file type", path.display());
        return Ok(None);
    }

    let source = fs::read_to_string(path)?;
    let tree = parser.parse(&source)?;
    let file = SourceFile::new(&tree, &source)
        .with_path(path)
        .with_language(parser.name());
    let pass = match range {
        Some(range) => PassRequest::new(range, range),
        None => PassRequest::whole_file(&tree),
    };

    let sink = CollectingSink::new();
    let outcome =
        highlighter.highlight(file, host, &pass, &ProgressIndicator::new(), &sink)?;
    if !outcome.success {
        info!("{}: some visitors did not complete their pass", path.display());
    }
    debug!(
        "Checked {} ({} elements) in {:?}",
        path.display(),
        outcome.elements,
        outcome.elapsed
    );

    Ok(Some(FileReport {
        path: path.to_path_buf(),
        diagnostics: sink.infos(),
        lines: LineIndex::new(&source),
        complete: outcome.success,
        visitors: outcome.visitors,
        elapsed: outcome.elapsed,
    }))
}

pub fn find_config() -> Result<RunnerConfig> {
    if let Some(path) = RunnerConfig::discover(".") {
        info!("Using config: {}", path.display());
        return RunnerConfig::from_file(&path).into_diagnostic();
    }

    debug!("No config file found, using defaults");
    Ok(RunnerConfig::new())
}
