//! Output formatting module

mod json;
mod text;

use miette::Result;

use crate::cli::OutputFormat;
use crate::commands::check::FileReport;

pub fn output_results(reports: &[FileReport], format: OutputFormat) -> Result<bool> {
    let has_errors = reports.iter().any(FileReport::has_errors);

    match format {
        OutputFormat::Json => json::output_json(reports)?,
        OutputFormat::Text => text::output_text(reports),
    }

    Ok(has_errors)
}
