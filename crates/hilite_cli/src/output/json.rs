//! JSON output formatter

use miette::{IntoDiagnostic, Result};

use crate::commands::check::FileReport;

pub fn output_json(reports: &[FileReport]) -> Result<()> {
    let output: Vec<_> = reports
        .iter()
        .map(|r| {
            let diagnostics: Vec<_> = r
                .diagnostics
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "tool": d.tool_id,
                        "severity": d.severity,
                        "message": d.message,
                        "span": d.span,
                        "location": r.lines.location(d.span),
                    })
                })
                .collect();
            serde_json::json!({
                "path": r.path.display().to_string(),
                "complete": r.complete,
                "visitors": r.visitors,
                "elapsed_ms": r.elapsed.as_secs_f64() * 1000.0,
                "diagnostics": diagnostics,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
