//! Text output formatter

use hilite_core::Severity;

use crate::commands::check::FileReport;

pub fn output_text(reports: &[FileReport]) {
    for report in reports {
        if report.diagnostics.is_empty() {
            continue;
        }

        println!("\n{}:", report.path.display());
        for diag in &report.diagnostics {
            let position = report.lines.position(diag.span.start);
            let severity = match diag.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::WeakWarning => "weak warning",
                Severity::Info => "info",
            };
            let tool = diag.tool_id.map_or("?", |t| t.as_str());
            println!(
                "  {}:{} {} [{}]: {}",
                position.line,
                position.column + 1,
                severity,
                tool,
                diag.message
            );
        }
    }

    let total_files = reports.len();
    let total_issues: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    let incomplete = reports.iter().filter(|r| !r.complete).count();

    println!();
    if incomplete > 0 {
        println!(
            "Checked {} files ({} incomplete), found {} issues",
            total_files, incomplete, total_issues
        );
    } else {
        println!("Checked {} files, found {} issues", total_files, total_issues);
    }
}
