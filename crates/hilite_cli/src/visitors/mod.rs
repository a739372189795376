//! Built-in highlighting visitors

mod brackets;
mod rainbow;
mod todo;
mod unresolved;

use hilite_core::{HighlightVisitor, SourceFile};

use brackets::BracketsVisitor;
use rainbow::RainbowVisitor;
use todo::TodoVisitor;
use unresolved::UnresolvedVisitor;

/// Every built-in visitor, in reporting order.
pub fn builtin() -> Vec<Box<dyn HighlightVisitor>> {
    vec![
        Box::new(BracketsVisitor),
        Box::new(TodoVisitor::default()),
        Box::new(UnresolvedVisitor::default()),
        Box::new(RainbowVisitor),
    ]
}

fn is_bracket_source(file: &SourceFile<'_>) -> bool {
    file.language == "bracket"
}

/// Numeric literals never name anything.
fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit()) && digits.parse::<f64>().is_ok()
}
