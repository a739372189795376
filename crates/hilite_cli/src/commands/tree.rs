//! Tree command implementation

use std::fmt::Write as _;
use std::path::Path;

use miette::{IntoDiagnostic, Result};

use hilite_ast::{Element, NodeData};
use hilite_parser::{BracketParser, Parser};

pub fn run_tree(path: &Path, json: bool) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let tree = BracketParser::new().parse(&source).into_diagnostic()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tree.root()).into_diagnostic()?
        );
    } else {
        print!("{}", render(tree.root(), &source));
    }
    Ok(())
}

/// Renders an element and its descendants, one per line.
pub fn render(root: Element<'_>, source: &str) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((element, depth)) = stack.pop() {
        let _ = write!(
            out,
            "{:indent$}{} {}",
            "",
            element.kind().as_str(),
            element.span(),
            indent = depth * 2
        );
        match element.data() {
            NodeData::Group { open, closed } => {
                let _ = write!(out, " {}", open);
                if !closed {
                    out.push_str(" (unclosed)");
                }
            }
            NodeData::None if !element.kind().is_parent() => {
                let _ = write!(out, " {:?}", element.text(source));
            }
            NodeData::None => {}
        }
        out.push('\n');

        for child in element.children().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render() {
        let source = "(a \"s\") ; hi\n[b";
        let tree = BracketParser::new().parse(source).unwrap();
        let expected = "\
file 0..15
  group 0..7 (
    atom 1..2 \"a\"
    str 3..6 \"\\\"s\\\"\"
  comment 8..12 \"; hi\"
  group 13..15 [ (unclosed)
    atom 14..15 \"b\"
";
        assert_eq!(render(tree.root(), source), expected);
    }
}
