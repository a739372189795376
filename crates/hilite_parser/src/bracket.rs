//! Bracket-language parser.
//!
//! The language is a minimal s-expression dialect:
//!
//! - `(` ... `)` and `[` ... `]` open and close groups
//! - `;` starts a comment running to the end of the line
//! - `"` ... `"` is a string, `\` escapes the next character
//! - anything else up to whitespace or a delimiter is an atom
//!
//! The parser is error tolerant. A closing bracket that does not match the
//! innermost open group becomes an `Error` leaf, an unterminated string
//! becomes an `Error` leaf, and groups still open at the end of input are
//! kept with `closed: false`.

use hilite_ast::{NodeData, NodeKind, Span, SyntaxTree, TreeBuilder};

use crate::{ParseError, Parser};

/// Parser for the bracket language.
#[derive(Debug, Default, Clone, Copy)]
pub struct BracketParser;

impl BracketParser {
    pub fn new() -> Self {
        Self
    }
}

fn closer_for(open: char) -> char {
    if open == '[' { ']' } else { ')' }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ';' | '"')
}

impl Parser for BracketParser {
    fn name(&self) -> &str {
        "bracket"
    }

    fn extensions(&self) -> &[&str] {
        &["sx", "lisp", "scm"]
    }

    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        if u32::try_from(source.len()).is_err() {
            return Err(ParseError::invalid_source(format!(
                "source of {} bytes exceeds the 4 GiB limit",
                source.len()
            )));
        }
        if let Some(offset) = source.find('\0') {
            return Err(ParseError::invalid_source_at("NUL byte in source", offset));
        }

        let len = source.len() as u32;
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::File, 0);
        let mut open_groups: Vec<char> = Vec::new();

        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let start = i as u32;
            match c {
                c if c.is_whitespace() => {}
                '(' | '[' => {
                    builder.start_node_with(
                        NodeKind::Group,
                        start,
                        NodeData::Group {
                            open: c,
                            closed: false,
                        },
                    );
                    open_groups.push(c);
                }
                ')' | ']' => match open_groups.last() {
                    Some(&open) if closer_for(open) == c => {
                        builder.set_data(NodeData::Group { open, closed: true });
                        builder.finish_node(start + 1);
                        open_groups.pop();
                    }
                    _ => {
                        builder.leaf(NodeKind::Error, Span::new(start, start + 1));
                    }
                },
                ';' => {
                    let mut end = len;
                    while let Some(&(j, next)) = chars.peek() {
                        if next == '\n' {
                            end = j as u32;
                            break;
                        }
                        chars.next();
                    }
                    builder.leaf(NodeKind::Comment, Span::new(start, end));
                }
                '"' => {
                    let mut end = None;
                    while let Some((j, next)) = chars.next() {
                        match next {
                            '\\' => {
                                chars.next();
                            }
                            '"' => {
                                end = Some(j as u32 + 1);
                                break;
                            }
                            _ => {}
                        }
                    }
                    match end {
                        Some(end) => builder.leaf(NodeKind::Str, Span::new(start, end)),
                        None => builder.leaf(NodeKind::Error, Span::new(start, len)),
                    };
                }
                _ => {
                    let mut end = start + c.len_utf8() as u32;
                    while let Some(&(j, next)) = chars.peek() {
                        if is_delimiter(next) {
                            break;
                        }
                        end = (j + next.len_utf8()) as u32;
                        chars.next();
                    }
                    builder.leaf(NodeKind::Atom, Span::new(start, end));
                }
            }
        }

        for _ in open_groups.drain(..) {
            builder.finish_node(len);
        }
        builder.finish_node(len);
        Ok(builder.finish())
    }
}
