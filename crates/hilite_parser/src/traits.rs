//! Parser trait definition.

use hilite_ast::SyntaxTree;

use crate::ParseError;

/// Trait for parsing source text into a [`SyntaxTree`].
pub trait Parser: Send + Sync {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles.
    ///
    /// Extensions should not include the leading dot (e.g., `["lisp", "sx"]`).
    fn extensions(&self) -> &[&str];

    /// Parses the source text into a tree.
    ///
    /// Malformed input should still produce a tree (with error elements);
    /// an `Err` means the source could not be represented at all.
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
