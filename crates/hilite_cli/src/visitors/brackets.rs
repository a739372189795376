//! Unbalanced bracket detection.

use hilite_ast::{Element, NodeData, NodeKind, Span};
use hilite_core::{
    HighlightInfo, HighlightVisitor, InfoHolder, SourceFile, ToolId, VisitError,
};

/// Reports unclosed groups, stray closers and unterminated strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketsVisitor;

impl HighlightVisitor for BracketsVisitor {
    fn id(&self) -> ToolId {
        ToolId::new("brackets")
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        super::is_bracket_source(file)
    }

    fn is_dumb_aware(&self) -> bool {
        true
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        Box::new(*self)
    }

    fn visit(
        &mut self,
        file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        match (element.kind(), element.data()) {
            (NodeKind::Group, NodeData::Group { open, closed: false }) => {
                let start = element.span().start;
                holder.add(HighlightInfo::error(
                    Span::new(start, start + open.len_utf8() as u32),
                    format!("unclosed '{}'", open),
                ));
            }
            (NodeKind::Error, _) => {
                let text = element.text(file.source);
                let message = if text.starts_with('"') {
                    "unterminated string".to_string()
                } else {
                    format!("unexpected '{}'", text)
                };
                holder.add(HighlightInfo::error(element.span(), message));
            }
            _ => {}
        }
        Ok(())
    }
}
