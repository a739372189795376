//! Rainbow identifier coloring.

use hilite_ast::{Element, NodeKind};
use hilite_core::{
    HighlightInfo, HighlightVisitor, InfoHolder, SourceFile, ToolId, VisitError,
};

/// Number of distinct colors handed out.
const PALETTE_SIZE: u32 = 6;

/// Gives every identifier a stable color derived from its name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RainbowVisitor;

/// FNV-1a, so colors stay the same across runs and platforms.
fn color_of(name: &str) -> u32 {
    let hash = name.bytes().fold(0x811c_9dc5_u32, |hash, b| {
        (hash ^ u32::from(b)).wrapping_mul(0x0100_0193)
    });
    hash % PALETTE_SIZE
}

impl HighlightVisitor for RainbowVisitor {
    fn id(&self) -> ToolId {
        ToolId::new("rainbow")
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        super::is_bracket_source(file)
    }

    fn is_dumb_aware(&self) -> bool {
        true
    }

    fn is_rainbow(&self) -> bool {
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
        if element.kind() != NodeKind::Atom {
            return Ok(());
        }
        let name = element.text(file.source);
        if super::is_number(name) {
            return Ok(());
        }
        holder.add(HighlightInfo::info(
            element.span(),
            format!("color {}", color_of(name)),
        ));
        Ok(())
    }
}
