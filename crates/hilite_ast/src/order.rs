//! Element ordering for highlighting passes.
//!
//! A pass walks elements bottom-up (children before their parents) so that
//! an error found in a child is known before the parent is reached. The
//! elements are split in two blocks: those intersecting the priority
//! (visible) range come first, everything else after.

use crate::{Element, ElementId, Span, SyntaxTree};

/// Ranges of an element sequence, one packed `u64` per element.
///
/// Each entry stores `start << 32 | end`, so the table is a single flat
/// allocation parallel to the element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    ranges: Vec<u64>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs a span into its table representation.
    #[inline]
    pub const fn encode(span: Span) -> u64 {
        ((span.start as u64) << 32) | span.end as u64
    }

    /// Unpacks a table entry.
    #[inline]
    pub const fn decode(packed: u64) -> Span {
        Span::new((packed >> 32) as u32, packed as u32)
    }

    #[inline]
    pub fn push(&mut self, span: Span) {
        self.ranges.push(Self::encode(span));
    }

    /// Returns the span stored at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Span> {
        self.ranges.get(index).map(|&packed| Self::decode(packed))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Span> + '_ {
        self.ranges.iter().map(|&packed| Self::decode(packed))
    }
}

/// Elements in visiting order together with their ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSequence {
    pub elements: Vec<ElementId>,
    pub ranges: RangeTable,
}

impl ElementSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element and its current span.
    pub fn push(&mut self, element: Element<'_>) {
        self.elements.push(element.id());
        self.ranges.push(element.span());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The two element blocks of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Divided {
    /// Elements intersecting the priority range.
    pub visible: ElementSequence,
    /// All remaining elements.
    pub invisible: ElementSequence,
}

impl Divided {
    /// Total number of elements across both blocks.
    pub fn len(&self) -> usize {
        self.visible.len() + self.invisible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.invisible.is_empty()
    }
}

/// Returns every element of the tree in post-order (children first, root
/// last).
pub fn post_order(tree: &SyntaxTree) -> Vec<ElementId> {
    let mut out = Vec::with_capacity(tree.len());
    // (element, children already pushed)
    let mut stack = vec![(tree.root(), false)];
    while let Some((element, expanded)) = stack.pop() {
        if expanded || !element.has_children() {
            out.push(element.id());
            continue;
        }
        stack.push((element, true));
        for child in element.children().rev() {
            stack.push((child, false));
        }
    }
    out
}

/// Splits the tree into visible and invisible blocks around `priority`.
///
/// Both blocks keep post-order. An element belongs to the visible block when
/// its span intersects (or touches) the priority range, so every ancestor of
/// a visible element is visible too.
pub fn divide(tree: &SyntaxTree, priority: Span) -> Divided {
    let mut divided = Divided::default();
    for id in post_order(tree) {
        let element = tree.get(id);
        if element.span().intersects(&priority) {
            divided.visible.push(element);
        } else {
            divided.invisible.push(element);
        }
    }
    divided
}
