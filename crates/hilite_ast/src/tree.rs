//! Syntax tree definition.
//!
//! Elements live in one flat vector and refer to each other by [`ElementId`].
//! The tree is immutable once built, so it can be shared by reference across
//! worker threads without synchronization.

use serde::{Serialize, Serializer};
use serde::ser::{SerializeSeq, SerializeStruct};

use crate::Span;

/// Index of an element inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(u32);

impl ElementId {
    /// Creates an id from a raw index.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a syntax element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The root of a file.
    File,
    /// A bracketed group.
    Group,
    /// A bare word.
    Atom,
    /// A string literal, quotes included.
    Str,
    /// A line comment, marker included.
    Comment,
    /// Text the parser could not place, such as a stray closing bracket.
    Error,
}

impl NodeKind {
    /// Returns true for kinds that may own children.
    #[inline]
    pub const fn is_parent(self) -> bool {
        matches!(self, NodeKind::File | NodeKind::Group)
    }

    /// Returns the lowercase name used in dumps and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Group => "group",
            NodeKind::Atom => "atom",
            NodeKind::Str => "str",
            NodeKind::Comment => "comment",
            NodeKind::Error => "error",
        }
    }
}

/// Kind-specific element data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeData {
    #[default]
    None,
    /// A group opened by `open`; `closed` is false when the input ended
    /// before the matching closer.
    Group { open: char, closed: bool },
}

impl NodeData {
    fn present_field_count(&self) -> usize {
        match self {
            NodeData::None => 0,
            NodeData::Group { .. } => 2,
        }
    }

    fn serialize_fields<S: SerializeStruct>(&self, state: &mut S) -> Result<(), S::Error> {
        match self {
            NodeData::None => {}
            NodeData::Group { open, closed } => {
                state.serialize_field("open", open)?;
                state.serialize_field("closed", closed)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    span: Span,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    data: NodeData,
}

/// An immutable syntax tree.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Returns the root element.
    #[inline]
    pub fn root(&self) -> Element<'_> {
        Element {
            tree: self,
            id: ElementId(0),
        }
    }

    /// Returns the element with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[inline]
    pub fn get(&self, id: ElementId) -> Element<'_> {
        assert!(id.index() < self.nodes.len(), "element {id:?} out of bounds");
        Element { tree: self, id }
    }

    /// Returns the number of elements, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so this is never true.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all elements in creation (pre-)order.
    pub fn iter(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| Element {
            tree: self,
            id: ElementId::from_index(i),
        })
    }

    #[inline]
    fn node(&self, id: ElementId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// A handle to one element of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Element<'t> {
    tree: &'t SyntaxTree,
    id: ElementId,
}

impl<'t> Element<'t> {
    /// Returns the element id.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the tree this element belongs to.
    #[inline]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.tree.node(self.id).kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.tree.node(self.id).span
    }

    #[inline]
    pub fn data(&self) -> NodeData {
        self.tree.node(self.id).data
    }

    /// Returns true for the root element.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.id.0 == 0
    }

    /// Returns the parent element, `None` for the root.
    pub fn parent(&self) -> Option<Element<'t>> {
        self.tree.node(self.id).parent.map(|id| Element {
            tree: self.tree,
            id,
        })
    }

    pub fn first_child(&self) -> Option<Element<'t>> {
        self.tree.node(self.id).children.first().map(|&id| Element {
            tree: self.tree,
            id,
        })
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.tree.node(self.id).children.is_empty()
    }

    /// Iterates the direct children in source order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Element<'t>> + ExactSizeIterator + use<'t> {
        let tree = self.tree;
        tree.node(self.id)
            .children
            .iter()
            .map(move |&id| Element { tree, id })
    }

    /// Iterates the ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'t>> + use<'t> {
        std::iter::successors(self.parent(), |e| e.parent())
    }

    /// Returns the source text covered by this element.
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span().slice(source)
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}@{}", self.kind().as_str(), self.id.0, self.span())
    }
}

impl Serialize for Element<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        let data = self.data();

        let mut len = 2; // type, range
        if kind.is_parent() {
            len += 1;
        }
        len += data.present_field_count();

        let mut state = serializer.serialize_struct("Element", len)?;
        state.serialize_field("type", &kind)?;
        let span = self.span();
        state.serialize_field("range", &[span.start, span.end])?;
        if kind.is_parent() {
            state.serialize_field("children", &Children(*self))?;
        }
        data.serialize_fields(&mut state)?;
        state.end()
    }
}

struct Children<'t>(Element<'t>);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children = self.0.children();
        let mut seq = serializer.serialize_seq(Some(children.len()))?;
        for child in children {
            seq.serialize_element(&child)?;
        }
        seq.end()
    }
}

/// Incremental builder for a [`SyntaxTree`].
///
/// The first node started becomes the root. Children are attached in the
/// order they are created.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<ElementId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a parent node starting at `start`.
    pub fn start_node(&mut self, kind: NodeKind, start: u32) {
        self.start_node_with(kind, start, NodeData::None);
    }

    /// Opens a parent node carrying kind-specific data.
    pub fn start_node_with(&mut self, kind: NodeKind, start: u32, data: NodeData) {
        let id = self.push(kind, Span::empty(start), data);
        self.stack.push(id);
    }

    /// Closes the innermost open node at `end`.
    pub fn finish_node(&mut self, end: u32) {
        if let Some(id) = self.stack.pop() {
            self.nodes[id.index()].span.end = end;
        }
    }

    /// Replaces the data of the innermost open node.
    pub fn set_data(&mut self, data: NodeData) {
        if let Some(&id) = self.stack.last() {
            self.nodes[id.index()].data = data;
        }
    }

    /// Adds a childless element under the innermost open node.
    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> ElementId {
        self.push(kind, span, NodeData::None)
    }

    /// Returns the number of nodes still open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Finishes the tree, closing any node left open at the end of its
    /// last child.
    pub fn finish(mut self) -> SyntaxTree {
        if self.nodes.is_empty() {
            self.start_node(NodeKind::File, 0);
        }
        while let Some(id) = self.stack.pop() {
            let node = &self.nodes[id.index()];
            let end = node
                .children
                .last()
                .map_or(node.span.start, |c| self.nodes[c.index()].span.end)
                .max(node.span.end);
            self.nodes[id.index()].span.end = end;
        }
        SyntaxTree { nodes: self.nodes }
    }

    fn push(&mut self, kind: NodeKind, span: Span, data: NodeData) -> ElementId {
        let id = ElementId::from_index(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(Node {
            kind,
            span,
            parent,
            children: Vec::new(),
            data,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }
}
