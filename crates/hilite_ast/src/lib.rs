//! # hilite_ast
//!
//! Syntax tree definitions for hilite.
//!
//! This crate provides the immutable tree that highlighting visitors read
//! concurrently during a pass:
//!
//! - [`SyntaxTree`] stores every element in one flat vector indexed by
//!   [`ElementId`], with parent and child links
//! - [`Element`] is a cheap `Copy` handle for navigating the tree
//! - [`divide`] orders the elements for a pass (children before parents,
//!   visible range before the rest) and records their ranges in a
//!   [`RangeTable`]
//!
//! ## Example
//!
//! ```rust
//! use hilite_ast::{NodeKind, Span, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! builder.start_node(NodeKind::File, 0);
//! builder.leaf(NodeKind::Atom, Span::new(0, 3));
//! builder.finish_node(3);
//! let tree = builder.finish();
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.root().children().count(), 1);
//! ```

mod line_index;
mod order;
mod span;
mod tree;

pub use line_index::LineIndex;
pub use order::{Divided, ElementSequence, RangeTable, divide, post_order};
pub use span::{Location, Position, Span};
pub use tree::{Element, ElementId, NodeData, NodeKind, SyntaxTree, TreeBuilder};
