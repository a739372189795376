//! # hilite_parser
//!
//! Parser abstraction layer for hilite.
//!
//! This crate provides:
//! - A `Parser` trait for turning source text into a [`SyntaxTree`]
//! - A built-in bracket-language parser
//!
//! ## Example
//!
//! ```rust
//! use hilite_parser::{BracketParser, Parser};
//!
//! let tree = BracketParser::new().parse("(def x 1) ; one").unwrap();
//! assert_eq!(tree.root().children().count(), 2);
//! ```
//!
//! [`SyntaxTree`]: hilite_ast::SyntaxTree

mod bracket;
mod error;
mod traits;

pub use bracket::BracketParser;
pub use error::ParseError;
pub use traits::Parser;
