//! # hilite_core
//!
//! Concurrent highlighting engine for hilite.
//!
//! This crate provides:
//! - The [`HighlightVisitor`] trait implemented by diagnostic producers
//! - The [`VisitorPool`] that selects and instantiates visitors for a pass
//! - [`run_visitors`], which walks one syntax tree with every visitor in
//!   parallel and streams per-element results to a [`ResultSink`]
//! - The [`Highlighter`] orchestrator tying the pieces together
//!
//! ## Example
//!
//! ```rust,ignore
//! use hilite_core::{CollectingSink, Highlighter, HostState, PassRequest, ProgressIndicator, RunnerConfig, SourceFile};
//!
//! let highlighter = Highlighter::new(RunnerConfig::default(), visitors)?;
//! let file = SourceFile::new(&tree, source);
//! let sink = CollectingSink::new();
//! let outcome = highlighter.highlight(
//!     file,
//!     &HostState::default(),
//!     &PassRequest::whole_file(&tree),
//!     &ProgressIndicator::new(),
//!     &sink,
//! )?;
//! println!("{} diagnostics", sink.infos().len());
//! ```

mod config;
mod diagnostic;
mod error;
mod highlighter;
mod holder;
pub mod pool;
mod progress;
pub mod runner;
mod sink;
mod visitor;

pub use config::{RunnerConfig, VisitorOption};
pub use diagnostic::{HighlightInfo, Severity, ToolId};
pub use error::RunnerError;
pub use highlighter::{Highlighter, PassOutcome, PassRequest};
pub use holder::InfoHolder;
pub use pool::{InFlightPasses, PassTicket, PooledVisitors, VisitorPool};
pub use progress::ProgressIndicator;
pub use runner::{RunRequest, run_visitors};
pub use sink::{CollectingSink, ResultSink, SinkEvent, SinkTarget};
pub use visitor::{HighlightVisitor, HostState, SourceFile, VisitError};

#[cfg(test)]
pub mod test_utils;
