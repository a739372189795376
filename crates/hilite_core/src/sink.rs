//! Result sink protocol.
//!
//! Every worker reports its diagnostics through one shared [`ResultSink`].
//! The sink is called inline on the worker thread, once per visited element
//! and once before and after each visitor's walk, so implementations must be
//! thread-safe and quick.

use std::collections::HashMap;

use parking_lot::Mutex;

use hilite_ast::ElementId;

use crate::{HighlightInfo, ToolId};

/// What a batch of diagnostics was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkTarget {
    /// Diagnostics from a visitor's `before_pass` hook. Empty when the hook
    /// failed.
    BeforePass,
    /// Diagnostics produced while visiting this element. An empty batch
    /// means the element was processed and produced nothing.
    Element(ElementId),
    /// Diagnostics from a visitor's `after_pass` hook. Not sent when the pass
    /// was aborted by cancellation, disposal or missing indices.
    AfterPass,
}

/// Consumer of per-element diagnostic batches.
pub trait ResultSink: Sync {
    fn accept(&self, tool: ToolId, target: SinkTarget, infos: &[HighlightInfo]);
}

impl<F> ResultSink for F
where
    F: Fn(ToolId, SinkTarget, &[HighlightInfo]) + Sync,
{
    fn accept(&self, tool: ToolId, target: SinkTarget, infos: &[HighlightInfo]) {
        self(tool, target, infos)
    }
}

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEvent {
    pub tool: ToolId,
    pub target: SinkTarget,
    pub infos: Vec<HighlightInfo>,
}

/// A sink that records every call.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded calls in arrival order.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Returns every reported diagnostic, sorted by position.
    pub fn infos(&self) -> Vec<HighlightInfo> {
        let mut infos: Vec<HighlightInfo> = self
            .events
            .lock()
            .iter()
            .flat_map(|event| event.infos.iter().cloned())
            .collect();
        infos.sort_by(|a, b| {
            a.span
                .cmp(&b.span)
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.tool_id.cmp(&b.tool_id))
        });
        infos
    }

    /// Returns the targets reported by `tool`, in the order that tool
    /// reported them.
    pub fn targets(&self, tool: ToolId) -> Vec<SinkTarget> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.tool == tool)
            .map(|event| event.target)
            .collect()
    }

    /// Number of sink calls per tool.
    pub fn flush_counts(&self) -> HashMap<ToolId, usize> {
        let mut counts = HashMap::new();
        for event in self.events.lock().iter() {
            *counts.entry(event.tool).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ResultSink for CollectingSink {
    fn accept(&self, tool: ToolId, target: SinkTarget, infos: &[HighlightInfo]) {
        self.events.lock().push(SinkEvent {
            tool,
            target,
            infos: infos.to_vec(),
        });
    }
}
