//! Pass orchestration.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use hilite_ast::{Span, SyntaxTree, divide};

use crate::{
    HighlightVisitor, HostState, InFlightPasses, ProgressIndicator, ResultSink, RunRequest,
    RunnerConfig, RunnerError, SourceFile, ToolId, VisitorPool, run_visitors,
};

/// Ranges of one highlighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassRequest {
    /// Only diagnostics inside this range are reported.
    pub restrict_range: Span,
    /// Elements intersecting this range are visited first.
    pub priority_range: Span,
}

impl PassRequest {
    pub fn new(restrict_range: Span, priority_range: Span) -> Self {
        Self {
            restrict_range,
            priority_range,
        }
    }

    /// Highlights the whole file with no priority region.
    pub fn whole_file(tree: &SyntaxTree) -> Self {
        let span = tree.root().span();
        Self::new(span, span)
    }
}

/// Summary of a finished pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// True when every visitor completed its pass.
    pub success: bool,
    /// Visitors that ran, in registration order.
    pub visitors: Vec<ToolId>,
    /// Number of elements each visitor walked.
    pub elements: usize,
    pub elapsed: Duration,
}

/// Runs highlighting passes over syntax trees.
///
/// Owns the visitor pool and the worker threads. A `Highlighter` can be
/// shared between threads; overlapping passes get their own visitor
/// instances.
pub struct Highlighter {
    config: RunnerConfig,
    pool: VisitorPool,
    in_flight: InFlightPasses,
    workers: rayon::ThreadPool,
}

impl Highlighter {
    /// Configures `visitors` from `config` and starts the worker pool.
    pub fn new(
        config: RunnerConfig,
        mut visitors: Vec<Box<dyn HighlightVisitor>>,
    ) -> Result<Self, RunnerError> {
        for visitor in &mut visitors {
            let id = visitor.id();
            if let Some(options) = config.visitor_options(id.as_str()) {
                visitor.configure(&options).map_err(|e| {
                    RunnerError::config(format!("Invalid options for visitor '{}': {}", id, e))
                })?;
            }
        }

        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("hilite-worker-{}", i))
            .build()?;

        info!(
            visitors = visitors.len(),
            threads = workers.current_num_threads(),
            "Highlighter ready"
        );

        Ok(Self {
            config,
            pool: VisitorPool::new(visitors),
            in_flight: InFlightPasses::new(),
            workers,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Ids of all registered visitors.
    pub fn registered(&self) -> &[ToolId] {
        self.pool.registered()
    }

    /// Counter of passes currently running on this highlighter.
    pub fn in_flight(&self) -> &InFlightPasses {
        &self.in_flight
    }

    /// Runs one pass over `file`, streaming diagnostics to `sink`.
    pub fn highlight(
        &self,
        file: SourceFile<'_>,
        host: &HostState,
        pass: &PassRequest,
        progress: &ProgressIndicator,
        sink: &dyn ResultSink,
    ) -> Result<PassOutcome, RunnerError> {
        let start = Instant::now();
        let divided = divide(file.tree, pass.priority_range);

        let ticket = self.in_flight.enter();
        let mut visitors = self.pool.acquire(&ticket, &file, host, &self.config);
        let ids = visitors.ids();
        progress.set_total(divided.len() * visitors.len());

        let request = RunRequest {
            file,
            restrict_range: pass.restrict_range,
            visible: &divided.visible,
            invisible: &divided.invisible,
            force_highlight_parents: self.config.force_highlight_parents,
            chunk_size: self.config.chunk_size,
            update_all: self.config.update_all,
        };
        let result = run_visitors(&request, &mut visitors, &self.workers, progress, sink);
        let elapsed = start.elapsed();

        debug!(
            file = %file.display_name(),
            visible = divided.visible.len(),
            invisible = divided.invisible.len(),
            visitors = ids.len(),
            concurrent = ticket.previous(),
            ?elapsed,
            ok = result.is_ok(),
            "Highlighting pass finished"
        );

        Ok(PassOutcome {
            success: result?,
            visitors: ids,
            elements: divided.len(),
            elapsed,
        })
    }
}
