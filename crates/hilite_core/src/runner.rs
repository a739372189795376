//! Concurrent visitor execution.
//!
//! [`run_visitors`] runs every visitor over the same element sequence, one
//! worker per visitor, on a bounded rayon pool. Each worker owns its
//! visitor, its skip-set and its [`InfoHolder`]; the sink is the only thing
//! workers share.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use hilite_ast::{ElementId, ElementSequence, Span};

use crate::{
    HighlightInfo, HighlightVisitor, InfoHolder, ProgressIndicator, ResultSink, RunnerError,
    SinkTarget, SourceFile, ToolId, VisitError,
};

/// Inputs of one [`run_visitors`] call.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    pub file: SourceFile<'a>,
    /// Only diagnostics inside this range are reported.
    pub restrict_range: Span,
    /// Walked first.
    pub visible: &'a ElementSequence,
    /// Walked after `visible`.
    pub invisible: &'a ElementSequence,
    /// Keep visiting parents of elements that produced errors.
    pub force_highlight_parents: bool,
    /// Number of elements between progress updates.
    pub chunk_size: usize,
    /// Full pass (true) or incremental pass (false).
    pub update_all: bool,
}

struct VisitorState<'v> {
    visitor: &'v mut dyn HighlightVisitor,
    skip_parents: HashSet<ElementId>,
    holder: InfoHolder,
}

/// Runs `visitors` concurrently over the request's elements.
///
/// Returns `Ok(true)` when every visitor completed its pass (`after_pass`
/// returned `true`), `Ok(false)` when at least one reported an incomplete
/// pass or failed in a hook. Cancellation, disposal and missing indices
/// abort every worker and are returned as errors.
pub fn run_visitors(
    request: &RunRequest<'_>,
    visitors: &mut [Box<dyn HighlightVisitor>],
    pool: &rayon::ThreadPool,
    progress: &ProgressIndicator,
    sink: &dyn ResultSink,
) -> Result<bool, RunnerError> {
    if visitors.is_empty() {
        return Ok(true);
    }

    let mut states: Vec<VisitorState<'_>> = visitors
        .iter_mut()
        .map(|visitor| VisitorState {
            visitor: visitor.as_mut(),
            skip_parents: HashSet::new(),
            holder: InfoHolder::new(),
        })
        .collect();

    // Tripped by the first worker that hits a propagating error, so that
    // siblings stop at their next element.
    let abort = progress.token().child_token();

    let outcomes: Vec<Result<bool, VisitError>> = pool.install(|| {
        states
            .par_iter_mut()
            .map(|state| {
                let outcome = run_worker(state, request, progress, &abort, sink);
                if let Err(e) = &outcome {
                    debug!(tool = %state.visitor.id(), "Visitor aborted the pass: {}", e);
                    abort.cancel();
                }
                outcome
            })
            .collect()
    });

    let mut success = true;
    let mut propagated: Option<VisitError> = None;
    for outcome in outcomes {
        match outcome {
            Ok(completed) => success &= completed,
            Err(VisitError::Cancelled) => {
                propagated.get_or_insert(VisitError::Cancelled);
            }
            Err(e) => {
                if matches!(propagated, None | Some(VisitError::Cancelled)) {
                    propagated = Some(e);
                }
            }
        }
    }

    match propagated {
        Some(e) => Err(e.into()),
        None => Ok(success),
    }
}

fn run_worker(
    state: &mut VisitorState<'_>,
    request: &RunRequest<'_>,
    progress: &ProgressIndicator,
    abort: &CancellationToken,
    sink: &dyn ResultSink,
) -> Result<bool, VisitError> {
    let tool = state.visitor.id();
    let file = &request.file;

    let mut hook_infos = Vec::new();
    let before = call_guarded(|| {
        state
            .visitor
            .before_pass(file, request.update_all, &mut hook_infos)
    });
    if let Err(e) = before {
        let completed = recover_hook_failure(tool, file, "before_pass", e)?;
        // The walk is skipped, but the pass is still bracketed and counted.
        sink.accept(tool, SinkTarget::BeforePass, &[]);
        progress.advance(request.visible.len() + request.invisible.len());
        sink.accept(tool, SinkTarget::AfterPass, &[]);
        return Ok(completed);
    }
    report_hook_infos(tool, SinkTarget::BeforePass, hook_infos, request, sink);

    walk(state, tool, request, progress, abort, sink)?;

    let mut hook_infos = Vec::new();
    let completed = match call_guarded(|| state.visitor.after_pass(file, &mut hook_infos)) {
        Ok(completed) => completed,
        Err(e) => {
            let completed = recover_hook_failure(tool, file, "after_pass", e)?;
            sink.accept(tool, SinkTarget::AfterPass, &[]);
            return Ok(completed);
        }
    };
    report_hook_infos(tool, SinkTarget::AfterPass, hook_infos, request, sink);

    if !completed {
        debug!(tool = %tool, file = %file.display_name(), "Visitor returned false");
    }
    Ok(completed)
}

fn recover_hook_failure(
    tool: ToolId,
    file: &SourceFile<'_>,
    hook: &str,
    e: VisitError,
) -> Result<bool, VisitError> {
    if e.is_propagating() {
        return Err(e);
    }
    error!(tool = %tool, file = %file.display_name(), "Visitor {} failed: {}", hook, e);
    Ok(false)
}

/// Walks the visible then invisible elements with one visitor.
fn walk(
    state: &mut VisitorState<'_>,
    tool: ToolId,
    request: &RunRequest<'_>,
    progress: &ProgressIndicator,
    abort: &CancellationToken,
    sink: &dyn ResultSink,
) -> Result<(), VisitError> {
    let tree = request.file.tree;
    let chunk_size = request.chunk_size.max(1);
    let total = request.visible.len() + request.invisible.len();
    let mut next_limit = chunk_size;
    let mut reported = 0;
    let mut failed = false;
    let mut batch = Vec::new();

    let elements = sequence(request.visible).chain(sequence(request.invisible));
    for (i, (id, visiting_range)) in elements.enumerate() {
        if abort.is_cancelled() {
            return Err(VisitError::Cancelled);
        }

        let element = tree.get(id);
        let parent = element.parent();
        let skip_marked = !element.is_root()
            && !state.skip_parents.is_empty()
            && element.has_children()
            && state.skip_parents.contains(&id);

        match parent {
            Some(parent) if skip_marked => {
                state.skip_parents.insert(parent.id());
            }
            _ => {
                let mark = state.holder.len();
                let visitor = &mut *state.visitor;
                let holder = &mut state.holder;
                match call_guarded(|| visitor.visit(&request.file, element, holder)) {
                    Ok(()) => {}
                    Err(e) if e.is_propagating() => return Err(e),
                    Err(e) => {
                        if !failed {
                            error!(
                                tool = %tool,
                                file = %request.file.display_name(),
                                element = ?element,
                                "Visitor failed: {}",
                                e
                            );
                        }
                        failed = true;
                    }
                }

                for mut info in state.holder.drain_from(mark) {
                    if !request.restrict_range.contains_span(&info.span) {
                        continue;
                    }
                    if info.is_error()
                        && !request.force_highlight_parents
                        && let Some(parent) = parent
                    {
                        state.skip_parents.insert(parent.id());
                    }
                    info.visiting_range = Some(visiting_range);
                    info.tool_id = Some(tool);
                    batch.push(info);
                }
            }
        }

        sink.accept(tool, SinkTarget::Element(id), &batch);
        batch.clear();

        if i + 1 == next_limit {
            progress.advance(chunk_size);
            reported += chunk_size;
            next_limit += chunk_size;
        }
    }
    progress.advance(total - reported);
    Ok(())
}

fn sequence(seq: &ElementSequence) -> impl Iterator<Item = (ElementId, Span)> + '_ {
    seq.elements.iter().copied().zip(seq.ranges.iter())
}

fn report_hook_infos(
    tool: ToolId,
    target: SinkTarget,
    infos: Vec<HighlightInfo>,
    request: &RunRequest<'_>,
    sink: &dyn ResultSink,
) {
    let batch: Vec<HighlightInfo> = infos
        .into_iter()
        .filter(|info| request.restrict_range.contains_span(&info.span))
        .map(|mut info| {
            info.tool_id = Some(tool);
            info
        })
        .collect();
    sink.accept(tool, target, &batch);
}

/// Runs a visitor callback, turning a panic into `VisitError::Failed`.
fn call_guarded<T>(f: impl FnOnce() -> Result<T, VisitError>) -> Result<T, VisitError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(VisitError::Failed(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
