//! Visitor pooling for concurrent passes.
//!
//! The pool owns the primary visitor instances. A pass that runs alone
//! checks the primaries out and returns them when it ends; passes that
//! overlap with another one get fresh instances instead, so no two workers
//! ever share a visitor.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{HighlightVisitor, HostState, RunnerConfig, SourceFile, ToolId};

/// Counter of passes currently in flight.
///
/// Owned by the pass orchestrator. [`enter`](Self::enter) hands out a
/// [`PassTicket`] that releases its slot when dropped, on every exit path.
#[derive(Debug, Default, Clone)]
pub struct InFlightPasses {
    count: Arc<AtomicUsize>,
}

impl InFlightPasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pass.
    pub fn enter(&self) -> PassTicket {
        let previous = self.count.fetch_add(1, Ordering::AcqRel);
        PassTicket {
            count: Arc::clone(&self.count),
            previous,
        }
    }

    /// Number of passes currently registered.
    pub fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

/// RAII registration of one in-flight pass.
#[derive(Debug)]
pub struct PassTicket {
    count: Arc<AtomicUsize>,
    previous: usize,
}

impl PassTicket {
    /// Number of passes that were already in flight when this one entered.
    pub fn previous(&self) -> usize {
        self.previous
    }
}

impl Drop for PassTicket {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Thread-safe visitor pool.
pub struct VisitorPool {
    ids: Vec<ToolId>,
    primaries: Mutex<Option<Vec<Box<dyn HighlightVisitor>>>>,
    prototypes: Mutex<Vec<Box<dyn HighlightVisitor>>>,
}

impl VisitorPool {
    /// Creates a pool from the registered visitors, in registration order.
    pub fn new(visitors: Vec<Box<dyn HighlightVisitor>>) -> Self {
        let ids = visitors.iter().map(|v| v.id()).collect();
        let prototypes = visitors.iter().map(|v| v.fresh_instance()).collect();
        Self {
            ids,
            primaries: Mutex::new(Some(visitors)),
            prototypes: Mutex::new(prototypes),
        }
    }

    /// Ids of all registered visitors.
    pub fn registered(&self) -> &[ToolId] {
        &self.ids
    }

    /// Returns true while the primary instances are checked out.
    pub fn primaries_in_use(&self) -> bool {
        self.primaries.lock().is_none()
    }

    /// Acquires the visitors that apply to `file` for one pass.
    ///
    /// Visitors are filtered by dumb mode, the rainbow switch, the
    /// per-visitor config switch and finally
    /// [`suitable_for`](HighlightVisitor::suitable_for). An empty result is
    /// logged as an error; the pass can still run and will report nothing.
    pub fn acquire(
        &self,
        ticket: &PassTicket,
        file: &SourceFile<'_>,
        host: &HostState,
        config: &RunnerConfig,
    ) -> PooledVisitors<'_> {
        let checked_out = if ticket.previous() == 0 {
            self.primaries.lock().take()
        } else {
            None
        };
        let is_primary = checked_out.is_some();
        let visitors = match checked_out {
            Some(visitors) => visitors,
            None => self.clone_all(),
        };

        let mut active = Vec::with_capacity(visitors.len());
        let mut active_slots = Vec::with_capacity(visitors.len());
        let mut parked = Vec::new();
        for (slot, visitor) in visitors.into_iter().enumerate() {
            if accepts(visitor.as_ref(), file, host, config) {
                active_slots.push(slot);
                active.push(visitor);
            } else {
                parked.push((slot, visitor));
            }
        }

        if active.is_empty() {
            error!(
                file = %file.display_name(),
                dumb_mode = host.dumb_mode,
                registered = ?self.ids,
                "No highlight visitors left after filtering"
            );
        } else {
            debug!(
                file = %file.display_name(),
                primary = is_primary,
                active = active.len(),
                "Acquired highlight visitors"
            );
        }

        PooledVisitors {
            active,
            active_slots,
            parked,
            home: is_primary.then_some(&self.primaries),
        }
    }

    fn clone_all(&self) -> Vec<Box<dyn HighlightVisitor>> {
        self.prototypes
            .lock()
            .iter()
            .map(|prototype| {
                let clone = prototype.fresh_instance();
                debug_assert_eq!(
                    clone.id(),
                    prototype.id(),
                    "fresh_instance() must return the same kind of visitor"
                );
                clone
            })
            .collect()
    }
}

fn accepts(
    visitor: &dyn HighlightVisitor,
    file: &SourceFile<'_>,
    host: &HostState,
    config: &RunnerConfig,
) -> bool {
    if host.dumb_mode && !visitor.is_dumb_aware() {
        return false;
    }
    if visitor.is_rainbow() && !config.rainbow {
        return false;
    }
    config.visitor_enabled(visitor.id().as_str()) && visitor.suitable_for(file)
}

/// A RAII guard over the visitors of one pass.
///
/// Dereferences to the active visitors. Primary instances go back to the
/// pool, in registration order, when the guard is dropped.
pub struct PooledVisitors<'a> {
    active: Vec<Box<dyn HighlightVisitor>>,
    active_slots: Vec<usize>,
    parked: Vec<(usize, Box<dyn HighlightVisitor>)>,
    home: Option<&'a Mutex<Option<Vec<Box<dyn HighlightVisitor>>>>>,
}

impl PooledVisitors<'_> {
    /// Ids of the active visitors.
    pub fn ids(&self) -> Vec<ToolId> {
        self.active.iter().map(|v| v.id()).collect()
    }

    /// Returns true if these are the pool's primary instances.
    pub fn is_primary(&self) -> bool {
        self.home.is_some()
    }
}

impl std::ops::Deref for PooledVisitors<'_> {
    type Target = [Box<dyn HighlightVisitor>];

    fn deref(&self) -> &Self::Target {
        &self.active
    }
}

impl std::ops::DerefMut for PooledVisitors<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.active
    }
}

impl Drop for PooledVisitors<'_> {
    fn drop(&mut self) {
        let Some(home) = self.home.take() else {
            return;
        };
        let mut all: Vec<(usize, Box<dyn HighlightVisitor>)> = self
            .active_slots
            .drain(..)
            .zip(self.active.drain(..))
            .chain(self.parked.drain(..))
            .collect();
        all.sort_by_key(|(slot, _)| *slot);
        *home.lock() = Some(all.into_iter().map(|(_, v)| v).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedVisitor, file_for};
    use hilite_ast::TreeBuilder;
    use pretty_assertions::assert_eq;

    fn pool() -> VisitorPool {
        VisitorPool::new(vec![
            Box::new(FixedVisitor::new("plain")),
            Box::new(FixedVisitor::new("dumb").dumb_aware()),
            Box::new(FixedVisitor::new("rainbow").rainbow()),
            Box::new(FixedVisitor::new("picky").only_language("other")),
        ])
    }

    fn names(ids: Vec<ToolId>) -> Vec<&'static str> {
        ids.into_iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_ticket_counts() {
        let in_flight = InFlightPasses::new();
        let first = in_flight.enter();
        let second = in_flight.enter();
        assert_eq!(first.previous(), 0);
        assert_eq!(second.previous(), 1);
        assert_eq!(in_flight.current(), 2);

        drop(first);
        drop(second);
        assert_eq!(in_flight.current(), 0);
    }

    #[test]
    fn test_ticket_released_on_panic() {
        let in_flight = InFlightPasses::new();
        let shared = in_flight.clone();
        let result = std::panic::catch_unwind(move || {
            let _ticket = shared.enter();
            panic!("pass blew up");
        });
        assert!(result.is_err());
        assert_eq!(in_flight.current(), 0);
    }

    #[test]
    fn test_filters_by_file_and_config() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = pool();
        let in_flight = InFlightPasses::new();
        let ticket = in_flight.enter();

        let visitors = pool.acquire(&ticket, &file, &HostState::default(), &RunnerConfig::new());
        assert_eq!(names(visitors.ids()), vec!["plain", "dumb"]);

        drop(visitors);
        let mut config = RunnerConfig::new();
        config.rainbow = true;
        config
            .visitors
            .insert("plain".to_string(), crate::VisitorOption::Enabled(false));
        let visitors = pool.acquire(&ticket, &file, &HostState::default(), &config);
        assert_eq!(names(visitors.ids()), vec!["dumb", "rainbow"]);
    }

    #[test]
    fn test_dumb_mode_keeps_only_dumb_aware() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = pool();
        let ticket = InFlightPasses::new().enter();

        let host = HostState { dumb_mode: true };
        let visitors = pool.acquire(&ticket, &file, &host, &RunnerConfig::new());
        assert_eq!(names(visitors.ids()), vec!["dumb"]);
    }

    #[test]
    fn test_empty_selection_is_not_fatal() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = VisitorPool::new(vec![Box::new(FixedVisitor::new("plain"))]);
        let ticket = InFlightPasses::new().enter();

        let host = HostState { dumb_mode: true };
        let visitors = pool.acquire(&ticket, &file, &host, &RunnerConfig::new());
        assert!(visitors.is_empty());
    }

    #[test]
    fn test_lone_pass_uses_primaries_and_returns_them() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = pool();
        let in_flight = InFlightPasses::new();

        {
            let ticket = in_flight.enter();
            let visitors = pool.acquire(&ticket, &file, &HostState::default(), &RunnerConfig::new());
            assert!(visitors.is_primary());
            assert!(pool.primaries_in_use());
        }

        assert!(!pool.primaries_in_use());
        let ticket = in_flight.enter();
        let visitors = pool.acquire(&ticket, &file, &HostState::default(), &RunnerConfig::new());
        assert!(visitors.is_primary());
    }

    #[test]
    fn test_primaries_return_in_registration_order() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = pool();
        let in_flight = InFlightPasses::new();

        {
            let ticket = in_flight.enter();
            let _visitors = pool.acquire(&ticket, &file, &HostState::default(), &RunnerConfig::new());
        }

        let mut config = RunnerConfig::new();
        config.rainbow = true;
        let ticket = in_flight.enter();
        let host = HostState::default();
        let visitors = pool.acquire(&ticket, &file, &host, &config);
        assert_eq!(names(visitors.ids()), vec!["plain", "dumb", "rainbow"]);
    }

    #[test]
    fn test_overlapping_pass_gets_fresh_instances() {
        let tree = TreeBuilder::new().finish();
        let file = file_for(&tree);
        let pool = pool();
        let in_flight = InFlightPasses::new();

        let first_ticket = in_flight.enter();
        let first = pool.acquire(&first_ticket, &file, &HostState::default(), &RunnerConfig::new());
        let second_ticket = in_flight.enter();
        let second = pool.acquire(&second_ticket, &file, &HostState::default(), &RunnerConfig::new());

        assert!(first.is_primary());
        assert!(!second.is_primary());
        assert_eq!(first.ids(), second.ids());

        drop(second);
        assert!(pool.primaries_in_use());
        drop(first);
        assert!(!pool.primaries_in_use());
    }

    #[test]
    fn test_registered_ids() {
        assert_eq!(
            names(pool().registered().to_vec()),
            vec!["plain", "dumb", "rainbow", "picky"]
        );
    }
}
