//! Shared helpers for hilite_core integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use hilite_ast::{Element, NodeKind, SyntaxTree};
use hilite_core::{
    CollectingSink, HighlightInfo, HighlightVisitor, Highlighter, HostState, InfoHolder,
    PassOutcome, PassRequest, ProgressIndicator, RunnerConfig, RunnerError, SourceFile, ToolId,
    VisitError,
};
use hilite_parser::{BracketParser, Parser};

pub fn parse(source: &str) -> SyntaxTree {
    BracketParser::new().parse(source).expect("test source should parse")
}

pub fn highlighter(visitors: Vec<Box<dyn HighlightVisitor>>) -> Highlighter {
    highlighter_with(RunnerConfig::new(), visitors)
}

pub fn highlighter_with(
    mut config: RunnerConfig,
    visitors: Vec<Box<dyn HighlightVisitor>>,
) -> Highlighter {
    config.threads = 4;
    Highlighter::new(config, visitors).expect("Failed to create highlighter")
}

/// Runs a whole-file pass over `source`.
pub fn run_pass(
    highlighter: &Highlighter,
    source: &str,
    host: HostState,
) -> (Result<PassOutcome, RunnerError>, CollectingSink) {
    let tree = parse(source);
    let file = SourceFile::new(&tree, source).with_language("bracket");
    let sink = CollectingSink::new();
    let result = highlighter.highlight(
        file,
        &host,
        &PassRequest::whole_file(&tree),
        &ProgressIndicator::new(),
        &sink,
    );
    (result, sink)
}

/// Visitor that records the text of every element it visits.
///
/// Atoms listed in `errors` get an error diagnostic. Calls listed in
/// `panic_at` (0-based, counted per pass) panic after being recorded.
#[derive(Clone)]
pub struct Probe {
    name: &'static str,
    pub visited: Arc<Mutex<Vec<String>>>,
    errors: Vec<&'static str>,
    panic_at: Vec<usize>,
    calls: usize,
    completed: bool,
    dumb_aware: bool,
    pub fresh_instances: Arc<AtomicUsize>,
    barrier: Option<Arc<Barrier>>,
}

impl Probe {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visited: Arc::new(Mutex::new(Vec::new())),
            errors: Vec::new(),
            panic_at: Vec::new(),
            calls: 0,
            completed: true,
            dumb_aware: false,
            fresh_instances: Arc::new(AtomicUsize::new(0)),
            barrier: None,
        }
    }

    pub fn error_on(mut self, atom: &'static str) -> Self {
        self.errors.push(atom);
        self
    }

    pub fn panic_at(mut self, call: usize) -> Self {
        self.panic_at.push(call);
        self
    }

    pub fn returning(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn dumb_aware(mut self) -> Self {
        self.dumb_aware = true;
        self
    }

    /// Makes `before_pass` wait on `barrier`.
    pub fn wait_on(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

impl HighlightVisitor for Probe {
    fn id(&self) -> ToolId {
        ToolId::new(self.name)
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        file.language == "bracket"
    }

    fn is_dumb_aware(&self) -> bool {
        self.dumb_aware
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        self.fresh_instances.fetch_add(1, Ordering::SeqCst);
        Box::new(Self {
            calls: 0,
            ..self.clone()
        })
    }

    fn before_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _update_all: bool,
        _infos: &mut Vec<HighlightInfo>,
    ) -> Result<(), VisitError> {
        self.calls = 0;
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
        Ok(())
    }

    fn visit(
        &mut self,
        file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        let text = match element.kind() {
            NodeKind::File => "<file>".to_string(),
            _ => element.text(file.source).to_string(),
        };
        self.visited.lock().push(text.clone());

        let call = self.calls;
        self.calls += 1;
        if self.panic_at.contains(&call) {
            panic!("probe {} gave up at call {}", self.name, call);
        }

        if element.kind() == NodeKind::Atom && self.errors.contains(&text.as_str()) {
            holder.add(HighlightInfo::error(element.span(), format!("bad atom {}", text)));
        }
        Ok(())
    }

    fn after_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _infos: &mut Vec<HighlightInfo>,
    ) -> Result<bool, VisitError> {
        Ok(self.completed)
    }
}
