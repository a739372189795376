//! Visitors and helpers shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use hilite_ast::{Element, ElementId, SyntaxTree};

use crate::{HighlightInfo, HighlightVisitor, InfoHolder, Severity, SourceFile, ToolId, VisitError};

pub fn file_for(tree: &SyntaxTree) -> SourceFile<'_> {
    SourceFile::new(tree, "").with_language("bracket")
}

pub fn test_pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap()
}

/// A visitor that reports nothing, with configurable selection flags.
#[derive(Debug, Clone)]
pub struct FixedVisitor {
    name: &'static str,
    dumb_aware: bool,
    rainbow: bool,
    language: Option<&'static str>,
}

impl FixedVisitor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            dumb_aware: false,
            rainbow: false,
            language: None,
        }
    }

    pub fn dumb_aware(mut self) -> Self {
        self.dumb_aware = true;
        self
    }

    pub fn rainbow(mut self) -> Self {
        self.rainbow = true;
        self
    }

    pub fn only_language(mut self, language: &'static str) -> Self {
        self.language = Some(language);
        self
    }
}

impl HighlightVisitor for FixedVisitor {
    fn id(&self) -> ToolId {
        ToolId::new(self.name)
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        self.language.is_none_or(|lang| lang == file.language)
    }

    fn is_dumb_aware(&self) -> bool {
        self.dumb_aware
    }

    fn is_rainbow(&self) -> bool {
        self.rainbow
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        Box::new(self.clone())
    }

    fn visit(
        &mut self,
        _file: &SourceFile<'_>,
        _element: Element<'_>,
        _holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        Ok(())
    }
}

/// Something a [`ScriptedVisitor`] does when it reaches an element.
#[derive(Debug, Clone)]
pub enum Action {
    /// Adds a diagnostic over the element's span.
    Report(Severity),
    Fail,
    Panic,
    Cancel,
    Dispose,
    IndexNotReady,
}

/// A visitor driven by a per-element script that records what it visits.
#[derive(Debug, Clone)]
pub struct ScriptedVisitor {
    name: &'static str,
    script: HashMap<ElementId, Vec<Action>>,
    visited: Arc<Mutex<Vec<ElementId>>>,
    completed: bool,
    fail_before: bool,
    fail_after: Option<VisitError>,
    before: Vec<HighlightInfo>,
    after: Vec<HighlightInfo>,
}

impl ScriptedVisitor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            script: HashMap::new(),
            visited: Arc::new(Mutex::new(Vec::new())),
            completed: true,
            fail_before: false,
            fail_after: None,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn on(mut self, index: usize, action: Action) -> Self {
        self.script
            .entry(ElementId::from_index(index))
            .or_default()
            .push(action);
        self
    }

    pub fn returning(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn failing_before(mut self) -> Self {
        self.fail_before = true;
        self
    }

    pub fn failing_after(mut self, error: VisitError) -> Self {
        self.fail_after = Some(error);
        self
    }

    pub fn before(mut self, info: HighlightInfo) -> Self {
        self.before.push(info);
        self
    }

    pub fn after(mut self, info: HighlightInfo) -> Self {
        self.after.push(info);
        self
    }

    /// Log of visited elements, shared with every fresh instance.
    pub fn visited(&self) -> Arc<Mutex<Vec<ElementId>>> {
        Arc::clone(&self.visited)
    }
}

impl HighlightVisitor for ScriptedVisitor {
    fn id(&self) -> ToolId {
        ToolId::new(self.name)
    }

    fn suitable_for(&self, _file: &SourceFile<'_>) -> bool {
        true
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        Box::new(self.clone())
    }

    fn before_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _update_all: bool,
        infos: &mut Vec<HighlightInfo>,
    ) -> Result<(), VisitError> {
        if self.fail_before {
            return Err(VisitError::failed("before_pass exploded"));
        }
        infos.extend(self.before.iter().cloned());
        Ok(())
    }

    fn visit(
        &mut self,
        _file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        self.visited.lock().push(element.id());
        for action in self.script.get(&element.id()).into_iter().flatten() {
            match action {
                Action::Report(severity) => {
                    holder.add(HighlightInfo::new(*severity, element.span(), "scripted"))
                }
                Action::Fail => return Err(VisitError::failed("scripted failure")),
                Action::Panic => panic!("scripted panic"),
                Action::Cancel => return Err(VisitError::Cancelled),
                Action::Dispose => return Err(VisitError::disposed("scripted disposal")),
                Action::IndexNotReady => return Err(VisitError::IndexNotReady),
            }
        }
        Ok(())
    }

    fn after_pass(
        &mut self,
        _file: &SourceFile<'_>,
        infos: &mut Vec<HighlightInfo>,
    ) -> Result<bool, VisitError> {
        infos.extend(self.after.iter().cloned());
        match &self.fail_after {
            Some(error) => Err(error.clone()),
            None => Ok(self.completed),
        }
    }
}
