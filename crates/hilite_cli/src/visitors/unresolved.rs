//! Names used without a definition.
//!
//! Definitions are indexed once per pass in `before_pass`: `(def name ...)`
//! binds `name`, `(fn (a b) ...)` binds `a` and `b`. Scoping is file-wide.

use std::collections::HashSet;

use serde::Deserialize;

use hilite_ast::{Element, ElementId, NodeKind};
use hilite_core::{
    HighlightInfo, HighlightVisitor, InfoHolder, SourceFile, ToolId, VisitError,
};

const BUILTINS: [&str; 15] = [
    "def", "fn", "let", "if", "do", "quote", "list", "print", "+", "-", "*", "/", "=", "<", ">",
];

/// Options accepted under `visitors.unresolved`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnresolvedOptions {
    #[serde(default)]
    builtins: Vec<String>,
}

/// Reports atoms that reference names never bound in the file.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedVisitor {
    extra_builtins: HashSet<String>,
    bound: HashSet<String>,
    binding_sites: HashSet<ElementId>,
}

impl UnresolvedVisitor {
    fn bind(&mut self, name: Element<'_>, source: &str, infos: &mut Vec<HighlightInfo>) {
        let text = name.text(source);
        self.binding_sites.insert(name.id());
        if !self.bound.insert(text.to_string()) {
            infos.push(HighlightInfo::warning(
                name.span(),
                format!("duplicate definition of '{}'", text),
            ));
        }
    }

    fn is_known(&self, name: &str) -> bool {
        BUILTINS.contains(&name)
            || self.extra_builtins.contains(name)
            || self.bound.contains(name)
            || super::is_number(name)
    }
}

impl HighlightVisitor for UnresolvedVisitor {
    fn id(&self) -> ToolId {
        ToolId::new("unresolved")
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        super::is_bracket_source(file)
    }

    fn configure(&mut self, options: &serde_json::Value) -> Result<(), VisitError> {
        let options: UnresolvedOptions = serde_json::from_value(options.clone())
            .map_err(|e| VisitError::failed(e.to_string()))?;
        self.extra_builtins = options.builtins.into_iter().collect();
        Ok(())
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        Box::new(Self {
            extra_builtins: self.extra_builtins.clone(),
            ..Self::default()
        })
    }

    fn before_pass(
        &mut self,
        file: &SourceFile<'_>,
        _update_all: bool,
        infos: &mut Vec<HighlightInfo>,
    ) -> Result<(), VisitError> {
        self.bound.clear();
        self.binding_sites.clear();

        for group in file.tree.iter().filter(|e| e.kind() == NodeKind::Group) {
            let mut children = group.children();
            let Some(head) = children.next().filter(|c| c.kind() == NodeKind::Atom) else {
                continue;
            };
            let Some(target) = children.next() else {
                continue;
            };
            match (head.text(file.source), target.kind()) {
                ("def", NodeKind::Atom) => self.bind(target, file.source, infos),
                ("fn", NodeKind::Group) => {
                    for param in target.children().filter(|c| c.kind() == NodeKind::Atom) {
                        self.bind(param, file.source, infos);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn visit(
        &mut self,
        file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        if element.kind() != NodeKind::Atom || self.binding_sites.contains(&element.id()) {
            return Ok(());
        }
        let name = element.text(file.source);
        if !self.is_known(name) {
            holder.add(HighlightInfo::warning(
                element.span(),
                format!("unresolved name '{}'", name),
            ));
        }
        Ok(())
    }

    fn after_pass(
        &mut self,
        _file: &SourceFile<'_>,
        _infos: &mut Vec<HighlightInfo>,
    ) -> Result<bool, VisitError> {
        self.bound.clear();
        self.binding_sites.clear();
        Ok(true)
    }
}
