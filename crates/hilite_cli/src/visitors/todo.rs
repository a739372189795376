//! TODO/FIXME markers in comments.

use serde::Deserialize;

use hilite_ast::{Element, NodeKind, Span};
use hilite_core::{
    HighlightInfo, HighlightVisitor, InfoHolder, SourceFile, ToolId, VisitError,
};

const DEFAULT_KEYWORDS: [&str; 2] = ["TODO", "FIXME"];

/// Options accepted under `visitors.todo`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TodoOptions {
    #[serde(default)]
    keywords: Option<Vec<String>>,
}

/// Reports marker keywords found in comments.
#[derive(Debug, Clone)]
pub struct TodoVisitor {
    keywords: Vec<String>,
}

impl Default for TodoVisitor {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl TodoVisitor {
    fn report_markers(&self, comment: &str, offset: u32, holder: &mut InfoHolder) {
        for keyword in &self.keywords {
            for (index, _) in comment.match_indices(keyword.as_str()) {
                let end = index + keyword.len();
                let standalone = !comment[..index].ends_with(is_word_char)
                    && !comment[end..].starts_with(is_word_char);
                if !standalone {
                    continue;
                }

                let note = comment[end..].trim_start_matches(':').trim();
                let message = if note.is_empty() {
                    keyword.clone()
                } else {
                    format!("{}: {}", keyword, note)
                };
                let span = Span::new(offset + index as u32, offset + end as u32);
                holder.add(HighlightInfo::warning(span, message));
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl HighlightVisitor for TodoVisitor {
    fn id(&self) -> ToolId {
        ToolId::new("todo")
    }

    fn suitable_for(&self, file: &SourceFile<'_>) -> bool {
        super::is_bracket_source(file)
    }

    fn is_dumb_aware(&self) -> bool {
        true
    }

    fn configure(&mut self, options: &serde_json::Value) -> Result<(), VisitError> {
        let options: TodoOptions = serde_json::from_value(options.clone())
            .map_err(|e| VisitError::failed(e.to_string()))?;
        if let Some(keywords) = options.keywords {
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(VisitError::failed("keywords must not be empty"));
            }
            self.keywords = keywords;
        }
        Ok(())
    }

    fn fresh_instance(&self) -> Box<dyn HighlightVisitor> {
        Box::new(self.clone())
    }

    fn visit(
        &mut self,
        file: &SourceFile<'_>,
        element: Element<'_>,
        holder: &mut InfoHolder,
    ) -> Result<(), VisitError> {
        if element.kind() == NodeKind::Comment {
            self.report_markers(element.text(file.source), element.span().start, holder);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitors::testing::{highlight, highlight_with, messages};
    use hilite_core::{RunnerConfig, Severity, VisitorOption};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reports_markers_in_comments() {
        let source = "(a) ; TODO: split this\n(b) ; FIXME\n; TODOS are fine\n(TODO)";
        let infos = highlight(Box::new(TodoVisitor::default()), source);

        assert_eq!(messages(&infos), vec!["TODO: split this", "FIXME"]);
        assert!(infos.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(infos[0].span.slice(source), "TODO");
    }

    #[test]
    fn test_configured_keywords() {
        let mut config = RunnerConfig::new();
        config.visitors.insert(
            "todo".to_string(),
            VisitorOption::Options(serde_json::json!({ "keywords": ["HACK"] })),
        );
        let infos = highlight_with(
            config,
            Box::new(TodoVisitor::default()),
            "; TODO later\n; HACK around it",
        );
        assert_eq!(messages(&infos), vec!["HACK: around it"]);
    }

    #[test]
    fn test_rejects_bad_options() {
        let mut visitor = TodoVisitor::default();
        assert!(visitor.configure(&serde_json::json!({ "keywords": [""] })).is_err());
        assert!(visitor.configure(&serde_json::json!({ "words": [] })).is_err());
        assert!(visitor.configure(&serde_json::json!({})).is_ok());
        assert_eq!(visitor.keywords, vec!["TODO", "FIXME"]);
    }
}
