//! Per-visitor diagnostic collection.

use crate::HighlightInfo;

/// Diagnostics a visitor has reported during one run.
///
/// Visitors only append. The runner records [`len`](Self::len) before each
/// visit call and takes everything added after that mark.
#[derive(Debug, Default)]
pub struct InfoHolder {
    infos: Vec<HighlightInfo>,
}

impl InfoHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a diagnostic.
    #[inline]
    pub fn add(&mut self, info: HighlightInfo) {
        self.infos.push(info);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&HighlightInfo> {
        self.infos.get(index)
    }

    /// Returns true if any held diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.infos.iter().any(HighlightInfo::is_error)
    }

    /// Removes and yields every diagnostic added at or after `mark`.
    pub(crate) fn drain_from(&mut self, mark: usize) -> std::vec::Drain<'_, HighlightInfo> {
        let mark = mark.min(self.infos.len());
        self.infos.drain(mark..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilite_ast::Span;

    #[test]
    fn test_drain_from_mark() {
        let mut holder = InfoHolder::new();
        holder.add(HighlightInfo::info(Span::new(0, 1), "a"));
        let mark = holder.len();
        holder.add(HighlightInfo::error(Span::new(1, 2), "b"));
        holder.add(HighlightInfo::info(Span::new(2, 3), "c"));
        assert!(holder.has_errors());

        let drained: Vec<_> = holder.drain_from(mark).map(|i| i.message).collect();
        assert_eq!(drained, vec!["b", "c"]);
        assert_eq!(holder.len(), 1);
        assert!(!holder.has_errors());
    }

    #[test]
    fn test_drain_past_end_is_empty() {
        let mut holder = InfoHolder::new();
        holder.add(HighlightInfo::info(Span::new(0, 1), "a"));
        assert_eq!(holder.drain_from(5).count(), 0);
        assert_eq!(holder.get(0).map(|i| i.message.as_str()), Some("a"));
    }
}
