//! URI-keyed diagnostic storage (spec.md §4.12, C12).
//!
//! Ported from `lsp/DiagnosticStore.cc`. Ranges are stored in whatever
//! coordinate space the caller hands in; `quill-lsp` converts wire UTF-16
//! positions to UTF-8 scalar columns via `quill_text::utf_codec` before
//! storing, so queries from the editor side (`get_at_position`) compare
//! directly against buffer cursor positions.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiagPos {
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: DiagPos,
    pub end: DiagPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// LSP wire severities are 1-based (`1..=4`); anything else defaults to
    /// `Info`, matching spec.md §4.10.
    pub fn from_lsp(code: i64) -> Self {
        match code {
            1 => Severity::Error,
            2 => Severity::Warning,
            3 => Severity::Info,
            4 => Severity::Hint,
            _ => Severity::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelatedInformation {
    pub uri: String,
    pub range: Range,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub code: Option<String>,
    pub source: Option<String>,
    pub message: String,
    pub related: Vec<RelatedInformation>,
}

#[derive(Default)]
pub struct DiagnosticStore {
    by_uri: HashMap<String, Vec<Diagnostic>>,
}

fn contains_line(r: &Range, line: usize) -> bool {
    line >= r.start.line && line <= r.end.line
}

fn contains_position(r: &Range, p: DiagPos) -> bool {
    if p.line < r.start.line || p.line > r.end.line {
        return false;
    }
    if r.start.line == r.end.line {
        return p.line == r.start.line
            && p.character >= r.start.character
            && p.character <= r.end.character;
    }
    if p.line == r.start.line {
        return p.character >= r.start.character;
    }
    if p.line == r.end.line {
        return p.character <= r.end.character;
    }
    true
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_diagnostics(&mut self, uri: impl Into<String>, diagnostics: Vec<Diagnostic>) {
        self.by_uri.insert(uri.into(), diagnostics);
    }

    pub fn get(&self, uri: &str) -> &[Diagnostic] {
        self.by_uri.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_at_line(&self, uri: &str, line: usize) -> Vec<&Diagnostic> {
        self.get(uri)
            .iter()
            .filter(|d| contains_line(&d.range, line))
            .collect()
    }

    pub fn get_at_position(&self, uri: &str, pos: DiagPos) -> Option<&Diagnostic> {
        self.get(uri).iter().find(|d| contains_position(&d.range, pos))
    }

    pub fn error_count(&self, uri: &str) -> usize {
        self.get(uri)
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
            .count()
    }

    pub fn warning_count(&self, uri: &str) -> usize {
        self.get(uri)
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count()
    }

    pub fn clear(&mut self, uri: &str) {
        self.by_uri.remove(uri);
    }

    pub fn clear_all(&mut self) {
        self.by_uri.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(start: (usize, usize), end: (usize, usize), sev: Severity) -> Diagnostic {
        Diagnostic {
            range: Range {
                start: DiagPos { line: start.0, character: start.1 },
                end: DiagPos { line: end.0, character: end.1 },
            },
            severity: sev,
            code: None,
            source: None,
            message: "msg".into(),
            related: Vec::new(),
        }
    }

    #[test]
    fn get_at_position_only_matches_within_range() {
        let mut store = DiagnosticStore::new();
        store.set_diagnostics("file:///a", vec![diag((0, 2), (0, 5), Severity::Error)]);
        assert!(store.get_at_position("file:///a", DiagPos { line: 0, character: 3 }).is_some());
        assert!(store.get_at_position("file:///a", DiagPos { line: 0, character: 1 }).is_none());
        assert!(store.get_at_position("file:///a", DiagPos { line: 1, character: 3 }).is_none());
    }

    #[test]
    fn multiline_range_position_containment() {
        let mut store = DiagnosticStore::new();
        store.set_diagnostics("u", vec![diag((1, 4), (3, 2), Severity::Warning)]);
        assert!(store.get_at_position("u", DiagPos { line: 2, character: 0 }).is_some());
        assert!(store.get_at_position("u", DiagPos { line: 1, character: 0 }).is_none());
        assert!(store.get_at_position("u", DiagPos { line: 3, character: 5 }).is_none());
    }

    #[test]
    fn severity_counts_and_clear() {
        let mut store = DiagnosticStore::new();
        store.set_diagnostics(
            "u",
            vec![
                diag((0, 0), (0, 1), Severity::Error),
                diag((1, 0), (1, 1), Severity::Warning),
                diag((2, 0), (2, 1), Severity::Error),
            ],
        );
        assert_eq!(store.error_count("u"), 2);
        assert_eq!(store.warning_count("u"), 1);
        store.clear("u");
        assert_eq!(store.get("u").len(), 0);
    }

    #[test]
    fn severity_from_lsp_defaults_unknown_to_info() {
        assert!(matches!(Severity::from_lsp(1), Severity::Error));
        assert!(matches!(Severity::from_lsp(99), Severity::Info));
    }
}
