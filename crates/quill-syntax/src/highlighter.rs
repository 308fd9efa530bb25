//! The per-language highlighter contract (spec.md §4.6, C5).
//!
//! The original splits `LanguageHighlighter` (stateless) from
//! `StatefulHighlighter` (a subclass, detected at the call site with
//! `dynamic_cast`). Rust has no open-ended downcasting, and it isn't needed:
//! every highlighter implements the same single method and reports whether
//! state actually carries across line boundaries via `is_stateful`, which
//! `HighlighterEngine` uses to decide whether cache lookups need to walk
//! forward from a prior row.

use crate::types::{HighlightSpan, LineState};

pub trait Highlighter: Send + Sync {
    /// Tokenize `line` (row `row`, 0-based), given the state left behind by
    /// the previous line. Stateless highlighters ignore `prev` and return
    /// `LineState::default()`.
    fn highlight(&self, line: &str, row: usize, prev: &LineState) -> (Vec<HighlightSpan>, LineState);

    /// Whether `prev`/the returned state is meaningful. Stateless
    /// highlighters (the common case) answer `false`.
    fn is_stateful(&self) -> bool {
        false
    }
}

/// Lets `quill-syntax` request line content without depending on
/// `quill-state`'s `Buffer` directly, which would create a dependency cycle
/// once the owning crate wires a `Buffer` to a `HighlighterEngine`.
pub trait LineSource {
    fn nrows(&self) -> usize;
    fn line(&self, row: usize) -> String;
}
