//! Ported from `NullHighlighter.cc`: the fallback for filetypes with no
//! dedicated lexer. Marks the whole line `Default` rather than leaving it
//! unspanned, so renderers don't need a separate "no highlighter" code path.

use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

pub struct NullHighlighter;

impl Highlighter for NullHighlighter {
    fn highlight(&self, line: &str, _row: usize, _prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        if line.is_empty() {
            return (Vec::new(), LineState::default());
        }
        (vec![HighlightSpan::new(0, line.len(), TokenKind::Default)], LineState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_line_is_one_default_span() {
        let (spans, _) = NullHighlighter.highlight("anything", 0, &LineState::default());
        assert_eq!(spans, vec![HighlightSpan::new(0, 8, TokenKind::Default)]);
    }

    #[test]
    fn empty_line_has_no_spans() {
        let (spans, _) = NullHighlighter.highlight("", 0, &LineState::default());
        assert!(spans.is_empty());
    }
}
