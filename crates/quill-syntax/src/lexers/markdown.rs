//! Ported from `MarkdownHighlighter.cc`. Reuses `LineState::in_fence` for
//! fenced-code-block tracking (the original overloads `in_block_comment` for
//! this; a dedicated field reads more honestly here).

use super::scan::Scanner;
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

pub struct MarkdownHighlighter;

impl Highlighter for MarkdownHighlighter {
    fn is_stateful(&self) -> bool {
        true
    }

    fn highlight(&self, line: &str, _row: usize, prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let mut state = prev.clone();
        let mut out = Vec::new();
        let n = line.len();

        if state.in_fence {
            match line.find("```") {
                None => {
                    out.push(HighlightSpan::new(0, n, TokenKind::String));
                    return (out, state);
                }
                Some(pos) => {
                    let end = pos + 3;
                    out.push(HighlightSpan::new(0, end, TokenKind::String));
                    if end < n {
                        out.push(HighlightSpan::new(end, n, TokenKind::Default));
                    }
                    state.in_fence = false;
                    return (out, state);
                }
            }
        }

        let sc = Scanner::new(line);
        let bol_byte = line.len() - line.trim_start_matches([' ', '\t']).len();
        if line[bol_byte..].starts_with("```") {
            out.push(HighlightSpan::new(bol_byte, n, TokenKind::String));
            state.in_fence = true;
            return (out, state);
        }

        if line[bol_byte..].starts_with('#') {
            out.push(HighlightSpan::new(bol_byte, n, TokenKind::Keyword));
            return (out, state);
        }

        let chars = sc.len();
        let mut i = 0usize;
        while i < chars {
            let c = sc.at(i).unwrap();
            if c == '`' {
                let mut j = i + 1;
                while j < chars && sc.at(j).unwrap() != '`' {
                    j += 1;
                }
                if j < chars {
                    j += 1;
                }
                out.push(HighlightSpan::new(sc.byte_of(i), sc.byte_of(j), TokenKind::String));
                i = j;
                continue;
            }
            if c == '*' || c == '_' {
                let m = c;
                let mut j = i + 1;
                while j < chars && sc.at(j).unwrap() != m {
                    j += 1;
                }
                if j < chars {
                    j += 1;
                    out.push(HighlightSpan::new(sc.byte_of(i), sc.byte_of(j), TokenKind::Type));
                    i = j;
                    continue;
                }
            }
            if c == '[' {
                let mut j = i + 1;
                while j < chars && sc.at(j).unwrap() != ']' {
                    j += 1;
                }
                if j < chars && j + 1 < chars && sc.at(j + 1).unwrap() == '(' {
                    let mut k = j + 2;
                    while k < chars && sc.at(k).unwrap() != ')' {
                        k += 1;
                    }
                    if k < chars {
                        k += 1;
                    }
                    out.push(HighlightSpan::new(sc.byte_of(i), sc.byte_of(k), TokenKind::Constant));
                    i = k;
                    continue;
                }
            }
            i += 1;
        }

        (out, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_spans_lines() {
        let (spans1, state) = MarkdownHighlighter.highlight("```rust", 0, &LineState::default());
        assert!(spans1.iter().any(|s| s.kind == TokenKind::String));
        assert!(state.in_fence);

        let (_, state2) = MarkdownHighlighter.highlight("fn main() {}", 1, &state);
        assert!(state2.in_fence);

        let (spans3, state3) = MarkdownHighlighter.highlight("``` trailing", 2, &state2);
        assert!(spans3.iter().any(|s| s.kind == TokenKind::String));
        assert!(!state3.in_fence);
    }

    #[test]
    fn heading_and_inline_code() {
        let (spans, _) = MarkdownHighlighter.highlight("# Title with `code`", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Keyword));
    }
}
