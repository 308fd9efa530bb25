//! Ported from `JsonHighlighter.cc`.

use super::scan::{is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

pub struct JsonHighlighter;

impl Highlighter for JsonHighlighter {
    fn highlight(&self, line: &str, _row: usize, _prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let sc = Scanner::new(line);
        let n = sc.len();
        let mut out = Vec::new();
        let mut i = 0usize;
        while i < n {
            let c = sc.at(i).unwrap();
            if is_space(c) {
                let mut j = i + 1;
                while j < n && is_space(sc.at(j).unwrap()) {
                    j += 1;
                }
                push(&mut out, &sc, i, j, TokenKind::Whitespace);
                i = j;
                continue;
            }
            if c == '"' {
                let mut j = i + 1;
                let mut esc = false;
                while j < n {
                    let d = sc.at(j).unwrap();
                    j += 1;
                    if esc {
                        esc = false;
                        continue;
                    }
                    if d == '\\' {
                        esc = true;
                        continue;
                    }
                    if d == '"' {
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::String);
                i = j;
                continue;
            }
            if c.is_ascii_digit() || (c == '-' && i + 1 < n && sc.at(i + 1).unwrap().is_ascii_digit()) {
                let mut j = i + 1;
                while j < n {
                    let d = sc.at(j).unwrap();
                    if d.is_ascii_digit() || matches!(d, '.' | 'e' | 'E' | '+' | '-' | '_') {
                        j += 1;
                    } else {
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::Number);
                i = j;
                continue;
            }
            if c.is_alphabetic() {
                let mut j = i + 1;
                while j < n && sc.at(j).unwrap().is_alphabetic() {
                    j += 1;
                }
                let id = sc.text(i, j);
                let kind = if matches!(id.as_str(), "true" | "false" | "null") {
                    TokenKind::Constant
                } else {
                    TokenKind::Identifier
                };
                push(&mut out, &sc, i, j, kind);
                i = j;
                continue;
            }
            if matches!(c, '{' | '}' | '[' | ']' | ',' | ':') {
                push(&mut out, &sc, i, i + 1, TokenKind::Punctuation);
                i += 1;
                continue;
            }
            push(&mut out, &sc, i, i + 1, TokenKind::Default);
            i += 1;
        }
        (out, LineState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_numbers_and_literals() {
        let (spans, _) = JsonHighlighter.highlight(r#"{"a": 1, "b": true}"#, 0, &LineState::default());
        let kinds: Vec<_> = spans.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&TokenKind::String));
        assert!(kinds.contains(&TokenKind::Number));
        assert!(kinds.contains(&TokenKind::Constant));
        assert!(kinds.contains(&TokenKind::Punctuation));
    }
}
