//! Ported from `LispHighlighter.cc`.

use super::scan::{is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "defun", "lambda", "let", "let*", "define", "set!", "if", "cond", "begin", "quote", "quasiquote", "unquote",
    "unquote-splicing", "loop", "do", "and", "or", "not",
];

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '*' | '-' | '+' | '/' | '_')
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '*' | '-' | '+' | '/' | '_' | '!')
}

pub struct LispHighlighter;

impl Highlighter for LispHighlighter {
    fn highlight(&self, line: &str, _row: usize, _prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let sc = Scanner::new(line);
        let n = sc.len();
        let mut out = Vec::new();

        let mut bol = 0usize;
        while bol < n && is_space(sc.at(bol).unwrap()) {
            bol += 1;
        }
        if bol < n && sc.at(bol).unwrap() == ';' {
            push(&mut out, &sc, bol, n, TokenKind::Comment);
            if bol > 0 {
                push(&mut out, &sc, 0, bol, TokenKind::Whitespace);
            }
            return (out, LineState::default());
        }

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
            if c == ';' {
                push(&mut out, &sc, i, n, TokenKind::Comment);
                break;
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
            if is_symbol_start(c) {
                let mut j = i + 1;
                while j < n && is_symbol_char(sc.at(j).unwrap()) {
                    j += 1;
                }
                let id = sc.text(i, j);
                let kind = if KEYWORDS.contains(&id.as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                push(&mut out, &sc, i, j, kind);
                i = j;
                continue;
            }
            if c.is_ascii_digit() {
                let mut j = i + 1;
                while j < n && (sc.at(j).unwrap().is_ascii_digit() || sc.at(j).unwrap() == '.') {
                    j += 1;
                }
                push(&mut out, &sc, i, j, TokenKind::Number);
                i = j;
                continue;
            }
            if c.is_ascii_punctuation() {
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
    fn parens_are_punctuation_and_defun_is_keyword() {
        let (spans, _) = LispHighlighter.highlight("(defun f (x) (+ x 1))", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Keyword));
        assert!(spans.iter().any(|s| s.kind == TokenKind::Punctuation));
    }
}
