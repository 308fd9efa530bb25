//! Ported from `RustHighlighter.cc`. Named `rust_lexer` to avoid shadowing
//! the `rust` keyword as a module path segment.

use super::scan::{is_ident_char, is_ident_start, is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
    "super", "trait", "true", "type", "unsafe", "use", "where", "while", "dyn", "async", "await", "try",
];

const TYPES: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize", "f32", "f64", "bool",
    "char", "str",
];

pub struct RustHighlighter;

impl Highlighter for RustHighlighter {
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
            if c == '/' && i + 1 < n && sc.at(i + 1).unwrap() == '/' {
                push(&mut out, &sc, i, n, TokenKind::Comment);
                break;
            }
            if c == '/' && i + 1 < n && sc.at(i + 1).unwrap() == '*' {
                let mut j = i + 2;
                let mut closed = false;
                while j + 1 <= n {
                    if j + 1 < n && sc.at(j).unwrap() == '*' && sc.at(j + 1).unwrap() == '/' {
                        j += 2;
                        closed = true;
                        break;
                    }
                    j += 1;
                }
                push(&mut out, &sc, i, j.min(n), TokenKind::Comment);
                if !closed {
                    break;
                }
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
            if c.is_ascii_digit() {
                let mut j = i + 1;
                while j < n && (sc.at(j).unwrap().is_alphanumeric() || matches!(sc.at(j).unwrap(), '.' | '_')) {
                    j += 1;
                }
                push(&mut out, &sc, i, j, TokenKind::Number);
                i = j;
                continue;
            }
            if is_ident_start(c) {
                let mut j = i + 1;
                while j < n && is_ident_char(sc.at(j).unwrap()) {
                    j += 1;
                }
                let id = sc.text(i, j);
                let kind = if KEYWORDS.contains(&id.as_str()) {
                    TokenKind::Keyword
                } else if TYPES.contains(&id.as_str()) {
                    TokenKind::Type
                } else {
                    TokenKind::Identifier
                };
                push(&mut out, &sc, i, j, kind);
                i = j;
                continue;
            }
            if c.is_ascii_punctuation() {
                let kind = if matches!(c, ';' | ',' | '(' | ')' | '{' | '}' | '[' | ']') {
                    TokenKind::Punctuation
                } else {
                    TokenKind::Operator
                };
                push(&mut out, &sc, i, i + 1, kind);
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
    fn keyword_type_and_string() {
        let (spans, _) = RustHighlighter.highlight(r#"fn main() -> u32 { "x" }"#, 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Keyword));
        assert!(spans.iter().any(|s| s.kind == TokenKind::Type));
        assert!(spans.iter().any(|s| s.kind == TokenKind::String));
    }
}
