//! Ported from `syntax/GoHighlighter.cc`.

use super::scan::{is_ident_char, is_ident_start, is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

const TYPES: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int", "int8", "int16", "int32",
    "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
];

pub struct GoHighlighter;

impl Highlighter for GoHighlighter {
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
                if closed {
                    push(&mut out, &sc, i, j, TokenKind::Comment);
                    i = j;
                    continue;
                }
                push(&mut out, &sc, i, n, TokenKind::Comment);
                break;
            }
            if c == '"' || c == '`' {
                let q = c;
                let mut j = i + 1;
                let mut esc = false;
                while j < n {
                    let d = sc.at(j).unwrap();
                    j += 1;
                    if q == '"' {
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
                    } else if d == '`' {
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::String);
                i = j;
                continue;
            }
            if c.is_ascii_digit() {
                let mut j = i + 1;
                while j < n && (sc.at(j).unwrap().is_alphanumeric() || sc.at(j).unwrap() == '.') {
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
    fn keywords_and_types_recognized() {
        let (spans, _) = GoHighlighter.highlight("func f(x int) string {", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Keyword));
        assert!(spans.iter().any(|s| s.kind == TokenKind::Type));
    }
}
