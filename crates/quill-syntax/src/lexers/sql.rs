//! Ported from `syntax/SqlHighlighter.cc`.

use super::scan::{is_ident_char, is_ident_start, is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "from", "where", "group", "by", "order", "limit", "offset", "values",
    "into", "create", "table", "index", "unique", "on", "as", "and", "or", "not", "null", "is", "primary", "key",
    "constraint", "foreign", "references", "drop", "alter", "add", "column", "rename", "to", "if", "exists", "join",
    "left", "right", "inner", "outer", "cross", "using", "set", "distinct", "having", "union", "all", "case",
    "when", "then", "else", "end", "pragma", "transaction", "begin", "commit", "rollback", "replace",
];

const TYPES: &[&str] = &["integer", "real", "text", "blob", "numeric", "boolean", "date", "datetime"];

pub struct SqlHighlighter;

impl Highlighter for SqlHighlighter {
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
            if c == '-' && i + 1 < n && sc.at(i + 1).unwrap() == '-' {
                push(&mut out, &sc, i, n, TokenKind::Comment);
                break;
            }
            if c == '\'' {
                let mut j = i + 1;
                while j < n {
                    let d = sc.at(j).unwrap();
                    j += 1;
                    if d == '\'' {
                        if j < n && sc.at(j).unwrap() == '\'' {
                            j += 1;
                            continue;
                        }
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::String);
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
            if is_ident_start(c) {
                let mut j = i + 1;
                while j < n && is_ident_char(sc.at(j).unwrap()) {
                    j += 1;
                }
                let id = sc.text(i, j).to_lowercase();
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
                let kind = if matches!(c, ';' | ',' | '(' | ')') {
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
    fn keywords_case_insensitive() {
        let (spans, _) = SqlHighlighter.highlight("SELECT * FROM t WHERE id = 1", 0, &LineState::default());
        let kw = spans.iter().filter(|s| s.kind == TokenKind::Keyword).count();
        assert_eq!(kw, 3);
    }

    #[test]
    fn line_comment() {
        let (spans, _) = SqlHighlighter.highlight("-- note", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Comment));
    }
}
