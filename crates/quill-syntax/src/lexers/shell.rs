//! Ported from `ShellHighlighter.cc`.

use super::scan::{is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "if", "then", "fi", "for", "in", "do", "done", "case", "esac", "while", "function", "elif", "else",
];

pub struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight(&self, line: &str, _row: usize, _prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let sc = Scanner::new(line);
        let n = sc.len();
        let mut out = Vec::new();

        let mut bol = 0usize;
        while bol < n && is_space(sc.at(bol).unwrap()) {
            bol += 1;
        }
        if bol < n && sc.at(bol).unwrap() == '#' {
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
            if c == '#' {
                push(&mut out, &sc, i, n, TokenKind::Comment);
                break;
            }
            if c == '\'' || c == '"' {
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
                    } else if d == '\'' {
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::String);
                i = j;
                continue;
            }
            if c == '$' {
                let mut j = i + 1;
                if j < n && sc.at(j).unwrap() == '{' {
                    j += 1;
                    while j < n && sc.at(j).unwrap() != '}' {
                        j += 1;
                    }
                    if j < n {
                        j += 1;
                    }
                } else {
                    while j < n && (sc.at(j).unwrap().is_alphanumeric() || sc.at(j).unwrap() == '_') {
                        j += 1;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::Constant);
                i = j;
                continue;
            }
            if c.is_alphabetic() {
                let mut j = i + 1;
                while j < n && (sc.at(j).unwrap().is_alphanumeric() || sc.at(j).unwrap() == '_') {
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
    fn comment_only_line() {
        let (spans, _) = ShellHighlighter.highlight("  # hi", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Comment));
    }

    #[test]
    fn keyword_vs_identifier() {
        let (spans, _) = ShellHighlighter.highlight("if foo; then", 0, &LineState::default());
        let kw_count = spans.iter().filter(|s| s.kind == TokenKind::Keyword).count();
        assert_eq!(kw_count, 2);
    }
}
