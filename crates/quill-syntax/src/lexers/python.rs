//! Ported from `PythonHighlighter.cc`. Triple-quoted strings are tracked via
//! `LineState::triple_quote` (the original overloads `raw_delim`/`in_raw_string`
//! for this; kept separate here since Python's triple-quote tracking and C++'s
//! raw-string tracking are unrelated concepts that happen to share a struct).

use super::scan::{is_ident_char, is_ident_start, is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except", "False", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "None", "nonlocal", "not", "or", "pass", "raise",
    "return", "True", "try", "while", "with", "yield",
];

pub struct PythonHighlighter;

impl Highlighter for PythonHighlighter {
    fn is_stateful(&self) -> bool {
        true
    }

    fn highlight(&self, line: &str, _row: usize, prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let mut state = prev.clone();
        let mut out = Vec::new();

        if !state.triple_quote.is_empty() {
            let delim = state.triple_quote.clone();
            match line.find(&delim) {
                None => {
                    out.push(HighlightSpan::new(0, line.len(), TokenKind::String));
                    return (out, state);
                }
                Some(byte_pos) => {
                    let end = byte_pos + delim.len();
                    out.push(HighlightSpan::new(0, end, TokenKind::String));
                    state.triple_quote.clear();
                    if end < line.len() {
                        out.push(HighlightSpan::new(end, line.len(), TokenKind::Default));
                    }
                    return (out, state);
                }
            }
        }

        let sc = Scanner::new(line);
        let n = sc.len();
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
            if c == '"' || c == '\'' {
                let q = c;
                if i + 2 < n && sc.at(i + 1).unwrap() == q && sc.at(i + 2).unwrap() == q {
                    let delim: String = std::iter::repeat(q).take(3).collect();
                    let search_from = sc.byte_of(i + 3);
                    match line[search_from..].find(&delim) {
                        None => {
                            push(&mut out, &sc, i, n, TokenKind::String);
                            state.triple_quote = delim;
                            return (out, state);
                        }
                        Some(rel) => {
                            let end = search_from + rel + 3;
                            out.push(HighlightSpan::new(sc.byte_of(i), end, TokenKind::String));
                            i = char_at_byte(&sc, end);
                            continue;
                        }
                    }
                }
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
                    if d == q {
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
                } else {
                    TokenKind::Identifier
                };
                push(&mut out, &sc, i, j, kind);
                i = j;
                continue;
            }
            if c.is_ascii_punctuation() {
                let kind = if matches!(c, ':' | ',' | '(' | ')' | '[' | ']') {
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
        (out, state)
    }
}

fn char_at_byte(sc: &Scanner, byte_pos: usize) -> usize {
    let mut i = 0;
    while i < sc.len() && sc.byte_of(i) < byte_pos {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_quote_spans_lines() {
        let (spans1, state) = PythonHighlighter.highlight(r#"x = """start"#, 0, &LineState::default());
        assert!(spans1.iter().any(|s| s.kind == TokenKind::String));
        assert!(!state.triple_quote.is_empty());

        let (spans2, state2) = PythonHighlighter.highlight(r#"end""" + rest"#, 1, &state);
        assert!(spans2.iter().any(|s| s.kind == TokenKind::String));
        assert!(state2.triple_quote.is_empty());
    }

    #[test]
    fn keyword_and_comment() {
        let (spans, _) = PythonHighlighter.highlight("def f():  # comment", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Keyword));
        assert!(spans.iter().any(|s| s.kind == TokenKind::Comment));
    }
}
