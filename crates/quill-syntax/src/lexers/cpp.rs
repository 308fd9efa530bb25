//! Ported from `CppHighlighter.cc`: the one highlighter whose state
//! (unterminated block comments and raw strings) spans multiple lines,
//! exercised directly by the raw-string cache-coherency scenario.

use super::scan::{is_ident_char, is_ident_start, is_space, push, Scanner};
use crate::highlighter::Highlighter;
use crate::types::{HighlightSpan, LineState, TokenKind};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "break", "continue", "return", "goto",
    "struct", "class", "namespace", "using", "template", "typename", "public", "private", "protected", "virtual",
    "override", "const", "constexpr", "auto", "static", "inline", "operator", "new", "delete", "try", "catch",
    "throw", "friend", "enum", "union", "extern", "volatile", "mutable", "noexcept", "sizeof", "this",
];

const TYPES: &[&str] = &[
    "int", "long", "short", "char", "signed", "unsigned", "float", "double", "void", "bool", "wchar_t", "size_t",
    "ptrdiff_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "int8_t", "int16_t", "int32_t", "int64_t",
];

pub struct CppHighlighter;

impl Highlighter for CppHighlighter {
    fn is_stateful(&self) -> bool {
        true
    }

    fn highlight(&self, line: &str, _row: usize, prev: &LineState) -> (Vec<HighlightSpan>, LineState) {
        let mut state = prev.clone();
        let sc = Scanner::new(line);
        let n = sc.len();
        let mut out = Vec::new();
        if sc.is_empty() {
            return (out, state);
        }

        let mut bol = 0usize;
        while bol < n && is_space(sc.at(bol).unwrap()) {
            bol += 1;
        }
        let mut i = 0usize;

        if state.in_raw_string {
            let needle = format!("){}\"", state.raw_delim);
            match line.find(&needle) {
                None => {
                    push(&mut out, &sc, 0, n, TokenKind::String);
                    return (out, state);
                }
                Some(byte_pos) => {
                    let end_byte = byte_pos + needle.len();
                    out.push(HighlightSpan::new(0, end_byte, TokenKind::String));
                    i = sc_char_at_byte(&sc, end_byte);
                    state.in_raw_string = false;
                    state.raw_delim.clear();
                }
            }
        }

        if state.in_block_comment {
            let j0 = i;
            let mut closed = false;
            while i + 1 < n {
                if sc.at(i).unwrap() == '*' && sc.at(i + 1).unwrap() == '/' {
                    i += 2;
                    push(&mut out, &sc, j0, i, TokenKind::Comment);
                    state.in_block_comment = false;
                    closed = true;
                    break;
                }
                i += 1;
            }
            if !closed {
                push(&mut out, &sc, j0, n, TokenKind::Comment);
                return (out, state);
            }
        }

        while i < n {
            let c = sc.at(i).unwrap();
            if i == bol && c == '#' {
                push(&mut out, &sc, 0, n, TokenKind::Preproc);
                break;
            }
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
                state.in_block_comment = true;
                return (out, state);
            }
            if c == 'R' && i + 1 < n && sc.at(i + 1).unwrap() == '"' {
                let mut k = i + 2;
                let mut delim = String::new();
                while k < n && sc.at(k).unwrap() != '(' {
                    delim.push(sc.at(k).unwrap());
                    k += 1;
                }
                if k < n && sc.at(k).unwrap() == '(' {
                    let body_start_byte = sc.byte_of(k + 1);
                    let needle = format!("){delim}\"");
                    match line[body_start_byte..].find(&needle) {
                        None => {
                            push(&mut out, &sc, i, n, TokenKind::String);
                            state.in_raw_string = true;
                            state.raw_delim = delim;
                            return (out, state);
                        }
                        Some(rel) => {
                            let end_byte = body_start_byte + rel + needle.len();
                            out.push(HighlightSpan::new(sc.byte_of(i), end_byte, TokenKind::String));
                            i = sc_char_at_byte(&sc, end_byte);
                            continue;
                        }
                    }
                }
                // malformed raw-string prefix: fall through, 'R' treated as an identifier below.
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
            if c == '\'' {
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
                    if d == '\'' {
                        break;
                    }
                }
                push(&mut out, &sc, i, j, TokenKind::Char);
                i = j;
                continue;
            }
            if c.is_ascii_digit() || (c == '.' && i + 1 < n && sc.at(i + 1).unwrap().is_ascii_digit()) {
                let mut j = i + 1;
                while j < n {
                    let d = sc.at(j).unwrap();
                    if d.is_alphanumeric() || matches!(d, '.' | 'x' | 'X' | 'b' | 'B' | '_') {
                        j += 1;
                    } else {
                        break;
                    }
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
            if c.is_ascii_punctuation() && c != '_' && c != '#' {
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

        (out, state)
    }
}

/// Resume char-index scanning after splicing in a byte-addressed span (the
/// raw-string/block-comment continuations above locate a needle with
/// `str::find`, which returns a byte offset).
fn sc_char_at_byte(sc: &Scanner, byte_pos: usize) -> usize {
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
    fn keywords_and_preproc() {
        let (spans, _) = CppHighlighter.highlight("#include <a>", 0, &LineState::default());
        assert!(spans.iter().any(|s| s.kind == TokenKind::Preproc));
    }

    #[test]
    fn raw_string_spans_multiple_lines() {
        // S4 from spec.md §8: R"DELIM(...)DELIM" spanning two lines.
        let (spans1, state) =
            CppHighlighter.highlight(r#"auto s = R"DELIM(unterminated"#, 0, &LineState::default());
        assert!(spans1.iter().any(|s| s.kind == TokenKind::String));
        assert!(state.in_raw_string);
        assert_eq!(state.raw_delim, "DELIM");

        let (spans2, state2) = CppHighlighter.highlight(r#"closing)DELIM" tail;"#, 1, &state);
        assert!(spans2.iter().any(|s| s.kind == TokenKind::String));
        assert!(!state2.in_raw_string);
    }

    #[test]
    fn block_comment_spans_multiple_lines() {
        let (_, state) = CppHighlighter.highlight("/* start", 0, &LineState::default());
        assert!(state.in_block_comment);
        let (spans, state2) = CppHighlighter.highlight("still comment */ int x;", 1, &state);
        assert!(spans.iter().any(|s| s.kind == TokenKind::Comment));
        assert!(!state2.in_block_comment);
        assert!(spans.iter().any(|s| s.kind == TokenKind::Type));
    }
}
