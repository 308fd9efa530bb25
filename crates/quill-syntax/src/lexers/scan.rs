//! Shared char-indexed scanning helper for the hand-rolled lexers in this
//! module. Every lexer below walks a line by *character* index (so a
//! multi-byte scalar is never split across two spans) but reports spans in
//! *byte* offsets, since that's what `quill_text::PieceTable` addresses.

use crate::types::{HighlightSpan, TokenKind};

pub struct Scanner<'a> {
    chars: Vec<(usize, char)>,
    byte_len: usize,
    _src: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            chars: s.char_indices().collect(),
            byte_len: s.len(),
            _src: s,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn at(&self, i: usize) -> Option<char> {
        self.chars.get(i).map(|&(_, c)| c)
    }

    /// Byte offset of char index `i`; `i == len()` yields the line's byte length.
    pub fn byte_of(&self, i: usize) -> usize {
        self.chars.get(i).map(|&(b, _)| b).unwrap_or(self.byte_len)
    }

    pub fn text(&self, a: usize, b: usize) -> String {
        let start = self.byte_of(a);
        let end = self.byte_of(b);
        self._src[start..end].to_string()
    }
}

pub fn push(out: &mut Vec<HighlightSpan>, sc: &Scanner, a: usize, b: usize, kind: TokenKind) {
    if b > a {
        out.push(HighlightSpan::new(sc.byte_of(a), sc.byte_of(b), kind));
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}
