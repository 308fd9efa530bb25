//! Piece-table text storage (spec.md §4.1, C1).
//!
//! Two immutable-once-written byte sequences — `original` (the file contents
//! at load) and `add` (an append-only edit log) — plus an ordered list of
//! `Piece`s that stitches slices of either into the logical document. Edits
//! never copy existing bytes; they only append to `add` and splice the piece
//! list.

use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Original,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    source: Source,
    start: usize,
    len: usize,
}

/// Append-only piece-table document. Cloning copies the backing buffers, so
/// prefer sharing behind a single owner ([`crate`] callers generally wrap one
/// per buffer) rather than cloning hot loops.
#[derive(Clone)]
pub struct PieceTable {
    original: Vec<u8>,
    add: Vec<u8>,
    pieces: Vec<Piece>,
    len: usize,
    // Sorted byte offsets where each line starts; `None` when stale.
    line_cache: RefCell<Option<Vec<usize>>>,
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceTable {
    pub fn new() -> Self {
        Self {
            original: Vec::new(),
            add: Vec::new(),
            pieces: Vec::new(),
            len: 0,
            line_cache: RefCell::new(None),
        }
    }

    /// Construct a piece table whose initial content is `bytes`, stored in
    /// the immutable `original` buffer (as if just loaded from disk).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        let pieces = if len == 0 {
            Vec::new()
        } else {
            vec![Piece {
                source: Source::Original,
                start: 0,
                len,
            }]
        };
        Self {
            original: bytes,
            add: Vec::new(),
            pieces,
            len,
            line_cache: RefCell::new(None),
        }
    }

    pub fn byte_size(&self) -> usize {
        self.len
    }

    fn invalidate(&self) {
        *self.line_cache.borrow_mut() = None;
    }

    fn source_slice(&self, source: Source) -> &[u8] {
        match source {
            Source::Original => &self.original,
            Source::Add => &self.add,
        }
    }

    /// Locate the piece containing absolute byte `offset`, returning its
    /// index and the offset local to that piece. `None` means `offset`
    /// points exactly at the end of the document (append position).
    fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        let mut cum = 0usize;
        for (i, p) in self.pieces.iter().enumerate() {
            if offset < cum + p.len {
                return Some((i, offset - cum));
            }
            cum += p.len;
        }
        None
    }

    /// Append `bytes` to the end of the document.
    pub fn append(&mut self, bytes: &[u8]) {
        self.insert(self.len, bytes);
    }

    /// Insert `bytes` at `offset`, clamped to `[0, byte_size()]`.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let offset = offset.min(self.len);
        let add_start = self.add.len();
        self.add.extend_from_slice(bytes);
        let new_piece = Piece {
            source: Source::Add,
            start: add_start,
            len: bytes.len(),
        };

        match self.locate(offset) {
            None => {
                self.pieces.push(new_piece);
            }
            Some((i, local)) => {
                let piece = self.pieces[i];
                let mut rebuilt = Vec::with_capacity(self.pieces.len() + 2);
                rebuilt.extend_from_slice(&self.pieces[..i]);
                if local > 0 {
                    rebuilt.push(Piece {
                        source: piece.source,
                        start: piece.start,
                        len: local,
                    });
                }
                rebuilt.push(new_piece);
                if local < piece.len {
                    rebuilt.push(Piece {
                        source: piece.source,
                        start: piece.start + local,
                        len: piece.len - local,
                    });
                }
                rebuilt.extend_from_slice(&self.pieces[i + 1..]);
                self.pieces = rebuilt;
            }
        }
        self.len += bytes.len();
        self.invalidate();
    }

    /// Delete `[offset, offset+len)`, clamped to the document's bounds.
    /// Never fatal on out-of-range input.
    pub fn delete(&mut self, offset: usize, len: usize) {
        if len == 0 || offset >= self.len {
            return;
        }
        let start = offset;
        let end = (offset + len).min(self.len);
        if start >= end {
            return;
        }

        let mut rebuilt = Vec::with_capacity(self.pieces.len());
        let mut cum = 0usize;
        for p in &self.pieces {
            let piece_start = cum;
            let piece_end = cum + p.len;
            cum = piece_end;
            if piece_end <= start || piece_start >= end {
                rebuilt.push(*p);
                continue;
            }
            let local_start = start.max(piece_start) - piece_start;
            let local_end = end.min(piece_end) - piece_start;
            if local_start > 0 {
                rebuilt.push(Piece {
                    source: p.source,
                    start: p.start,
                    len: local_start,
                });
            }
            if local_end < p.len {
                rebuilt.push(Piece {
                    source: p.source,
                    start: p.start + local_end,
                    len: p.len - local_end,
                });
            }
        }
        self.pieces = rebuilt;
        self.len -= end - start;
        self.invalidate();
    }

    /// Materialize the byte range `[start, end)`, clamped to document bounds.
    pub fn bytes_range(&self, start: usize, end: usize) -> Vec<u8> {
        let start = start.min(self.len);
        let end = end.min(self.len);
        if start >= end {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(end - start);
        let mut cum = 0usize;
        for p in &self.pieces {
            let piece_start = cum;
            let piece_end = cum + p.len;
            cum = piece_end;
            if piece_end <= start || piece_start >= end {
                continue;
            }
            let local_start = start.max(piece_start) - piece_start;
            let local_end = end.min(piece_end) - piece_start;
            let slice = self.source_slice(p.source);
            out.extend_from_slice(&slice[p.start + local_start..p.start + local_end]);
        }
        out
    }

    /// Materialize the whole document.
    pub fn data(&self) -> Vec<u8> {
        self.bytes_range(0, self.len)
    }

    fn line_starts(&self) -> Vec<usize> {
        if let Some(cached) = self.line_cache.borrow().as_ref() {
            return cached.clone();
        }
        let data = self.data();
        let mut starts = vec![0usize];
        for (i, &b) in data.iter().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        *self.line_cache.borrow_mut() = Some(starts.clone());
        starts
    }

    /// Number of logical lines. An empty document has exactly one (empty)
    /// line; a document ending in `\n` has a trailing empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    /// Half-open byte range of line `i`, excluding any trailing `\n`.
    /// Out-of-range `i` clamps to the last line.
    pub fn get_line_range(&self, i: usize) -> (usize, usize) {
        let starts = self.line_starts();
        let i = i.min(starts.len() - 1);
        let start = starts[i];
        let end = if i + 1 < starts.len() {
            starts[i + 1] - 1
        } else {
            self.len
        };
        (start, end)
    }

    pub fn get_line(&self, i: usize) -> Vec<u8> {
        let (s, e) = self.get_line_range(i);
        self.bytes_range(s, e)
    }

    /// Resolve `(row, col)` — `col` in UTF-8 scalar units — to an absolute
    /// byte offset by binary-searching the line index then walking scalars.
    /// `col = usize::MAX` clamps to end of line (before any `\n`).
    pub fn line_col_to_byte_offset(&self, row: usize, col: usize) -> usize {
        let (line_start, line_end) = self.get_line_range(row);
        if col == usize::MAX {
            return line_end;
        }
        let line_bytes = self.bytes_range(line_start, line_end);
        let line_str = String::from_utf8_lossy(&line_bytes);
        let mut count = 0usize;
        for (idx, _) in line_str.char_indices() {
            if count == col {
                return line_start + idx;
            }
            count += 1;
        }
        line_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_into_empty() {
        let mut pt = PieceTable::new();
        pt.insert(0, b"hello");
        assert_eq!(pt.data(), b"hello");
        assert_eq!(pt.byte_size(), 5);
    }

    #[test]
    fn insert_splits_piece() {
        let mut pt = PieceTable::from_bytes(b"abcdef".to_vec());
        pt.insert(3, b"XYZ");
        assert_eq!(pt.data(), b"abcXYZdef");
    }

    #[test]
    fn delete_trims_and_removes_pieces() {
        let mut pt = PieceTable::from_bytes(b"abcdef".to_vec());
        pt.insert(6, b"ghi"); // abcdefghi, two pieces
        pt.delete(2, 5); // remove "cdefg"
        assert_eq!(pt.data(), b"abhi");
    }

    #[test]
    fn delete_across_original_and_add_boundary() {
        let mut pt = PieceTable::from_bytes(b"ab\ncd\nef".to_vec());
        pt.delete(1, 4); // delete "b\ncd"
        assert_eq!(pt.data(), b"a\nef");
    }

    #[test]
    fn insert_then_delete_round_trips() {
        let mut pt = PieceTable::from_bytes(b"hello world".to_vec());
        pt.insert(5, b", there");
        pt.delete(5, 7);
        assert_eq!(pt.data(), b"hello world");
    }

    #[test]
    fn line_index_and_byte_offsets() {
        let pt = PieceTable::from_bytes(b"ab\ncd\nef".to_vec());
        assert_eq!(pt.line_count(), 3);
        assert_eq!(pt.get_line(0), b"ab");
        assert_eq!(pt.get_line(1), b"cd");
        assert_eq!(pt.get_line(2), b"ef");
        assert_eq!(pt.line_col_to_byte_offset(1, 1), 4);
        assert_eq!(pt.line_col_to_byte_offset(1, usize::MAX), 5);
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        let pt = PieceTable::from_bytes(b"a\nb\n".to_vec());
        assert_eq!(pt.line_count(), 3);
        assert_eq!(pt.get_line(2), b"");
    }

    #[test]
    fn out_of_range_offsets_clamp_not_panic() {
        let mut pt = PieceTable::from_bytes(b"ab".to_vec());
        pt.insert(999, b"c");
        assert_eq!(pt.data(), b"abc");
        pt.delete(0, 999);
        assert_eq!(pt.data(), b"");
        pt.delete(0, 5); // no-op on empty
        assert_eq!(pt.data(), b"");
    }

    #[test]
    fn empty_document_has_one_line() {
        let pt = PieceTable::new();
        assert_eq!(pt.line_count(), 1);
        assert_eq!(pt.get_line(0), b"");
    }
}
