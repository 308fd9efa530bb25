//! The editable document (spec.md §4.2, C2): a `PieceTable` plus cursor,
//! viewport, dirty tracking and an owned undo history.

use std::fs;
use std::path::{Path, PathBuf};

use quill_text::{PieceTable, Position};
use thiserror::Error;

use crate::undo::{UndoKind, UndoTree};

const TAB_STOP: usize = 8;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer is not backed by a file")]
    NotFileBacked,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub dirty: bool,
    pub read_only: bool,
    pub file_backed: bool,
    pub syntax_enabled: bool,
}

pub struct Buffer {
    table: PieceTable,
    pub cursor: Position,
    /// Tab-expanded render column for `cursor`, recomputed by `sync_rx`.
    pub rx: usize,
    pub viewport: (usize, usize),
    pub mark: Option<Position>,
    pub flags: Flags,
    pub filetype: Option<String>,
    pub filename: Option<PathBuf>,
    pub version: u64,
    undo: UndoTree,
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~')
        && (rest.is_empty() || rest.starts_with('/'))
        && let Some(home) = std::env::var_os("HOME")
    {
        let mut p = PathBuf::from(home);
        if !rest.is_empty() {
            p.push(rest.trim_start_matches('/'));
        }
        return p;
    }
    PathBuf::from(path)
}

fn render_col(line: &str, col: usize) -> usize {
    let mut rx = 0usize;
    for (i, ch) in line.chars().enumerate() {
        if i >= col {
            break;
        }
        if ch == '\t' {
            rx += TAB_STOP - (rx % TAB_STOP);
        } else {
            rx += 1;
        }
    }
    rx
}

impl Buffer {
    /// An empty, unnamed scratch buffer.
    pub fn scratch() -> Self {
        Self::from_text(None, Vec::new())
    }

    /// An in-memory buffer with `name` as a cosmetic (non-file-backed) label.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        let mut b = Self::from_text(None, content.as_bytes().to_vec());
        b.filename = Some(PathBuf::from(name.into()));
        b
    }

    fn from_text(filename: Option<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            table: PieceTable::from_bytes(bytes),
            cursor: Position::origin(),
            rx: 0,
            viewport: (0, 0),
            mark: None,
            flags: Flags::default(),
            filetype: None,
            filename,
            version: 0,
            undo: UndoTree::new(),
        }
    }

    /// Load a file from disk. A nonexistent path yields an empty,
    /// not-file-backed buffer carrying that name (the file is created on
    /// first successful save) rather than failing — spec.md §4.2.
    pub fn open_from_file(path: impl AsRef<Path>) -> Result<Self, BufferError> {
        let raw = path.as_ref().to_string_lossy().to_string();
        let expanded = expand_tilde(&raw);
        if expanded.exists() {
            let canonical = fs::canonicalize(&expanded).unwrap_or(expanded);
            let bytes = fs::read(&canonical)?;
            let mut buf = Self::from_text(Some(canonical), bytes);
            buf.flags.file_backed = true;
            Ok(buf)
        } else {
            let mut buf = Self::from_text(Some(expanded), Vec::new());
            buf.flags.file_backed = false;
            Ok(buf)
        }
    }

    pub fn save(&mut self) -> Result<(), BufferError> {
        if !self.flags.file_backed {
            return Err(BufferError::NotFileBacked);
        }
        let path = self.filename.clone().ok_or(BufferError::NotFileBacked)?;
        fs::write(&path, self.table.data())?;
        self.mark_saved();
        Ok(())
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), BufferError> {
        let expanded = expand_tilde(&path.as_ref().to_string_lossy());
        fs::write(&expanded, self.table.data())?;
        self.filename = Some(expanded);
        self.flags.file_backed = true;
        self.mark_saved();
        Ok(())
    }

    // ---- content queries -------------------------------------------------

    pub fn nrows(&self) -> usize {
        self.table.line_count()
    }

    pub fn line(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.table.get_line(row)).into_owned()
    }

    pub fn line_byte_len(&self, row: usize) -> usize {
        let (s, e) = self.table.get_line_range(row);
        e - s
    }

    pub fn full_text(&self) -> String {
        String::from_utf8_lossy(&self.table.data()).into_owned()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.dirty
    }

    /// Recompute `rx` (tab-expanded render column) from `cursor`.
    pub fn sync_rx(&mut self) {
        let line = self.line(self.cursor.line);
        self.rx = render_col(&line, self.cursor.col);
    }

    fn clamp_cursor(&mut self) {
        let nrows = self.nrows();
        if self.cursor.line >= nrows {
            self.cursor.line = nrows - 1;
        }
        let len = self.line(self.cursor.line).chars().count();
        if self.cursor.col > len {
            self.cursor.col = len;
        }
    }

    fn bump_version(&mut self) {
        self.version += 1;
        self.flags.dirty = true;
    }

    fn sync_dirty(&mut self) {
        self.flags.dirty = self.undo.is_dirty();
    }

    // ---- raw edit primitives (no undo recording, no cursor movement) ----

    pub fn insert_text(&mut self, row: usize, col: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = self.table.line_col_to_byte_offset(row, col);
        self.table.insert(offset, text.as_bytes());
        self.bump_version();
        self.clamp_cursor();
    }

    /// Delete `len` bytes starting at `(row, col)`.
    pub fn delete_text(&mut self, row: usize, col: usize, len: usize) {
        if len == 0 {
            return;
        }
        let offset = self.table.line_col_to_byte_offset(row, col);
        self.table.delete(offset, len);
        self.bump_version();
        self.clamp_cursor();
    }

    pub fn split_line(&mut self, row: usize, col: usize) {
        self.insert_text(row, col, "\n");
    }

    /// Join line `row` with `row + 1` by removing the newline between them.
    /// No-op if `row` is the last line.
    pub fn join_lines(&mut self, row: usize) {
        if row + 1 >= self.nrows() {
            return;
        }
        let (_, end) = self.table.get_line_range(row);
        self.table.delete(end, 1);
        self.bump_version();
        self.clamp_cursor();
    }

    /// Insert a whole new line of `text` before line `row`.
    pub fn insert_row(&mut self, row: usize, text: &str) {
        let offset = self.table.line_col_to_byte_offset(row, 0);
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(b'\n');
        self.table.insert(offset, &bytes);
        self.bump_version();
        self.clamp_cursor();
    }

    /// Remove line `row` entirely (including its trailing newline, if any)
    /// and return its text (excluding the newline).
    pub fn delete_row(&mut self, row: usize) -> String {
        let (start, end) = self.table.get_line_range(row);
        let text = self.line(row);
        let has_trailing_nl = end < self.table.byte_size();
        let delete_len = if has_trailing_nl { end - start + 1 } else { end - start };
        self.table.delete(start, delete_len);
        self.bump_version();
        self.clamp_cursor();
        text
    }

    // ---- undo-aware helpers (spec.md §4.3) -------------------------------

    pub fn undo_begin(&mut self, kind: UndoKind, row: usize, col: usize) {
        self.undo.begin(kind, row, col);
    }
    pub fn undo_append_insert(&mut self, text: &str) {
        self.undo.append_insert(text);
    }
    pub fn undo_append_delete_left(&mut self, text: &str) {
        self.undo.append_delete_left(text);
    }
    pub fn undo_append_delete_right(&mut self, text: &str) {
        self.undo.append_delete_right(text);
    }
    pub fn undo_commit(&mut self) {
        self.undo.commit();
        self.sync_dirty();
    }
    pub fn undo_commit_single(&mut self, kind: UndoKind, row: usize, col: usize, text: &str) {
        self.undo.commit_single(kind, row, col, text);
        self.sync_dirty();
    }
    pub fn undo_discard_pending(&mut self) {
        self.undo.discard_pending();
    }

    fn apply_step(&mut self, step: &crate::undo::UndoStep, direction: i8) {
        use UndoKind::*;
        match step.kind {
            Insert | Paste => {
                if direction > 0 {
                    self.insert_text(step.row, step.col, &step.text);
                } else {
                    self.delete_text(step.row, step.col, step.text.len());
                }
            }
            Delete => {
                if direction > 0 {
                    self.delete_text(step.row, step.col, step.text.len());
                } else {
                    self.insert_text(step.row, step.col, &step.text);
                }
            }
            Newline => {
                if direction > 0 {
                    self.split_line(step.row, step.col);
                } else {
                    self.join_lines(step.row);
                }
            }
            DeleteRow => {
                if direction > 0 {
                    self.delete_row(step.row);
                } else {
                    self.insert_row(step.row, &step.text);
                }
            }
        }
        self.cursor = Position::new(step.row, step.col);
        self.sync_rx();
    }

    /// Undo the current history node, moving `current` to its parent.
    /// Returns `false` if already at the root (nothing to undo).
    pub fn undo(&mut self) -> bool {
        self.undo.discard_pending();
        match self.undo.take_undo() {
            Some(step) => {
                self.apply_step(&step, -1);
                self.sync_dirty();
                true
            }
            None => false,
        }
    }

    /// Redo the most recently committed child branch. Returns `false` if
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.undo.take_redo() {
            Some(step) => {
                self.apply_step(&step, 1);
                self.sync_dirty();
                true
            }
            None => false,
        }
    }

    pub fn mark_saved(&mut self) {
        self.undo.mark_saved();
        self.sync_dirty();
    }

    pub fn clear_undo(&mut self) {
        self.undo.clear();
        self.sync_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_undo_redo_roundtrip() {
        // S1 from spec.md §8: Insert "Hello", Undo, Redo.
        let mut b = Buffer::scratch();
        b.undo_begin(UndoKind::Insert, 0, 0);
        b.insert_text(0, 0, "Hello");
        b.undo_append_insert("Hello");
        b.undo_commit();
        assert_eq!(b.line(0), "Hello");
        assert!(b.is_dirty());

        assert!(b.undo());
        assert_eq!(b.line(0), "");

        assert!(b.redo());
        assert_eq!(b.line(0), "Hello");
    }

    #[test]
    fn piece_table_splice_across_lines() {
        // S2 from spec.md §8.
        let mut b = Buffer::from_str("t", "ab\ncd\nef");
        b.delete_text(0, 1, 4); // delete "b\ncd\n"
        assert_eq!(b.line(0), "aef");
        assert_eq!(b.nrows(), 1);
        assert_eq!(b.full_text(), "aef");
    }

    #[test]
    fn split_and_join_lines_round_trip() {
        let mut b = Buffer::from_str("t", "abcd");
        b.split_line(0, 2);
        assert_eq!(b.nrows(), 2);
        assert_eq!(b.line(0), "ab");
        assert_eq!(b.line(1), "cd");
        b.join_lines(0);
        assert_eq!(b.nrows(), 1);
        assert_eq!(b.line(0), "abcd");
    }

    #[test]
    fn insert_row_then_delete_row_restores_buffer() {
        let mut b = Buffer::from_str("t", "one\ntwo");
        b.insert_row(1, "inserted");
        assert_eq!(b.nrows(), 3);
        assert_eq!(b.line(1), "inserted");
        let removed = b.delete_row(1);
        assert_eq!(removed, "inserted");
        assert_eq!(b.nrows(), 2);
        assert_eq!(b.full_text(), "one\ntwo");
    }

    #[test]
    fn save_point_tracks_dirty_across_undo() {
        let mut b = Buffer::scratch();
        b.undo_begin(UndoKind::Insert, 0, 0);
        b.insert_text(0, 0, "x");
        b.undo_append_insert("x");
        b.undo_commit();
        b.flags.file_backed = true;
        b.filename = Some(PathBuf::from("/tmp/does-not-matter"));
        b.mark_saved();
        assert!(!b.is_dirty());

        b.undo_begin(UndoKind::Insert, 0, 1);
        b.insert_text(0, 1, "y");
        b.undo_append_insert("y");
        b.undo_commit();
        assert!(b.is_dirty());

        assert!(b.undo());
        assert!(!b.is_dirty(), "returning to the save point clears dirty");
    }

    #[test]
    fn version_strictly_increases_on_mutation() {
        let mut b = Buffer::scratch();
        let v0 = b.version();
        b.insert_text(0, 0, "a");
        assert!(b.version() > v0);
        let v1 = b.version();
        b.delete_text(0, 0, 1);
        assert!(b.version() > v1);
    }

    #[test]
    fn load_save_round_trip_is_byte_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, b"line1\r\nline2\r\n").unwrap();
        let mut b = Buffer::open_from_file(&path).unwrap();
        assert!(b.flags.file_backed);
        b.save().unwrap();
        let after = std::fs::read(&path).unwrap();
        assert_eq!(after, b"line1\r\nline2\r\n");
    }

    #[test]
    fn open_missing_file_is_not_fatal() {
        let b = Buffer::open_from_file("/tmp/quill-definitely-missing-xyz").unwrap();
        assert!(!b.flags.file_backed);
        assert_eq!(b.nrows(), 1);
    }
}
