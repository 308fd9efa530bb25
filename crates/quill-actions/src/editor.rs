//! The `Editor`: a buffer list, the kill ring, and the prompt/search/
//! universal-argument state machines that sit above a single `Buffer`
//! (spec.md §4.7). Grounded on the teacher's `EditorState` (owner of
//! `View`s and global editing state in `dispatcher/command.rs`), adapted
//! from one-buffer-per-window to a flat buffer list with a single active
//! index (this editor has no split windows).

use std::path::PathBuf;
use std::sync::Arc;

use quill_state::{Buffer, KillRing};
use quill_syntax::{create_for, detect_for_path, HighlighterEngine, LineSource};
use quill_text::Position;

use crate::types::{PromptState, ReplaceState, SearchState, StatusLine, UniversalArg};

/// Bridges a `Buffer` to `quill_syntax::LineSource` without either crate
/// depending on the other — `quill-actions` is the first crate that knows
/// about both, so the orphan-rule workaround newtype lives here.
pub struct BufLines<'a>(pub &'a Buffer);

impl LineSource for BufLines<'_> {
    fn nrows(&self) -> usize {
        self.0.nrows()
    }
    fn line(&self, row: usize) -> String {
        self.0.line(row)
    }
}

/// A snapshot of a buffer's lines, cheap to hand to the background warmer
/// thread without holding the buffer borrow across threads.
struct SnapshotLines(Vec<String>);

impl LineSource for SnapshotLines {
    fn nrows(&self) -> usize {
        self.0.len()
    }
    fn line(&self, row: usize) -> String {
        self.0.get(row).cloned().unwrap_or_default()
    }
}

/// One open buffer plus the syntax engine that caches its highlighting.
/// The original's `Buffer` owns its `HighlighterEngine` directly; here
/// ownership moves up to `Editor` so `quill-syntax` never has to depend on
/// `quill-state` (see [`crate::editor::BufLines`]).
pub struct BufferSlot {
    pub buffer: Buffer,
    pub engine: HighlighterEngine,
}

impl BufferSlot {
    fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            engine: HighlighterEngine::new(),
        }
    }

    /// (Re-)resolve and install a highlighter for this buffer's filetype.
    pub fn sync_highlighter(&mut self) {
        if !self.buffer.flags.syntax_enabled {
            return;
        }
        let first_line = self.buffer.line(0);
        let filetype = self
            .buffer
            .filetype
            .clone()
            .or_else(|| {
                self.buffer
                    .filename
                    .as_deref()
                    .and_then(|p| detect_for_path(p, &first_line))
            })
            .unwrap_or_else(|| "text".to_string());
        self.buffer.filetype = Some(filetype.clone());
        self.engine.set_highlighter(create_for(&filetype));
    }

    pub fn prefetch_viewport(&self, warm_margin: usize) {
        if !self.buffer.flags.syntax_enabled || !self.engine.has_highlighter() {
            return;
        }
        let (first_row, row_count) = self.buffer.viewport;
        let lines: Vec<String> = (0..self.buffer.nrows()).map(|r| self.buffer.line(r)).collect();
        let src: Arc<dyn LineSource + Send + Sync> = Arc::new(SnapshotLines(lines));
        self.engine
            .prefetch_viewport(src, first_row, row_count.max(1), self.buffer.version(), warm_margin);
    }
}

pub struct Editor {
    slots: Vec<BufferSlot>,
    active: usize,
    pub kill_ring: KillRing,
    /// Set while consecutive kill-like commands run, so they chain onto
    /// the same kill-ring entry instead of pushing a new one each time.
    pub kill_chain: bool,
    pub status: StatusLine,
    pub prompt: PromptState,
    pub prompt_buffer: String,
    pub search: SearchState,
    pub replace: ReplaceState,
    pub uarg: UniversalArg,
    pub quit_requested: bool,
    pub quit_confirm_pending: bool,
    pub cwd: PathBuf,
}

impl Editor {
    pub fn new() -> Self {
        let mut slot = BufferSlot::new(Buffer::scratch());
        slot.buffer.flags.syntax_enabled = true;
        Self {
            slots: vec![slot],
            active: 0,
            kill_ring: KillRing::default(),
            kill_chain: false,
            status: StatusLine::default(),
            prompt: PromptState::None,
            prompt_buffer: String::new(),
            search: SearchState::default(),
            replace: ReplaceState::default(),
            uarg: UniversalArg::default(),
            quit_requested: false,
            quit_confirm_pending: false,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn open_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<usize, quill_state::BufferError> {
        let buffer = Buffer::open_from_file(path)?;
        let mut slot = BufferSlot::new(buffer);
        slot.buffer.flags.syntax_enabled = true;
        slot.sync_highlighter();
        self.slots.push(slot);
        self.active = self.slots.len() - 1;
        Ok(self.active)
    }

    pub fn buffer(&self) -> &Buffer {
        &self.slots[self.active].buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.slots[self.active].buffer
    }

    pub fn slot(&self) -> &BufferSlot {
        &self.slots[self.active]
    }

    pub fn slot_mut(&mut self) -> &mut BufferSlot {
        &mut self.slots[self.active]
    }

    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [BufferSlot] {
        &mut self.slots
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn buffer_count(&self) -> usize {
        self.slots.len()
    }

    pub fn switch_to(&mut self, index: usize) -> bool {
        if index < self.slots.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn next_buffer(&mut self) {
        if !self.slots.is_empty() {
            self.active = (self.active + 1) % self.slots.len();
        }
    }

    pub fn prev_buffer(&mut self) {
        if !self.slots.is_empty() {
            self.active = (self.active + self.slots.len() - 1) % self.slots.len();
        }
    }

    /// Close the active buffer. If it's the last one, replaces it with a
    /// fresh scratch buffer rather than leaving the editor with none.
    pub fn close_active(&mut self) {
        if self.slots.len() == 1 {
            self.slots[0] = BufferSlot::new(Buffer::scratch());
            return;
        }
        self.slots.remove(self.active);
        if self.active >= self.slots.len() {
            self.active = self.slots.len() - 1;
        }
    }

    pub fn any_dirty(&self) -> bool {
        self.slots.iter().any(|s| s.buffer.is_dirty())
    }

    /// Shortest unique path-suffix per buffer, for a buffer-switch prompt
    /// or a tab line: two files named the same get disambiguated by
    /// walking up their paths one component at a time.
    pub fn display_names(&self) -> Vec<String> {
        let full: Vec<Vec<String>> = self
            .slots
            .iter()
            .map(|s| match &s.buffer.filename {
                Some(p) => p
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect(),
                None => vec!["[no name]".to_string()],
            })
            .collect();

        let mut depth = 1usize;
        loop {
            let suffixes: Vec<String> = full
                .iter()
                .map(|parts| {
                    let n = parts.len();
                    let take = depth.min(n);
                    parts[n - take..].join("/")
                })
                .collect();
            let mut unique = suffixes.clone();
            unique.sort();
            unique.dedup();
            if unique.len() == suffixes.len() || depth >= full.iter().map(Vec::len).max().unwrap_or(1) {
                return suffixes;
            }
            depth += 1;
        }
    }

    pub fn set_mark_at_cursor(&mut self) {
        let buf = self.buffer_mut();
        if buf.mark == Some(buf.cursor) {
            buf.mark = None;
        } else {
            buf.mark = Some(buf.cursor);
        }
    }

    /// The marked region as an ordered `(start, end)` pair, or `None` if
    /// there is no mark or it coincides with the cursor.
    pub fn region(&self) -> Option<(Position, Position)> {
        let buf = self.buffer();
        let mark = buf.mark?;
        if mark == buf.cursor {
            return None;
        }
        Some(if mark < buf.cursor { (mark, buf.cursor) } else { (buf.cursor, mark) })
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
