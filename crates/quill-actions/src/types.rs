//! Editor-level state machines (spec.md §4.7): the prompt state machine,
//! the universal-argument accumulator, and incremental search state.

use quill_text::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    None,
    Command,
    OpenFile,
    SaveAs,
    Chdir,
    Confirm,
    GotoLine,
    Search,
    RegexSearch,
    ReplaceFind,
    ReplaceWith,
    RegexReplaceFind,
    RegexReplaceWith,
    BufferSwitch,
}

impl Default for PromptState {
    fn default() -> Self {
        PromptState::None
    }
}

/// `C-u`-style repeat-count accumulator. `C-u` alone multiplies by 4 on each
/// repetition (4, 16, 64, ...); typed digits override the value outright;
/// a leading `-` negates it.
#[derive(Debug, Clone, Default)]
pub struct UniversalArg {
    active: bool,
    value: i64,
    typed_digits: bool,
    negative: bool,
}

impl UniversalArg {
    /// `C-u` pressed with no digits typed yet: start at 4, or multiply an
    /// already-active bare accumulation by 4.
    pub fn begin_or_repeat(&mut self) {
        if self.active && !self.typed_digits {
            self.value *= 4;
        } else {
            self.active = true;
            self.value = 4;
            self.typed_digits = false;
            self.negative = false;
        }
    }

    pub fn push_digit(&mut self, d: u32) {
        if !self.active {
            self.active = true;
            self.value = 0;
        }
        if !self.typed_digits {
            self.value = 0;
            self.typed_digits = true;
        }
        self.value = self.value * 10 + d as i64;
    }

    pub fn negate(&mut self) {
        self.active = true;
        self.negative = !self.negative;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Consume the accumulated count (resetting to inactive) for attachment
    /// to the next non-`UArgStatus` command.
    pub fn take(&mut self) -> Option<i64> {
        if !self.active {
            return None;
        }
        let v = if self.negative { -self.value } else { self.value };
        *self = UniversalArg::default();
        Some(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub pattern: String,
    pub regex: bool,
    pub matches: Vec<Position>,
    pub index: usize,
    /// Cursor and viewport to restore on cancel.
    pub origin: Option<(Position, (usize, usize))>,
}

impl SearchState {
    pub fn reset(&mut self) {
        *self = SearchState::default();
    }

    pub fn current(&self) -> Option<Position> {
        self.matches.get(self.index).copied()
    }

    pub fn advance(&mut self, forward: bool) -> Option<Position> {
        if self.matches.is_empty() {
            return None;
        }
        if forward {
            self.index = (self.index + 1) % self.matches.len();
        } else {
            self.index = (self.index + self.matches.len() - 1) % self.matches.len();
        }
        self.current()
    }
}

/// Two-step find/replace state (spec.md §4.8).
#[derive(Debug, Clone, Default)]
pub struct ReplaceState {
    pub find: String,
    pub regex: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub text: String,
    pub set_at: Option<std::time::Instant>,
}

impl StatusLine {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Some(std::time::Instant::now());
    }
}
