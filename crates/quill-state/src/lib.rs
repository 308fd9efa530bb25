//! Buffer, undo history, kill ring and diagnostic storage.

mod buffer;
mod diagnostics;
mod kill_ring;
mod undo;

pub use buffer::{Buffer, BufferError, Flags};
pub use diagnostics::{
    DiagPos, Diagnostic, DiagnosticStore, Range, RelatedInformation, Severity,
};
pub use kill_ring::{KillRing, KILL_RING_DEFAULT_CAP};
pub use undo::{UndoKind, UndoStep, UndoTree};
