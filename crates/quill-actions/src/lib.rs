//! Editor state, the command registry and the dispatcher (spec.md §4.7,
//! §4.8; components C7/C8).

pub mod command;
pub mod dispatcher;
pub mod editor;
pub mod handlers;
pub mod types;

pub use command::{find_by_id, find_by_name, public_commands, CommandId, CommandSpec, COMMANDS};
pub use dispatcher::{Context, Dispatcher};
pub use editor::{BufLines, BufferSlot, Editor};
pub use types::{PromptState, ReplaceState, SearchState, StatusLine, UniversalArg};
