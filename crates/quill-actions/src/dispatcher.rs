//! The five-step dispatch gate (spec.md §4.8). Grounded on the teacher's
//! `Dispatcher::dispatch` (`dispatcher/command.rs`): unknown command is a
//! no-op, a pending quit-confirmation lapses unless the next command keeps
//! it alive, kill-chaining commands are the only ones allowed to preserve
//! `kill_chain`, and a read-only buffer blocks mutating commands outside an
//! active prompt.

use crate::command::{self, CommandId};
use crate::editor::Editor;
use crate::types::PromptState;

pub struct Context<'a> {
    pub editor: &'a mut Editor,
    pub arg: Option<String>,
    pub count: i64,
}

pub struct Dispatcher;

impl Dispatcher {
    /// Dispatch a known command id. Returns `true` if the command ran (and
    /// possibly mutated state), `false` if the gate rejected it.
    pub fn dispatch(editor: &mut Editor, id: CommandId, arg: Option<String>) -> bool {
        let spec = command::find_by_id(id);

        if editor.quit_confirm_pending && !matches!(id, CommandId::Quit | CommandId::KPrefix) {
            editor.quit_confirm_pending = false;
        }

        if !spec.kill_like {
            editor.kill_chain = false;
        }

        let prompt_active = editor.prompt != PromptState::None;
        if spec.mutates && editor.buffer().flags.read_only && !prompt_active {
            editor.status.set("Read-only buffer");
            return false;
        }

        let count = editor.uarg.take().unwrap_or(1).max(1);
        let mut cx = Context { editor, arg, count };
        crate::handlers::run(id, &mut cx);
        true
    }

    /// Dispatch by command name (the `:` prompt, or a keymap entry keyed
    /// by name rather than id). An unknown name is a no-op that only sets
    /// the status line.
    pub fn dispatch_named(editor: &mut Editor, name: &str, arg: Option<String>) -> bool {
        match command::find_by_name(name) {
            Some(spec) => Self::dispatch(editor, spec.id, arg),
            None => {
                editor.status.set(format!("Unknown command: {name}"));
                false
            }
        }
    }

    /// Feed a printable character: appended to the prompt buffer while a
    /// prompt is active, otherwise dispatched as `Insert`.
    pub fn dispatch_char(editor: &mut Editor, ch: char) -> bool {
        if editor.prompt != PromptState::None {
            editor.prompt_buffer.push(ch);
            crate::handlers::search::on_prompt_buffer_changed(editor);
            return true;
        }
        Self::dispatch(editor, CommandId::Insert, Some(ch.to_string()))
    }
}
