//! Buffer lifecycle and prompt-entry commands (spec.md §4.8): save/quit,
//! opening and switching buffers, and the handful of bookkeeping commands
//! that don't touch text.

use std::path::PathBuf;

use crate::dispatcher::Context;
use crate::types::PromptState;

pub fn save(cx: &mut Context) -> bool {
    let buf = cx.editor.buffer_mut();
    if !buf.flags.file_backed {
        cx.editor.prompt = PromptState::SaveAs;
        cx.editor.prompt_buffer.clear();
        return false;
    }
    match buf.save() {
        Ok(()) => {
            cx.editor.status.set("Saved");
            true
        }
        Err(e) => {
            cx.editor.status.set(format!("Save failed: {e}"));
            false
        }
    }
}

pub fn save_as(cx: &mut Context) -> bool {
    cx.editor.prompt = PromptState::SaveAs;
    cx.editor.prompt_buffer.clear();
    false
}

pub fn quit(cx: &mut Context) -> bool {
    if cx.editor.any_dirty() && !cx.editor.quit_confirm_pending {
        cx.editor.quit_confirm_pending = true;
        cx.editor.status.set("Unsaved changes — run quit again to discard, or save-quit");
        return false;
    }
    cx.editor.quit_requested = true;
    true
}

pub fn quit_now(cx: &mut Context) -> bool {
    cx.editor.quit_requested = true;
    true
}

pub fn save_quit(cx: &mut Context) -> bool {
    for slot in cx.editor.slots_mut() {
        if slot.buffer.flags.file_backed && slot.buffer.is_dirty() {
            let _ = slot.buffer.save();
        }
    }
    cx.editor.quit_requested = true;
    true
}

pub fn refresh(cx: &mut Context) -> bool {
    if cx.editor.prompt != PromptState::None {
        cx.editor.prompt = PromptState::None;
        cx.editor.prompt_buffer.clear();
        crate::handlers::search::cancel_search(cx.editor);
        cx.editor.status.set("Cancelled");
    }
    false
}

pub fn open_file_start(cx: &mut Context) -> bool {
    cx.editor.prompt = PromptState::OpenFile;
    cx.editor.prompt_buffer.clear();
    false
}

pub fn buffer_switch_start(cx: &mut Context) -> bool {
    cx.editor.prompt = PromptState::BufferSwitch;
    cx.editor.prompt_buffer.clear();
    false
}

pub fn buffer_next(cx: &mut Context) -> bool {
    cx.editor.next_buffer();
    false
}

pub fn buffer_prev(cx: &mut Context) -> bool {
    cx.editor.prev_buffer();
    false
}

pub fn buffer_close(cx: &mut Context) -> bool {
    cx.editor.close_active();
    true
}

pub fn reload_buffer(cx: &mut Context) -> bool {
    let Some(path) = cx.editor.buffer().filename.clone() else {
        cx.editor.status.set("No file to reload");
        return false;
    };
    match quill_state::Buffer::open_from_file(&path) {
        Ok(fresh) => {
            *cx.editor.buffer_mut() = fresh;
            cx.editor.slot_mut().sync_highlighter();
            cx.editor.status.set("Reloaded");
            true
        }
        Err(e) => {
            cx.editor.status.set(format!("Reload failed: {e}"));
            false
        }
    }
}

pub fn toggle_read_only(cx: &mut Context) -> bool {
    let buf = cx.editor.buffer_mut();
    buf.flags.read_only = !buf.flags.read_only;
    let state = if buf.flags.read_only { "on" } else { "off" };
    cx.editor.status.set(format!("Read-only {state}"));
    false
}

pub fn show_working_directory(cx: &mut Context) -> bool {
    let cwd = cx.editor.cwd.display().to_string();
    cx.editor.status.set(cwd);
    false
}

pub fn change_working_directory(cx: &mut Context) -> bool {
    let Some(arg) = cx.arg.clone() else { return false };
    let path = PathBuf::from(arg);
    match std::env::set_current_dir(&path) {
        Ok(()) => {
            cx.editor.cwd = path;
            cx.editor.status.set("Changed directory");
            false
        }
        Err(e) => {
            cx.editor.status.set(format!("chdir failed: {e}"));
            false
        }
    }
}

/// Complete the `SaveAs`/`OpenFile`/`BufferSwitch`/`Chdir` prompts once the
/// user accepts (presses Newline while the prompt is active). Returns to
/// `PromptState::None` regardless of outcome.
pub fn accept_prompt(cx: &mut Context) -> bool {
    let input = std::mem::take(&mut cx.editor.prompt_buffer);
    let state = cx.editor.prompt;
    cx.editor.prompt = PromptState::None;
    match state {
        PromptState::SaveAs => match cx.editor.buffer_mut().save_as(&input) {
            Ok(()) => {
                cx.editor.status.set("Saved");
                true
            }
            Err(e) => {
                cx.editor.status.set(format!("Save failed: {e}"));
                false
            }
        },
        PromptState::OpenFile => match cx.editor.open_file(&input) {
            Ok(_) => {
                cx.editor.slot_mut().sync_highlighter();
                false
            }
            Err(e) => {
                cx.editor.status.set(format!("Open failed: {e}"));
                false
            }
        },
        PromptState::BufferSwitch => {
            let names = cx.editor.display_names();
            if let Some(idx) = names.iter().position(|n| n == &input) {
                cx.editor.switch_to(idx);
            } else {
                cx.editor.status.set(format!("No such buffer: {input}"));
            }
            false
        }
        PromptState::Chdir => {
            cx.arg = Some(input);
            change_working_directory(cx)
        }
        PromptState::Command => crate::dispatcher::Dispatcher::dispatch_named(cx.editor, &input, None),
        PromptState::GotoLine => {
            cx.arg = Some(input);
            crate::handlers::motion::goto_line(cx)
        }
        PromptState::Search | PromptState::RegexSearch => {
            cx.editor.search.reset();
            false
        }
        PromptState::ReplaceFind | PromptState::RegexReplaceFind => crate::handlers::search::accept_replace_find(cx, input),
        PromptState::ReplaceWith | PromptState::RegexReplaceWith => crate::handlers::search::accept_replace_with(cx, input),
        PromptState::None | PromptState::Confirm => false,
    }
}
