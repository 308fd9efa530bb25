//! Prefix keys, undo/redo, help and buffer-option commands (spec.md §4.8).

use crate::command;
use crate::dispatcher::Context;
use crate::types::PromptState;

pub fn k_prefix(cx: &mut Context) -> bool {
    cx.editor.kill_chain = true;
    false
}

pub fn command_prompt_start(cx: &mut Context) -> bool {
    cx.editor.prompt = PromptState::Command;
    cx.editor.prompt_buffer.clear();
    false
}

pub fn undo(cx: &mut Context) -> bool {
    for _ in 0..cx.count.max(1) {
        if !cx.editor.buffer_mut().undo() {
            break;
        }
    }
    cx.editor.slot_mut().engine.invalidate_from(0);
    true
}

pub fn redo(cx: &mut Context) -> bool {
    for _ in 0..cx.count.max(1) {
        if !cx.editor.buffer_mut().redo() {
            break;
        }
    }
    cx.editor.slot_mut().engine.invalidate_from(0);
    true
}

pub fn show_help(cx: &mut Context) -> bool {
    let names: Vec<&str> = command::public_commands().map(|c| c.name).collect();
    cx.editor.status.set(names.join(" "));
    false
}

/// `syntax on|off|reload`.
pub fn syntax(cx: &mut Context) -> bool {
    match cx.arg.as_deref() {
        Some("off") => {
            cx.editor.buffer_mut().flags.syntax_enabled = false;
            cx.editor.status.set("Syntax off");
        }
        Some("on") => {
            cx.editor.buffer_mut().flags.syntax_enabled = true;
            cx.editor.slot_mut().sync_highlighter();
            cx.editor.status.set("Syntax on");
        }
        Some("reload") => {
            cx.editor.slot_mut().sync_highlighter();
            cx.editor.slot_mut().engine.invalidate_from(0);
            cx.editor.status.set("Syntax reloaded");
        }
        _ => cx.editor.status.set("Usage: syntax on|off|reload"),
    }
    false
}

/// `set key=value`; only `filetype` is recognized today.
pub fn set(cx: &mut Context) -> bool {
    let Some(arg) = cx.arg.clone() else {
        cx.editor.status.set("Usage: set key=value");
        return false;
    };
    let Some((key, value)) = arg.split_once('=') else {
        cx.editor.status.set("Usage: set key=value");
        return false;
    };
    match key.trim() {
        "filetype" => {
            cx.editor.buffer_mut().filetype = Some(value.trim().to_string());
            cx.editor.slot_mut().sync_highlighter();
            cx.editor.slot_mut().engine.invalidate_from(0);
            cx.editor.status.set(format!("filetype={}", value.trim()));
        }
        other => cx.editor.status.set(format!("Unknown option: {other}")),
    }
    false
}
