//! Incremental search and two-step find/replace (spec.md §4.8). Grounded
//! on the original's incremental-search prompt: every keystroke re-scans
//! the buffer and moves the cursor to the nearest match; cancelling
//! (`refresh`) restores the cursor and viewport the search started from.

use quill_text::Position;
use regex::Regex;

use crate::dispatcher::Context;
use crate::editor::Editor;
use crate::types::PromptState;

fn find_all(editor: &Editor, pattern: &str, regex: bool) -> Vec<Position> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let buf = editor.buffer();
    let mut out = Vec::new();
    let compiled = if regex { Regex::new(pattern).ok() } else { None };
    for row in 0..buf.nrows() {
        let line = buf.line(row);
        if regex {
            let Some(re) = &compiled else { continue };
            for m in re.find_iter(&line) {
                let col = line[..m.start()].chars().count();
                out.push(Position::new(row, col));
            }
        } else {
            let mut start = 0;
            while let Some(idx) = line[start..].find(pattern) {
                let byte_pos = start + idx;
                let col = line[..byte_pos].chars().count();
                out.push(Position::new(row, col));
                start = byte_pos + pattern.len().max(1);
                if start > line.len() {
                    break;
                }
            }
        }
    }
    out
}

fn nearest_forward(matches: &[Position], from: Position) -> usize {
    matches.iter().position(|&p| p >= from).unwrap_or(0)
}

fn begin(editor: &mut Editor, state: PromptState, regex: bool) {
    editor.search.reset();
    editor.search.regex = regex;
    editor.search.origin = Some((editor.buffer().cursor, editor.buffer().viewport));
    editor.prompt = state;
    editor.prompt_buffer.clear();
}

pub fn find_start(cx: &mut Context) -> bool {
    begin(cx.editor, PromptState::Search, false);
    false
}

pub fn regex_find_start(cx: &mut Context) -> bool {
    begin(cx.editor, PromptState::RegexSearch, true);
    false
}

/// Called after every character is appended to (or removed from) the
/// prompt buffer while a search prompt is active.
pub fn on_prompt_buffer_changed(editor: &mut Editor) {
    match editor.prompt {
        PromptState::Search | PromptState::RegexSearch => {
            let pattern = editor.prompt_buffer.clone();
            let regex = editor.prompt == PromptState::RegexSearch;
            let matches = find_all(editor, &pattern, regex);
            editor.search.pattern = pattern;
            let from = editor.search.origin.map(|(pos, _)| pos).unwrap_or(editor.buffer().cursor);
            editor.search.index = if matches.is_empty() { 0 } else { nearest_forward(&matches, from) };
            editor.search.matches = matches;
            if let Some(pos) = editor.search.current() {
                editor.buffer_mut().cursor = pos;
                editor.buffer_mut().sync_rx();
            } else {
                editor.status.set("No match");
            }
        }
        PromptState::ReplaceFind | PromptState::RegexReplaceFind => {}
        _ => {}
    }
}

/// `refresh` (cancel) while a search prompt is active: restore the
/// pre-search cursor/viewport and drop the search state.
pub fn cancel_search(editor: &mut Editor) {
    if let Some((pos, viewport)) = editor.search.origin {
        editor.buffer_mut().cursor = pos;
        editor.buffer_mut().viewport = viewport;
        editor.buffer_mut().sync_rx();
    }
    editor.search.reset();
}

/// Advance to the next/previous match without leaving the search prompt
/// (bound to the same find-start command pressed again, or an arrow key).
pub fn advance(cx: &mut Context, forward: bool) -> bool {
    if let Some(pos) = cx.editor.search.advance(forward) {
        cx.editor.buffer_mut().cursor = pos;
        cx.editor.buffer_mut().sync_rx();
        true
    } else {
        false
    }
}

pub fn search_replace(cx: &mut Context) -> bool {
    cx.editor.replace = crate::types::ReplaceState { find: String::new(), regex: false };
    cx.editor.prompt = PromptState::ReplaceFind;
    cx.editor.prompt_buffer.clear();
    false
}

pub fn regex_replace(cx: &mut Context) -> bool {
    cx.editor.replace = crate::types::ReplaceState { find: String::new(), regex: true };
    cx.editor.prompt = PromptState::RegexReplaceFind;
    cx.editor.prompt_buffer.clear();
    false
}

/// First prompt accepted: remember the find pattern, advance to the
/// replacement prompt.
pub fn accept_replace_find(cx: &mut Context, input: String) -> bool {
    cx.editor.replace.find = input;
    cx.editor.prompt = if cx.editor.replace.regex {
        PromptState::RegexReplaceWith
    } else {
        PromptState::ReplaceWith
    };
    cx.editor.prompt_buffer.clear();
    false
}

/// Second prompt accepted: replace the first match at or after the cursor
/// and leave the cursor positioned after the replacement.
pub fn accept_replace_with(cx: &mut Context, replacement: String) -> bool {
    cx.editor.prompt = PromptState::None;
    let pattern = cx.editor.replace.find.clone();
    let regex = cx.editor.replace.regex;
    let from = cx.editor.buffer().cursor;
    let matches = find_all(cx.editor, &pattern, regex);
    let Some(&pos) = matches.iter().find(|&&p| p >= from).or_else(|| matches.first()) else {
        cx.editor.status.set("No match");
        return false;
    };
    let line = cx.editor.buffer().line(pos.line);
    let suffix = &line[byte_of(&line, pos.col)..];
    let match_len_chars = if regex {
        Regex::new(&pattern)
            .ok()
            .and_then(|re| re.find(suffix))
            .map(|m| suffix[m.start()..m.end()].chars().count())
            .unwrap_or(pattern.chars().count())
    } else {
        pattern.chars().count()
    };
    let byte_len: usize = line.chars().skip(pos.col).take(match_len_chars).map(char::len_utf8).sum();

    let buf = cx.editor.buffer_mut();
    buf.undo_begin(quill_state::UndoKind::Delete, pos.line, pos.col);
    let removed: String = line.chars().skip(pos.col).take(match_len_chars).collect();
    buf.delete_text(pos.line, pos.col, byte_len);
    buf.undo_append_delete_right(&removed);
    buf.undo_commit();
    buf.undo_begin(quill_state::UndoKind::Insert, pos.line, pos.col);
    buf.insert_text(pos.line, pos.col, &replacement);
    buf.undo_append_insert(&replacement);
    buf.undo_commit();
    buf.cursor = Position::new(pos.line, pos.col + replacement.chars().count());
    buf.sync_rx();
    cx.editor.slot_mut().engine.invalidate_from(pos.line);
    cx.editor.status.set("Replaced");
    true
}

fn byte_of(line: &str, col: usize) -> usize {
    line.chars().take(col).map(char::len_utf8).sum()
}
