//! Text-mutating commands (spec.md §4.8). Grounded on the original's
//! `Buffer::insertChar`/`deleteChar`/`Editor::killLine` family: every edit
//! opens (or extends) an undo batch, mutates the piece table through the
//! raw primitives, then invalidates the highlighter cache from the edited
//! row onward.

use quill_state::UndoKind;
use quill_text::Position;

use crate::dispatcher::Context;
use crate::handlers::motion::{word_boundary_after, word_boundary_before};

fn invalidate_from(cx: &mut Context, row: usize) {
    cx.editor.slot_mut().engine.invalidate_from(row);
}

pub fn insert(cx: &mut Context) -> bool {
    let Some(text) = cx.arg.clone() else { return false };
    if text.is_empty() {
        return false;
    }
    let repeated = text.repeat(cx.count.max(1) as usize);
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    {
        let buf = cx.editor.buffer_mut();
        buf.undo_begin(UndoKind::Insert, row, col);
        buf.insert_text(row, col, &repeated);
        buf.undo_append_insert(&repeated);
        buf.cursor = Position::new(row, col + repeated.chars().count());
        buf.sync_rx();
    }
    invalidate_from(cx, row);
    true
}

pub fn newline(cx: &mut Context) -> bool {
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    {
        let buf = cx.editor.buffer_mut();
        buf.undo_commit_single(UndoKind::Newline, row, col, "");
        buf.split_line(row, col);
        buf.cursor = Position::new(row + 1, 0);
        buf.sync_rx();
    }
    invalidate_from(cx, row);
    true
}

pub fn backspace(cx: &mut Context) -> bool {
    for _ in 0..cx.count.max(1) {
        let (row, col) = {
            let buf = cx.editor.buffer();
            (buf.cursor.line, buf.cursor.col)
        };
        if col == 0 && row == 0 {
            break;
        }
        if col == 0 {
            // Join with the previous line: record as the inverse of Newline.
            let prev_len = cx.editor.buffer().line(row - 1).chars().count();
            let buf = cx.editor.buffer_mut();
            buf.undo_commit_single(UndoKind::Newline, row - 1, prev_len, "");
            buf.join_lines(row - 1);
            buf.cursor = Position::new(row - 1, prev_len);
            buf.sync_rx();
            invalidate_from(cx, row - 1);
        } else {
            let ch = {
                let buf = cx.editor.buffer();
                buf.line(row).chars().nth(col - 1).unwrap_or(' ').to_string()
            };
            let buf = cx.editor.buffer_mut();
            buf.undo_begin(UndoKind::Delete, row, col - 1);
            buf.delete_text(row, col - 1, ch.len());
            buf.undo_append_delete_left(&ch);
            buf.cursor = Position::new(row, col - 1);
            buf.sync_rx();
            invalidate_from(cx, row);
        }
    }
    true
}

pub fn delete_char(cx: &mut Context) -> bool {
    for _ in 0..cx.count.max(1) {
        let (row, col) = {
            let buf = cx.editor.buffer();
            (buf.cursor.line, buf.cursor.col)
        };
        let len = cx.editor.buffer().line(row).chars().count();
        if col >= len {
            if row + 1 >= cx.editor.buffer().nrows() {
                break;
            }
            let buf = cx.editor.buffer_mut();
            buf.undo_commit_single(UndoKind::Newline, row, col, "");
            buf.join_lines(row);
            buf.cursor = Position::new(row, col);
            buf.sync_rx();
            invalidate_from(cx, row);
        } else {
            let ch = cx.editor.buffer().line(row).chars().nth(col).unwrap_or(' ').to_string();
            let buf = cx.editor.buffer_mut();
            buf.undo_begin(UndoKind::Delete, row, col);
            buf.delete_text(row, col, ch.len());
            buf.undo_append_delete_right(&ch);
            buf.cursor = Position::new(row, col);
            buf.sync_rx();
            invalidate_from(cx, row);
        }
    }
    true
}

fn push_kill(cx: &mut Context, text: &str, forward: bool) {
    if text.is_empty() {
        return;
    }
    if cx.editor.kill_chain {
        if forward {
            cx.editor.kill_ring.append(text);
        } else {
            cx.editor.kill_ring.prepend(text);
        }
    } else {
        cx.editor.kill_ring.push(text);
    }
    cx.editor.kill_chain = true;
}

pub fn kill_to_eol(cx: &mut Context) -> bool {
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    let line = cx.editor.buffer().line(row);
    let len = line.chars().count();
    let killed = if col < len {
        line.chars().skip(col).collect::<String>()
    } else if row + 1 < cx.editor.buffer().nrows() {
        "\n".to_string()
    } else {
        String::new()
    };
    if killed.is_empty() {
        return false;
    }
    if killed == "\n" {
        let buf = cx.editor.buffer_mut();
        buf.undo_commit_single(UndoKind::Newline, row, col, "");
        buf.join_lines(row);
        buf.sync_rx();
    } else {
        let buf = cx.editor.buffer_mut();
        buf.undo_begin(UndoKind::Delete, row, col);
        buf.delete_text(row, col, killed.len());
        buf.undo_append_delete_right(&killed);
        buf.sync_rx();
    }
    invalidate_from(cx, row);
    push_kill(cx, &killed, true);
    true
}

pub fn kill_line(cx: &mut Context) -> bool {
    let row = cx.editor.buffer().cursor.line;
    let text = cx.editor.buffer_mut().delete_row(row);
    if cx.editor.buffer().nrows() == 0 {
        cx.editor.buffer_mut().insert_row(0, "");
    }
    let buf = cx.editor.buffer_mut();
    buf.undo_commit_single(UndoKind::DeleteRow, row, 0, &text);
    buf.cursor = Position::new(row.min(buf.nrows().saturating_sub(1)), 0);
    buf.sync_rx();
    invalidate_from(cx, row);
    push_kill(cx, &format!("{text}\n"), true);
    true
}

pub fn yank(cx: &mut Context) -> bool {
    let Some(text) = cx.editor.kill_ring.head().map(str::to_string) else {
        cx.editor.status.set("Kill ring is empty");
        return false;
    };
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Paste, row, col);
    buf.insert_text(row, col, &text);
    buf.undo_append_insert(&text);
    buf.undo_commit();
    let lines: Vec<&str> = text.split('\n').collect();
    buf.cursor = if lines.len() > 1 {
        Position::new(row + lines.len() - 1, lines.last().unwrap().chars().count())
    } else {
        Position::new(row, col + text.chars().count())
    };
    buf.sync_rx();
    invalidate_from(cx, row);
    true
}

pub fn kill_region(cx: &mut Context) -> bool {
    let Some((start, end)) = cx.editor.region() else {
        return false;
    };
    let text = region_text(cx, start, end);
    delete_region(cx, start, end);
    let buf = cx.editor.buffer_mut();
    buf.mark = None;
    buf.cursor = start;
    buf.sync_rx();
    invalidate_from(cx, start.line);
    push_kill(cx, &text, true);
    true
}

pub fn copy_region(cx: &mut Context) -> bool {
    let Some((start, end)) = cx.editor.region() else {
        return false;
    };
    let text = region_text(cx, start, end);
    cx.editor.buffer_mut().mark = None;
    push_kill(cx, &text, true);
    cx.editor.status.set("Region copied");
    true
}

pub fn flush_kill_ring(cx: &mut Context) -> bool {
    cx.editor.kill_ring.clear();
    cx.editor.status.set("Kill ring cleared");
    false
}

fn region_text(cx: &Context, start: Position, end: Position) -> String {
    let buf = cx.editor.buffer();
    if start.line == end.line {
        return buf.line(start.line).chars().skip(start.col).take(end.col - start.col).collect();
    }
    let mut out = String::new();
    out.push_str(&buf.line(start.line).chars().skip(start.col).collect::<String>());
    out.push('\n');
    for row in start.line + 1..end.line {
        out.push_str(&buf.line(row));
        out.push('\n');
    }
    out.push_str(&buf.line(end.line).chars().take(end.col).collect::<String>());
    out
}

fn delete_region(cx: &mut Context, start: Position, end: Position) {
    let buf = cx.editor.buffer_mut();
    if start.line == end.line {
        let char_len = end.col - start.col;
        let line = buf.line(start.line);
        let byte_len: usize = line.chars().skip(start.col).take(char_len).map(char::len_utf8).sum();
        buf.undo_begin(UndoKind::Delete, start.line, start.col);
        let removed: String = line.chars().skip(start.col).take(char_len).collect();
        buf.delete_text(start.line, start.col, byte_len);
        buf.undo_append_delete_right(&removed);
        buf.undo_commit();
        return;
    }
    buf.undo_begin(UndoKind::Delete, start.line, start.col);
    for row in (start.line..=end.line).rev() {
        if row == start.line {
            let line = buf.line(row);
            let byte_len: usize = line.chars().skip(start.col).map(char::len_utf8).sum();
            let removed: String = line.chars().skip(start.col).collect();
            buf.delete_text(row, start.col, byte_len);
            buf.undo_append_delete_right(&format!("{removed}\n"));
            buf.join_lines(row);
        } else if row == end.line {
            let line = buf.line(row);
            let byte_len: usize = line.chars().take(end.col).map(char::len_utf8).sum();
            buf.delete_text(row, 0, byte_len);
        } else {
            let text = buf.delete_row(row);
            let _ = text;
        }
    }
    buf.undo_commit();
}

pub fn delete_word_prev(cx: &mut Context) -> bool {
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    let line = cx.editor.buffer().line(row);
    let start = word_boundary_before(&line, col);
    if start == col {
        return false;
    }
    let removed: String = line.chars().skip(start).take(col - start).collect();
    let byte_len = removed.len();
    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Delete, row, start);
    buf.delete_text(row, start, byte_len);
    buf.undo_append_delete_left(&removed);
    buf.undo_commit();
    buf.cursor = Position::new(row, start);
    buf.sync_rx();
    invalidate_from(cx, row);
    push_kill(cx, &removed, false);
    true
}

pub fn delete_word_next(cx: &mut Context) -> bool {
    let (row, col) = {
        let buf = cx.editor.buffer();
        (buf.cursor.line, buf.cursor.col)
    };
    let line = cx.editor.buffer().line(row);
    let end = word_boundary_after(&line, col);
    if end == col {
        return false;
    }
    let removed: String = line.chars().skip(col).take(end - col).collect();
    let byte_len = removed.len();
    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Delete, row, col);
    buf.delete_text(row, col, byte_len);
    buf.undo_append_delete_right(&removed);
    buf.undo_commit();
    buf.sync_rx();
    invalidate_from(cx, row);
    push_kill(cx, &removed, true);
    true
}

pub fn indent_region(cx: &mut Context) -> bool {
    let Some((s, e)) = cx.editor.region() else {
        cx.editor.status.set("No region: set a mark first");
        return false;
    };
    let (start_line, end_line) = (s.line, e.line);
    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Insert, start_line, 0);
    for row in start_line..=end_line {
        buf.insert_text(row, 0, "\t");
        buf.undo_append_insert("\t");
    }
    buf.undo_commit();
    buf.sync_rx();
    invalidate_from(cx, start_line);
    true
}

pub fn unindent_region(cx: &mut Context) -> bool {
    let Some((s, e)) = cx.editor.region() else {
        cx.editor.status.set("No region: set a mark first");
        return false;
    };
    let (start_line, end_line) = (s.line, e.line);
    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Delete, start_line, 0);
    for row in start_line..=end_line {
        let line = buf.line(row);
        let strip: String = if line.starts_with('\t') {
            "\t".to_string()
        } else {
            line.chars().take_while(|c| *c == ' ').take(8).collect()
        };
        if !strip.is_empty() {
            buf.delete_text(row, 0, strip.len());
            buf.undo_append_delete_right(&strip);
        }
    }
    buf.undo_commit();
    buf.sync_rx();
    invalidate_from(cx, start_line);
    true
}

/// Greedy-wrap the paragraph under the cursor to `count` columns (default
/// 72), Emacs `fill-paragraph` style: a paragraph is a maximal run of
/// non-blank lines. The dispatcher always normalizes a missing universal
/// argument to `1`, so `count <= 1` is read as "no width given" here.
pub fn reflow_paragraph(cx: &mut Context) -> bool {
    let width = if cx.count > 1 { cx.count as usize } else { 72 };
    let row = cx.editor.buffer().cursor.line;
    let nrows = cx.editor.buffer().nrows();
    let mut start = row;
    while start > 0 && !cx.editor.buffer().line(start - 1).trim().is_empty() {
        start -= 1;
    }
    let mut end = row;
    while end + 1 < nrows && !cx.editor.buffer().line(end + 1).trim().is_empty() {
        end += 1;
    }
    let original_lines: Vec<String> = (start..=end).map(|r| cx.editor.buffer().line(r)).collect();
    let words: Vec<String> =
        original_lines.iter().flat_map(|l| l.split_whitespace().map(str::to_string).collect::<Vec<_>>()).collect();
    if words.is_empty() {
        return false;
    }
    let mut wrapped = Vec::new();
    let mut line = String::new();
    for w in &words {
        if line.is_empty() {
            line = w.clone();
        } else if line.chars().count() + 1 + w.chars().count() <= width {
            line.push(' ');
            line.push_str(w);
        } else {
            wrapped.push(std::mem::take(&mut line));
            line = w.clone();
        }
    }
    if !line.is_empty() {
        wrapped.push(line);
    }

    let original_text = original_lines.join("\n");
    let wrapped_text = wrapped.join("\n");
    if original_text == wrapped_text {
        return false;
    }

    let buf = cx.editor.buffer_mut();
    buf.undo_begin(UndoKind::Delete, start, 0);
    buf.delete_text(start, 0, original_text.len());
    buf.undo_append_delete_right(&original_text);
    buf.undo_commit();
    buf.undo_begin(UndoKind::Insert, start, 0);
    buf.insert_text(start, 0, &wrapped_text);
    buf.undo_append_insert(&wrapped_text);
    buf.undo_commit();
    buf.cursor = Position::new(start, 0);
    buf.sync_rx();
    invalidate_from(cx, start);
    true
}
