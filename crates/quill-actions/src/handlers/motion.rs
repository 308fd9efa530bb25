//! Cursor motion (spec.md §4.8). Any motion first flushes a pending undo
//! batch — moving the cursor ends the run of adjacent edits the same way
//! a non-adjacent edit would.

use quill_text::Position;

use crate::dispatcher::Context;

fn settle_undo(cx: &mut Context) {
    cx.editor.buffer_mut().undo_commit();
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn word_boundary_before(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut i = col.min(chars.len());
    while i > 0 && !is_word_char(chars[i - 1]) {
        i -= 1;
    }
    while i > 0 && is_word_char(chars[i - 1]) {
        i -= 1;
    }
    i
}

pub fn word_boundary_after(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut i = col.min(n);
    while i < n && !is_word_char(chars[i]) {
        i += 1;
    }
    while i < n && is_word_char(chars[i]) {
        i += 1;
    }
    i
}

fn clamp_col(line_len: usize, col: usize) -> usize {
    col.min(line_len)
}

pub fn left(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        if buf.cursor.col > 0 {
            buf.cursor.col -= 1;
        } else if buf.cursor.line > 0 {
            buf.cursor.line -= 1;
            buf.cursor.col = buf.line(buf.cursor.line).chars().count();
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn right(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        let len = buf.line(buf.cursor.line).chars().count();
        if buf.cursor.col < len {
            buf.cursor.col += 1;
        } else if buf.cursor.line + 1 < buf.nrows() {
            buf.cursor.line += 1;
            buf.cursor.col = 0;
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn up(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        if buf.cursor.line > 0 {
            buf.cursor.line -= 1;
            let len = buf.line(buf.cursor.line).chars().count();
            buf.cursor.col = clamp_col(len, buf.cursor.col);
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn down(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        if buf.cursor.line + 1 < buf.nrows() {
            buf.cursor.line += 1;
            let len = buf.line(buf.cursor.line).chars().count();
            buf.cursor.col = clamp_col(len, buf.cursor.col);
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn home(cx: &mut Context) -> bool {
    settle_undo(cx);
    cx.editor.buffer_mut().cursor.col = 0;
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn end(cx: &mut Context) -> bool {
    settle_undo(cx);
    let buf = cx.editor.buffer_mut();
    buf.cursor.col = buf.line(buf.cursor.line).chars().count();
    buf.sync_rx();
    true
}

pub fn page_up(cx: &mut Context) -> bool {
    settle_undo(cx);
    let page = cx.editor.buffer().viewport.1.max(1);
    let buf = cx.editor.buffer_mut();
    buf.cursor.line = buf.cursor.line.saturating_sub(page);
    let len = buf.line(buf.cursor.line).chars().count();
    buf.cursor.col = clamp_col(len, buf.cursor.col);
    buf.sync_rx();
    true
}

pub fn page_down(cx: &mut Context) -> bool {
    settle_undo(cx);
    let page = cx.editor.buffer().viewport.1.max(1);
    let buf = cx.editor.buffer_mut();
    buf.cursor.line = (buf.cursor.line + page).min(buf.nrows() - 1);
    let len = buf.line(buf.cursor.line).chars().count();
    buf.cursor.col = clamp_col(len, buf.cursor.col);
    buf.sync_rx();
    true
}

pub fn word_prev(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        let line = buf.line(buf.cursor.line);
        if buf.cursor.col == 0 && buf.cursor.line > 0 {
            buf.cursor.line -= 1;
            buf.cursor.col = buf.line(buf.cursor.line).chars().count();
        } else {
            buf.cursor.col = word_boundary_before(&line, buf.cursor.col);
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn word_next(cx: &mut Context) -> bool {
    settle_undo(cx);
    for _ in 0..cx.count {
        let buf = cx.editor.buffer_mut();
        let line = buf.line(buf.cursor.line);
        let len = line.chars().count();
        if buf.cursor.col >= len && buf.cursor.line + 1 < buf.nrows() {
            buf.cursor.line += 1;
            buf.cursor.col = 0;
        } else {
            buf.cursor.col = word_boundary_after(&line, buf.cursor.col);
        }
    }
    cx.editor.buffer_mut().sync_rx();
    true
}

pub fn move_cursor_to(cx: &mut Context) -> bool {
    settle_undo(cx);
    let Some(arg) = &cx.arg else { return false };
    let Some((row_s, col_s)) = arg.split_once(':') else {
        return false;
    };
    let (Ok(row), Ok(col)) = (row_s.trim().parse::<usize>(), col_s.trim().parse::<usize>()) else {
        return false;
    };
    let buf = cx.editor.buffer_mut();
    buf.cursor = Position::new(row.min(buf.nrows() - 1), 0);
    let len = buf.line(buf.cursor.line).chars().count();
    buf.cursor.col = clamp_col(len, col);
    buf.sync_rx();
    true
}

pub fn goto_line(cx: &mut Context) -> bool {
    settle_undo(cx);
    let Some(arg) = &cx.arg else { return false };
    let Ok(line1) = arg.trim().parse::<usize>() else {
        return false;
    };
    let buf = cx.editor.buffer_mut();
    let line = line1.saturating_sub(1).min(buf.nrows() - 1);
    buf.cursor = Position::new(line, 0);
    buf.sync_rx();
    true
}

pub fn file_start(cx: &mut Context) -> bool {
    settle_undo(cx);
    let buf = cx.editor.buffer_mut();
    buf.cursor = Position::origin();
    buf.sync_rx();
    true
}

pub fn file_end(cx: &mut Context) -> bool {
    settle_undo(cx);
    let buf = cx.editor.buffer_mut();
    let last = buf.nrows() - 1;
    let len = buf.line(last).chars().count();
    buf.cursor = Position::new(last, len);
    buf.sync_rx();
    true
}

pub fn toggle_mark(cx: &mut Context) -> bool {
    settle_undo(cx);
    cx.editor.set_mark_at_cursor();
    true
}

pub fn jump_to_mark(cx: &mut Context) -> bool {
    settle_undo(cx);
    if let Some(mark) = cx.editor.buffer().mark {
        let buf = cx.editor.buffer_mut();
        let prior = buf.cursor;
        buf.cursor = mark;
        buf.mark = Some(prior);
        buf.sync_rx();
    }
    true
}
