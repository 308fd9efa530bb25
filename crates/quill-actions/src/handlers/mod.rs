//! Command handler table. `run` is the single entry point the dispatcher
//! calls once its gate has passed; it also intercepts the handful of
//! "chrome" commands (`Newline`, `Backspace`) that behave differently
//! while a prompt is capturing text instead of editing the buffer.

pub mod edit;
pub mod io;
pub mod misc;
pub mod motion;
pub mod search;

use crate::command::CommandId;
use crate::dispatcher::Context;
use crate::types::PromptState;

pub fn run(id: CommandId, cx: &mut Context) -> bool {
    if cx.editor.prompt != PromptState::None {
        match id {
            CommandId::Newline => return io::accept_prompt(cx),
            CommandId::Backspace => {
                let popped = cx.editor.prompt_buffer.pop().is_some();
                search::on_prompt_buffer_changed(cx.editor);
                return popped;
            }
            CommandId::Refresh => return io::refresh(cx),
            _ => {}
        }
    }

    match id {
        CommandId::Save => io::save(cx),
        CommandId::SaveAs => io::save_as(cx),
        CommandId::Quit => io::quit(cx),
        CommandId::QuitNow => io::quit_now(cx),
        CommandId::SaveQuit => io::save_quit(cx),
        CommandId::Refresh => io::refresh(cx),
        CommandId::KPrefix => misc::k_prefix(cx),
        CommandId::CommandPromptStart => misc::command_prompt_start(cx),
        CommandId::FindStart => search::find_start(cx),
        CommandId::RegexFindStart => search::regex_find_start(cx),
        CommandId::SearchReplace => search::search_replace(cx),
        CommandId::RegexReplace => search::regex_replace(cx),
        CommandId::OpenFileStart => io::open_file_start(cx),
        CommandId::BufferSwitchStart => io::buffer_switch_start(cx),
        CommandId::BufferNext => io::buffer_next(cx),
        CommandId::BufferPrev => io::buffer_prev(cx),
        CommandId::BufferClose => io::buffer_close(cx),
        CommandId::Insert => edit::insert(cx),
        CommandId::Newline => edit::newline(cx),
        CommandId::Backspace => edit::backspace(cx),
        CommandId::DeleteChar => edit::delete_char(cx),
        CommandId::KillToEol => edit::kill_to_eol(cx),
        CommandId::KillLine => edit::kill_line(cx),
        CommandId::Yank => edit::yank(cx),
        CommandId::KillRegion => edit::kill_region(cx),
        CommandId::CopyRegion => edit::copy_region(cx),
        CommandId::FlushKillRing => edit::flush_kill_ring(cx),
        CommandId::FileStart => motion::file_start(cx),
        CommandId::FileEnd => motion::file_end(cx),
        CommandId::ToggleMark => motion::toggle_mark(cx),
        CommandId::JumpToMark => motion::jump_to_mark(cx),
        CommandId::Left => motion::left(cx),
        CommandId::Right => motion::right(cx),
        CommandId::Up => motion::up(cx),
        CommandId::Down => motion::down(cx),
        CommandId::Home => motion::home(cx),
        CommandId::End => motion::end(cx),
        CommandId::PageUp => motion::page_up(cx),
        CommandId::PageDown => motion::page_down(cx),
        CommandId::WordPrev => motion::word_prev(cx),
        CommandId::WordNext => motion::word_next(cx),
        CommandId::DeleteWordPrev => edit::delete_word_prev(cx),
        CommandId::DeleteWordNext => edit::delete_word_next(cx),
        CommandId::MoveCursorTo => motion::move_cursor_to(cx),
        CommandId::GotoLine => {
            cx.editor.prompt = PromptState::GotoLine;
            cx.editor.prompt_buffer.clear();
            false
        }
        CommandId::Undo => misc::undo(cx),
        CommandId::Redo => misc::redo(cx),
        CommandId::IndentRegion => edit::indent_region(cx),
        CommandId::UnindentRegion => edit::unindent_region(cx),
        CommandId::ReflowParagraph => edit::reflow_paragraph(cx),
        CommandId::ToggleReadOnly => io::toggle_read_only(cx),
        CommandId::ReloadBuffer => io::reload_buffer(cx),
        CommandId::ShowHelp => misc::show_help(cx),
        CommandId::Syntax => misc::syntax(cx),
        CommandId::Set => misc::set(cx),
        CommandId::ShowWorkingDirectory => io::show_working_directory(cx),
        CommandId::ChangeWorkingDirectory => io::change_working_directory(cx),
    }
}
