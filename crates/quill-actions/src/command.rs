//! The command table (spec.md §4.8, §6): a stable id/name pair per command,
//! exposed to keymaps and to the `:` prompt. Grounded on the teacher's
//! `Action` + handler-table split (`dispatcher/mod.rs`), adapted from a
//! modal key-translation table to this editor's flat, Emacs-style command
//! set (no Normal/Insert modes here — every command is always "live",
//! gated only by the read-only/prompt rules in [`crate::dispatcher`]).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Save,
    SaveAs,
    Quit,
    QuitNow,
    SaveQuit,
    Refresh,
    KPrefix,
    CommandPromptStart,
    FindStart,
    RegexFindStart,
    SearchReplace,
    RegexReplace,
    OpenFileStart,
    BufferSwitchStart,
    BufferNext,
    BufferPrev,
    BufferClose,
    Insert,
    Newline,
    Backspace,
    DeleteChar,
    KillToEol,
    KillLine,
    Yank,
    KillRegion,
    CopyRegion,
    FlushKillRing,
    FileStart,
    FileEnd,
    ToggleMark,
    JumpToMark,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    WordPrev,
    WordNext,
    DeleteWordPrev,
    DeleteWordNext,
    MoveCursorTo,
    GotoLine,
    Undo,
    Redo,
    IndentRegion,
    UnindentRegion,
    ReflowParagraph,
    ToggleReadOnly,
    ReloadBuffer,
    ShowHelp,
    Syntax,
    Set,
    ShowWorkingDirectory,
    ChangeWorkingDirectory,
}

pub struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub help: &'static str,
    pub is_public: bool,
    /// The read-only gate (spec.md §4.8 step 4) blocks these unless a
    /// prompt is active.
    pub mutates: bool,
    /// Kill-chain-preserving commands (spec.md §4.8 step 3): everything
    /// else clears `Editor::kill_chain` before it runs.
    pub kill_like: bool,
}

macro_rules! spec {
    ($id:ident, $name:literal, $help:literal, pub=$pub:literal, mutates=$mut:literal, kill=$kill:literal) => {
        CommandSpec {
            id: CommandId::$id,
            name: $name,
            help: $help,
            is_public: $pub,
            mutates: $mut,
            kill_like: $kill,
        }
    };
}

pub const COMMANDS: &[CommandSpec] = &[
    spec!(Save, "save", "Write the current buffer to disk", pub=true, mutates=false, kill=false),
    spec!(SaveAs, "save-as", "Write the current buffer to a new path", pub=true, mutates=false, kill=false),
    spec!(Quit, "quit", "Quit, prompting if buffers are dirty", pub=true, mutates=false, kill=false),
    spec!(QuitNow, "quit-now", "Quit without prompting", pub=true, mutates=false, kill=false),
    spec!(SaveQuit, "save-quit", "Save every dirty buffer, then quit", pub=true, mutates=false, kill=false),
    spec!(Refresh, "refresh", "Redraw / cancel the active prompt", pub=true, mutates=false, kill=false),
    spec!(KPrefix, "k-prefix", "Begin a C-k-style kill chain prefix", pub=false, mutates=false, kill=true),
    spec!(CommandPromptStart, "command-prompt-start", "Open the ':' command prompt", pub=true, mutates=false, kill=false),
    spec!(FindStart, "find-start", "Begin a literal incremental search", pub=true, mutates=false, kill=false),
    spec!(RegexFindStart, "regex-find-start", "Begin a regex incremental search", pub=true, mutates=false, kill=false),
    spec!(SearchReplace, "search-replace", "Begin a literal find/replace", pub=true, mutates=false, kill=false),
    spec!(RegexReplace, "regex-replace", "Begin a regex find/replace", pub=true, mutates=false, kill=false),
    spec!(OpenFileStart, "open-file-start", "Prompt for a file to open", pub=true, mutates=false, kill=false),
    spec!(BufferSwitchStart, "buffer-switch-start", "Prompt for a buffer to switch to", pub=true, mutates=false, kill=false),
    spec!(BufferNext, "buffer-next", "Switch to the next buffer", pub=true, mutates=false, kill=false),
    spec!(BufferPrev, "buffer-prev", "Switch to the previous buffer", pub=true, mutates=false, kill=false),
    spec!(BufferClose, "buffer-close", "Close the current buffer", pub=true, mutates=false, kill=false),
    spec!(Insert, "insert", "Insert text at the cursor", pub=false, mutates=true, kill=false),
    spec!(Newline, "newline", "Split the line at the cursor", pub=false, mutates=true, kill=false),
    spec!(Backspace, "backspace", "Delete the character left of the cursor", pub=false, mutates=true, kill=false),
    spec!(DeleteChar, "delete-char", "Delete the character under/right of the cursor", pub=false, mutates=true, kill=false),
    spec!(KillToEol, "kill-to-eol", "Kill to end of line", pub=true, mutates=true, kill=true),
    spec!(KillLine, "kill-line", "Kill the whole current line", pub=true, mutates=true, kill=true),
    spec!(Yank, "yank", "Insert the most recent kill", pub=true, mutates=true, kill=false),
    spec!(KillRegion, "kill-region", "Kill the marked region", pub=true, mutates=true, kill=true),
    spec!(CopyRegion, "copy-region", "Copy the marked region to the kill ring", pub=true, mutates=false, kill=true),
    spec!(FlushKillRing, "flush-kill-ring", "Clear the kill ring", pub=true, mutates=false, kill=false),
    spec!(FileStart, "file-start", "Move to the start of the buffer", pub=true, mutates=false, kill=false),
    spec!(FileEnd, "file-end", "Move to the end of the buffer", pub=true, mutates=false, kill=false),
    spec!(ToggleMark, "toggle-mark", "Set or clear the mark at the cursor", pub=true, mutates=false, kill=false),
    spec!(JumpToMark, "jump-to-mark", "Move the cursor to the mark", pub=true, mutates=false, kill=false),
    spec!(Left, "left", "Move left", pub=true, mutates=false, kill=false),
    spec!(Right, "right", "Move right", pub=true, mutates=false, kill=false),
    spec!(Up, "up", "Move up", pub=true, mutates=false, kill=false),
    spec!(Down, "down", "Move down", pub=true, mutates=false, kill=false),
    spec!(Home, "home", "Move to start of line", pub=true, mutates=false, kill=false),
    spec!(End, "end", "Move to end of line", pub=true, mutates=false, kill=false),
    spec!(PageUp, "page-up", "Scroll up one page", pub=true, mutates=false, kill=false),
    spec!(PageDown, "page-down", "Scroll down one page", pub=true, mutates=false, kill=false),
    spec!(WordPrev, "word-prev", "Move to the previous word", pub=true, mutates=false, kill=false),
    spec!(WordNext, "word-next", "Move to the next word", pub=true, mutates=false, kill=false),
    spec!(DeleteWordPrev, "delete-word-prev", "Delete the previous word", pub=true, mutates=true, kill=true),
    spec!(DeleteWordNext, "delete-word-next", "Delete the next word", pub=true, mutates=true, kill=true),
    spec!(MoveCursorTo, "move-cursor-to", "Move the cursor to row:col", pub=true, mutates=false, kill=false),
    spec!(GotoLine, "goto-line", "Prompt for a 1-based line number", pub=true, mutates=false, kill=false),
    spec!(Undo, "undo", "Undo the last committed edit", pub=true, mutates=true, kill=false),
    spec!(Redo, "redo", "Redo the next committed edit", pub=true, mutates=true, kill=false),
    spec!(IndentRegion, "indent-region", "Indent the marked region", pub=true, mutates=true, kill=false),
    spec!(UnindentRegion, "unindent-region", "Unindent the marked region", pub=true, mutates=true, kill=false),
    spec!(ReflowParagraph, "reflow-paragraph", "Greedy-wrap the current paragraph", pub=true, mutates=true, kill=false),
    spec!(ToggleReadOnly, "toggle-read-only", "Toggle the read-only flag", pub=true, mutates=false, kill=false),
    spec!(ReloadBuffer, "reload-buffer", "Reload the buffer from disk", pub=true, mutates=false, kill=false),
    spec!(ShowHelp, "show-help", "List public commands", pub=true, mutates=false, kill=false),
    spec!(Syntax, "syntax", "on|off|reload syntax highlighting", pub=true, mutates=false, kill=false),
    spec!(Set, "set", "Set a buffer-local option (key=value)", pub=true, mutates=false, kill=false),
    spec!(ShowWorkingDirectory, "show-working-directory", "Print the working directory", pub=true, mutates=false, kill=false),
    spec!(ChangeWorkingDirectory, "change-working-directory", "Change the working directory", pub=true, mutates=false, kill=false),
];

pub fn find_by_name(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub fn find_by_id(id: CommandId) -> &'static CommandSpec {
    COMMANDS
        .iter()
        .find(|c| c.id == id)
        .expect("every CommandId has a table entry")
}

pub fn public_commands() -> impl Iterator<Item = &'static CommandSpec> {
    COMMANDS.iter().filter(|c| c.is_public)
}
