//! Entry point: CLI parsing and wiring `quill-state`/`quill-syntax`/
//! `quill-actions`/`quill-lsp` into a running `Editor` (spec.md §6).
//!
//! There is no renderer or input loop in scope here — those are a
//! frontend's job — so `main` does the one thing the core promises a
//! frontend: parse arguments, build the editor, open the requested files,
//! and hand back exit codes that match spec.md §6 exactly.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{info, warn};

use quill_actions::Editor;
use quill_lsp::{LspManager, LspServerConfig};
use quill_state::DiagnosticStore;
use quill_text::Position;

const EXIT_OK: u8 = 0;
const EXIT_FRONTEND_INIT_FAILURE: u8 = 1;
const EXIT_BAD_USAGE: u8 = 2;

/// `prog [--gui|-g|--term|-t] [+N] [files...]` (spec.md §6). `--gui`/
/// `--term` are accepted so frontends share one argument surface with the
/// core, but this binary doesn't act on them — it has no renderer to pick.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "A modal, multi-frontend code editor core")]
struct Args {
    #[arg(short = 'g', long = "gui", conflicts_with = "term")]
    gui: bool,
    #[arg(short = 't', long = "term")]
    term: bool,
    files: Vec<PathBuf>,
}

fn configure_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Pulls a leading `+N` token out of the raw argv before clap ever sees it;
/// clap has no natural way to parse a bare `+5` positional. Applies once,
/// to the first file argument, per spec.md §6.
fn extract_goto_line(raw_args: &[String]) -> (Option<usize>, Vec<String>) {
    let mut goto = None;
    let mut rest = Vec::with_capacity(raw_args.len());
    for arg in raw_args {
        if goto.is_none() && arg.len() > 1 && arg.starts_with('+') && arg[1..].bytes().all(|b| b.is_ascii_digit()) {
            goto = arg[1..].parse::<usize>().ok();
            continue;
        }
        rest.push(arg.clone());
    }
    (goto, rest)
}

/// Servers a frontend would reasonably want autostarted out of the box;
/// embedding applications are free to call `register_server` with their
/// own table instead.
fn register_default_servers(manager: &mut LspManager) {
    manager.register_server(
        "rust",
        LspServerConfig { root_patterns: vec!["Cargo.toml".into()], ..LspServerConfig::new("rust-analyzer", Vec::new()) },
    );
    manager.register_server(
        "python",
        LspServerConfig {
            root_patterns: vec!["pyproject.toml".into(), "setup.py".into()],
            ..LspServerConfig::new("pylsp", Vec::new())
        },
    );
    manager.register_server(
        "go",
        LspServerConfig { root_patterns: vec!["go.mod".into()], ..LspServerConfig::new("gopls", Vec::new()) },
    );
}

fn run() -> Result<ExitCode, anyhow::Error> {
    configure_logging();

    let raw: Vec<String> = env::args().skip(1).collect();
    let (goto_line, rest) = extract_goto_line(&raw);
    let args = match Args::try_parse_from(std::iter::once("quill".to_string()).chain(rest)) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return Ok(ExitCode::from(EXIT_BAD_USAGE));
        }
    };

    let mut editor = Editor::new();

    // The LSP manager's diagnostics handler runs on a background reader
    // thread and needs a buffer's current line text to convert UTF-16 wire
    // positions to UTF-8 scalar columns. Rather than hand it a reference
    // into `editor` (which the main thread keeps mutating), it gets its own
    // snapshot, refreshed here whenever a buffer is opened.
    let line_snapshots: Arc<Mutex<HashMap<String, Vec<String>>>> = Arc::new(Mutex::new(HashMap::new()));
    let line_lookup = {
        let line_snapshots = line_snapshots.clone();
        Arc::new(move |uri: &str, line: usize| -> Option<String> {
            line_snapshots.lock().unwrap().get(uri)?.get(line).cloned()
        })
    };
    let diagnostics = Arc::new(Mutex::new(DiagnosticStore::new()));
    let mut manager = LspManager::new(diagnostics.clone(), line_lookup);
    register_default_servers(&mut manager);

    for (index, path) in args.files.iter().enumerate() {
        match editor.open_file(path) {
            Ok(_) => {
                if index == 0 {
                    if let Some(line) = goto_line {
                        editor.buffer_mut().cursor = Position::new(line.saturating_sub(1), 0);
                    }
                }
                let uri = LspManager::uri_for_path(path);
                let buffer = editor.buffer();
                let language_id = buffer.filetype.clone().unwrap_or_else(|| "text".to_string());
                let start_dir = path.parent().map(PathBuf::from).unwrap_or_else(|| editor.cwd.clone());
                let version = buffer.version() as i64;
                let lines: Vec<String> = (0..buffer.nrows()).map(|r| buffer.line(r)).collect();
                let full_text = lines.join("\n");
                line_snapshots.lock().unwrap().insert(uri.clone(), lines);
                if let Err(err) = manager.on_buffer_opened(&uri, &language_id, version, &full_text, &start_dir) {
                    warn!(target: "cli.lsp", %uri, %err, "failed to notify language server of opened buffer");
                }
            }
            Err(err) => {
                warn!(target: "cli", path = %path.display(), %err, "failed to open file");
            }
        }
    }

    info!(target: "cli", buffers = editor.buffer_count(), "quill core initialized");
    manager.stop_all_servers();

    Ok(ExitCode::from(EXIT_OK))
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("quill: {err}");
            ExitCode::from(EXIT_FRONTEND_INIT_FAILURE)
        }
    }
}
