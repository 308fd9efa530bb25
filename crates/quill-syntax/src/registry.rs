//! Filetype normalization, detection and highlighter construction
//! (spec.md §4.6). Ported from `syntax/HighlighterRegistry.cc`, including its
//! runtime `Register` extensibility hook.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use crate::highlighter::Highlighter;
use crate::lexers::{cpp, go, json, lisp, markdown, null, python, rust_lexer, shell, sql};

pub type Factory = Arc<dyn Fn() -> Box<dyn Highlighter> + Send + Sync>;

fn external_registry() -> &'static Mutex<HashMap<String, Factory>> {
    static REG: OnceLock<Mutex<HashMap<String, Factory>>> = OnceLock::new();
    REG.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Normalize aliases and extensions (`"py"`, `"c++"`, `"mkd"`, ...) to the
/// canonical filetype id used throughout this crate.
pub fn normalize(ft: &str) -> String {
    let f = ft.to_lowercase();
    match f.as_str() {
        "c" | "c++" | "cc" | "hpp" | "hh" | "h" | "cxx" | "cpp" => "cpp".to_string(),
        "json" => "json".to_string(),
        "markdown" | "md" | "mkd" | "mdown" => "markdown".to_string(),
        "shell" | "sh" | "bash" | "zsh" | "ksh" | "fish" => "shell".to_string(),
        "go" | "golang" => "go".to_string(),
        "py" | "python" => "python".to_string(),
        "rs" | "rust" => "rust".to_string(),
        "lisp" | "scheme" | "scm" | "rkt" | "el" | "clj" | "cljc" | "cl" => "lisp".to_string(),
        "sql" | "sqlite" | "sqlite3" => "sql".to_string(),
        other => other.to_string(),
    }
}

/// Register (or override) a factory for a normalized filetype. Lets
/// embedders plug in a highlighter this crate doesn't ship.
pub fn register(filetype: &str, factory: Factory, override_existing: bool) {
    let ft = normalize(filetype);
    let mut reg = external_registry().lock().unwrap();
    if !override_existing && reg.contains_key(&ft) {
        return;
    }
    reg.insert(ft, factory);
}

pub fn is_registered(filetype: &str) -> bool {
    let ft = normalize(filetype);
    external_registry().lock().unwrap().contains_key(&ft) || builtin(&ft).is_some()
}

pub fn registered_filetypes() -> Vec<String> {
    external_registry().lock().unwrap().keys().cloned().collect()
}

fn builtin(ft: &str) -> Option<Box<dyn Highlighter>> {
    let h: Box<dyn Highlighter> = match ft {
        "cpp" => Box::new(cpp::CppHighlighter),
        "json" => Box::new(json::JsonHighlighter),
        "markdown" => Box::new(markdown::MarkdownHighlighter),
        "shell" => Box::new(shell::ShellHighlighter),
        "go" => Box::new(go::GoHighlighter),
        "python" => Box::new(python::PythonHighlighter),
        "rust" => Box::new(rust_lexer::RustHighlighter),
        "lisp" => Box::new(lisp::LispHighlighter),
        "sql" => Box::new(sql::SqlHighlighter),
        _ => return None,
    };
    Some(h)
}

/// Construct a highlighter for `filetype`. Externally registered factories
/// take priority over the built-ins; an unknown filetype falls back to
/// [`null::NullHighlighter`] rather than `None`, so callers never need a
/// "no highlighter" branch (spec.md §4.6 edge case).
pub fn create_for(filetype: &str) -> Box<dyn Highlighter> {
    let ft = normalize(filetype);
    if let Some(factory) = external_registry().lock().unwrap().get(&ft) {
        return factory();
    }
    builtin(&ft).unwrap_or_else(|| Box::new(null::NullHighlighter))
}

fn shebang_to_filetype(first_line: &str) -> Option<&'static str> {
    if !first_line.starts_with("#!") {
        return None;
    }
    let low = first_line.to_lowercase();
    if low.contains("python") {
        return Some("python");
    }
    if low.contains("bash") || low.contains("zsh") || low.contains("fish") || low.contains("sh") {
        return Some("shell");
    }
    if low.contains("scheme") || low.contains("racket") || low.contains("guile") {
        return Some("lisp");
    }
    None
}

/// Detect a filetype id from a path's extension, falling back to a shebang
/// on the first line. Returns `None` (not `NullHighlighter`'s ft) when
/// nothing matches, so callers can distinguish "unknown" from "detected null".
pub fn detect_for_path(path: &Path, first_line: &str) -> Option<String> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_lowercase();
        let ft = match ext.as_str() {
            "c" | "cc" | "cpp" | "cxx" | "h" | "hpp" | "hh" => Some("cpp"),
            "json" => Some("json"),
            "md" | "markdown" | "mkd" => Some("markdown"),
            "sh" | "bash" | "zsh" | "ksh" | "fish" => Some("shell"),
            "go" => Some("go"),
            "py" => Some("python"),
            "rs" => Some("rust"),
            "lisp" | "scm" | "rkt" | "el" | "clj" | "cljc" | "cl" => Some("lisp"),
            "sql" | "sqlite" => Some("sql"),
            _ => None,
        };
        if let Some(ft) = ft {
            return Some(ft.to_string());
        }
    }
    shebang_to_filetype(first_line).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_aliases() {
        assert_eq!(normalize("py"), "python");
        assert_eq!(normalize("C++"), "cpp");
        assert_eq!(normalize("mkd"), "markdown");
    }

    #[test]
    fn detect_by_extension() {
        assert_eq!(detect_for_path(Path::new("main.rs"), ""), Some("rust".into()));
        assert_eq!(detect_for_path(Path::new("script"), "#!/usr/bin/env python3"), Some("python".into()));
        assert_eq!(detect_for_path(Path::new("noext"), "plain text"), None);
    }

    #[test]
    fn unknown_filetype_falls_back_to_null() {
        let h = create_for("cobol");
        let (spans, _) = h.highlight("hello", 0, &crate::types::LineState::default());
        assert_eq!(spans.len(), 1);
    }
}
