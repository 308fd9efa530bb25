//! Per-language server lifecycle and URI↔buffer bookkeeping (spec.md §4.9,
//! C9). Ported from `LspManager.{h,cc}`: a `language_id → client` map, a
//! `language_id → LspServerConfig` table, workspace-root detection cached
//! by `(start_dir, patterns)`, and the four buffer event handlers that
//! drive `didOpen`/`didChange`/`didClose`/`didSave`.
//!
//! Diagnostics arrive on the reader thread still carrying LSP wire (UTF-16)
//! positions; converting them to UTF-8 scalar columns needs the buffer's
//! current line text, which this crate doesn't own, so the manager is
//! handed a `line_lookup` closure by whatever wires it to an `Editor`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use quill_state::{DiagPos, Diagnostic, DiagnosticStore, Range, RelatedInformation, Severity};
use quill_text::utf_codec::utf16_units_to_utf8_col;

use crate::process_client::{DiagnosticsHandler, LspError, LspProcessClient};
use crate::protocol::{RawDiagnostic, RawPos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone)]
pub struct LspServerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub file_patterns: Vec<String>,
    pub root_patterns: Vec<String>,
    pub preferred_sync_mode: SyncMode,
    pub autostart: bool,
    pub init_options: Option<Value>,
    pub settings: Option<Value>,
}

impl LspServerConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            file_patterns: Vec::new(),
            root_patterns: Vec::new(),
            preferred_sync_mode: SyncMode::Full,
            autostart: true,
            init_options: None,
            settings: None,
        }
    }
}

type LineLookup = Arc<dyn Fn(&str, usize) -> Option<String> + Send + Sync>;

pub struct LspManager {
    configs: HashMap<String, LspServerConfig>,
    clients: HashMap<String, LspProcessClient>,
    uri_language: HashMap<String, String>,
    diagnostics: Arc<Mutex<DiagnosticStore>>,
    root_cache: Mutex<HashMap<String, PathBuf>>,
    line_lookup: LineLookup,
    request_timeout_ms: u64,
    max_pending: usize,
}

impl LspManager {
    pub fn new(diagnostics: Arc<Mutex<DiagnosticStore>>, line_lookup: LineLookup) -> Self {
        Self {
            configs: HashMap::new(),
            clients: HashMap::new(),
            uri_language: HashMap::new(),
            diagnostics,
            root_cache: Mutex::new(HashMap::new()),
            line_lookup,
            request_timeout_ms: 5_000,
            max_pending: 256,
        }
    }

    pub fn register_server(&mut self, language_id: impl Into<String>, config: LspServerConfig) {
        self.configs.insert(language_id.into(), config);
    }

    pub fn configured_languages(&self) -> Vec<&str> {
        self.configs.keys().map(String::as_str).collect()
    }

    pub fn running_languages(&self) -> Vec<&str> {
        self.clients
            .iter()
            .filter(|(_, c)| c.is_running())
            .map(|(lang, _)| lang.as_str())
            .collect()
    }

    pub fn toggle_autostart(&mut self, language_id: &str, enabled: bool) {
        if let Some(cfg) = self.configs.get_mut(language_id) {
            cfg.autostart = enabled;
        }
    }

    /// File-path `file://<canonical>` or `untitled:<hex>` per spec.md §6.
    pub fn uri_for_path(path: &Path) -> String {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        format!("file://{}", canonical.display())
    }

    pub fn uri_for_untitled(stable_id: u64) -> String {
        format!("untitled:{stable_id:x}")
    }

    fn detect_workspace_root(&self, start_dir: &Path, root_patterns: &[String]) -> PathBuf {
        let key = format!("{}|{}", start_dir.display(), root_patterns.join(","));
        if let Some(hit) = self.root_cache.lock().unwrap().get(&key) {
            return hit.clone();
        }
        let mut dir = start_dir.to_path_buf();
        let root = loop {
            if root_patterns.iter().any(|pat| dir.join(pat).exists()) {
                break dir.clone();
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break start_dir.to_path_buf(),
            }
        };
        self.root_cache.lock().unwrap().insert(key, root.clone());
        root
    }

    fn make_diagnostics_handler(&self) -> DiagnosticsHandler {
        let store = self.diagnostics.clone();
        let line_lookup = self.line_lookup.clone();
        Arc::new(move |uri: String, raw: Vec<RawDiagnostic>| {
            let converted: Vec<Diagnostic> =
                raw.into_iter().map(|d| convert_diagnostic(&uri, d, &line_lookup)).collect();
            store.lock().unwrap().set_diagnostics(uri, converted);
        })
    }

    /// Spawn (if not already running) the server configured for
    /// `language_id`, rooted under `start_dir`. No-op if no config was
    /// registered for the language, or a running client already exists.
    pub fn ensure_server_for_language(&mut self, language_id: &str, start_dir: &Path) -> Result<bool, LspError> {
        if let Some(existing) = self.clients.get(language_id) {
            if existing.is_running() {
                return Ok(true);
            }
            self.clients.remove(language_id);
        }
        let Some(config) = self.configs.get(language_id).cloned() else {
            return Ok(false);
        };
        if !config.autostart {
            return Ok(false);
        }
        let root = self.detect_workspace_root(start_dir, &config.root_patterns);
        let root_uri = Self::uri_for_path(&root);
        let handler = self.make_diagnostics_handler();
        let client =
            LspProcessClient::spawn(&config.command, &config.args, handler, self.request_timeout_ms, self.max_pending)?;
        client.initialize(Some(std::process::id()), Some(&root_uri))?;
        self.clients.insert(language_id.to_string(), client);
        Ok(true)
    }

    pub fn stop_server(&mut self, language_id: &str) {
        self.clients.remove(language_id);
    }

    pub fn stop_all_servers(&mut self) {
        self.clients.clear();
    }

    pub fn restart_server(&mut self, language_id: &str, start_dir: &Path) -> Result<bool, LspError> {
        self.stop_server(language_id);
        self.ensure_server_for_language(language_id, start_dir)
    }

    pub fn on_buffer_opened(
        &mut self,
        uri: &str,
        language_id: &str,
        version: i64,
        full_text: &str,
        start_dir: &Path,
    ) -> Result<(), LspError> {
        self.uri_language.insert(uri.to_string(), language_id.to_string());
        if !self.ensure_server_for_language(language_id, start_dir)? {
            return Ok(());
        }
        self.clients.get(language_id).unwrap().did_open(uri, language_id, version, full_text)
    }

    pub fn on_buffer_changed(&mut self, uri: &str, version: i64, full_text: &str) -> Result<(), LspError> {
        let Some(client) = self.client_for_uri(uri) else { return Ok(()) };
        client.did_change(uri, version, full_text)
    }

    pub fn on_buffer_saved(&mut self, uri: &str) -> Result<(), LspError> {
        let Some(client) = self.client_for_uri(uri) else { return Ok(()) };
        client.did_save(uri)
    }

    pub fn on_buffer_closed(&mut self, uri: &str) {
        if let Some(client) = self.client_for_uri(uri) {
            let _ = client.did_close(uri);
        }
        self.uri_language.remove(uri);
        self.diagnostics.lock().unwrap().clear(uri);
    }

    fn client_for_uri(&self, uri: &str) -> Option<&LspProcessClient> {
        let language_id = self.uri_language.get(uri)?;
        self.clients.get(language_id).filter(|c| c.is_running())
    }

    pub fn request_completion(&self, uri: &str, line: u64, character: u64) -> Option<Result<Value, LspError>> {
        Some(self.client_for_uri(uri)?.completion(uri, line, character))
    }

    pub fn request_hover(&self, uri: &str, line: u64, character: u64) -> Option<Result<Value, LspError>> {
        Some(self.client_for_uri(uri)?.hover(uri, line, character))
    }

    pub fn request_definition(&self, uri: &str, line: u64, character: u64) -> Option<Result<Value, LspError>> {
        Some(self.client_for_uri(uri)?.definition(uri, line, character))
    }
}

fn convert_pos(uri: &str, pos: RawPos, line_lookup: &LineLookup) -> DiagPos {
    let character = match line_lookup(uri, pos.line as usize) {
        Some(line_text) => utf16_units_to_utf8_col(line_text.as_bytes(), pos.character as usize),
        None => pos.character as usize,
    };
    DiagPos { line: pos.line as usize, character }
}

fn convert_diagnostic(uri: &str, raw: RawDiagnostic, line_lookup: &LineLookup) -> Diagnostic {
    Diagnostic {
        range: Range {
            start: convert_pos(uri, raw.range.start, line_lookup),
            end: convert_pos(uri, raw.range.end, line_lookup),
        },
        severity: raw.severity.map(Severity::from_lsp).unwrap_or(Severity::Info),
        code: raw.code.map(|c| match c {
            Value::String(s) => s,
            other => other.to_string(),
        }),
        source: raw.source,
        message: raw.message,
        related: raw
            .related_information
            .into_iter()
            .map(|r| RelatedInformation {
                uri: r.location.uri.clone(),
                range: Range {
                    start: convert_pos(&r.location.uri, r.location.range.start, line_lookup),
                    end: convert_pos(&r.location.uri, r.location.range.end, line_lookup),
                },
                message: r.message,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_for_untitled_is_stable_hex() {
        assert_eq!(LspManager::uri_for_untitled(255), "untitled:ff");
    }

    #[test]
    fn convert_diagnostic_maps_severity_and_position() {
        let lookup: LineLookup = Arc::new(|_uri, _line| Some("A😀B".to_string()));
        let raw = RawDiagnostic {
            range: crate::protocol::RawRange {
                start: RawPos { line: 0, character: 0 },
                end: RawPos { line: 0, character: 2 },
            },
            severity: Some(1),
            code: None,
            source: Some("rustc".into()),
            message: "oops".into(),
            related_information: Vec::new(),
        };
        let diag = convert_diagnostic("file:///a.rs", raw, &lookup);
        assert!(matches!(diag.severity, Severity::Error));
        // 2 UTF-16 units lands mid-surrogate on the emoji; clamps back to
        // the scalar boundary before it.
        assert_eq!(diag.range.end.character, 1);
    }

    #[test]
    fn unregistered_language_never_spawns() {
        let diagnostics = Arc::new(Mutex::new(DiagnosticStore::new()));
        let lookup: LineLookup = Arc::new(|_, _| None);
        let mut manager = LspManager::new(diagnostics, lookup);
        let spawned = manager.ensure_server_for_language("nonexistent", Path::new(".")).unwrap();
        assert!(!spawned);
    }
}
