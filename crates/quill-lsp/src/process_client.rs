//! One spawned language server and the plumbing around it (spec.md §4.10,
//! C10). Ported from `LspProcessClient.{h,cc}`: a pending-request table
//! keyed by the request id's string form, an LRU-style cap on how many
//! requests may be outstanding, and a watchdog thread that times entries
//! out. The original spawns the child with raw `pipe()`/`fork()`/`execvp()`;
//! here that's `std::process::Command` with piped stdio, which gives the
//! same "one reader thread, writes serialized under one mutex" shape
//! without unsafe process plumbing.

use std::collections::{HashMap, VecDeque};
use std::io::BufReader;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::protocol::{PublishDiagnosticsParams, RawDiagnostic};
use crate::transport::{read_message, write_message, TransportError};

#[derive(Debug, Error)]
pub enum LspError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server response for request {0} was malformed: {1}")]
    BadResponse(i64, String),
    #[error("client is not running")]
    NotRunning,
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },
}

const TIMEOUT_CODE: i64 = -32000;
const DROPPED_CODE: i64 = -32001;
const METHOD_NOT_FOUND_CODE: i64 = -32601;

struct PendingEntry {
    reply_tx: crossbeam_channel::Sender<Value>,
    deadline: Option<Instant>,
}

#[derive(Default)]
struct PendingTable {
    entries: HashMap<String, PendingEntry>,
    order: VecDeque<String>,
}

impl PendingTable {
    fn insert(&mut self, id: String, entry: PendingEntry, max_pending: usize) {
        if max_pending > 0 && self.entries.len() >= max_pending {
            if let Some(oldest) = self.order.pop_front() {
                if let Some(evicted) = self.entries.remove(&oldest) {
                    let _ = evicted.reply_tx.send(error_value(DROPPED_CODE, "dropped"));
                }
            }
        }
        self.order.push_back(id.clone());
        self.entries.insert(id, entry);
    }

    fn take(&mut self, id: &str) -> Option<PendingEntry> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            self.order.retain(|i| i != id);
        }
        entry
    }

    fn drain_expired(&mut self, now: Instant) -> Vec<PendingEntry> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline.is_some_and(|d| d <= now))
            .map(|(id, _)| id.clone())
            .collect();
        expired.into_iter().filter_map(|id| self.take(&id)).collect()
    }

    fn drain_all(&mut self) -> Vec<PendingEntry> {
        self.order.clear();
        self.entries.drain().map(|(_, e)| e).collect()
    }
}

fn error_value(code: i64, message: &str) -> Value {
    json!({"error": {"code": code, "message": message}})
}

/// Handler invoked (from the reader thread) whenever the server publishes
/// diagnostics. Receives the raw wire positions (UTF-16 units); converting
/// to UTF-8 scalar columns requires the buffer's line text, which only the
/// manager has, so that conversion happens one layer up.
pub type DiagnosticsHandler = Arc<dyn Fn(String, Vec<RawDiagnostic>) + Send + Sync>;

pub struct LspProcessClient {
    child: Mutex<Child>,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
    next_id: AtomicI64,
    pending: Arc<Mutex<PendingTable>>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    watchdog: Option<JoinHandle<()>>,
    max_pending: usize,
    request_timeout_ms: u64,
    server_name: String,
}

impl LspProcessClient {
    /// Spawn `command args...` with piped stdio, and start the reader and
    /// watchdog threads. `request_timeout_ms == 0` disables the watchdog's
    /// timeout sweep; `max_pending == 0` disables the cap.
    pub fn spawn(
        command: &str,
        args: &[String],
        diagnostics_handler: DiagnosticsHandler,
        request_timeout_ms: u64,
        max_pending: usize,
    ) -> Result<Self, LspError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = child.stdout.take().expect("piped stdout");
        let stdin = Arc::new(Mutex::new(Some(stdin)));
        let pending: Arc<Mutex<PendingTable>> = Arc::new(Mutex::new(PendingTable::default()));
        let running = Arc::new(AtomicBool::new(true));

        let reader = {
            let pending = pending.clone();
            let running = running.clone();
            let stdin = stdin.clone();
            thread::Builder::new()
                .name("quill-lsp-reader".into())
                .spawn(move || reader_loop(stdout, pending, running, stdin, diagnostics_handler))
                .expect("spawn lsp reader thread")
        };

        let watchdog = {
            let pending = pending.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("quill-lsp-watchdog".into())
                .spawn(move || watchdog_loop(pending, running))
                .expect("spawn lsp watchdog thread")
        };

        Ok(Self {
            child: Mutex::new(child),
            stdin,
            next_id: AtomicI64::new(1),
            pending,
            running,
            reader: Some(reader),
            watchdog: Some(watchdog),
            max_pending,
            request_timeout_ms,
            server_name: command.to_string(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    fn send_raw(&self, value: &Value) -> Result<(), LspError> {
        if !self.is_running() {
            return Err(LspError::NotRunning);
        }
        let body = serde_json::to_vec(value)?;
        let mut guard = self.stdin.lock().unwrap();
        match guard.as_mut() {
            Some(stdin) => {
                write_message(stdin, &body)?;
                Ok(())
            }
            None => Err(LspError::NotRunning),
        }
    }

    /// Fire a notification (no response expected, no id).
    pub fn notify(&self, method: &str, params: Value) -> Result<(), LspError> {
        self.send_raw(&json!({"jsonrpc": "2.0", "method": method, "params": params}))
    }

    /// Send a request and block until its response (or a synthetic
    /// timeout/eviction error) arrives. The blocking wait is satisfied by
    /// whichever of {reader thread, watchdog thread} resolves the pending
    /// entry first.
    pub fn request(&self, method: &str, params: Value) -> Result<Value, LspError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = crossbeam_channel::unbounded();
        let deadline = if self.request_timeout_ms > 0 {
            Some(Instant::now() + Duration::from_millis(self.request_timeout_ms))
        } else {
            None
        };
        {
            let mut table = self.pending.lock().unwrap();
            table.insert(id.to_string(), PendingEntry { reply_tx: tx, deadline }, self.max_pending);
        }
        self.send_raw(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))?;
        let value = rx.recv().map_err(|_| LspError::NotRunning)?;
        to_result(id, value)
    }

    /// Same as [`request`](Self::request) but installs an explicit deadline
    /// independent of the client-wide default, letting the watchdog enforce
    /// per-request timeouts (spec.md §4.10).
    pub fn request_with_timeout(&self, method: &str, params: Value, timeout_ms: u64) -> Result<Value, LspError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = crossbeam_channel::unbounded();
        let deadline = if timeout_ms > 0 { Some(Instant::now() + Duration::from_millis(timeout_ms)) } else { None };
        {
            let mut table = self.pending.lock().unwrap();
            table.insert(id.to_string(), PendingEntry { reply_tx: tx, deadline }, self.max_pending);
        }
        self.send_raw(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))?;
        let value = rx.recv().map_err(|_| LspError::NotRunning)?;
        to_result(id, value)
    }

    pub fn respond(&self, id: Value, result: Value) -> Result<(), LspError> {
        self.send_raw(&json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    pub fn respond_error(&self, id: Value, code: i64, message: &str) -> Result<(), LspError> {
        self.send_raw(&json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}}))
    }

    /// `initialize` / `initialized` handshake (spec.md §4.10 step 1-2).
    pub fn initialize(&self, process_id: Option<u32>, root_uri: Option<&str>) -> Result<Value, LspError> {
        let params = json!({
            "processId": process_id,
            "rootUri": root_uri,
            "capabilities": {
                "textDocument": {
                    "synchronization": {"didSave": true}
                }
            },
        });
        let result = self.request("initialize", params)?;
        self.notify("initialized", json!({}))?;
        Ok(result)
    }

    pub fn did_open(&self, uri: &str, language_id: &str, version: i64, text: &str) -> Result<(), LspError> {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {"uri": uri, "languageId": language_id, "version": version, "text": text},
            }),
        )
    }

    /// Phase 1 coalesces every change into one full-document replacement
    /// (spec.md §4.9); a ranged incremental variant can be added later
    /// without touching this client's framing.
    pub fn did_change(&self, uri: &str, version: i64, full_text: &str) -> Result<(), LspError> {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": [{"text": full_text}],
            }),
        )
    }

    pub fn did_close(&self, uri: &str) -> Result<(), LspError> {
        self.notify("textDocument/didClose", json!({"textDocument": {"uri": uri}}))
    }

    pub fn did_save(&self, uri: &str) -> Result<(), LspError> {
        self.notify("textDocument/didSave", json!({"textDocument": {"uri": uri}}))
    }

    pub fn completion(&self, uri: &str, line: u64, character: u64) -> Result<Value, LspError> {
        self.request(
            "textDocument/completion",
            json!({"textDocument": {"uri": uri}, "position": {"line": line, "character": character}}),
        )
    }

    pub fn hover(&self, uri: &str, line: u64, character: u64) -> Result<Value, LspError> {
        self.request(
            "textDocument/hover",
            json!({"textDocument": {"uri": uri}, "position": {"line": line, "character": character}}),
        )
    }

    pub fn definition(&self, uri: &str, line: u64, character: u64) -> Result<Value, LspError> {
        self.request(
            "textDocument/definition",
            json!({"textDocument": {"uri": uri}, "position": {"line": line, "character": character}}),
        )
    }

    /// `shutdown` (fire, don't wait) + `exit`, then close the write end,
    /// kill the child to unblock the reader, and join both threads.
    pub fn shutdown(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.send_raw(&json!({"jsonrpc": "2.0", "id": self.next_id.fetch_add(1, Ordering::SeqCst), "method": "shutdown"}));
        let _ = self.notify("exit", json!({}));
        self.stdin.lock().unwrap().take();
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
            let _ = child.wait();
        }
        for evicted in self.pending.lock().unwrap().drain_all() {
            let _ = evicted.reply_tx.send(error_value(DROPPED_CODE, "client shutting down"));
        }
        if let Some(r) = self.reader.take() {
            let _ = r.join();
        }
        if let Some(w) = self.watchdog.take() {
            let _ = w.join();
        }
    }
}

impl Drop for LspProcessClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn to_result(id: i64, value: Value) -> Result<Value, LspError> {
    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error.get("message").and_then(Value::as_str).unwrap_or("").to_string();
        return Err(LspError::Server { code, message });
    }
    value
        .get("result")
        .cloned()
        .ok_or_else(|| LspError::BadResponse(id, value.to_string()))
}

fn reader_loop(
    stdout: std::process::ChildStdout,
    pending: Arc<Mutex<PendingTable>>,
    running: Arc<AtomicBool>,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
    diagnostics_handler: DiagnosticsHandler,
) {
    let mut reader = BufReader::new(stdout);
    loop {
        let frame = match read_message(&mut reader) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: "lsp.reader", "server closed stdout");
                break;
            }
            Err(err) => {
                warn!(target: "lsp.reader", %err, "transport error, stopping reader");
                break;
            }
        };
        let value: Value = match serde_json::from_slice(&frame) {
            Ok(v) => v,
            Err(err) => {
                warn!(target: "lsp.reader", %err, "malformed JSON-RPC frame");
                continue;
            }
        };
        handle_message(value, &pending, &stdin, &diagnostics_handler);
    }
    running.store(false, Ordering::SeqCst);
    for evicted in pending.lock().unwrap().drain_all() {
        let _ = evicted.reply_tx.send(error_value(TIMEOUT_CODE, "transport closed"));
    }
}

fn handle_message(
    value: Value,
    pending: &Arc<Mutex<PendingTable>>,
    stdin: &Arc<Mutex<Option<ChildStdin>>>,
    diagnostics_handler: &DiagnosticsHandler,
) {
    let has_id = value.get("id").is_some();
    let method = value.get("method").and_then(Value::as_str).map(str::to_string);

    match (method, has_id) {
        (Some(method), false) => handle_notification(&method, value, diagnostics_handler),
        (Some(method), true) => handle_server_request(&method, value, stdin),
        (None, true) => {
            let id_key = value.get("id").map(value_id_key).unwrap_or_default();
            let entry = pending.lock().unwrap().take(&id_key);
            if let Some(entry) = entry {
                let _ = entry.reply_tx.send(value);
            } else {
                trace!(target: "lsp.reader", id = %id_key, "response for unknown/expired request");
            }
        }
        (None, false) => warn!(target: "lsp.reader", "frame with neither method nor id"),
    }
}

fn value_id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn handle_notification(method: &str, value: Value, diagnostics_handler: &DiagnosticsHandler) {
    if method != "textDocument/publishDiagnostics" {
        trace!(target: "lsp.reader", method, "unhandled notification");
        return;
    }
    let Some(params) = value.get("params").cloned() else { return };
    match serde_json::from_value::<PublishDiagnosticsParams>(params) {
        Ok(parsed) => diagnostics_handler(parsed.uri, parsed.diagnostics),
        Err(err) => warn!(target: "lsp.reader", %err, "malformed publishDiagnostics params"),
    }
}

/// Server-originated requests: spec.md §4.10 names exactly two that get a
/// canned reply, everything else is "method not found".
fn handle_server_request(method: &str, value: Value, stdin: &Arc<Mutex<Option<ChildStdin>>>) {
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let response = match method {
        "workspace/configuration" => {
            let n = value
                .get("params")
                .and_then(|p| p.get("items"))
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            json!({"jsonrpc": "2.0", "id": id, "result": vec![json!({}); n]})
        }
        "window/showMessageRequest" => json!({"jsonrpc": "2.0", "id": id, "result": Value::Null}),
        _ => json!({"jsonrpc": "2.0", "id": id, "error": {"code": METHOD_NOT_FOUND_CODE, "message": "Method not found"}}),
    };
    let Ok(body) = serde_json::to_vec(&response) else { return };
    let mut guard = stdin.lock().unwrap();
    if let Some(stdin) = guard.as_mut() {
        let _ = write_message(stdin, &body);
    }
}

/// Sweeps every 100ms (spec.md §5) for pending entries whose deadline has
/// passed; entries with no deadline (`request_timeout_ms == 0`, or a
/// notification-only wait that never sets one) are never touched here.
fn watchdog_loop(pending: Arc<Mutex<PendingTable>>, running: Arc<AtomicBool>) {
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
        let expired = pending.lock().unwrap().drain_expired(Instant::now());
        for entry in expired {
            let _ = entry.reply_tx.send(error_value(TIMEOUT_CODE, "timeout"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_cap_evicts_oldest_with_dropped_error() {
        let mut table = PendingTable::default();
        let (tx_a, rx_a) = crossbeam_channel::unbounded();
        let (tx_b, _rx_b) = crossbeam_channel::unbounded();
        table.insert("a".into(), PendingEntry { reply_tx: tx_a, deadline: None }, 1);
        table.insert("b".into(), PendingEntry { reply_tx: tx_b, deadline: None }, 1);
        let evicted = rx_a.try_recv().unwrap();
        assert_eq!(evicted["error"]["code"], json!(DROPPED_CODE));
        assert!(table.entries.contains_key("b"));
        assert!(!table.entries.contains_key("a"));
    }

    #[test]
    fn drain_expired_only_removes_entries_past_deadline() {
        let mut table = PendingTable::default();
        let (tx_live, _rx_live) = crossbeam_channel::unbounded();
        let (tx_dead, _rx_dead) = crossbeam_channel::unbounded();
        table.insert("live".into(), PendingEntry { reply_tx: tx_live, deadline: None }, 0);
        table.insert(
            "dead".into(),
            PendingEntry { reply_tx: tx_dead, deadline: Some(Instant::now() - Duration::from_secs(1)) },
            0,
        );
        let expired = table.drain_expired(Instant::now());
        assert_eq!(expired.len(), 1);
        assert!(table.entries.contains_key("live"));
        assert!(!table.entries.contains_key("dead"));
    }

    #[test]
    fn to_result_maps_error_field_to_server_error() {
        let v = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "timeout"}});
        match to_result(1, v) {
            Err(LspError::Server { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "timeout");
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }
}
