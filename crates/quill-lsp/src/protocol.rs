//! Wire-shaped types for the handful of JSON-RPC payloads this client
//! builds or parses directly (spec.md §4.10, §6). Everything else passes
//! through as a `serde_json::Value`; these are reserved for the messages
//! whose fields the manager needs to read (`publishDiagnostics`) or whose
//! shape must match the protocol exactly (`initialize` params).
//!
//! Positions here are still in LSP wire units (UTF-16 code units); callers
//! convert to UTF-8 scalar columns via `quill_text::utf_codec` once they
//! have the buffer line the position refers to.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawPos {
    pub line: u64,
    pub character: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawRange {
    pub start: RawPos,
    pub end: RawPos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRelatedInformation {
    #[serde(rename = "location")]
    pub location: RawLocation,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    pub uri: String,
    pub range: RawRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDiagnostic {
    pub range: RawRange,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub source: Option<String>,
    pub message: String,
    #[serde(default, rename = "relatedInformation")]
    pub related_information: Vec<RawRelatedInformation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<RawDiagnostic>,
}
