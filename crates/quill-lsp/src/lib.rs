//! JSON-RPC LSP client over stdio (spec.md §4.9, §4.10, §4.11; components
//! C9/C10). `transport` is the wire framing, `process_client` is a single
//! spawned server with its pending-request table and watchdog, `manager`
//! multiplexes servers by language and tracks which buffer URI belongs to
//! which.

pub mod manager;
pub mod process_client;
pub mod protocol;
pub mod transport;

pub use manager::{LspManager, LspServerConfig, SyncMode};
pub use process_client::{DiagnosticsHandler, LspError, LspProcessClient};
pub use protocol::{PublishDiagnosticsParams, RawDiagnostic, RawLocation, RawPos, RawRange, RawRelatedInformation};
pub use transport::{read_message, write_message, TransportError};
