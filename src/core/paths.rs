//! Storage keys and environment names
//!
//! Centralized registry so the store, the session and the CLI agree on where
//! the durable queue lives.

/// Durable queue keys
pub mod queue {
    /// Key under which the chain-transport subset of the queue is persisted.
    pub const PENDING: &str = "sign-requests/pending";
    /// Schema tag written alongside the persisted queue.
    pub const SCHEMA: &str = "sign-requests@v1";
}

/// Environment variables
pub mod env {
    /// Overrides the data root (defaults to the platform local data dir).
    pub const ROOT: &str = "BEESIGN_ROOT";
    /// `1` switches log output to JSON lines.
    pub const LOG_JSON: &str = "BEESIGN_LOG_JSON";
}

/// Directory under `<root>/<app>/` holding storage files.
pub const DATA_DIR: &str = "data";

/// Default application name when none is configured.
pub const DEFAULT_APP: &str = "beesign";
