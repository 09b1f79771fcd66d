//! Error types for clipgraph operations.
//!
//! The engines themselves never fail: degenerate input is skipped or clamped
//! (see the individual modules). [`ClipgraphError`] only covers the edges of
//! the library where outside data comes in, such as snapshot files,
//! configuration, and lookups by caller-supplied node ids.

use std::io;

use thiserror::Error;

/// The main error type for clipgraph operations.
#[derive(Debug, Error)]
pub enum ClipgraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A graph snapshot could not be decoded. `src` is the raw snapshot text,
    /// kept so callers can point at the failing line.
    #[error("Invalid graph snapshot: {err}")]
    Snapshot { err: serde_json::Error, src: String },

    #[error("Failed to encode output: {0}")]
    Encode(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),
}

impl ClipgraphError {
    /// Create a new `Snapshot` error with the associated source text.
    pub fn new_snapshot_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Snapshot {
            err,
            src: src.into(),
        }
    }
}
