//! Clipgraph - the canvas graph engine behind a node-graph video editor.
//!
//! The engine works on a snapshot of the editor canvas (nodes with boxes,
//! directed edges with optional relation tags) and provides four services:
//!
//! - [`cycles`]: bounded enumeration of simple directed cycles, keyed by node set.
//! - [`cycle_layout`]: one-time regular-polygon layout of newly closed cycles.
//! - [`alignment`]: drag guide lines, the sticky user position cache and tidy layouts.
//! - [`relation`]: typed relation edges and upstream/downstream lineage chains.
//!
//! [`EditorSession`] wires them together for one editor instance.

pub mod alignment;
pub mod config;
pub mod cycle_layout;
pub mod cycles;
pub mod persistence;
pub mod relation;
pub mod snapshot;

mod error;
mod session;

pub use clipgraph_core::{geometry, graph, identifier};

pub use error::ClipgraphError;
pub use session::EditorSession;
