//! JSON graph snapshots exchanged with the host canvas.

use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use clipgraph_core::graph::{Edge, GraphModel, Node};

use crate::error::ClipgraphError;

/// The host's view of the canvas at one moment: every node and every edge.
///
/// ```
/// # use clipgraph::snapshot::GraphSnapshot;
/// let snapshot = GraphSnapshot::from_json(
///     r#"{ "nodes": [{ "id": "a", "position": { "x": 0, "y": 0 } }], "edges": [] }"#,
/// ).unwrap();
/// assert_eq!(snapshot.nodes().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parses a snapshot, keeping the source text in the error for diagnostics.
    pub fn from_json(src: &str) -> Result<Self, ClipgraphError> {
        serde_json::from_str(src).map_err(|err| ClipgraphError::new_snapshot_error(err, src))
    }

    /// Reads and parses a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClipgraphError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&src)?;
        debug!(
            path:? = path,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len();
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Captures the current contents of `graph`.
    pub fn from_graph(graph: &GraphModel) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    pub fn to_json_pretty(&self) -> Result<String, ClipgraphError> {
        serde_json::to_string_pretty(self).map_err(ClipgraphError::Encode)
    }
}
