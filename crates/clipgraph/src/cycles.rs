//! Detection of closed loops in the canvas graph.
//!
//! The detector enumerates simple directed cycles up to a bounded length with
//! a depth-limited search that keeps its own work stack, so the search depth
//! is a plain data structure and the length cap is enforced directly.
//!
//! Every cycle is identified by a [`CycleKey`]: its sorted member node set.
//! Two cycles over the same node set share a key no matter where the search
//! started or in which direction the edges run, and are reported once.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use serde::{Serialize, Serializer};

use clipgraph_core::{
    geometry::Point,
    graph::{Edge, GraphModel},
    identifier::Id,
};

/// Separator between node ids in the text form of a [`CycleKey`].
///
/// A separator or backslash inside a node id is escaped with a backslash, so
/// distinct node sets always render distinct strings.
pub const CYCLE_KEY_SEPARATOR: char = '|';

/// Longest cycle reported by [`CycleDetector::default`], in distinct nodes.
pub const DEFAULT_MAX_CYCLE_LEN: usize = 4;

/// Canonical identity of a cycle: its sorted, deduplicated node set.
///
/// Serializes as the member ids joined by [`CYCLE_KEY_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleKey(Vec<Id>);

impl CycleKey {
    /// Builds the key for a set of member nodes, in any order.
    pub fn from_nodes(node_ids: &[Id]) -> Self {
        let mut ids = node_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    /// Returns the member node ids in ascending string order.
    pub fn node_ids(&self) -> &[Id] {
        &self.0
    }
}

impl fmt::Display for CycleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{CYCLE_KEY_SEPARATOR}")?;
            }
            id.with_str(|name| {
                name.chars().try_for_each(|c| {
                    if c == CYCLE_KEY_SEPARATOR || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")
                })
            })?;
        }
        Ok(())
    }
}

impl Serialize for CycleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A simple directed cycle found in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedCycle {
    node_ids: Vec<Id>,
    edge_ids: Vec<Id>,
    center: Point,
    key: CycleKey,
}

impl DetectedCycle {
    /// Member nodes in traversal order, starting at the node the search began from.
    pub fn node_ids(&self) -> &[Id] {
        &self.node_ids
    }

    /// Edges along the path; the last one closes the loop.
    pub fn edge_ids(&self) -> &[Id] {
        &self.edge_ids
    }

    /// Mean of the member node centers that could be resolved.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Returns the canonical key of the member node set.
    pub fn key(&self) -> &CycleKey {
        &self.key
    }

    /// Returns the number of member nodes.
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn contains_node(&self, id: Id) -> bool {
        self.node_ids.contains(&id)
    }
}

/// One pending step of the depth-limited search.
struct Frame {
    node: Id,
    path: Vec<Id>,
    edge_path: Vec<Id>,
}

/// Bounded simple-cycle enumerator.
#[derive(Debug, Clone, Copy)]
pub struct CycleDetector {
    max_len: usize,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CYCLE_LEN)
    }
}

impl CycleDetector {
    /// Create a detector reporting cycles of at most `max_len` distinct nodes.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Returns the longest cycle length reported, in distinct nodes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Enumerate the cycles of `graph`.
    ///
    /// The result is a pure function of the edges and the node boxes. It must be
    /// recomputed when positions change because [`DetectedCycle::center`]
    /// depends on them.
    pub fn detect(&self, graph: &GraphModel) -> Vec<DetectedCycle> {
        if graph.edges_count() < 2 {
            trace!(edges = graph.edges_count(); "Too few edges for a cycle");
            return Vec::new();
        }

        let starts: IndexSet<Id> = graph
            .edges()
            .flat_map(|edge| [edge.source(), edge.target()])
            .collect();

        let mut found: IndexMap<CycleKey, DetectedCycle> = IndexMap::new();

        for &start in &starts {
            let mut stack = vec![Frame {
                node: start,
                path: vec![start],
                edge_path: Vec::new(),
            }];

            while let Some(frame) = stack.pop() {
                let outgoing: Vec<&Edge> = graph.outgoing(frame.node).collect();

                // Reverse so the first outgoing edge is explored first.
                for edge in outgoing.into_iter().rev() {
                    let next = edge.target();

                    if next == start {
                        if frame.path.len() >= 2 {
                            let mut edge_ids = frame.edge_path.clone();
                            edge_ids.push(edge.id());
                            self.record(graph, &frame.path, edge_ids, &mut found);
                        }
                        continue;
                    }

                    if frame.path.len() >= self.max_len || frame.path.contains(&next) {
                        continue;
                    }

                    let mut path = frame.path.clone();
                    path.push(next);
                    let mut edge_path = frame.edge_path.clone();
                    edge_path.push(edge.id());
                    stack.push(Frame {
                        node: next,
                        path,
                        edge_path,
                    });
                }
            }
        }

        debug!(
            cycles = found.len(),
            edges = graph.edges_count(),
            max_len = self.max_len;
            "Cycle detection finished"
        );

        found.into_values().collect()
    }

    fn record(
        &self,
        graph: &GraphModel,
        path: &[Id],
        edge_ids: Vec<Id>,
        found: &mut IndexMap<CycleKey, DetectedCycle>,
    ) {
        let key = CycleKey::from_nodes(path);
        if found.contains_key(&key) {
            return;
        }

        let Some(center) = Point::centroid(
            path.iter()
                .filter_map(|id| graph.node(*id))
                .map(|node| node.center()),
        ) else {
            trace!(key:% = key; "Cycle has no resolvable nodes, skipping");
            return;
        };

        trace!(key:% = key, len = path.len(); "Cycle found");
        found.insert(
            key.clone(),
            DetectedCycle {
                node_ids: path.to_vec(),
                edge_ids,
                center,
                key,
            },
        );
    }
}

/// Enumerate cycles with the default length bound.
pub fn detect_cycles(graph: &GraphModel) -> Vec<DetectedCycle> {
    CycleDetector::default().detect(graph)
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use clipgraph_core::{geometry::Size, graph::Node};

    use super::*;

    /// A ring over `len` nodes, with edges inserted starting at `rotation`.
    fn rotated_ring(len: usize, rotation: usize) -> GraphModel {
        let ids: Vec<String> = (0..len).map(|i| format!("ring{i}")).collect();
        let nodes = ids
            .iter()
            .map(|id| Node::new(id.as_str(), Point::new(0.0, 0.0)).with_size(Size::new(10.0, 10.0)));
        let edges = (0..len).map(|i| {
            let from = (i + rotation) % len;
            let to = (from + 1) % len;
            Edge::new(format!("ring-e{from}"), ids[from].as_str(), ids[to].as_str())
        });
        GraphModel::from_parts(nodes, edges)
    }

    /// The reported key never depends on the order edges were added in.
    fn check_key_rotation_invariant(len: usize, rotation: usize) -> Result<(), TestCaseError> {
        let base = detect_cycles(&rotated_ring(len, 0));
        let rotated = detect_cycles(&rotated_ring(len, rotation));

        prop_assert_eq!(base.len(), 1);
        prop_assert_eq!(rotated.len(), 1);
        prop_assert_eq!(base[0].key(), rotated[0].key());
        Ok(())
    }

    proptest! {
        #[test]
        fn key_rotation_invariant(len in 2usize..=4, rotation in 0usize..8) {
            check_key_rotation_invariant(len, rotation)?;
        }

        #[test]
        fn long_rings_never_reported(len in 5usize..9, rotation in 0usize..8) {
            prop_assert!(detect_cycles(&rotated_ring(len, rotation)).is_empty());
        }
    }
}
