//! The canvas graph model shared by every engine.
//!
//! This module provides the read-mostly view of the visual editor canvas:
//! nodes with their boxes and directed edges with optional relation tags.
//!
//! # Architecture
//!
//! - [`Node`]: a canvas node (top-left position plus optional measured size)
//! - [`Edge`]: a directed connection between two node ids
//! - [`GraphModel`]: insertion-ordered node table, edge table, and an
//!   adjacency index tracking incoming and outgoing edges per node id
//!
//! Nodes and edges are owned by the host canvas. The engines only read them,
//! apart from node positions which they write back.
//!
//! Edges whose endpoints are missing from the node table ("dangling" edges)
//! are kept as given. Consumers filter them at the point of use.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Size assumed for nodes the host has not measured yet.
pub const DEFAULT_NODE_SIZE: Size = Size::new(160.0, 284.0);

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: Id,
    position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<Size>,
}

impl Node {
    /// Creates an unmeasured node at `position`.
    pub fn new(id: impl Into<Id>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            size: None,
        }
    }

    /// Sets the measured size (builder style).
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Top-left corner of the node box.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Returns a copy of this node moved to `position`.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Measured size, falling back to [`DEFAULT_NODE_SIZE`].
    pub fn size(&self) -> Size {
        self.size.unwrap_or(DEFAULT_NODE_SIZE)
    }

    /// Whether the host has reported a measured size for this node.
    pub fn is_measured(&self) -> bool {
        self.size.is_some()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size())
    }

    /// Geometric center, `position + size / 2`.
    pub fn center(&self) -> Point {
        self.position.add_point(self.size().half())
    }
}

/// Typed meaning of a relation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// The target was generated using the source as a reference input.
    Reference,
    /// The target was derived (edited, upscaled, restyled) from the source.
    Derivation,
    /// The target continues the source clip in time.
    Continuation,
    /// The target is a transition clip bridging from the source.
    Transition,
}

/// A directed edge between two canvas nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation_type: Option<RelationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_handle: Option<String>,
}

impl Edge {
    /// Creates a plain (untyped) edge.
    pub fn new(id: impl Into<Id>, source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation_type: None,
            relation_label: None,
            source_handle: None,
            target_handle: None,
        }
    }

    /// Tags this edge with a relation type (builder style).
    pub fn with_relation(mut self, relation_type: RelationType) -> Self {
        self.relation_type = Some(relation_type);
        self
    }

    /// Attaches a display label (builder style).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.relation_label = Some(label.into());
        self
    }

    /// Attaches host handle identifiers. The engines pass them through untouched.
    pub fn with_handles(mut self, source: Option<String>, target: Option<String>) -> Self {
        self.source_handle = source;
        self.target_handle = target;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn relation_type(&self) -> Option<RelationType> {
        self.relation_type
    }

    pub fn set_relation_type(&mut self, relation_type: Option<RelationType>) {
        self.relation_type = relation_type;
    }

    pub fn relation_label(&self) -> Option<&str> {
        self.relation_label.as_deref()
    }

    pub fn set_relation_label(&mut self, label: Option<String>) {
        self.relation_label = label;
    }

    pub fn source_handle(&self) -> Option<&str> {
        self.source_handle.as_deref()
    }

    pub fn target_handle(&self) -> Option<&str> {
        self.target_handle.as_deref()
    }

    /// An edge is a relation edge iff it carries a relation type.
    pub fn is_relation(&self) -> bool {
        self.relation_type.is_some()
    }

    /// Whether this edge connects `a` and `b` in either direction.
    pub fn connects(&self, a: Id, b: Id) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// In-memory canvas graph: nodes, edges and an adjacency index.
///
/// The graph is directed and allows self-loops and multiple edges between
/// the same pair of nodes. Iteration order of nodes and edges is insertion
/// order, which keeps every derived result deterministic.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: IndexMap<Id, Node>,
    edges: IndexMap<Id, Edge>,
    incoming: HashMap<Id, Vec<Id>>,
    outgoing: HashMap<Id, Vec<Id>>,
}

impl GraphModel {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from host snapshots.
    ///
    /// Later duplicates of a node or edge id replace earlier ones.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut graph = Self {
            nodes: nodes.into_iter().map(|node| (node.id(), node)).collect(),
            edges: edges.into_iter().map(|edge| (edge.id(), edge)).collect(),
            ..Self::default()
        };
        graph.reindex();
        graph
    }

    /// Returns the node for the given ID, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns a mutable node for the given ID, if it exists.
    ///
    /// The id is immutable on [`Node`], so the node table stays keyed correctly.
    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the edge with the given ID, if it exists.
    pub fn edge(&self, id: Id) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Mutable access to an edge's relation tags.
    ///
    /// Endpoints are immutable on [`Edge`], so the adjacency index stays valid.
    pub fn edge_mut(&mut self, id: Id) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// Returns an iterator over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, id: Id) -> bool {
        self.edges.contains_key(&id)
    }

    /// Adds a node, replacing any node with the same ID.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: Id) -> Option<Node> {
        let removed = self.nodes.shift_remove(&id)?;
        self.retain_edges(|edge| edge.source() != id && edge.target() != id);
        Some(removed)
    }

    /// Adds a directed edge, replacing any edge with the same ID.
    ///
    /// Endpoints do not have to exist yet; see the module docs on dangling edges.
    pub fn add_edge(&mut self, edge: Edge) {
        let (id, source, target) = (edge.id(), edge.source(), edge.target());
        if self.edges.insert(id, edge).is_some() {
            // Endpoints of the replaced edge may differ.
            self.reindex();
        } else {
            self.outgoing.entry(source).or_default().push(id);
            self.incoming.entry(target).or_default().push(id);
        }
    }

    /// Removes an edge by ID.
    pub fn remove_edge(&mut self, id: Id) -> Option<Edge> {
        let removed = self.edges.shift_remove(&id)?;
        self.reindex();
        Some(removed)
    }

    /// Keeps only the edges matching `keep`, returning how many were dropped.
    pub fn retain_edges(&mut self, mut keep: impl FnMut(&Edge) -> bool) -> usize {
        let before = self.edges.len();
        self.edges.retain(|_, edge| keep(edge));
        let dropped = before - self.edges.len();
        if dropped > 0 {
            self.reindex();
        }
        dropped
    }

    /// Moves a node. Returns `false` if the node does not exist.
    pub fn set_node_position(&mut self, id: Id, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_position(position);
                true
            }
            None => false,
        }
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Edges arriving at `id`, in insertion order.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Edges with at least one endpoint missing from the node table.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(|edge| {
            !self.nodes.contains_key(&edge.source()) || !self.nodes.contains_key(&edge.target())
        })
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.incoming.clear();
        self.outgoing.clear();
    }

    fn reindex(&mut self) {
        self.incoming.clear();
        self.outgoing.clear();
        for (id, edge) in &self.edges {
            self.outgoing.entry(edge.source()).or_default().push(*id);
            self.incoming.entry(edge.target()).or_default().push(*id);
        }
        trace!(edges = self.edges.len(); "Adjacency index rebuilt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, Point::new(x, y)).with_size(Size::new(100.0, 50.0))
    }

    #[test]
    fn test_graph_new() {
        let graph = GraphModel::new();

        assert_eq!(graph.nodes_count(), 0);
        assert_eq!(graph.edges_count(), 0);
        assert_eq!(graph.nodes().count(), 0);
    }

    #[test]
    fn test_unmeasured_node_uses_default_size() {
        let n = Node::new("unmeasured", Point::new(0.0, 0.0));
        assert!(!n.is_measured());
        assert_eq!(n.size(), Size::new(160.0, 284.0));
        assert_eq!(n.center(), Point::new(80.0, 142.0));
    }

    #[test]
    fn test_node_replacement() {
        let mut graph = GraphModel::new();
        graph.add_node(node("n", 0.0, 0.0));
        graph.add_node(node("n", 5.0, 5.0));

        assert_eq!(graph.nodes_count(), 1);
        assert_eq!(graph.node(Id::new("n")).unwrap().position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_outgoing_and_incoming() {
        let graph = GraphModel::from_parts(
            [node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 0.0, 0.0)],
            [Edge::new("e1", "a", "b"), Edge::new("e2", "a", "c"), Edge::new("e3", "c", "b")],
        );

        let out: Vec<Id> = graph.outgoing(Id::new("a")).map(Edge::target).collect();
        assert_eq!(out, vec![Id::new("b"), Id::new("c")]);

        let inc: Vec<Id> = graph.incoming(Id::new("b")).map(Edge::source).collect();
        assert_eq!(inc, vec![Id::new("a"), Id::new("c")]);

        assert_eq!(graph.outgoing(Id::new("missing")).count(), 0);
    }

    #[test]
    fn test_remove_edge_updates_index() {
        let mut graph = GraphModel::from_parts(
            [node("a", 0.0, 0.0), node("b", 0.0, 0.0)],
            [Edge::new("e1", "a", "b"), Edge::new("e2", "b", "a")],
        );

        assert!(graph.remove_edge(Id::new("e1")).is_some());
        assert!(graph.remove_edge(Id::new("e1")).is_none());
        assert_eq!(graph.outgoing(Id::new("a")).count(), 0);
        assert_eq!(graph.incoming(Id::new("a")).count(), 1);
    }

    #[test]
    fn test_add_edge_replacing_reindexes() {
        let mut graph = GraphModel::from_parts(
            [node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 0.0, 0.0)],
            [Edge::new("e1", "a", "b")],
        );

        graph.add_edge(Edge::new("e1", "a", "c"));

        assert_eq!(graph.edges_count(), 1);
        assert_eq!(graph.incoming(Id::new("b")).count(), 0);
        assert_eq!(graph.incoming(Id::new("c")).count(), 1);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = GraphModel::from_parts(
            [node("a", 0.0, 0.0), node("b", 0.0, 0.0), node("c", 0.0, 0.0)],
            [Edge::new("e1", "a", "b"), Edge::new("e2", "b", "c"), Edge::new("e3", "a", "c")],
        );

        graph.remove_node(Id::new("b"));

        assert_eq!(graph.nodes_count(), 2);
        assert_eq!(graph.edges_count(), 1);
        assert!(graph.contains_edge(Id::new("e3")));
    }

    #[test]
    fn test_dangling_edges() {
        let graph = GraphModel::from_parts(
            [node("a", 0.0, 0.0)],
            [Edge::new("ok", "a", "a"), Edge::new("bad", "a", "ghost")],
        );

        let dangling: Vec<Id> = graph.dangling_edges().map(Edge::id).collect();
        assert_eq!(dangling, vec![Id::new("bad")]);
    }

    #[test]
    fn test_set_node_position() {
        let mut graph = GraphModel::from_parts([node("a", 0.0, 0.0)], Vec::new());

        assert!(graph.set_node_position(Id::new("a"), Point::new(3.0, 4.0)));
        assert!(!graph.set_node_position(Id::new("zz"), Point::new(3.0, 4.0)));
        assert_eq!(graph.node(Id::new("a")).unwrap().position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_node_mut_updates_in_place() {
        let mut graph = GraphModel::from_parts([Node::new("a", Point::new(0.0, 0.0))], Vec::new());

        graph
            .node_mut(Id::new("a"))
            .unwrap()
            .set_position(Point::new(7.0, 8.0));

        assert_eq!(graph.node(Id::new("a")).unwrap().position(), Point::new(7.0, 8.0));
        assert!(graph.node_mut(Id::new("missing")).is_none());
    }

    #[test]
    fn test_edge_serde_camel_case() {
        let json = r#"{"id":"e","source":"a","target":"b","relationType":"derivation","relationLabel":"upscale","sourceHandle":"out"}"#;
        let edge: Edge = serde_json::from_str(json).unwrap();

        assert!(edge.is_relation());
        assert_eq!(edge.relation_type(), Some(RelationType::Derivation));
        assert_eq!(edge.relation_label(), Some("upscale"));
        assert_eq!(edge.source_handle(), Some("out"));
        assert_eq!(edge.target_handle(), None);
    }

    #[test]
    fn test_edge_builders_serialize_back() {
        let edge = Edge::new("e", "a", "b")
            .with_relation(RelationType::Transition)
            .with_label("crossfade")
            .with_handles(Some("out".to_string()), None);

        let json = serde_json::to_value(&edge).unwrap();

        assert_eq!(json["relationType"], "transition");
        assert_eq!(json["relationLabel"], "crossfade");
        assert_eq!(json["sourceHandle"], "out");
        assert!(json.get("targetHandle").is_none());
    }

    #[test]
    fn test_node_serde_optional_size() {
        let node: Node = serde_json::from_str(r#"{"id":"n","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert!(!node.is_measured());
        assert_eq!(node.position(), Point::new(1.0, 2.0));
    }
}
