//! Typed relation edges and lineage traversal.
//!
//! An edge carrying a [`RelationType`] is a *relation* edge: it says how the
//! target clip was produced from the source. Every other edge is *plain* and
//! only expresses connectivity. [`RelationGraphManager`] partitions the two,
//! answers upstream/downstream lineage queries and edits relation edges in
//! place on a [`GraphModel`].
//!
//! Lineage chains are breadth-first and nearest-first. A node is marked
//! visited before it is enqueued, so cyclic graphs terminate.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use clipgraph_core::{
    graph::{Edge, GraphModel, RelationType},
    identifier::Id,
};

/// Which edges lineage queries follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// Follow every edge, typed or not.
    #[default]
    AllEdges,
    /// Follow relation edges only.
    RelationsOnly,
}

impl Traversal {
    fn follows(self, edge: &Edge) -> bool {
        match self {
            Self::AllEdges => true,
            Self::RelationsOnly => edge.is_relation(),
        }
    }
}

/// Result of [`classify`]: a partition of edges by whether they carry a relation type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedEdges<'a> {
    pub relation_edges: Vec<&'a Edge>,
    pub plain_edges: Vec<&'a Edge>,
}

/// Splits `edges` into relation and plain edges, preserving order.
pub fn classify<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> ClassifiedEdges<'a> {
    let (relation_edges, plain_edges) = edges.into_iter().partition(|edge| edge.is_relation());
    ClassifiedEdges {
        relation_edges,
        plain_edges,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

/// Lineage queries and relation editing over a [`GraphModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationGraphManager {
    traversal: Traversal,
}

impl RelationGraphManager {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Partitions the edges of `graph`.
    pub fn classify<'a>(&self, graph: &'a GraphModel) -> ClassifiedEdges<'a> {
        classify(graph.edges())
    }

    /// Sources of the followed edges into `node`, without duplicates.
    ///
    /// Sources missing from the node table are skipped.
    pub fn direct_upstream(&self, graph: &GraphModel, node: Id) -> Vec<Id> {
        self.neighbors(graph, node, Direction::Upstream)
    }

    /// Targets of the followed edges out of `node`, without duplicates.
    pub fn direct_downstream(&self, graph: &GraphModel, node: Id) -> Vec<Id> {
        self.neighbors(graph, node, Direction::Downstream)
    }

    /// Every ancestor of `node`, nearest first. `node` itself is never included.
    pub fn upstream_chain(&self, graph: &GraphModel, node: Id) -> Vec<Id> {
        self.chain(graph, node, Direction::Upstream)
    }

    /// Every descendant of `node`, nearest first. `node` itself is never included.
    pub fn downstream_chain(&self, graph: &GraphModel, node: Id) -> Vec<Id> {
        self.chain(graph, node, Direction::Downstream)
    }

    /// Whether a relation edge joins `a` and `b` in either direction.
    pub fn has_relation(&self, graph: &GraphModel, a: Id, b: Id) -> bool {
        graph
            .outgoing(a)
            .chain(graph.incoming(a))
            .any(|edge| edge.is_relation() && edge.connects(a, b))
    }

    /// Tags the connection `source → target` with `relation_type`.
    ///
    /// The first existing edge from `source` to `target` is upgraded in place;
    /// otherwise a new edge is added. Returns the id of the tagged edge.
    pub fn add_relation(
        &self,
        graph: &mut GraphModel,
        source: Id,
        target: Id,
        relation_type: RelationType,
        label: Option<String>,
    ) -> Id {
        let existing = graph
            .outgoing(source)
            .find(|edge| edge.target() == target)
            .map(Edge::id);

        let id = match existing {
            Some(id) => {
                if let Some(edge) = graph.edge_mut(id) {
                    edge.set_relation_type(Some(relation_type));
                    edge.set_relation_label(label);
                }
                id
            }
            None => {
                let id = Id::new(&format!("rel:{source}->{target}"));
                let mut edge = Edge::new(id, source, target).with_relation(relation_type);
                edge.set_relation_label(label);
                graph.add_edge(edge);
                id
            }
        };

        debug!(source:%, target:%, relation:? = relation_type; "Relation added");
        id
    }

    /// Removes relation edges from `source` to `target`. Plain edges are kept.
    ///
    /// Returns how many edges were removed.
    pub fn remove_relation(&self, graph: &mut GraphModel, source: Id, target: Id) -> usize {
        let removed = graph.retain_edges(|edge| {
            !(edge.is_relation() && edge.source() == source && edge.target() == target)
        });
        debug!(source:%, target:%, removed; "Relation removed");
        removed
    }

    /// Replaces every relation edge with `relations`, keeping plain edges.
    ///
    /// Untyped edges in `relations` are ignored.
    pub fn set_relations(&self, graph: &mut GraphModel, relations: impl IntoIterator<Item = Edge>) {
        let dropped = graph.retain_edges(|edge| !edge.is_relation());

        let mut added = 0usize;
        for edge in relations {
            if !edge.is_relation() {
                warn!(edge:% = edge.id(); "Ignoring untyped edge in relation set");
                continue;
            }
            graph.add_edge(edge);
            added += 1;
        }

        debug!(dropped, added; "Relations replaced");
    }

    fn neighbors(&self, graph: &GraphModel, node: Id, direction: Direction) -> Vec<Id> {
        let mut seen = HashSet::new();
        self.step(graph, node, direction)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn step<'a>(
        &self,
        graph: &'a GraphModel,
        node: Id,
        direction: Direction,
    ) -> Box<dyn Iterator<Item = Id> + 'a> {
        let traversal = self.traversal;
        let edges: Box<dyn Iterator<Item = &'a Edge> + 'a> = match direction {
            Direction::Upstream => Box::new(graph.incoming(node)),
            Direction::Downstream => Box::new(graph.outgoing(node)),
        };

        Box::new(
            edges
                .filter(move |edge| traversal.follows(edge))
                .map(move |edge| match direction {
                    Direction::Upstream => edge.source(),
                    Direction::Downstream => edge.target(),
                })
                .filter(move |id| graph.contains_node(*id)),
        )
    }

    fn chain(&self, graph: &GraphModel, start: Id, direction: Direction) -> Vec<Id> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut chain = Vec::new();

        while let Some(current) = queue.pop_front() {
            for next in self.step(graph, current, direction) {
                if visited.insert(next) {
                    chain.push(next);
                    queue.push_back(next);
                }
            }
        }

        chain
    }
}
