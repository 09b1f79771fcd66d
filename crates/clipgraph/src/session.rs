//! One editing session: the graph plus every engine that works on it.
//!
//! [`EditorSession`] owns the only [`GraphModel`], the
//! [`NodeAlignmentEngine`] with its position cache, the [`CycleAutoLayout`]
//! with its done-set and frame queue, and the [`RelationGraphManager`].
//! Sessions share nothing, so two editors (or two tests) never see each
//! other's cached positions or layout flags.
//!
//! # Example
//!
//! ```
//! # use clipgraph::{EditorSession, config::AppConfig};
//! # use clipgraph::graph::{Edge, Node};
//! # use clipgraph::geometry::Point;
//! let mut session = EditorSession::new(&AppConfig::default());
//! session.sync(
//!     [
//!         Node::new("a", Point::new(0.0, 0.0)),
//!         Node::new("b", Point::new(200.0, 0.0)),
//!     ],
//!     [Edge::new("ab", "a", "b"), Edge::new("ba", "b", "a")],
//! );
//! assert_eq!(session.cycles().len(), 1);
//!
//! // Cycle layouts are deferred to the next frame by default.
//! let moved = session.on_animation_frame();
//! assert_eq!(moved.len(), 2);
//! ```

use log::{debug, info};

use clipgraph_core::{
    geometry::Point,
    graph::{Edge, GraphModel, Node, RelationType},
    identifier::Id,
};

use crate::{
    alignment::{GuideLine, NodeAlignmentEngine, TidyMode},
    config::{AppConfig, TidyConfig},
    cycle_layout::CycleAutoLayout,
    cycles::{CycleDetector, CycleKey, DetectedCycle},
    error::ClipgraphError,
    persistence::{NoPersistence, PositionPersistence},
    relation::{ClassifiedEdges, RelationGraphManager},
};

/// Editor-side state for one canvas: the graph and the engines that work on it.
///
/// Host events come in through [`sync`](Self::sync), the drag hooks and
/// [`on_animation_frame`](Self::on_animation_frame). Layout results are
/// written to the graph, the user position cache and the installed
/// [`PositionPersistence`].
pub struct EditorSession {
    graph: GraphModel,
    cycles: Vec<DetectedCycle>,
    detector: CycleDetector,
    alignment: NodeAlignmentEngine,
    auto_layout: CycleAutoLayout,
    relations: RelationGraphManager,
    tidy: TidyConfig,
    persistence: Box<dyn PositionPersistence>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            graph: GraphModel::new(),
            cycles: Vec::new(),
            detector: CycleDetector::new(config.cycle_layout().max_cycle_len()),
            alignment: NodeAlignmentEngine::new(config.alignment().clone()),
            auto_layout: CycleAutoLayout::new(config.cycle_layout()),
            relations: RelationGraphManager::new(config.lineage().traversal()),
            tidy: config.tidy().clone(),
            persistence: Box::new(NoPersistence),
        }
    }

    /// Installs the collaborator that stores layout results.
    pub fn with_persistence(mut self, persistence: impl PositionPersistence + 'static) -> Self {
        self.persistence = Box::new(persistence);
        self
    }

    /// Returns the current graph.
    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Cycles found by the latest detection pass.
    pub fn cycles(&self) -> &[DetectedCycle] {
        &self.cycles
    }

    /// Returns the alignment engine and its position cache.
    pub fn alignment(&self) -> &NodeAlignmentEngine {
        &self.alignment
    }

    /// Returns the cycle auto-layout and its done flags.
    pub fn auto_layout(&self) -> &CycleAutoLayout {
        &self.auto_layout
    }

    /// Looks up a caller-supplied node name.
    pub fn resolve_node(&self, name: &str) -> Result<Id, ClipgraphError> {
        let id = Id::new(name);
        if self.graph.contains_node(id) {
            Ok(id)
        } else {
            Err(ClipgraphError::UnknownNode(name.to_string()))
        }
    }

    /// Replaces the graph with a fresh host snapshot.
    ///
    /// Cached user positions are laid over the incoming nodes, cycles are
    /// re-detected and any new cycle is handed to the auto-layout.
    pub fn sync(
        &mut self,
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> &[DetectedCycle] {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        self.graph = GraphModel::from_parts(self.alignment.merge_positions(&nodes), edges);
        debug!(
            nodes = self.graph.nodes_count(),
            edges = self.graph.edges_count();
            "Session synced"
        );
        self.refresh();
        &self.cycles
    }

    /// Moves `id` to `position` for this drag tick and returns its guide lines.
    ///
    /// Unknown ids produce no guides.
    pub fn on_node_drag(&mut self, id: Id, position: Point) -> Vec<GuideLine> {
        if !self.graph.set_node_position(id, position) {
            return Vec::new();
        }
        let Some(dragged) = self.graph.node(id) else {
            return Vec::new();
        };
        self.alignment.on_node_drag(dragged, self.graph.nodes())
    }

    /// Commits a finished drag. Returns `false` for unknown ids.
    pub fn on_node_drag_stop(&mut self, id: Id) -> bool {
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        self.alignment.on_node_drag_stop(node);
        self.cycles = self.detector.detect(&self.graph);
        true
    }

    /// Runs cycle layouts scheduled by earlier syncs and applies them to the graph.
    pub fn on_animation_frame(&mut self) -> Vec<(Id, Point)> {
        let applied = self.auto_layout.on_animation_frame(
            &self.graph,
            &mut self.alignment,
            &mut *self.persistence,
        );
        self.apply_positions(&applied);
        applied
    }

    /// Lays out one detected cycle again, ignoring its done flag.
    pub fn relayout_cycle(&mut self, key: &CycleKey) -> Vec<(Id, Point)> {
        let applied = self.auto_layout.relayout(
            key,
            &self.cycles,
            &self.graph,
            &mut self.alignment,
            &mut *self.persistence,
        );
        self.apply_positions(&applied);
        applied
    }

    /// Forgets which cycles were laid out. Nothing moves until the next sync.
    pub fn reset_cycle_layouts(&mut self) {
        self.auto_layout.reset();
    }

    /// Empties the graph and every session cache.
    pub fn clear(&mut self) {
        info!(nodes = self.graph.nodes_count(); "Session cleared");
        self.graph.clear();
        self.cycles.clear();
        self.alignment.clear_all_user_positions();
        self.auto_layout.reset();
    }

    /// Tidies `selection` (every node when `None`).
    ///
    /// `mode` and `gap` fall back to the configured defaults. Returns the
    /// nodes that moved; each one is persisted.
    pub fn tidy(
        &mut self,
        mode: Option<TidyMode>,
        gap: Option<f32>,
        selection: Option<&[Id]>,
    ) -> Vec<(Id, Point)> {
        let nodes: Vec<Node> = match selection {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.graph.node(*id))
                .cloned()
                .collect(),
            None => self.graph.nodes().cloned().collect(),
        };

        let mode = mode.unwrap_or(self.tidy.mode());
        let gap = gap.unwrap_or(self.tidy.gap());
        let tidied = self.alignment.tidy_layout(&nodes, mode, gap);

        let moved: Vec<(Id, Point)> = tidied
            .iter()
            .zip(&nodes)
            .filter(|(after, before)| after.position() != before.position())
            .map(|(after, _)| (after.id(), after.position()))
            .collect();

        for &(id, position) in &moved {
            self.persistence.persist_position(id, position);
        }
        self.apply_positions(&moved);
        moved
    }

    pub fn classify_edges(&self) -> ClassifiedEdges<'_> {
        self.relations.classify(&self.graph)
    }

    pub fn direct_upstream(&self, id: Id) -> Vec<Id> {
        self.relations.direct_upstream(&self.graph, id)
    }

    pub fn direct_downstream(&self, id: Id) -> Vec<Id> {
        self.relations.direct_downstream(&self.graph, id)
    }

    pub fn upstream_chain(&self, id: Id) -> Vec<Id> {
        self.relations.upstream_chain(&self.graph, id)
    }

    pub fn downstream_chain(&self, id: Id) -> Vec<Id> {
        self.relations.downstream_chain(&self.graph, id)
    }

    pub fn has_relation(&self, a: Id, b: Id) -> bool {
        self.relations.has_relation(&self.graph, a, b)
    }

    /// Adds or upgrades a relation edge. A new edge may close a cycle.
    pub fn add_relation(
        &mut self,
        source: Id,
        target: Id,
        relation_type: RelationType,
        label: Option<String>,
    ) -> Id {
        let id = self
            .relations
            .add_relation(&mut self.graph, source, target, relation_type, label);
        self.refresh();
        id
    }

    pub fn remove_relation(&mut self, source: Id, target: Id) -> usize {
        let removed = self.relations.remove_relation(&mut self.graph, source, target);
        if removed > 0 {
            self.refresh();
        }
        removed
    }

    pub fn set_relations(&mut self, relations: impl IntoIterator<Item = Edge>) {
        self.relations.set_relations(&mut self.graph, relations);
        self.refresh();
    }

    /// Re-detects cycles and lets the auto-layout react to new ones.
    fn refresh(&mut self) {
        self.cycles = self.detector.detect(&self.graph);
        let applied = self.auto_layout.react_to_new_cycles(
            &self.cycles,
            &self.graph,
            &mut self.alignment,
            &mut *self.persistence,
        );
        self.apply_positions(&applied);
    }

    fn apply_positions(&mut self, positions: &[(Id, Point)]) {
        if positions.is_empty() {
            return;
        }
        for &(id, position) in positions {
            self.graph.set_node_position(id, position);
        }
        // Centers moved.
        self.cycles = self.detector.detect(&self.graph);
    }
}
