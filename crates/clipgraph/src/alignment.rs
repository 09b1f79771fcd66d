//! Drag alignment, the user position cache and tidy layouts.
//!
//! [`NodeAlignmentEngine`] is the authoritative owner of hand-placed node
//! positions. Anything that moves a node on purpose (a finished drag, a cycle
//! layout, a tidy pass) writes through [`NodeAlignmentEngine::save_user_position`],
//! and [`NodeAlignmentEngine::merge_positions`] lays those positions over any
//! fresh host snapshot so they survive unrelated re-renders.
//!
//! While a node is being dragged, [`NodeAlignmentEngine::on_node_drag`]
//! produces transient [`GuideLine`]s: edge and center alignment against every
//! other node, plus equal-spacing hints along the dragged node's row and column.

mod guides;
mod tidy;

pub use guides::{GuideLine, GuideOrientation, GuideSource};
pub use tidy::{TidyMode, TidyModeParseError};

use indexmap::IndexMap;
use log::{debug, info, trace};

use clipgraph_core::{
    geometry::Point,
    graph::Node,
    identifier::Id,
};

use crate::config::AlignmentConfig;

/// Last explicitly set position per node id.
#[derive(Debug, Clone, Default)]
pub struct UserPositionCache {
    positions: IndexMap<Id, Point>,
}

impl UserPositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Id) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Stores `position` for `id`, returning the previous one.
    pub fn insert(&mut self, id: Id, position: Point) -> Option<Point> {
        self.positions.insert(id, position)
    }

    pub fn remove(&mut self, id: Id) -> Option<Point> {
        self.positions.shift_remove(&id)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Point)> + '_ {
        self.positions.iter().map(|(id, position)| (*id, *position))
    }
}

/// Interactive alignment engine for one editor session.
#[derive(Debug, Clone, Default)]
pub struct NodeAlignmentEngine {
    config: AlignmentConfig,
    cache: UserPositionCache,
}

impl NodeAlignmentEngine {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            cache: UserPositionCache::new(),
        }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn cache(&self) -> &UserPositionCache {
        &self.cache
    }

    pub fn user_position(&self, id: Id) -> Option<Point> {
        self.cache.get(id)
    }

    /// Returns `nodes` with every cached position substituted in.
    ///
    /// Nodes without a cached position pass through unchanged.
    pub fn merge_positions<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|node| match self.cache.get(node.id()) {
                Some(position) => node.clone().with_position(position),
                None => node.clone(),
            })
            .collect()
    }

    /// Commits the final position of a dragged node.
    pub fn on_node_drag_stop(&mut self, node: &Node) {
        trace!(node:% = node.id(); "Drag committed");
        self.cache.insert(node.id(), node.position());
    }

    pub fn save_user_position(&mut self, id: Id, position: Point) {
        self.cache.insert(id, position);
    }

    pub fn clear_user_position(&mut self, id: Id) -> Option<Point> {
        self.cache.remove(id)
    }

    pub fn clear_all_user_positions(&mut self) {
        debug!(positions = self.cache.len(); "User position cache cleared");
        self.cache.clear();
    }

    /// Guide lines for `dragged` at its current position against `all_nodes`.
    ///
    /// `all_nodes` may include the dragged node itself; it is never compared
    /// against itself for edge alignment.
    pub fn on_node_drag<'a>(
        &self,
        dragged: &Node,
        all_nodes: impl IntoIterator<Item = &'a Node>,
    ) -> Vec<GuideLine> {
        let others: Vec<&Node> = all_nodes
            .into_iter()
            .filter(|node| node.id() != dragged.id())
            .collect();

        let mut lines = guides::snap_lines(dragged, &others, self.config.snap_threshold());
        lines.extend(guides::equal_spacing_lines(dragged, &others, &self.config));

        let lines = guides::dedup(lines);
        trace!(node:% = dragged.id(), guides = lines.len(); "Drag guides computed");
        lines
    }

    /// Re-arranges `nodes` in one pass and makes the result sticky.
    ///
    /// Returns the nodes in their input order with updated positions. Every
    /// moved node's position is written into the cache.
    pub fn tidy_layout(&mut self, nodes: &[Node], mode: TidyMode, gap: f32) -> Vec<Node> {
        let positions = tidy::arrange(nodes, mode, gap);
        if positions.is_empty() {
            return nodes.to_vec();
        }

        for (id, position) in &positions {
            self.cache.insert(*id, *position);
        }

        info!(mode:% = mode, nodes = positions.len(); "Tidy layout applied");
        nodes
            .iter()
            .map(|node| match positions.get(&node.id()) {
                Some(position) => node.clone().with_position(*position),
                None => node.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, Point::new(x, y))
    }

    #[test]
    fn test_merge_prefers_cached_position() {
        let mut engine = NodeAlignmentEngine::default();
        engine.save_user_position(Id::new("a"), Point::new(5.0, 6.0));

        let merged = engine.merge_positions(&[node("a", 0.0, 0.0), node("b", 1.0, 2.0)]);

        assert_eq!(merged[0].position(), Point::new(5.0, 6.0));
        assert_eq!(merged[1].position(), Point::new(1.0, 2.0));

        let again = engine.merge_positions(&merged);
        assert_eq!(again, merged);
    }

    #[test]
    fn test_drag_stop_commits_and_clear() {
        let mut engine = NodeAlignmentEngine::default();
        engine.on_node_drag_stop(&node("a", 30.0, 40.0));
        engine.on_node_drag_stop(&node("b", 1.0, 1.0));

        assert_eq!(engine.user_position(Id::new("a")), Some(Point::new(30.0, 40.0)));
        assert_eq!(engine.clear_user_position(Id::new("a")), Some(Point::new(30.0, 40.0)));
        assert_eq!(engine.user_position(Id::new("a")), None);

        engine.clear_all_user_positions();
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_merge_ignores_positions_of_absent_nodes() {
        let mut engine = NodeAlignmentEngine::default();
        engine.save_user_position(Id::new("a"), Point::new(9.0, 9.0));
        engine.save_user_position(Id::new("ghost"), Point::new(1.0, 1.0));

        let merged = engine.merge_positions(&[node("a", 0.0, 0.0)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].position(), Point::new(9.0, 9.0));
    }

    #[test]
    fn test_drag_ignores_self() {
        let engine = NodeAlignmentEngine::default();
        let dragged = node("a", 0.0, 0.0);

        let lines = engine.on_node_drag(&dragged, [&dragged]);

        assert!(lines.is_empty());
    }

    #[test]
    fn test_tidy_makes_positions_sticky() {
        let mut engine = NodeAlignmentEngine::default();
        let nodes = vec![node("a", 50.0, 10.0), node("b", 0.0, 0.0)];

        let tidied = engine.tidy_layout(&nodes, TidyMode::Horizontal, 10.0);

        assert_eq!(tidied[0].id(), Id::new("a"));
        assert_eq!(tidied[1].position(), Point::new(0.0, 0.0));
        assert_eq!(tidied[0].position(), Point::new(170.0, 0.0));
        assert_eq!(engine.user_position(Id::new("a")), Some(Point::new(170.0, 0.0)));

        let merged = engine.merge_positions(&nodes);
        assert_eq!(merged, tidied);
    }

    #[test]
    fn test_tidy_distribute_skips_single_node() {
        let mut engine = NodeAlignmentEngine::default();
        let nodes = vec![node("a", 50.0, 10.0)];

        let tidied = engine.tidy_layout(&nodes, TidyMode::DistributeH, 10.0);

        assert_eq!(tidied, nodes);
        assert!(engine.cache().is_empty());
    }
}
