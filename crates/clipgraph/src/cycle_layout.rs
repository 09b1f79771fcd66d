//! Automatic regular-polygon layout for newly closed cycles.
//!
//! When the user draws the edge that closes a loop, the member nodes are
//! arranged once on a regular polygon centered on their current centroid.
//! After that the user owns the arrangement: the cycle's key is remembered in
//! a [`LayoutDoneSet`] and the same node set is never laid out automatically
//! again until the flag is cleared.
//!
//! Positions are written through [`NodeAlignmentEngine::save_user_position`],
//! the same channel used by drags, so a later position merge keeps them.

use std::{
    collections::HashSet,
    f32::consts::{FRAC_PI_2, PI, TAU},
};

use indexmap::IndexMap;
use log::{debug, info, trace};

use clipgraph_core::{
    geometry::{Point, Size},
    graph::{GraphModel, Node},
    identifier::Id,
};

use crate::{
    alignment::NodeAlignmentEngine,
    config::CycleLayoutConfig,
    cycles::{CycleKey, DetectedCycle},
    persistence::PositionPersistence,
};

/// Smallest circumradius the polygon layout will produce.
pub const MIN_RADIUS: f32 = 180.0;

/// Fixed-formula polygon sizing.
///
/// The minimum chord between adjacent vertices is
/// `diagonal_factor * d + spacing`, where `d` is the average node diagonal.
/// A regular `n`-gon has chord `2 r sin(π / n)`, which gives `r`.
#[derive(Debug, Clone, Copy)]
pub struct PolygonGeometry {
    min_radius: f32,
    diagonal_factor: f32,
    spacing: f32,
}

impl Default for PolygonGeometry {
    fn default() -> Self {
        Self {
            min_radius: MIN_RADIUS,
            diagonal_factor: 0.8,
            spacing: 40.0,
        }
    }
}

impl From<&CycleLayoutConfig> for PolygonGeometry {
    fn from(config: &CycleLayoutConfig) -> Self {
        Self {
            min_radius: config.min_radius(),
            diagonal_factor: config.diagonal_factor(),
            spacing: config.spacing(),
        }
    }
}

impl PolygonGeometry {
    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    /// Circumradius for `n` vertices holding nodes of average size `average`.
    ///
    /// Never below `min_radius`, and falls back to it when `sin(π / n)` is too
    /// small to divide by.
    pub fn radius(&self, n: usize, average: Size) -> f32 {
        if n < 2 {
            return self.min_radius;
        }

        let chord = self.diagonal_factor * average.diagonal() + self.spacing;
        let sin = (PI / n as f32).sin();
        if sin <= f32::EPSILON {
            return self.min_radius;
        }

        let radius = chord / (2.0 * sin);
        if radius.is_finite() {
            radius.max(self.min_radius)
        } else {
            self.min_radius
        }
    }
}

/// Polygon radius for `n` nodes of average `width` × `height`, with the default geometry.
pub fn compute_radius(n: usize, width: f32, height: f32) -> f32 {
    PolygonGeometry::default().radius(n, Size::new(width, height))
}

/// Smallest absolute difference between two angles, in `[0, π]`.
fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}

/// Computes polygon positions for the members of `cycle`.
///
/// Members missing from `graph` are left out. Returns `None` when fewer than
/// two members resolve. Members keep their current angular order around the
/// centroid; the member closest to due north takes the first (north) vertex
/// and the rest follow clockwise on screen.
pub fn layout_cycle(
    cycle: &DetectedCycle,
    graph: &GraphModel,
    geometry: &PolygonGeometry,
) -> Option<Vec<(Id, Point)>> {
    let members: Vec<&Node> = cycle
        .node_ids()
        .iter()
        .filter_map(|id| graph.node(*id))
        .collect();
    if members.len() < 2 {
        trace!(key:% = cycle.key(); "Fewer than two members resolve, skipping layout");
        return None;
    }

    let centroid = Point::centroid(members.iter().map(|node| node.center()))?;
    let n = members.len();
    let average = Size::new(
        members.iter().map(|node| node.size().width()).sum::<f32>() / n as f32,
        members.iter().map(|node| node.size().height()).sum::<f32>() / n as f32,
    );
    let radius = geometry.radius(n, average);

    let mut ordered: Vec<(&Node, f32)> = members
        .into_iter()
        .map(|node| (node, node.center().angle_from(centroid)))
        .collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));

    let north = ordered
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            angular_distance(a.1, -FRAC_PI_2).total_cmp(&angular_distance(b.1, -FRAC_PI_2))
        })
        .map_or(0, |(index, _)| index);
    ordered.rotate_left(north);

    let step = TAU / n as f32;
    let positions = ordered
        .into_iter()
        .enumerate()
        .map(|(i, (node, _))| {
            let vertex = centroid.polar_offset(radius, -FRAC_PI_2 + i as f32 * step);
            (node.id(), vertex.sub_point(node.size().half()))
        })
        .collect();

    debug!(key:% = cycle.key(), nodes = n, radius; "Cycle polygon computed");
    Some(positions)
}

/// Whether every member of `cycle` is present and each one still has an edge
/// to the next member, wrapping around.
fn still_closed(cycle: &DetectedCycle, graph: &GraphModel) -> bool {
    let members = cycle.node_ids();
    members.iter().all(|id| graph.contains_node(*id))
        && members
            .iter()
            .zip(members.iter().cycle().skip(1))
            .all(|(from, to)| graph.outgoing(*from).any(|edge| edge.target() == *to))
}

/// Keys of cycles that have already been laid out once.
#[derive(Debug, Clone, Default)]
pub struct LayoutDoneSet {
    keys: HashSet<CycleKey>,
}

impl LayoutDoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &CycleKey) -> bool {
        self.keys.contains(key)
    }

    /// Marks `key` as done. Returns `false` if it already was.
    pub fn mark(&mut self, key: CycleKey) -> bool {
        self.keys.insert(key)
    }

    /// Clears the flag for one cycle. Returns `true` if it was set.
    pub fn unmark(&mut self, key: &CycleKey) -> bool {
        self.keys.remove(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Drives polygon layout for cycles as they appear.
///
/// Owns the [`LayoutDoneSet`] and the queue of layouts waiting for the next
/// animation frame. Each editor session owns one instance.
#[derive(Debug, Clone)]
pub struct CycleAutoLayout {
    geometry: PolygonGeometry,
    defer: bool,
    done: LayoutDoneSet,
    pending: IndexMap<CycleKey, DetectedCycle>,
}

impl Default for CycleAutoLayout {
    fn default() -> Self {
        Self::new(&CycleLayoutConfig::default())
    }
}

impl CycleAutoLayout {
    pub fn new(config: &CycleLayoutConfig) -> Self {
        Self {
            geometry: PolygonGeometry::from(config),
            defer: config.defer_layout(),
            done: LayoutDoneSet::new(),
            pending: IndexMap::new(),
        }
    }

    pub fn geometry(&self) -> &PolygonGeometry {
        &self.geometry
    }

    pub fn done(&self) -> &LayoutDoneSet {
        &self.done
    }

    pub fn is_done(&self, key: &CycleKey) -> bool {
        self.done.contains(key)
    }

    /// Whether layouts are waiting for [`on_animation_frame`](Self::on_animation_frame).
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Reacts to a fresh detection result.
    ///
    /// Every cycle whose key is not yet done is claimed. With deferral enabled
    /// the layout is queued for the next frame and nothing is returned;
    /// otherwise it is applied at once and the written positions are returned.
    pub fn react_to_new_cycles(
        &mut self,
        cycles: &[DetectedCycle],
        graph: &GraphModel,
        alignment: &mut NodeAlignmentEngine,
        persistence: &mut dyn PositionPersistence,
    ) -> Vec<(Id, Point)> {
        let mut applied = Vec::new();

        for cycle in cycles {
            if !self.done.mark(cycle.key().clone()) {
                // Keep a scheduled layout in step with the latest detection.
                if let Some(scheduled) = self.pending.get_mut(cycle.key()) {
                    *scheduled = cycle.clone();
                }
                continue;
            }

            if self.defer {
                trace!(key:% = cycle.key(); "Cycle layout scheduled for next frame");
                self.pending.insert(cycle.key().clone(), cycle.clone());
            } else {
                applied.extend(self.apply(cycle, graph, alignment, persistence));
            }
        }

        applied
    }

    /// Runs every layout scheduled by [`react_to_new_cycles`](Self::react_to_new_cycles).
    ///
    /// A cycle broken since it was scheduled (a member node is gone, or two
    /// consecutive members are no longer joined by an edge) is skipped without
    /// touching any node, and its claim is released so the loop is laid out if
    /// it closes again. Edge ids are not compared, so a redrawn edge keeps the
    /// loop intact.
    pub fn on_animation_frame(
        &mut self,
        graph: &GraphModel,
        alignment: &mut NodeAlignmentEngine,
        persistence: &mut dyn PositionPersistence,
    ) -> Vec<(Id, Point)> {
        let pending = std::mem::take(&mut self.pending);
        let mut applied = Vec::new();

        for (key, cycle) in pending {
            if !still_closed(&cycle, graph) {
                debug!(key:% = key; "Scheduled cycle broke before layout, skipping");
                self.done.unmark(&key);
                continue;
            }
            applied.extend(self.apply(&cycle, graph, alignment, persistence));
        }

        applied
    }

    /// Clears one cycle's done flag and lays it out again immediately.
    ///
    /// `cycles` is the current detection result; nothing happens if `key` is
    /// not among them.
    pub fn relayout(
        &mut self,
        key: &CycleKey,
        cycles: &[DetectedCycle],
        graph: &GraphModel,
        alignment: &mut NodeAlignmentEngine,
        persistence: &mut dyn PositionPersistence,
    ) -> Vec<(Id, Point)> {
        self.done.unmark(key);
        self.pending.shift_remove(key);

        let Some(cycle) = cycles.iter().find(|cycle| cycle.key() == key) else {
            debug!(key:% = key; "Relayout requested for unknown cycle");
            return Vec::new();
        };

        self.done.mark(key.clone());
        self.apply(cycle, graph, alignment, persistence)
    }

    /// Forgets every done flag and every scheduled layout.
    pub fn reset(&mut self) {
        debug!(done = self.done.len(), pending = self.pending.len(); "Cycle layout state reset");
        self.done.clear();
        self.pending.clear();
    }

    fn apply(
        &self,
        cycle: &DetectedCycle,
        graph: &GraphModel,
        alignment: &mut NodeAlignmentEngine,
        persistence: &mut dyn PositionPersistence,
    ) -> Vec<(Id, Point)> {
        let Some(positions) = layout_cycle(cycle, graph, &self.geometry) else {
            return Vec::new();
        };

        for &(id, position) in &positions {
            alignment.save_user_position(id, position);
            persistence.persist_position(id, position);
        }

        info!(key:% = cycle.key(), nodes = positions.len(); "Cycle layout applied");
        positions
    }
}
