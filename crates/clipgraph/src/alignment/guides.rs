//! Guide line computation for a single drag tick.

use std::collections::HashSet;

use serde::Serialize;

use clipgraph_core::{graph::Node, identifier::Id};

use crate::config::AlignmentConfig;

/// Orientation of a guide line.
///
/// A vertical line marks an x coordinate, a horizontal line a y coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideOrientation {
    Horizontal,
    Vertical,
}

/// What a guide line aligns the dragged node with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "nodeId")]
pub enum GuideSource {
    /// An edge or center of another node.
    Node(Id),
    /// The middle of three equally spaced nodes.
    EqualSpacing,
}

impl GuideSource {
    pub fn is_equal_spacing(self) -> bool {
        matches!(self, Self::EqualSpacing)
    }
}

/// A transient alignment hint shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideLine {
    #[serde(rename = "type")]
    orientation: GuideOrientation,
    position: f32,
    source: GuideSource,
}

impl GuideLine {
    pub fn new(orientation: GuideOrientation, position: f32, source: GuideSource) -> Self {
        Self {
            orientation,
            position,
            source,
        }
    }

    pub fn orientation(&self) -> GuideOrientation {
        self.orientation
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn source(&self) -> GuideSource {
        self.source
    }
}

/// Edge and center alignment of `dragged` against each of `others`.
///
/// Per axis the comparisons are min-min, max-max, center-center, and the two
/// cross pairs min-max and max-min. A line is placed on the other node's
/// coordinate whenever the difference is strictly below `threshold`.
pub(super) fn snap_lines(dragged: &Node, others: &[&Node], threshold: f32) -> Vec<GuideLine> {
    let own = dragged.bounds();
    let mut lines = Vec::new();

    for other in others {
        let theirs = other.bounds();
        let source = GuideSource::Node(other.id());

        let vertical = [
            (own.min_x(), theirs.min_x()),
            (own.max_x(), theirs.max_x()),
            (own.center_x(), theirs.center_x()),
            (own.min_x(), theirs.max_x()),
            (own.max_x(), theirs.min_x()),
        ];
        let horizontal = [
            (own.min_y(), theirs.min_y()),
            (own.max_y(), theirs.max_y()),
            (own.center_y(), theirs.center_y()),
            (own.min_y(), theirs.max_y()),
            (own.max_y(), theirs.min_y()),
        ];

        lines.extend(
            vertical
                .into_iter()
                .filter(|(a, b)| (a - b).abs() < threshold)
                .map(|(_, at)| GuideLine::new(GuideOrientation::Vertical, at, source)),
        );
        lines.extend(
            horizontal
                .into_iter()
                .filter(|(a, b)| (a - b).abs() < threshold)
                .map(|(_, at)| GuideLine::new(GuideOrientation::Horizontal, at, source)),
        );
    }

    lines
}

/// Equal-spacing hints along the dragged node's row and column.
///
/// The row holds every node (dragged one included) whose `y` is within half
/// the dragged node's height, ordered by `x`; the column is the same with the
/// axes swapped. For each consecutive triple whose two gaps differ by less
/// than the equal-spacing threshold, and where both gaps exceed the minimum
/// gap, a line is placed at the middle node's coordinate.
pub(super) fn equal_spacing_lines(
    dragged: &Node,
    others: &[&Node],
    config: &AlignmentConfig,
) -> Vec<GuideLine> {
    let origin = dragged.position();
    let size = dragged.size();

    let mut row: Vec<f32> = std::iter::once(dragged)
        .chain(others.iter().copied())
        .filter(|node| (node.position().y() - origin.y()).abs() < size.height() / 2.0)
        .map(|node| node.position().x())
        .collect();
    let mut column: Vec<f32> = std::iter::once(dragged)
        .chain(others.iter().copied())
        .filter(|node| (node.position().x() - origin.x()).abs() < size.width() / 2.0)
        .map(|node| node.position().y())
        .collect();

    let mut lines = equal_gaps(&mut row, config)
        .map(|at| GuideLine::new(GuideOrientation::Vertical, at, GuideSource::EqualSpacing))
        .collect::<Vec<_>>();
    lines.extend(
        equal_gaps(&mut column, config)
            .map(|at| GuideLine::new(GuideOrientation::Horizontal, at, GuideSource::EqualSpacing)),
    );
    lines
}

/// Sorts `coords` and yields the middle of every equally spaced triple.
fn equal_gaps<'a>(
    coords: &'a mut [f32],
    config: &'a AlignmentConfig,
) -> impl Iterator<Item = f32> + 'a {
    coords.sort_by(f32::total_cmp);
    coords.windows(3).filter_map(move |triple| {
        let first = triple[1] - triple[0];
        let second = triple[2] - triple[1];
        let min_gap = config.min_equal_gap();
        let equal = (first - second).abs() < config.equal_spacing_threshold();
        (equal && first > min_gap && second > min_gap).then_some(triple[1])
    })
}

/// Collapses lines with the same orientation, rounded position and source kind.
///
/// The first occurrence wins, so the relative order of surviving lines is stable.
pub(super) fn dedup(lines: Vec<GuideLine>) -> Vec<GuideLine> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| {
            seen.insert((
                line.orientation,
                line.position.round() as i64,
                line.source.is_equal_spacing(),
            ))
        })
        .collect()
}
