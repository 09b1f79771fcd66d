//! One-shot batch arrangements of a node selection.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clipgraph_core::{
    geometry::{Bounds, Point, Size},
    graph::Node,
    identifier::Id,
};

/// Arrangement applied by a tidy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TidyMode {
    /// A single row, left to right, each node taking its own width.
    Horizontal,
    /// A single column, top to bottom, stepping by the tallest node.
    Vertical,
    /// `ceil(sqrt(n))` columns filled row by row.
    Grid,
    /// Even horizontal spacing between the leftmost and rightmost nodes.
    DistributeH,
    /// Even vertical spacing between the topmost and bottommost nodes.
    DistributeV,
}

impl TidyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Grid => "grid",
            Self::DistributeH => "distribute-h",
            Self::DistributeV => "distribute-v",
        }
    }
}

impl fmt::Display for TidyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "unknown tidy mode `{0}` (expected horizontal, vertical, grid, distribute-h or distribute-v)"
)]
pub struct TidyModeParseError(String);

impl FromStr for TidyMode {
    type Err = TidyModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "grid" => Ok(Self::Grid),
            "distribute-h" => Ok(Self::DistributeH),
            "distribute-v" => Ok(Self::DistributeV),
            other => Err(TidyModeParseError(other.to_string())),
        }
    }
}

/// Computes new top-left positions for `nodes`.
///
/// Row, column and grid arrangements start at the top-left corner of the
/// selection's bounding box. The result is empty when there is nothing to do.
pub(super) fn arrange(nodes: &[Node], mode: TidyMode, gap: f32) -> IndexMap<Id, Point> {
    let Some(origin) = nodes
        .iter()
        .map(Node::bounds)
        .reduce(|acc, bounds| acc.merge(&bounds))
        .map(Bounds::min_point)
    else {
        return IndexMap::new();
    };

    match mode {
        TidyMode::Horizontal => {
            let mut x = origin.x();
            sorted_by(nodes, |position| position.x())
                .map(|node| {
                    let position = Point::new(x, origin.y());
                    x += node.size().width() + gap;
                    (node.id(), position)
                })
                .collect()
        }
        TidyMode::Vertical => {
            let step = uniform_size(nodes).height() + gap;
            sorted_by(nodes, |position| position.y())
                .enumerate()
                .map(|(i, node)| (node.id(), Point::new(origin.x(), origin.y() + i as f32 * step)))
                .collect()
        }
        TidyMode::Grid => {
            let columns = (nodes.len() as f32).sqrt().ceil() as usize;
            let cell = uniform_size(nodes);
            let mut ordered: Vec<&Node> = nodes.iter().collect();
            ordered.sort_by(|a, b| {
                let (a, b) = (a.position(), b.position());
                a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x()))
            });
            ordered
                .into_iter()
                .enumerate()
                .map(|(i, node)| {
                    let (row, column) = ((i / columns) as f32, (i % columns) as f32);
                    let position = Point::new(
                        origin.x() + column * (cell.width() + gap),
                        origin.y() + row * (cell.height() + gap),
                    );
                    (node.id(), position)
                })
                .collect()
        }
        TidyMode::DistributeH => distribute(nodes, |position| position.x(), Point::with_x),
        TidyMode::DistributeV => distribute(nodes, |position| position.y(), Point::with_y),
    }
}

/// Largest width and largest height over `nodes`.
fn uniform_size(nodes: &[Node]) -> Size {
    nodes
        .iter()
        .map(Node::size)
        .fold(Size::default(), |acc, size| acc.max(size))
}

fn sorted_by(nodes: &[Node], axis: impl Fn(Point) -> f32) -> impl Iterator<Item = &Node> {
    let mut ordered: Vec<&Node> = nodes.iter().collect();
    ordered.sort_by(|a, b| axis(a.position()).total_cmp(&axis(b.position())));
    ordered.into_iter()
}

/// Spaces nodes evenly along one axis, keeping the two extremes in place.
fn distribute(
    nodes: &[Node],
    axis: impl Fn(Point) -> f32,
    place: impl Fn(Point, f32) -> Point,
) -> IndexMap<Id, Point> {
    if nodes.len() < 2 {
        return IndexMap::new();
    }

    let ordered: Vec<&Node> = sorted_by(nodes, &axis).collect();
    let first = axis(ordered[0].position());
    let last = axis(ordered[ordered.len() - 1].position());
    let step = (last - first) / (ordered.len() - 1) as f32;

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, node)| (node.id(), place(node.position(), first + i as f32 * step)))
        .collect()
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, Point::new(x, y)).with_size(Size::new(100.0, 50.0))
    }

    fn at(positions: &IndexMap<Id, Point>, id: &str) -> Point {
        positions[&Id::new(id)]
    }

    #[test]
    fn test_grid_of_five_uses_three_columns() {
        let nodes: Vec<Node> = (0..5)
            .map(|i| node(&format!("n{i}"), i as f32 * 10.0, 0.0))
            .collect();

        let positions = arrange(&nodes, TidyMode::Grid, 20.0);

        let rows: Vec<f32> = positions.values().map(|position| position.y()).collect();
        assert_eq!(rows, vec![0.0, 0.0, 0.0, 70.0, 70.0]);
        assert_eq!(at(&positions, "n2"), Point::new(240.0, 0.0));
        assert_eq!(at(&positions, "n3"), Point::new(0.0, 70.0));
        assert_eq!(at(&positions, "n4"), Point::new(120.0, 70.0));
    }

    #[test]
    fn test_horizontal_uses_actual_widths() {
        let nodes = vec![
            node("b", 300.0, 40.0),
            Node::new("a", Point::new(10.0, 20.0)).with_size(Size::new(50.0, 50.0)),
        ];

        let positions = arrange(&nodes, TidyMode::Horizontal, 5.0);

        assert_eq!(at(&positions, "a"), Point::new(10.0, 20.0));
        assert_eq!(at(&positions, "b"), Point::new(65.0, 20.0));
    }

    #[test]
    fn test_vertical_uses_uniform_height() {
        let nodes = vec![
            node("a", 0.0, 0.0),
            Node::new("tall", Point::new(0.0, 10.0)).with_size(Size::new(10.0, 200.0)),
            node("c", 5.0, 20.0),
        ];

        let positions = arrange(&nodes, TidyMode::Vertical, 10.0);

        assert_eq!(at(&positions, "tall"), Point::new(0.0, 210.0));
        assert_eq!(at(&positions, "c"), Point::new(0.0, 420.0));
    }

    #[test]
    fn test_distribute_keeps_extremes() {
        let nodes = vec![
            node("a", 0.0, 5.0),
            node("c", 300.0, 7.0),
            node("b", 40.0, 9.0),
            node("d", 120.0, 1.0),
        ];

        let positions = arrange(&nodes, TidyMode::DistributeH, 0.0);

        assert_eq!(at(&positions, "a"), Point::new(0.0, 5.0));
        assert_eq!(at(&positions, "c"), Point::new(300.0, 7.0));
        assert_approx_eq!(f32, at(&positions, "b").x(), 100.0);
        assert_approx_eq!(f32, at(&positions, "d").x(), 200.0);
        assert_eq!(at(&positions, "d").y(), 1.0);
    }

    #[test]
    fn test_distribute_vertical() {
        let nodes = vec![node("a", 3.0, 0.0), node("b", 4.0, 10.0), node("c", 5.0, 90.0)];

        let positions = arrange(&nodes, TidyMode::DistributeV, 0.0);

        assert_eq!(at(&positions, "b"), Point::new(4.0, 45.0));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(arrange(&[], TidyMode::Grid, 10.0).is_empty());
        assert!(arrange(&[node("a", 0.0, 0.0)], TidyMode::DistributeV, 10.0).is_empty());
        assert_eq!(arrange(&[node("a", 3.0, 4.0)], TidyMode::Grid, 10.0).len(), 1);
    }

    #[test]
    fn test_mode_parse_and_display() {
        for mode in [
            TidyMode::Horizontal,
            TidyMode::Vertical,
            TidyMode::Grid,
            TidyMode::DistributeH,
            TidyMode::DistributeV,
        ] {
            assert_eq!(mode.to_string().parse::<TidyMode>(), Ok(mode));
        }
        assert!("diagonal".parse::<TidyMode>().is_err());
    }
}
