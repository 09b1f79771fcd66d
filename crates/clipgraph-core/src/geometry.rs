//! Canvas-space geometry: points, sizes and axis-aligned boxes.
//!
//! Every engine reads node boxes through these types and writes node
//! positions back as [`Point`]s.
//!
//! - [`Point`]: a coordinate, also used as an offset vector
//! - [`Size`]: measured node dimensions
//! - [`Bounds`]: a box given by its min and max corners
//!
//! Canvas space follows screen conventions. `x` grows to the right and `y`
//! grows downward, so the angle `-π/2` points "north":
//!
//! ```text
//!   origin ──► +x
//!     │
//!     ▼ +y
//! ```
//!
//! A node position is the **top-left** corner of its box, never its center.

use serde::{Deserialize, Serialize};

/// A coordinate in canvas space.
///
/// ```
/// # use clipgraph_core::geometry::Point;
/// let center = Point::new(100.0, 100.0);
/// let north = center.polar_offset(50.0, -std::f32::consts::FRAC_PI_2);
///
/// assert!((north.y() - 50.0).abs() < 1e-3);
/// assert!((north.angle_from(center) + std::f32::consts::FRAC_PI_2).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Same point with `x` replaced.
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Same point with `y` replaced.
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle in radians of the vector from `origin` to this point.
    ///
    /// Follows `atan2` conventions in screen space, so the result is in
    /// `(-π, π]` and `-π/2` means straight up.
    pub fn angle_from(self, origin: Point) -> f32 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }

    /// Point at `radius` from this point along `angle`.
    pub fn polar_offset(self, radius: f32, angle: f32) -> Self {
        Self {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }

    /// Arithmetic mean of a set of points, or `None` for an empty set.
    pub fn centroid(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let (sum, count) = points
            .into_iter()
            .fold((Point::default(), 0usize), |(sum, count), point| {
                (sum.add_point(point), count + 1)
            });
        (count > 0).then(|| sum.scale(1.0 / count as f32))
    }
}

/// Dimensions of a node box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Length of the box diagonal, `sqrt(w² + h²)`
    pub fn diagonal(self) -> f32 {
        self.width.hypot(self.height)
    }

    /// Half the size as an offset from the top-left corner to the center
    pub fn half(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Component-wise maximum, used to build uniform grid cells.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// An axis-aligned box defined by its minimum and maximum coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Left edge.
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Top edge.
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Right edge.
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Bottom edge.
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn center_x(self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(self) -> f32 {
        (self.min_y + self.max_y) / 2.0
    }

    pub fn center(self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Top-left corner.
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Smallest box covering both `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_distance() {
        let origin = Point::new(1.0, 1.0);
        assert_approx_eq!(f32, Point::new(4.0, 5.0).distance(origin), 5.0);
        assert_approx_eq!(f32, origin.distance(origin), 0.0);
    }

    #[test]
    fn test_angle_from_screen_directions() {
        let origin = Point::new(100.0, 100.0);
        assert_approx_eq!(f32, Point::new(200.0, 100.0).angle_from(origin), 0.0);
        assert_approx_eq!(f32, Point::new(100.0, 0.0).angle_from(origin), -FRAC_PI_2);
        assert_approx_eq!(f32, Point::new(100.0, 200.0).angle_from(origin), FRAC_PI_2);
        assert_approx_eq!(f32, Point::new(0.0, 100.0).angle_from(origin), PI);
    }

    #[test]
    fn test_polar_offset_north() {
        let center = Point::new(10.0, 10.0);
        let north = center.polar_offset(50.0, -FRAC_PI_2);
        assert_approx_eq!(f32, north.x(), 10.0, epsilon = 0.0001);
        assert_approx_eq!(f32, north.y(), -40.0, epsilon = 0.0001);
    }

    #[test]
    fn test_centroid() {
        let centroid = Point::centroid([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 30.0),
        ])
        .unwrap();
        assert_approx_eq!(f32, centroid.x(), 5.0);
        assert_approx_eq!(f32, centroid.y(), 10.0);

        assert!(Point::centroid(std::iter::empty()).is_none());
    }

    #[test]
    fn test_size_diagonal_and_half() {
        let size = Size::new(30.0, 40.0);
        assert_approx_eq!(f32, size.diagonal(), 50.0);
        assert_eq!(size.half(), Point::new(15.0, 20.0));
        assert_eq!(Size::default().max(size), size);
    }

    #[test]
    fn test_bounds_edges_and_center() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(100.0, 50.0));
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.max_x(), 110.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_y(), 70.0);
        assert_eq!(bounds.center(), Point::new(60.0, 45.0));
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 50.0);
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Bounds::new_from_top_left(Point::new(20.0, -5.0), Size::new(10.0, 10.0));
        let merged = a.merge(&b);
        assert_eq!(merged.min_point(), Point::new(0.0, -5.0));
        assert_eq!(merged.max_x(), 30.0);
        assert_eq!(merged.max_y(), 10.0);
    }
}
