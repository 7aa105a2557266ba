//! Planar geometry primitives: points, segments and their intersections.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in the plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The fixed start of every path.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise equality within `threshold`.
    #[inline]
    pub fn approx_eq(&self, other: &Point, threshold: f64) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A closed line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    #[inline]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Whether the two closed segments share at least one point.
    #[inline]
    pub fn intersects(&self, other: &Segment) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
    }

    /// Intersection of the lines through both segments.
    #[inline]
    pub fn intersection_point(&self, other: &Segment) -> Option<Point> {
        line_intersection_point(self.start, self.end, other.start, other.end)
    }
}

/// Orientation of `p` relative to the directed segment `a -> b`.
///
/// Returns 1 or -1 for the two sides of the line. Collinear points return 0
/// when they lie on the segment, and -1/1 when they lie beyond `a`/`b`
/// respectively, so that collinear but disjoint segments are not reported
/// as intersecting.
fn relative_ccw(a: Point, b: Point, p: Point) -> i32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut px, mut py) = (p.x - a.x, p.y - a.y);

    let mut ccw = px * dy - py * dx;
    if ccw == 0.0 {
        ccw = px * dx + py * dy;
        if ccw > 0.0 {
            px -= dx;
            py -= dy;
            ccw = px * dx + py * dy;
            if ccw < 0.0 {
                ccw = 0.0;
            }
        }
    }

    if ccw < 0.0 {
        -1
    } else if ccw > 0.0 {
        1
    } else {
        0
    }
}

/// Closed-segment intersection test for `a1 -> a2` and `b1 -> b2`.
///
/// Touching endpoints and collinear overlap both count as intersecting.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    relative_ccw(a1, a2, b1) * relative_ccw(a1, a2, b2) <= 0
        && relative_ccw(b1, b2, a1) * relative_ccw(b1, b2, a2) <= 0
}

/// Intersection point of the infinite lines through `a1 -> a2` and `b1 -> b2`.
///
/// Each line is written as `a*x + b*y = c` and the 2x2 system is solved
/// directly. Returns `None` only when the determinant is exactly zero
/// (parallel or coincident lines). The returned point may lie outside both
/// segments; callers check [`segments_intersect`] first.
pub fn line_intersection_point(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let la = a2.y - a1.y;
    let lb = a1.x - a2.x;
    let lc = la * a1.x + lb * a1.y;

    let ma = b2.y - b1.y;
    let mb = b1.x - b2.x;
    let mc = ma * b1.x + mb * b1.y;

    let determinant = la * mb - ma * lb;
    if determinant == 0.0 {
        return None;
    }

    Some(Point {
        x: (mb * lc - lb * mc) / determinant,
        y: (la * mc - ma * lc) / determinant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_crossing_segments_intersect() {
        assert!(segments_intersect(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)));
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 1.0), p(5.0, 0.0), p(6.0, 1.0)));
        // Lines cross, segments do not reach.
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(2.0, 1.0)));
    }

    #[test]
    fn test_touching_endpoint_counts() {
        assert!(segments_intersect(p(0.0, 0.0), p(5.0, 5.0), p(5.0, 5.0), p(10.0, 0.0)));
        // T-junction
        assert!(segments_intersect(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0), p(5.0, 5.0)));
    }

    #[test]
    fn test_collinear_overlap_counts() {
        assert!(segments_intersect(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0), p(15.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(4.0, 0.0), p(5.0, 0.0), p(15.0, 0.0)));
    }

    #[test]
    fn test_line_intersection_point() {
        let hit = line_intersection_point(p(30.0, 40.0), p(70.0, 40.0), p(40.0, 50.0), p(40.0, 30.0))
            .unwrap();
        assert!(hit.approx_eq(&p(40.0, 40.0), 1e-9));
    }

    #[test]
    fn test_line_intersection_outside_segments() {
        let hit = line_intersection_point(p(0.0, 0.0), p(1.0, 0.0), p(5.0, 1.0), p(5.0, 2.0)).unwrap();
        assert!(hit.approx_eq(&p(5.0, 0.0), 1e-9));
    }

    #[test]
    fn test_parallel_lines_have_no_point() {
        assert!(line_intersection_point(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)).is_none());
        assert!(line_intersection_point(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)).is_none());
    }

    #[test]
    fn test_point_distance_and_approx_eq() {
        assert!((p(0.0, 0.0).distance(&p(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert!(p(1.0, 1.0).approx_eq(&p(1.0 + 1e-10, 1.0), 1e-8));
        assert!(!p(1.0, 1.0).approx_eq(&p(1.0 + 1e-6, 1.0), 1e-8));
    }
}
