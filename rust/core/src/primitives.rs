// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D geometric primitives.
//!
//! Orientation and segment tests work on the x-y projection only and take
//! [`Point2D`]. They are not a 3D intersection test: callers project with
//! [`Point2D::from_xy`] and must only rely on the result when the inputs are
//! meaningful in plan view.

use nalgebra::Point3;

use crate::types::{ColoredPoint, Point2D, Rgb};

/// Turn direction of an ordered triplet of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Colinear,
    Clockwise,
    CounterClockwise,
}

/// Orientation of the triplet `(p, q, r)`.
///
/// Sign of the cross product of `q - p` and `r - q`.
pub fn orientation(p: Point2D, q: Point2D, r: Point2D) -> Turn {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Turn::Colinear
    } else if val > 0.0 {
        Turn::Clockwise
    } else {
        Turn::CounterClockwise
    }
}

/// Whether `q` lies within the bounding box of `p` and `r`.
///
/// Only meaningful when the three points are already known to be colinear.
pub fn on_segment(p: Point2D, q: Point2D, r: Point2D) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segment `p1q1` intersects segment `p2q2` in plan view.
pub fn segments_intersect(p1: Point2D, q1: Point2D, p2: Point2D, q2: Point2D) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Colinear cases: an endpoint of one segment lies on the other
    (o1 == Turn::Colinear && on_segment(p1, p2, q1))
        || (o2 == Turn::Colinear && on_segment(p1, q2, q1))
        || (o3 == Turn::Colinear && on_segment(p2, p1, q2))
        || (o4 == Turn::Colinear && on_segment(p2, q1, q2))
}

/// Evenly spaced points along `start -> end`, both endpoints included.
///
/// Cloning the iterator restarts the sequence.
#[derive(Debug, Clone)]
pub struct LinePoints {
    start: Point3<f64>,
    end: Point3<f64>,
    color: Rgb,
    count: usize,
    next: usize,
}

impl LinePoints {
    /// Total number of points in the sequence.
    pub fn count_total(&self) -> usize {
        self.count
    }
}

impl Iterator for LinePoints {
    type Item = ColoredPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let t = if self.count == 1 {
            0.0
        } else {
            self.next as f64 / (self.count - 1) as f64
        };
        self.next += 1;
        let position = self.start + (self.end - self.start) * t;
        Some(ColoredPoint::new(position, self.color))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for LinePoints {}

/// Points along the segment `p1 -> p2` at `density` points per unit length.
///
/// The count is `round(|p2 - p1| * density)`.
pub fn generate_line(p1: Point3<f64>, p2: Point3<f64>, density: f64, color: Rgb) -> LinePoints {
    let length = (p2 - p1).norm();
    let count = (length * density).round();
    let count = if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    };
    LinePoints {
        start: p1,
        end: p2,
        color,
        count,
        next: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn orientation_of_triplets() {
        assert_eq!(orientation(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)), Turn::Colinear);
        assert_eq!(orientation(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)), Turn::Clockwise);
        assert_eq!(
            orientation(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 2.0)),
            Turn::CounterClockwise
        );
    }

    #[test]
    fn on_segment_bounding_box() {
        assert!(on_segment(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)));
        assert!(!on_segment(p(0.0, 0.0), p(3.0, 3.0), p(2.0, 2.0)));
    }

    #[test]
    fn segments_sharing_an_endpoint_intersect() {
        assert!(segments_intersect(p(0.0, 0.0), p(1.0, 1.0), p(1.0, 1.0), p(2.0, 0.0)));
    }

    #[test]
    fn parallel_segments_never_intersect() {
        assert!(!segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(0.0, 1.0), p(2.0, 1.0)));
    }

    #[test]
    fn colinear_overlapping_segments_intersect() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(3.0, 0.0)));
    }

    #[test]
    fn colinear_disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)));
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0)));
    }

    #[test]
    fn generate_line_unit_segment() {
        let line = generate_line(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            10.0,
            Rgb::GREEN,
        );
        let points: Vec<_> = line.collect();
        assert_eq!(points.len(), 10);
        assert_relative_eq!(points[0].position.x, 0.0);
        assert_relative_eq!(points[9].position.x, 1.0);
        for w in points.windows(2) {
            assert_relative_eq!(w[1].position.x - w[0].position.x, 1.0 / 9.0, epsilon = 1e-12);
        }
        assert!(points
            .iter()
            .all(|pt| pt.position.y == 0.0 && pt.position.z == 0.0 && pt.color == Rgb::GREEN));
    }

    #[test]
    fn generate_line_is_restartable() {
        let line = generate_line(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            5.0,
            Rgb::WHITE,
        );
        let first: Vec<_> = line.clone().collect();
        let second: Vec<_> = line.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn generate_line_zero_length() {
        let a = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(generate_line(a, a, 100.0, Rgb::WHITE).len(), 0);
    }
}
