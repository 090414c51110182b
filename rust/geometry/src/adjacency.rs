// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency and coplanarity tests between plane boundaries.
//!
//! All tests look at the top edge of a plane (`left_up -> right_up`) in plan
//! view. For walls this edge is the wall's footprint line.

use nalgebra::{Matrix2, Vector2};
use roomshell_core::{Error, Plane, Point2D, Result};
use smallvec::SmallVec;

/// Disagreement between the two line-distance estimates that gets reported.
pub const SANITY_TOLERANCE: f64 = 1.0;

/// Slack on the overlap interval bounds.
const OVERLAP_TOLERANCE: f64 = 1e-9;

/// Neighbour indices returned by [`find_near_planes`].
pub type NearPlanes = SmallVec<[usize; 4]>;

/// Top edge of a plane projected on the x-y plane.
#[derive(Debug, Clone, Copy)]
struct TopEdge {
    start: Point2D,
    end: Point2D,
}

impl TopEdge {
    fn of(plane: &Plane) -> Result<Self> {
        let start = Point2D::from_xy(&plane.left_up());
        let end = Point2D::from_xy(&plane.right_up());
        if start.distance_to(&end) < 1e-12 {
            return Err(Error::degenerate("plane top edge has zero length in plan view"));
        }
        Ok(Self { start, end })
    }

    fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.end.x - self.start.x, self.end.y - self.start.y)
    }

    /// Distance from `p` to the infinite line through the edge.
    fn distance_to_line(&self, p: Point2D) -> f64 {
        let d = self.direction();
        let w = Vector2::new(p.x - self.start.x, p.y - self.start.y);
        (d.x * w.y - d.y * w.x).abs() / d.norm()
    }

    /// Intersection of the edge line with the perpendicular through `p`.
    fn foot_of(&self, p: Point2D) -> Result<Point2D> {
        let d = self.direction();
        let n = Vector2::new(-d.y, d.x);
        // start + s*d = p + t*n
        let system = Matrix2::new(d.x, -n.x, d.y, -n.y);
        let rhs = Vector2::new(p.x - self.start.x, p.y - self.start.y);
        let solution = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| Error::degenerate("edge line and its perpendicular are parallel"))?;
        let s = solution.x;
        let foot = Point2D::new(self.start.x + s * d.x, self.start.y + s * d.y);
        if !(foot.x.is_finite() && foot.y.is_finite()) {
            return Err(Error::degenerate("non-finite foot point"));
        }
        Ok(foot)
    }

    /// Whether `p.x` or `p.y` falls within the edge's extent on that axis.
    fn spans(&self, p: Point2D) -> bool {
        let within = |v: f64, a: f64, b: f64| {
            v >= a.min(b) - OVERLAP_TOLERANCE && v <= a.max(b) + OVERLAP_TOLERANCE
        };
        within(p.x, self.start.x, self.end.x) || within(p.y, self.start.y, self.end.y)
    }
}

/// Gap between `a`'s top-edge line and `b`'s top corners.
///
/// Average of the distances of `b.left_up` and `b.right_up` to the line.
/// Logs a warning when the two disagree by more than [`SANITY_TOLERANCE`]
/// but still returns the average.
pub fn edge_distance(a: &Plane, b: &Plane) -> Result<f64> {
    let edge = TopEdge::of(a)?;
    let d1 = edge.distance_to_line(Point2D::from_xy(&b.left_up()));
    let d2 = edge.distance_to_line(Point2D::from_xy(&b.right_up()));
    if (d1 - d2).abs() > SANITY_TOLERANCE {
        tracing::warn!(
            d1,
            d2,
            "top edge distance estimates disagree, planes may not be parallel"
        );
    }
    Ok((d1 + d2) / 2.0)
}

/// Whether `b`'s top corners project onto `a`'s top edge.
///
/// Directional: use [`coplanar_overlap`] for the symmetric test.
pub fn edges_overlap(a: &Plane, b: &Plane) -> Result<bool> {
    let edge = TopEdge::of(a)?;
    for corner in [b.left_up(), b.right_up()] {
        let foot = edge.foot_of(Point2D::from_xy(&corner))?;
        if edge.spans(foot) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `edges_overlap(a, b) || edges_overlap(b, a)`.
pub fn coplanar_overlap(a: &Plane, b: &Plane) -> Result<bool> {
    Ok(edges_overlap(a, b)? || edges_overlap(b, a)?)
}

/// Indices of the planes whose top corners come within `threshold` of the top
/// corners of `planes[index]` in plan view. Never contains `index` itself.
pub fn find_near_planes(index: usize, planes: &[Plane], threshold: f64) -> NearPlanes {
    let Some(source) = planes.get(index) else {
        return NearPlanes::new();
    };
    let source_corners = top_corners(source);

    planes
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .filter(|(_, target)| {
            let target_corners = top_corners(target);
            source_corners
                .iter()
                .flat_map(|s| target_corners.iter().map(move |t| s.distance_to(t)))
                .any(|d| d <= threshold)
        })
        .map(|(i, _)| i)
        .collect()
}

fn top_corners(plane: &Plane) -> [Point2D; 2] {
    [
        Point2D::from_xy(&plane.left_up()),
        Point2D::from_xy(&plane.right_up()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomshell_core::{PlaneCoefficients, Point3, PointCloud, Rgb};

    /// Rectangle in the plane with normal `(nx, ny, 0)` through the xy segment `from -> to`.
    fn wall(from: (f64, f64), to: (f64, f64), nx: f64, ny: f64) -> Plane {
        let positions = [
            Point3::new(from.0, from.1, 0.0),
            Point3::new(to.0, to.1, 0.0),
            Point3::new(from.0, from.1, 2.0),
            Point3::new(to.0, to.1, 2.0),
        ];
        let coefficients =
            PlaneCoefficients::from_point_normal(&positions[0], &nalgebra::Vector3::new(nx, ny, 0.0))
                .unwrap();
        Plane::new(PointCloud::from_positions(&positions, Rgb::WHITE), coefficients).unwrap()
    }

    #[test]
    fn coincident_planes_touch_and_overlap_both_ways() {
        let a = wall((0.0, 0.0), (0.0, 3.0), 1.0, 0.0);
        let b = a.clone();
        assert_relative_eq!(edge_distance(&a, &b).unwrap(), 0.0, epsilon = 1e-12);
        assert!(edges_overlap(&a, &b).unwrap());
        assert!(edges_overlap(&b, &a).unwrap());
    }

    #[test]
    fn parallel_offset_is_measured() {
        let a = wall((0.0, 0.0), (0.0, 3.0), 1.0, 0.0);
        let b = wall((0.3, 1.0), (0.3, 2.0), 1.0, 0.0);
        assert_relative_eq!(edge_distance(&a, &b).unwrap(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn disagreeing_estimates_still_average() {
        // b diverges from a's line: its corners sit 0.5 and 3.5 away
        let a = wall((0.0, 0.0), (0.0, 3.0), 1.0, 0.0);
        let b = wall((0.5, 0.0), (3.5, 3.0), 1.0, -1.0);
        let d1 = (b.left_up().x).abs();
        let d2 = (b.right_up().x).abs();
        assert!((d1 - d2).abs() > SANITY_TOLERANCE);
        assert_relative_eq!(edge_distance(&a, &b).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn slanted_walls_overlap_only_when_projected_inside() {
        let a = wall((0.0, 0.0), (2.0, 2.0), 1.0, -1.0);
        let inside = wall((1.0, 1.0), (1.5, 1.5), 1.0, -1.0);
        let outside = wall((5.0, 5.0), (6.0, 6.0), 1.0, -1.0);
        assert!(edges_overlap(&a, &inside).unwrap());
        assert!(!edges_overlap(&a, &outside).unwrap());
        assert!(!coplanar_overlap(&a, &outside).unwrap());
    }

    #[test]
    fn overlap_is_directional() {
        // The short edge projects inside the long one but not the other way round
        let long = wall((0.0, 0.0), (4.0, 4.0), 1.0, -1.0);
        let short = wall((1.0, 1.0), (2.0, 2.0), 1.0, -1.0);
        assert!(edges_overlap(&long, &short).unwrap());
        assert!(!edges_overlap(&short, &long).unwrap());
        assert!(coplanar_overlap(&short, &long).unwrap());
    }

    #[test]
    fn zero_length_edge_is_degenerate() {
        let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, 0.0).unwrap();
        let column = Plane::new(
            PointCloud::from_positions(
                &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 2.0)],
                Rgb::WHITE,
            ),
            coefficients,
        )
        .unwrap();
        let other = wall((0.0, 0.0), (0.0, 1.0), 1.0, 0.0);
        assert!(matches!(
            edge_distance(&column, &other),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn near_planes_exclude_self_and_are_symmetric() {
        let planes = vec![
            wall((0.0, 0.0), (0.0, 2.0), 1.0, 0.0),
            wall((0.0, 2.3), (0.0, 4.0), 1.0, 0.0),
            wall((9.0, 9.0), (9.0, 10.0), 1.0, 0.0),
        ];
        let near = find_near_planes(0, &planes, 0.5);
        assert!(!near.contains(&0));
        assert_eq!(near.as_slice(), &[1]);
        assert!(find_near_planes(1, &planes, 0.5).contains(&0));
        assert!(find_near_planes(2, &planes, 0.5).is_empty());
    }
}
