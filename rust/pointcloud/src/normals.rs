// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-point normal and curvature estimation.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::pca::Pca;
use crate::spatial::PointIndex;

/// Surface estimate at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Unit normal, sign arbitrary.
    pub normal: Vector3<f64>,
    pub curvature: f64,
}

/// Estimates normals from the `k` nearest neighbours of every indexed point.
///
/// Points whose neighbourhood is degenerate get a `+z` normal and curvature 1
/// so they never seed a region.
pub fn estimate_normals(index: &PointIndex, k: usize) -> Vec<SurfacePoint> {
    let points = index.points();
    let normals: Vec<SurfacePoint> = points
        .par_iter()
        .map(|p| {
            let neighbours = index.nearest(p, k);
            match Pca::of(neighbours.iter().map(|&i| &points[i])) {
                Some(pca) => SurfacePoint {
                    normal: pca.normal,
                    curvature: pca.curvature,
                },
                None => SurfacePoint {
                    normal: Vector3::z(),
                    curvature: 1.0,
                },
            }
        })
        .collect();

    tracing::debug!(points = points.len(), k, "estimated normals");
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn wall_normals_are_horizontal() {
        let points: Vec<_> = (0..100)
            .map(|i| Point3::new(1.0, (i % 10) as f64 * 0.1, (i / 10) as f64 * 0.1))
            .collect();
        let index = PointIndex::new(points);
        let normals = estimate_normals(&index, 8);
        assert_eq!(normals.len(), 100);
        for s in &normals {
            assert_relative_eq!(s.normal.x.abs(), 1.0, epsilon = 1e-6);
            assert!(s.curvature < 1e-6);
        }
    }

    #[test]
    fn distant_outlier_does_not_disturb_the_patch() {
        let mut points: Vec<_> = (0..400)
            .map(|i| Point3::new((i % 20) as f64 * 0.05, (i / 20) as f64 * 0.05, 0.0))
            .collect();
        points.push(Point3::new(0.5, 0.5, 20.0));
        let index = PointIndex::new(points);
        let normals = estimate_normals(&index, 10);
        assert_eq!(normals.len(), 401);
        for s in &normals[..400] {
            assert_relative_eq!(s.normal.z.abs(), 1.0, epsilon = 1e-6);
        }
    }
}
