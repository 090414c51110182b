// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Principal component analysis of point neighbourhoods.

use nalgebra::{Matrix3, Point3, Vector3};

/// Least-squares plane through a set of points.
#[derive(Debug, Clone, Copy)]
pub struct Pca {
    pub centroid: Point3<f64>,
    /// Eigenvector of the smallest eigenvalue, unit length.
    pub normal: Vector3<f64>,
    /// `λ_min / (λ0 + λ1 + λ2)`, 0 for a perfect plane and 1/3 for isotropic noise.
    pub curvature: f64,
}

impl Pca {
    /// Returns `None` for fewer than three points.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let points: Vec<&Point3<f64>> = points.into_iter().collect();
        if points.len() < 3 {
            return None;
        }

        let centroid: Vector3<f64> = points
            .iter()
            .map(|p| p.coords)
            .fold(Vector3::zeros(), |acc, v| acc + v)
            / points.len() as f64;

        let mut cov = Matrix3::zeros();
        for p in &points {
            let d = p.coords - centroid;
            cov += d * d.transpose();
        }

        // Smallest eigenvector is the normal
        let eig = cov.symmetric_eigen();
        let mut min_idx = 0;
        for i in 1..3 {
            if eig.eigenvalues[i] < eig.eigenvalues[min_idx] {
                min_idx = i;
            }
        }

        let normal = eig.eigenvectors.column(min_idx).into_owned();
        let norm = normal.norm();
        if !norm.is_finite() || norm < 1e-10 {
            return None;
        }

        let total: f64 = eig.eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let curvature = if total > 0.0 {
            eig.eigenvalues[min_idx].max(0.0) / total
        } else {
            0.0
        };

        Some(Self {
            centroid: Point3::from(centroid),
            normal: normal / norm,
            curvature,
        })
    }
}
