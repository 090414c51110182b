// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RANSAC plane fitting.

use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use roomshell_core::{PlaneCoefficients, PlaneFitter, PointCloud};

use crate::error::{PointCloudError, Result};
use crate::pca::Pca;

/// A plane and the indices of the points that support it.
#[derive(Debug, Clone)]
pub struct RansacFit {
    pub coefficients: PlaneCoefficients,
    pub inliers: Vec<usize>,
}

/// Random sample consensus plane fitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Ransac {
    /// Maximum point-to-plane distance of an inlier.
    pub distance_threshold: f64,
    pub max_iterations: usize,
    /// Fixed seed for reproducible fits; a fresh random seed per call otherwise.
    pub seed: Option<u64>,
}

impl Default for Ransac {
    fn default() -> Self {
        Self {
            distance_threshold: 0.05,
            max_iterations: 1000,
            seed: None,
        }
    }
}

impl Ransac {
    pub fn new(distance_threshold: f64) -> Self {
        Self {
            distance_threshold,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fits a plane to `points`.
    ///
    /// Sampling stops early once `inlier_ratio` of the points are inliers. The
    /// best hypothesis is refined by least squares on its inliers.
    pub fn fit_points(&self, points: &[Point3<f64>], inlier_ratio: f64) -> Result<RansacFit> {
        if points.len() < 3 {
            return Err(PointCloudError::InsufficientPoints {
                needed: 3,
                found: points.len(),
            });
        }

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let target = (inlier_ratio.clamp(0.0, 1.0) * points.len() as f64).ceil() as usize;

        let mut best: Option<(PlaneCoefficients, usize)> = None;
        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            let sample = rand::seq::index::sample(&mut rng, points.len(), 3);
            let (a, b, c) = (sample.index(0), sample.index(1), sample.index(2));
            let Some(candidate) = plane_through(&points[a], &points[b], &points[c]) else {
                continue;
            };

            let count = self.count_inliers(points, &candidate);
            if best.as_ref().map_or(true, |(_, c)| count > *c) {
                best = Some((candidate, count));
                if count >= target {
                    break;
                }
            }
        }

        let Some((hypothesis, _)) = best else {
            return Err(PointCloudError::Fit(format!(
                "no non-degenerate sample among {} points",
                points.len()
            )));
        };

        let inliers = self.inliers(points, &hypothesis);
        let refined = Pca::of(inliers.iter().map(|&i| &points[i]))
            .and_then(|pca| PlaneCoefficients::from_point_normal(&pca.centroid, &pca.normal).ok())
            .map(|c| c.aligned_with(&hypothesis.normal()))
            .unwrap_or(hypothesis);
        let inliers = self.inliers(points, &refined);

        tracing::trace!(
            points = points.len(),
            inliers = inliers.len(),
            iterations,
            "fitted plane"
        );
        Ok(RansacFit {
            coefficients: refined,
            inliers,
        })
    }

    fn count_inliers(&self, points: &[Point3<f64>], plane: &PlaneCoefficients) -> usize {
        points
            .par_iter()
            .filter(|p| plane.signed_distance(p).abs() <= self.distance_threshold)
            .count()
    }

    fn inliers(&self, points: &[Point3<f64>], plane: &PlaneCoefficients) -> Vec<usize> {
        points
            .par_iter()
            .enumerate()
            .filter(|(_, p)| plane.signed_distance(p).abs() <= self.distance_threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

impl PlaneFitter for Ransac {
    fn fit(&self, cloud: &PointCloud, inlier_ratio: f64) -> roomshell_core::Result<PlaneCoefficients> {
        let points: Vec<Point3<f64>> = cloud.positions().copied().collect();
        Ok(self.fit_points(&points, inlier_ratio)?.coefficients)
    }
}

fn plane_through(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<PlaneCoefficients> {
    let normal = (b - a).cross(&(c - a));
    if normal.norm() < 1e-12 {
        return None;
    }
    PlaneCoefficients::from_point_normal(a, &normal).ok()
}
