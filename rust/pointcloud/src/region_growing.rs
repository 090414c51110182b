// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smoothness-constrained region growing.
//!
//! Seeds are taken in ascending curvature order. A region grows from a seed
//! to every neighbour whose normal deviates by less than the smoothness
//! threshold; neighbours that are themselves flat enough keep growing the
//! region.

use std::collections::VecDeque;

use crate::normals::SurfacePoint;
use crate::spatial::PointIndex;

/// Region growing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGrowing {
    /// Regions with fewer points are dropped.
    pub min_cluster_size: usize,
    /// Neighbours examined per point.
    pub neighbours: usize,
    /// Maximum normal deviation between neighbours (degrees).
    pub smoothness_threshold: f64,
    /// Points with lower curvature continue the growth.
    pub curvature_threshold: f64,
}

impl Default for RegionGrowing {
    fn default() -> Self {
        Self {
            min_cluster_size: 200,
            neighbours: 30,
            smoothness_threshold: 5.0,
            curvature_threshold: 1.0,
        }
    }
}

impl RegionGrowing {
    /// Splits the indexed points into smooth regions of point indices.
    ///
    /// `surface` holds one estimate per indexed point.
    pub fn segment(&self, index: &PointIndex, surface: &[SurfacePoint]) -> Vec<Vec<usize>> {
        let points = index.points();
        let n = points.len().min(surface.len());
        let cos_threshold = self.smoothness_threshold.to_radians().cos();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| surface[a].curvature.total_cmp(&surface[b].curvature));

        let mut labelled = vec![false; n];
        let mut regions = Vec::new();
        let mut dropped = 0usize;
        let mut queue = VecDeque::new();

        for &seed in &order {
            if labelled[seed] {
                continue;
            }
            labelled[seed] = true;
            let mut region = vec![seed];
            queue.push_back(seed);

            while let Some(current) = queue.pop_front() {
                for neighbour in index.nearest(&points[current], self.neighbours) {
                    if neighbour >= n || labelled[neighbour] {
                        continue;
                    }
                    // Normals are unoriented
                    let cos = surface[current].normal.dot(&surface[neighbour].normal).abs();
                    if cos < cos_threshold {
                        continue;
                    }
                    labelled[neighbour] = true;
                    region.push(neighbour);
                    if surface[neighbour].curvature < self.curvature_threshold {
                        queue.push_back(neighbour);
                    }
                }
            }

            if region.len() >= self.min_cluster_size {
                regions.push(region);
            } else {
                dropped += 1;
            }
        }

        tracing::debug!(
            points = n,
            regions = regions.len(),
            dropped,
            "grew smooth regions"
        );
        regions
    }
}
