// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room scan segmentation into planar patches.
//!
//! 1. Voxel downsampling
//! 2. Normal and curvature estimation
//! 3. Region growing into smooth regions
//! 4. RANSAC plane fit per region, keeping only the inliers
//! 5. Classification into floors/ceilings and walls, slanted planes dropped

use nalgebra::Point3;
use roomshell_core::{
    ColoredPoint, Orientation, Plane, PlaneSegmenter, PointCloud, Rgb,
};

use crate::downsample::voxel_downsample;
use crate::error::{PointCloudError, Result};
use crate::normals::estimate_normals;
use crate::ransac::Ransac;
use crate::region_growing::RegionGrowing;
use crate::spatial::PointIndex;

/// Inlier ratio at which a region fit stops sampling.
const REGION_INLIER_RATIO: f64 = 0.9;

/// Segmentation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSegmenter {
    /// Voxel side for downsampling.
    pub leaf_size: f64,
    /// Neighbours used for normal estimation.
    pub k_search: usize,
    pub region_growing: RegionGrowing,
    pub ransac: Ransac,
    /// Planes with fewer inliers are dropped.
    pub min_inliers: usize,
    /// Minimum dominant normal component for a plane to count as horizontal
    /// or vertical.
    pub plane_vector_threshold: f64,
}

impl Default for RoomSegmenter {
    fn default() -> Self {
        Self {
            leaf_size: 0.05,
            k_search: 30,
            region_growing: RegionGrowing::default(),
            ransac: Ransac::default(),
            min_inliers: 500,
            plane_vector_threshold: 0.9,
        }
    }
}

/// Planes found in a scan, with bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub planes: Vec<Plane>,
    pub downsampled: usize,
    pub regions: usize,
    pub dropped_small: usize,
    pub dropped_slanted: usize,
}

impl RoomSegmenter {
    pub fn run(&self, cloud: &PointCloud) -> Result<Segmentation> {
        if cloud.len() < 3 {
            return Err(PointCloudError::InsufficientPoints {
                needed: 3,
                found: cloud.len(),
            });
        }

        let down = voxel_downsample(cloud, self.leaf_size);
        let Some(scan_centroid) = down.centroid() else {
            return Err(PointCloudError::InsufficientPoints { needed: 3, found: 0 });
        };
        let index = PointIndex::new(down.positions().copied().collect());
        let surface = estimate_normals(&index, self.k_search);
        let regions = self.region_growing.segment(&index, &surface);

        let mut result = Segmentation {
            downsampled: down.len(),
            regions: regions.len(),
            ..Default::default()
        };

        for region in &regions {
            let points: Vec<Point3<f64>> = region.iter().map(|&i| index.points()[i]).collect();
            let fit = match self.ransac.fit_points(&points, REGION_INLIER_RATIO) {
                Ok(fit) => fit,
                Err(PointCloudError::Fit(reason)) => {
                    tracing::warn!(points = points.len(), %reason, "skipping unfittable region");
                    continue;
                }
                Err(PointCloudError::InsufficientPoints { .. }) => {
                    result.dropped_small += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            if fit.inliers.len() < self.min_inliers || fit.inliers.is_empty() {
                result.dropped_small += 1;
                continue;
            }

            let inliers: PointCloud = fit
                .inliers
                .iter()
                .map(|&i| ColoredPoint::new(points[i], Rgb::SEGMENTED))
                .collect();

            // Normals face into the room
            let mut coefficients = fit.coefficients;
            if let Some(center) = inliers.centroid() {
                coefficients = coefficients.aligned_with(&(scan_centroid - center));
            }

            let n = coefficients.normal();
            let strength = match Orientation::classify(&n) {
                Orientation::Horizontal => n.z.abs(),
                Orientation::Vertical => n.x.hypot(n.y),
            };
            if strength < self.plane_vector_threshold {
                result.dropped_slanted += 1;
                continue;
            }

            match Plane::new(inliers, coefficients) {
                Ok(plane) => result.planes.push(plane),
                Err(err) => tracing::warn!(error = %err, "skipping empty plane"),
            }
        }

        tracing::info!(
            input = cloud.len(),
            downsampled = result.downsampled,
            regions = result.regions,
            planes = result.planes.len(),
            small = result.dropped_small,
            slanted = result.dropped_slanted,
            "segmented scan"
        );
        Ok(result)
    }
}

impl PlaneSegmenter for RoomSegmenter {
    fn segment(&self, cloud: &PointCloud) -> roomshell_core::Result<Vec<Plane>> {
        Ok(self.run(cloud)?.planes)
    }
}
