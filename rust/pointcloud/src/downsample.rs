// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Voxel-grid downsampling.

use nalgebra::{Point3, Vector3};
use roomshell_core::{ColoredPoint, PointCloud};
use rustc_hash::FxHashMap;

/// Replaces the points of every occupied voxel by their centroid.
///
/// Voxels are cubes of side `leaf_size` aligned to the cloud's minimum corner.
/// The centroid keeps the color of the first point that fell into the voxel,
/// and output order follows the first point of each voxel.
pub fn voxel_downsample(cloud: &PointCloud, leaf_size: f64) -> PointCloud {
    if cloud.is_empty() || leaf_size.is_nan() || leaf_size <= 0.0 {
        return cloud.clone();
    }
    let Some(bounds) = cloud.bounds() else {
        return cloud.clone();
    };
    let min_bound = bounds.min;

    // Voxel data: (position_sum, first point, count)
    let mut slots: FxHashMap<(i64, i64, i64), usize> = FxHashMap::default();
    let mut voxels: Vec<(Vector3<f64>, ColoredPoint, usize)> = Vec::new();

    for point in cloud.iter() {
        let ix = ((point.position.x - min_bound.x) / leaf_size).floor() as i64;
        let iy = ((point.position.y - min_bound.y) / leaf_size).floor() as i64;
        let iz = ((point.position.z - min_bound.z) / leaf_size).floor() as i64;

        let slot = *slots.entry((ix, iy, iz)).or_insert_with(|| {
            voxels.push((Vector3::zeros(), *point, 0));
            voxels.len() - 1
        });
        let entry = &mut voxels[slot];
        entry.0 += point.position.coords;
        entry.2 += 1;
    }

    let result: PointCloud = voxels
        .into_iter()
        .map(|(sum, first, count)| {
            ColoredPoint::new(Point3::from(sum / count as f64), first.color)
        })
        .collect();

    tracing::debug!(
        input = cloud.len(),
        output = result.len(),
        leaf_size,
        "downsampled point cloud"
    );
    result
}
