// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thresholds for grouping and extending wall planes

/// Parameters of the wall reasoning stages.
///
/// Built once from the loaded configuration and passed by reference into
/// every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct WallParams {
    /// Fill density in points per meter.
    /// Default: 50
    pub point_pitch: f64,

    /// Minimum wall height as a fraction of the room height.
    /// Default: 0.3
    pub min_plane_height: f64,

    /// Proximity of top corners (plan view) for a wall to count as having a neighbour.
    /// Default: 0.5m
    pub min_edge_dist: f64,

    /// Maximum top-edge line distance between two planes of one group.
    /// Default: 0.5m
    pub max_planes_dist: f64,

    /// Maximum angle between the normals of two planes of one group (degrees).
    /// Default: 10
    pub max_normal_angle: f64,

    /// Inlier ratio requested when refitting a merged group.
    /// Default: 0.8
    pub refit_inlier_ratio: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            point_pitch: 50.0,
            min_plane_height: 0.3,
            min_edge_dist: 0.5,
            max_planes_dist: 0.5,
            max_normal_angle: 10.0,
            refit_inlier_ratio: 0.8,
        }
    }
}

impl WallParams {
    /// Spacing between synthesized points.
    pub fn density_step(&self) -> f64 {
        1.0 / self.point_pitch
    }
}
