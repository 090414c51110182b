// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction configuration loaded from YAML.
//!
//! Keys follow the scanner tool's configuration files:
//!
//! ```yaml
//! pointPitch: 50
//! minPlaneHeight: 0.3
//! RANSAC: { RANSAC_DistThreshold: 0.05, RANSAC_MinInliers: 500, RANSAC_PlaneVectorThreshold: 0.9 }
//! Downsampling: { KSearch: 30, leafSize: 0.05 }
//! Clustering: { MinSizeOfCluster: 200, NumberOfNeighbours: 30, SmoothnessThreshold: 5, CurvatureThreshold: 1 }
//! Combine: { minimumEdgeDist: 0.5, minPlanesDist: 0.5, minAngle_normalDiff: 10 }
//! ```

use std::path::Path;

use roomshell_geometry::WallParams;
use roomshell_pointcloud::{Ransac, RegionGrowing, RoomSegmenter};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Full reconstruction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Fill density in points per meter
    #[serde(rename = "pointPitch")]
    pub point_pitch: u32,

    /// Minimum wall height as a fraction of the room height
    #[serde(rename = "minPlaneHeight")]
    pub min_plane_height: f64,

    #[serde(rename = "RANSAC")]
    pub ransac: RansacConfig,

    #[serde(rename = "Downsampling")]
    pub downsampling: DownsamplingConfig,

    #[serde(rename = "Clustering")]
    pub clustering: ClusteringConfig,

    #[serde(rename = "Combine")]
    pub combine: CombineConfig,
}

/// RANSAC plane fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    #[serde(rename = "RANSAC_DistThreshold")]
    pub dist_threshold: f64,

    #[serde(rename = "RANSAC_MinInliers")]
    pub min_inliers: usize,

    /// Minimum dominant normal component of a kept plane
    #[serde(rename = "RANSAC_PlaneVectorThreshold")]
    pub plane_vector_threshold: f64,
}

/// Downsampling and normal estimation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsamplingConfig {
    #[serde(rename = "KSearch")]
    pub k_search: usize,

    #[serde(rename = "leafSize")]
    pub leaf_size: f64,
}

/// Region growing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    #[serde(rename = "MinSizeOfCluster")]
    pub min_cluster_size: usize,

    #[serde(rename = "NumberOfNeighbours")]
    pub neighbours: usize,

    /// Degrees
    #[serde(rename = "SmoothnessThreshold")]
    pub smoothness_threshold: f64,

    #[serde(rename = "CurvatureThreshold")]
    pub curvature_threshold: f64,
}

/// Wall grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    #[serde(rename = "minimumEdgeDist")]
    pub min_edge_dist: f64,

    #[serde(rename = "minPlanesDist")]
    pub min_planes_dist: f64,

    /// Degrees
    #[serde(rename = "minAngle_normalDiff")]
    pub min_angle_normal_diff: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            point_pitch: 50,
            min_plane_height: 0.3,
            ransac: RansacConfig::default(),
            downsampling: DownsamplingConfig::default(),
            clustering: ClusteringConfig::default(),
            combine: CombineConfig::default(),
        }
    }
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            dist_threshold: 0.05,
            min_inliers: 500,
            plane_vector_threshold: 0.9,
        }
    }
}

impl Default for DownsamplingConfig {
    fn default() -> Self {
        Self {
            k_search: 30,
            leaf_size: 0.05,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 200,
            neighbours: 30,
            smoothness_threshold: 5.0,
            curvature_threshold: 1.0,
        }
    }
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            min_edge_dist: 0.5,
            min_planes_dist: 0.5,
            min_angle_normal_diff: 10.0,
        }
    }
}

impl ReconstructionConfig {
    /// Load and validate configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be positive, got {value}")))
            }
        }
        fn angle(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 180.0 {
                Ok(())
            } else {
                Err(invalid(field, format!("must be in (0, 180] degrees, got {value}")))
            }
        }

        if self.point_pitch == 0 {
            return Err(invalid("pointPitch", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_plane_height) {
            return Err(invalid(
                "minPlaneHeight",
                format!("must be in [0, 1], got {}", self.min_plane_height),
            ));
        }

        positive("RANSAC_DistThreshold", self.ransac.dist_threshold)?;
        let threshold = self.ransac.plane_vector_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(invalid(
                "RANSAC_PlaneVectorThreshold",
                format!("must be in (0, 1], got {threshold}"),
            ));
        }

        if self.downsampling.k_search == 0 {
            return Err(invalid("KSearch", "must be at least 1"));
        }
        positive("leafSize", self.downsampling.leaf_size)?;

        if self.clustering.neighbours == 0 {
            return Err(invalid("NumberOfNeighbours", "must be at least 1"));
        }
        angle("SmoothnessThreshold", self.clustering.smoothness_threshold)?;
        positive("CurvatureThreshold", self.clustering.curvature_threshold)?;

        positive("minimumEdgeDist", self.combine.min_edge_dist)?;
        positive("minPlanesDist", self.combine.min_planes_dist)?;
        angle("minAngle_normalDiff", self.combine.min_angle_normal_diff)?;
        Ok(())
    }

    /// Thresholds of the wall reasoning stages
    pub fn wall_params(&self) -> WallParams {
        WallParams {
            point_pitch: self.point_pitch as f64,
            min_plane_height: self.min_plane_height,
            min_edge_dist: self.combine.min_edge_dist,
            max_planes_dist: self.combine.min_planes_dist,
            max_normal_angle: self.combine.min_angle_normal_diff,
            ..WallParams::default()
        }
    }

    /// RANSAC fitter, reproducible when `seed` is set
    pub fn fitter(&self, seed: Option<u64>) -> Ransac {
        Ransac {
            distance_threshold: self.ransac.dist_threshold,
            seed,
            ..Ransac::default()
        }
    }

    /// Scan segmenter
    pub fn segmenter(&self, seed: Option<u64>) -> RoomSegmenter {
        RoomSegmenter {
            leaf_size: self.downsampling.leaf_size,
            k_search: self.downsampling.k_search,
            region_growing: RegionGrowing {
                min_cluster_size: self.clustering.min_cluster_size,
                neighbours: self.clustering.neighbours,
                smoothness_threshold: self.clustering.smoothness_threshold,
                curvature_threshold: self.clustering.curvature_threshold,
            },
            ransac: self.fitter(seed),
            min_inliers: self.ransac.min_inliers,
            plane_vector_threshold: self.ransac.plane_vector_threshold,
        }
    }
}
