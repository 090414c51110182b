// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the point-cloud algorithms the plane reasoning depends on.

use crate::error::Result;
use crate::plane::{Plane, PlaneCoefficients};
use crate::types::PointCloud;

/// Splits a scan into fitted planar patches.
///
/// Returned planes carry their points, coefficients and orientation and are
/// not yet grouped. Failure is fatal for the run.
pub trait PlaneSegmenter {
    fn segment(&self, cloud: &PointCloud) -> Result<Vec<Plane>>;
}

/// Fits one plane equation to a cloud.
pub trait PlaneFitter {
    /// Robustly fits a plane, stopping once `inlier_ratio` of the points agree.
    fn fit(&self, cloud: &PointCloud, inlier_ratio: f64) -> Result<PlaneCoefficients>;
}

/// Checkpoint for inspecting intermediate results.
///
/// Implementations may block until the user dismisses the view, but must not
/// change what they are shown.
pub trait Viewer {
    fn show_planes(&mut self, label: &str, planes: &[Plane]);

    fn show_cloud(&mut self, label: &str, cloud: &PointCloud);
}

/// Viewer for headless runs: every checkpoint is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Viewer for Headless {
    fn show_planes(&mut self, _label: &str, _planes: &[Plane]) {}

    fn show_cloud(&mut self, _label: &str, _cloud: &PointCloud) {}
}
