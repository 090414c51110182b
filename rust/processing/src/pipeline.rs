// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction: scan in, closed room shell out.
//!
//! ```text
//! scan ─ segment ─┬─ horizontal ─ room bounds ───────────────┐
//!                 └─ vertical ─ fill ─ filter ─ cluster ─ merge ─ extend ─ boundaries ─ shell
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use roomshell_core::{Error, Orientation, Plane, PlaneFitter, PlaneSegmenter, PointCloud, Rgb, Viewer};
use roomshell_geometry::{
    assign_group_colors, cluster_planes, extend_groups, fill_boundaries, filter_candidates,
    merge_groups, ExtensionStats, FilterStats, RoomBounds, WallParams,
};
use roomshell_pointcloud::{Ransac, RoomSegmenter};

use crate::config::ReconstructionConfig;
use crate::error::Result;

/// Reconstruction result.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Representatives, extended members and boundary lines.
    pub cloud: PointCloud,
    pub room: RoomBounds,
    pub stats: PipelineStats,
}

/// Counters of every stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub input_points: usize,
    pub horizontal_planes: usize,
    pub vertical_planes: usize,
    pub filter: FilterStats,
    pub groups: usize,
    /// Groups with more than one member.
    pub merged_groups: usize,
    pub extension: ExtensionStats,
    pub boundary_points: usize,
    pub output_points: usize,
}

/// Reconstruction driver.
///
/// Segmentation and fitting are pluggable; wall reasoning follows `params`.
#[derive(Debug, Clone)]
pub struct Pipeline<S = RoomSegmenter, F = Ransac> {
    params: WallParams,
    segmenter: S,
    fitter: F,
    seed: Option<u64>,
}

impl Pipeline {
    /// Pipeline with the built-in segmenter and RANSAC fitter.
    pub fn from_config(config: &ReconstructionConfig, seed: Option<u64>) -> Self {
        Self {
            params: config.wall_params(),
            segmenter: config.segmenter(seed),
            fitter: config.fitter(seed),
            seed,
        }
    }
}

impl<S: PlaneSegmenter, F: PlaneFitter> Pipeline<S, F> {
    pub fn new(params: WallParams, segmenter: S, fitter: F) -> Self {
        Self {
            params,
            segmenter,
            fitter,
            seed: None,
        }
    }

    /// Makes group colors reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn params(&self) -> &WallParams {
        &self.params
    }

    /// Segments `scan` and reconstructs the room shell from its planes.
    pub fn run<V: Viewer + ?Sized>(&self, scan: &PointCloud, viewer: &mut V) -> Result<PipelineOutput> {
        tracing::info!(points = scan.len(), "starting reconstruction");
        let planes = self.segmenter.segment(scan)?;
        let mut output = self.reconstruct(planes, viewer)?;
        output.stats.input_points = scan.len();
        Ok(output)
    }

    /// Reconstructs the room shell from already segmented planes.
    pub fn reconstruct<V: Viewer + ?Sized>(
        &self,
        planes: Vec<Plane>,
        viewer: &mut V,
    ) -> Result<PipelineOutput> {
        let params = &self.params;
        let mut stats = PipelineStats::default();

        let (horizontal, mut vertical): (Vec<Plane>, Vec<Plane>) = planes
            .into_iter()
            .partition(|p| p.orientation() == Orientation::Horizontal);
        stats.horizontal_planes = horizontal.len();
        stats.vertical_planes = vertical.len();
        tracing::debug!(
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            "classified planes"
        );

        for plane in &mut vertical {
            plane.fill(params.point_pitch);
        }
        viewer.show_planes("Filled RANSAC planes", &vertical);

        let (room, _) = RoomBounds::from_horizontal_planes(&horizontal)?;
        tracing::info!(bottom = room.bottom, top = room.top, "room bounds");

        let filtered = filter_candidates(vertical, &room, params);
        stats.filter = filtered.stats;
        let mut walls = filtered.planes;
        if walls.is_empty() {
            return Err(Error::InsufficientData {
                what: "walls",
                needed: 1,
                found: 0,
            }
            .into());
        }

        let clustering = cluster_planes(&mut walls, params)?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        assign_group_colors(&mut walls, clustering.group_count(), &mut rng);
        stats.groups = clustering.group_count();
        stats.merged_groups = clustering.merged_count();
        viewer.show_planes("Group Planes", &walls);

        let mut merged = merge_groups(&walls, &clustering, &room, params, &self.fitter)?;
        let representatives: Vec<Plane> = merged.iter().map(|g| g.representative.clone()).collect();
        viewer.show_planes("Filled Group Planes", &representatives);

        for group in merged.iter().filter(|g| !g.is_trivial()) {
            for &i in &group.members {
                walls[i].set_color(Rgb::MEMBER);
            }
        }
        stats.extension = extend_groups(&mut walls, &mut merged, &room, params)?;

        let mut cloud = PointCloud::new();
        for group in &merged {
            cloud.append(group.representative.cloud());
            if !group.is_trivial() {
                for &i in &group.members {
                    cloud.append(walls[i].cloud());
                }
            }
        }
        viewer.show_cloud("Extended Planes", &cloud);

        let boundary = fill_boundaries(&cloud, params)?;
        viewer.show_cloud("top", &boundary.slabs.top);
        viewer.show_cloud("down", &boundary.slabs.bottom);
        stats.boundary_points = boundary.points.len();
        cloud.append(&boundary.points);
        viewer.show_cloud("cloud Filled", &cloud);

        stats.output_points = cloud.len();
        tracing::info!(
            walls = stats.filter.final_count,
            groups = stats.groups,
            merged = stats.merged_groups,
            extended = stats.extension.extended,
            boundary_points = stats.boundary_points,
            points = stats.output_points,
            "reconstruction complete"
        );

        Ok(PipelineOutput { cloud, room, stats })
    }
}
