// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ceiling and floor closure.
//!
//! The walls stop where the scan stopped, which leaves a ragged outline at
//! the ceiling and floor. The combined wall cloud is cut into a thin slab at
//! its top and bottom, and each slab is scanned in columns along x. Every
//! column gets a line spanning the slab's y extent at that x.

use roomshell_core::{generate_line, ColoredPoint, Error, Point3, PointCloud, Result, Rgb};

use crate::params::WallParams;

/// Width of a scan column along x.
pub const COLUMN_WIDTH: f64 = 0.1;

/// Coordinates beyond this magnitude mean the column had no real data.
pub const SANITY_MAGNITUDE: f64 = 10_000.0;

/// Slab thickness in density steps.
pub const SLAB_STEPS: f64 = 2.0;

/// Points near the top and bottom of a cloud.
#[derive(Debug, Clone, Default)]
pub struct Slabs {
    pub top: PointCloud,
    pub bottom: PointCloud,
}

/// Output of [`fill_boundaries`].
#[derive(Debug, Clone, Default)]
pub struct BoundaryFill {
    pub slabs: Slabs,
    /// Synthesized boundary points.
    pub points: PointCloud,
    pub columns: usize,
    pub lines: usize,
    /// Slab columns skipped for lack of data.
    pub skipped: usize,
}

/// Cuts the top and bottom slabs, each `SLAB_STEPS * step` thick.
pub fn extract_slabs(cloud: &PointCloud, step: f64) -> Result<Slabs> {
    let bounds = cloud.bounds().ok_or(Error::InsufficientData {
        what: "boundary slabs",
        needed: 1,
        found: 0,
    })?;
    let thickness = SLAB_STEPS * step;
    Ok(Slabs {
        top: cloud.pass_through(2, bounds.max.z - thickness, bounds.max.z),
        bottom: cloud.pass_through(2, bounds.min.z, bounds.min.z + thickness),
    })
}

/// Synthesizes the ceiling and floor boundary lines of `cloud`.
///
/// Fails only on an empty cloud; columns without data are skipped.
pub fn fill_boundaries(cloud: &PointCloud, params: &WallParams) -> Result<BoundaryFill> {
    let step = params.density_step();
    let slabs = extract_slabs(cloud, step)?;
    let bounds = cloud.bounds().ok_or(Error::InsufficientData {
        what: "boundary fill",
        needed: 1,
        found: 0,
    })?;

    let top = SortedSlab::new(&slabs.top);
    let bottom = SortedSlab::new(&slabs.bottom);

    let mut fill = BoundaryFill::default();
    let x_min = bounds.min.x.max(-SANITY_MAGNITUDE);
    let x_max = bounds.max.x.min(SANITY_MAGNITUDE);
    if x_min > bounds.min.x || x_max < bounds.max.x {
        tracing::warn!(
            min = bounds.min.x,
            max = bounds.max.x,
            "cloud extends past the sanity range, clamping the column sweep"
        );
    }
    let span = ((x_max - x_min) / step).ceil();
    let columns = if span.is_finite() && span > 0.0 {
        span as usize
    } else {
        0
    };

    for i in 0..columns {
        let x = x_min + i as f64 * step;
        fill.columns += 1;

        let column_top = top.column(x).filter(|c| c.count >= 2);
        let column_bottom = bottom.column(x).filter(|c| c.count >= 2);

        let lines = [
            column_top.map(|c| (c.y_min, c.y_max, c.z_max)),
            column_bottom.map(|c| (c.y_min, c.y_max, c.z_min)),
        ];
        for line in lines {
            let Some((y_min, y_max, z)) = line else {
                fill.skipped += 1;
                continue;
            };
            if [y_min, y_max, z]
                .iter()
                .any(|v| !v.is_finite() || v.abs() >= SANITY_MAGNITUDE)
            {
                tracing::debug!(x, y_min, y_max, z, "boundary column out of range");
                fill.skipped += 1;
                continue;
            }
            fill.points.extend(generate_line(
                Point3::new(x, y_min, z),
                Point3::new(x, y_max, z),
                params.point_pitch,
                Rgb::BOUNDARY,
            ));
            fill.lines += 1;
        }
    }

    tracing::info!(
        columns = fill.columns,
        lines = fill.lines,
        skipped = fill.skipped,
        points = fill.points.len(),
        "filled ceiling and floor boundaries"
    );
    fill.slabs = slabs;
    Ok(fill)
}

/// Column statistics of a slab.
#[derive(Debug, Clone, Copy)]
struct Column {
    count: usize,
    y_min: f64,
    y_max: f64,
    z_min: f64,
    z_max: f64,
}

/// Slab points sorted by x for column range queries.
struct SortedSlab {
    points: Vec<ColoredPoint>,
}

impl SortedSlab {
    fn new(slab: &PointCloud) -> Self {
        let mut points = slab.points.clone();
        points.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        Self { points }
    }

    /// Points with x in `[x, x + COLUMN_WIDTH]`.
    fn column(&self, x: f64) -> Option<Column> {
        let start = self.points.partition_point(|p| p.position.x < x);
        let end = self
            .points
            .partition_point(|p| p.position.x <= x + COLUMN_WIDTH);
        let slice = self.points.get(start..end)?;
        let first = slice.first()?.position;
        let init = Column {
            count: 0,
            y_min: first.y,
            y_max: first.y,
            z_min: first.z,
            z_max: first.z,
        };
        Some(slice.iter().fold(init, |c, p| Column {
            count: c.count + 1,
            y_min: c.y_min.min(p.position.y),
            y_max: c.y_max.max(p.position.y),
            z_min: c.z_min.min(p.position.z),
            z_max: c.z_max.max(p.position.z),
        }))
    }
}
