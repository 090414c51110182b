// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping of wall candidates into coplanar surfaces.
//!
//! Groups are the connected components of the graph whose edges are given by
//! [`is_connected`]. Components are found by a flood fill over plane indices,
//! visiting planes in collection order.

use rand::Rng;
use roomshell_core::{Plane, Result, Rgb};
use rustc_hash::FxHashSet;

use crate::adjacency::{coplanar_overlap, edge_distance};
use crate::params::WallParams;

/// Outcome of [`cluster_planes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clustering {
    /// Member indices per group, indexed by group id.
    pub groups: Vec<Vec<usize>>,
}

impl Clustering {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups with more than one member.
    pub fn merged_count(&self) -> usize {
        self.groups.iter().filter(|g| g.len() > 1).count()
    }
}

/// Connection predicate between two planes.
///
/// Normals within `max_normal_angle`, top edges within `max_planes_dist` and
/// overlapping in at least one direction. Degenerate pairs are not connected.
pub fn is_connected(a: &Plane, b: &Plane, params: &WallParams) -> bool {
    let angle = a.coefficients().angle_to(b.coefficients());
    if angle > params.max_normal_angle {
        return false;
    }
    let test = || -> Result<bool> {
        Ok(edge_distance(a, b)? <= params.max_planes_dist && coplanar_overlap(a, b)?)
    };
    match test() {
        Ok(connected) => connected,
        Err(err) => {
            tracing::warn!(error = %err, "skipping degenerate plane pair");
            false
        }
    }
}

/// Assigns a group id to every plane.
///
/// Planes must not carry a group yet.
pub fn cluster_planes(planes: &mut [Plane], params: &WallParams) -> Result<Clustering> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut worklist: Vec<usize> = Vec::new();

    for seed in 0..planes.len() {
        if planes[seed].group().is_some() {
            continue;
        }
        let group = groups.len();
        planes[seed].assign_group(group)?;
        let mut members = vec![seed];
        worklist.push(seed);

        while let Some(source) = worklist.pop() {
            for target in 0..planes.len() {
                if target == source || planes[target].group().is_some() {
                    continue;
                }
                if is_connected(&planes[source], &planes[target], params) {
                    planes[target].assign_group(group)?;
                    members.push(target);
                    worklist.push(target);
                }
            }
        }

        members.sort_unstable();
        tracing::debug!(group, members = members.len(), "grouped planes");
        groups.push(members);
    }

    let clustering = Clustering { groups };
    tracing::info!(
        planes = planes.len(),
        groups = clustering.group_count(),
        merged = clustering.merged_count(),
        "clustered wall candidates"
    );
    Ok(clustering)
}

/// Colors reserved for fixed roles, never handed out to a group.
const RESERVED: [Rgb; 4] = [Rgb::SEGMENTED, Rgb::MEMBER, Rgb::FILL, Rgb::BOUNDARY];

/// Gives every group a distinct random color and recolors its planes.
///
/// Returns the color of each group, indexed by group id.
pub fn assign_group_colors<R: Rng>(
    planes: &mut [Plane],
    group_count: usize,
    rng: &mut R,
) -> Vec<Rgb> {
    let mut used: FxHashSet<Rgb> = RESERVED.into_iter().collect();
    let colors: Vec<Rgb> = (0..group_count)
        .map(|_| loop {
            let color = Rgb::new(rng.random(), rng.random(), rng.random());
            if used.insert(color) {
                break color;
            }
        })
        .collect();

    for plane in planes.iter_mut() {
        if let Some(color) = plane.group().and_then(|g| colors.get(g)) {
            plane.set_color(*color);
        }
    }
    colors
}
