// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-clustering filters for wall candidates.
//!
//! Segmentation returns many vertical patches that are not walls:
//! - Furniture fronts, door leaves and cupboards (too short)
//! - Stray patches in the middle of the room (no neighbours)
//!
//! Each filter runs once, in order, on the vertical candidates.

use roomshell_core::Plane;

use crate::adjacency::find_near_planes;
use crate::params::WallParams;
use crate::room::RoomBounds;

/// Candidates that passed both filters
#[derive(Debug, Clone)]
pub struct FilterResult {
    pub planes: Vec<Plane>,
    pub stats: FilterStats,
}

/// Statistics from the filtering pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input_count: usize,
    pub removed_short: usize,
    pub removed_isolated: usize,
    pub final_count: usize,
}

/// Height filter followed by isolation filter.
pub fn filter_candidates(planes: Vec<Plane>, room: &RoomBounds, params: &WallParams) -> FilterResult {
    let mut stats = FilterStats {
        input_count: planes.len(),
        ..Default::default()
    };

    let mut planes = planes;
    stats.removed_short = filter_by_height(&mut planes, room.height(), params.min_plane_height);
    stats.removed_isolated = filter_isolated(&mut planes, params.min_edge_dist);
    stats.final_count = planes.len();

    tracing::info!(
        input = stats.input_count,
        short = stats.removed_short,
        isolated = stats.removed_isolated,
        kept = stats.final_count,
        "filtered wall candidates"
    );

    FilterResult { planes, stats }
}

/// Drops planes whose height is less than `min_fraction` of `room_height`.
///
/// Returns the number of planes removed.
pub fn filter_by_height(planes: &mut Vec<Plane>, room_height: f64, min_fraction: f64) -> usize {
    let before = planes.len();
    planes.retain(|plane| {
        let fraction = plane.height() / room_height;
        let keep = fraction >= min_fraction;
        if !keep {
            tracing::debug!(height = plane.height(), fraction, "dropping short plane");
        }
        keep
    });
    before - planes.len()
}

/// Drops planes without a neighbour within `threshold` in plan view.
///
/// Neighbours are counted on the collection as passed in, then every isolated
/// plane is removed at once. Returns the number of planes removed.
pub fn filter_isolated(planes: &mut Vec<Plane>, threshold: f64) -> usize {
    let isolated: Vec<bool> = (0..planes.len())
        .map(|i| find_near_planes(i, planes, threshold).is_empty())
        .collect();
    let before = planes.len();
    let mut flags = isolated.into_iter();
    planes.retain(|_| !flags.next().unwrap_or(false));
    before - planes.len()
}
