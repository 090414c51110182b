// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Roomshell Geometry
//!
//! Turns independently segmented wall patches into a closed room shell.
//!
//! ## Stages
//!
//! 1. [`filters`]: drop short and isolated wall candidates
//! 2. [`clustering`]: group coplanar, adjacent patches
//! 3. [`merge`]: one refitted representative plane per group
//! 4. [`extension`]: close the gap between each member and its representative
//! 5. [`boundary`]: line up the ceiling and floor outline
//!
//! [`adjacency`] holds the pairwise plane tests shared by the stages and
//! [`room`] the floor/ceiling limits.
//!
//! ## Example
//!
//! ```rust,ignore
//! use roomshell_geometry::{cluster_planes, filter_candidates, RoomBounds, WallParams};
//!
//! let params = WallParams::default();
//! let (room, _) = RoomBounds::from_horizontal_planes(&horizontal)?;
//! let mut walls = filter_candidates(vertical, &room, &params).planes;
//! let clustering = cluster_planes(&mut walls, &params)?;
//! println!("{} groups", clustering.group_count());
//! ```

pub mod adjacency;
pub mod boundary;
pub mod clustering;
pub mod extension;
pub mod filters;
pub mod merge;
pub mod params;
pub mod room;

pub use adjacency::{coplanar_overlap, edge_distance, edges_overlap, find_near_planes, NearPlanes};
pub use boundary::{extract_slabs, fill_boundaries, BoundaryFill, Slabs};
pub use clustering::{assign_group_colors, cluster_planes, is_connected, Clustering};
pub use extension::{extend_groups, extend_member, Extension, ExtensionStats};
pub use filters::{filter_by_height, filter_candidates, filter_isolated, FilterResult, FilterStats};
pub use merge::{merge_groups, MergedGroup};
pub use params::WallParams;
pub use room::RoomBounds;
