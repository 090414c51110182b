// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Roomshell Point Cloud
//!
//! Point-cloud algorithms around the plane reasoning of `roomshell-geometry`:
//!
//! - [`io`]: PLY reading and writing
//! - [`downsample`]: voxel-grid downsampling
//! - [`normals`]: k-NN normal and curvature estimation over a [`PointIndex`]
//! - [`region_growing`]: smoothness-constrained region growing
//! - [`ransac`]: RANSAC plane fitting, implements [`PlaneFitter`]
//! - [`segmentation`]: the full scan-to-planes chain, implements [`PlaneSegmenter`]
//!
//! [`PlaneFitter`]: roomshell_core::PlaneFitter
//! [`PlaneSegmenter`]: roomshell_core::PlaneSegmenter

pub mod downsample;
pub mod error;
pub mod io;
pub mod normals;
pub mod pca;
pub mod ransac;
pub mod region_growing;
pub mod segmentation;
pub mod spatial;

pub use downsample::voxel_downsample;
pub use error::{PointCloudError, Result};
pub use io::{read_ply, write_ply};
pub use normals::{estimate_normals, SurfacePoint};
pub use pca::Pca;
pub use ransac::{Ransac, RansacFit};
pub use region_growing::RegionGrowing;
pub use segmentation::{RoomSegmenter, Segmentation};
pub use spatial::PointIndex;
