// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Roomshell Core
//!
//! Data model shared by the room-shell reconstruction crates:
//!
//! - **Points**: [`ColoredPoint`], [`PointCloud`] and the plan-view [`Point2D`]
//! - **Planes**: [`Plane`] with its [`PlaneCoefficients`], [`Corners`] and
//!   [`Orientation`]
//! - **Primitives**: orientation and segment tests in plan view, evenly spaced
//!   line points and filled quad patches
//! - **Collaborators**: traits for segmentation, plane fitting and viewing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roomshell_core::{Plane, PlaneCoefficients, PointCloud};
//!
//! let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, -2.0)?;
//! let mut wall = Plane::new(cloud, coefficients)?;
//! wall.fill(50.0);
//! println!("wall spans {:.2} m", wall.height());
//! ```

pub mod collaborator;
pub mod error;
pub mod patch;
pub mod plane;
pub mod primitives;
pub mod types;

pub use collaborator::{Headless, PlaneFitter, PlaneSegmenter, Viewer};
pub use error::{Error, Result};
pub use patch::fill_quad;
pub use plane::{Corners, Orientation, Plane, PlaneCoefficients};
pub use primitives::{generate_line, on_segment, orientation, segments_intersect, LinePoints, Turn};
pub use types::{Aabb, ColoredPoint, Point2D, PointCloud, Rgb};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
