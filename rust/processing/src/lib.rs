// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Roomshell Processing
//!
//! Ties segmentation and wall reasoning together:
//!
//! - [`config`]: YAML configuration with validation
//! - [`pipeline`]: the reconstruction driver
//! - [`viewer`]: a [`Viewer`](roomshell_core::Viewer) that dumps checkpoints to PLY
//!
//! ```rust,ignore
//! use roomshell_core::Headless;
//! use roomshell_processing::{Pipeline, ReconstructionConfig};
//!
//! let config = ReconstructionConfig::load(Path::new("config.yaml"))?;
//! let output = Pipeline::from_config(&config, None).run(&scan, &mut Headless)?;
//! roomshell_pointcloud::write_ply("OutputData/6_AllPlanes.ply", &output.cloud)?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod viewer;

pub use config::{
    ClusteringConfig, CombineConfig, DownsamplingConfig, RansacConfig, ReconstructionConfig,
};
pub use error::{ConfigError, PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput, PipelineStats};
pub use viewer::SnapshotWriter;
