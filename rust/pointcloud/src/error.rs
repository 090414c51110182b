// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for point-cloud processing.

use std::path::PathBuf;

/// Result type alias for point-cloud operations.
pub type Result<T> = std::result::Result<T, PointCloudError>;

/// Errors from point-cloud I/O and fitting.
#[derive(Debug, thiserror::Error)]
pub enum PointCloudError {
    #[error("failed to read {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {details}")]
    Parse { path: PathBuf, details: String },

    #[error("not enough points: need {needed}, found {found}")]
    InsufficientPoints { needed: usize, found: usize },

    #[error("plane fit failed: {0}")]
    Fit(String),
}

impl From<PointCloudError> for roomshell_core::Error {
    fn from(err: PointCloudError) -> Self {
        match err {
            PointCloudError::InsufficientPoints { needed, found } => {
                roomshell_core::Error::InsufficientData {
                    what: "plane fit",
                    needed,
                    found,
                }
            }
            other => roomshell_core::Error::Collaborator(other.to_string()),
        }
    }
}
