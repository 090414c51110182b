// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for plane reasoning.

/// Result type alias for room-shell operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying, merging and extending planes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parallel or coincident lines, zero-length edges or a vanishing
    /// in-plane direction. Raised instead of emitting NaN/Inf points.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Not enough input to carry out the operation.
    #[error("insufficient data for {what}: need {needed}, found {found}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        found: usize,
    },

    /// Ceiling and floor could not be identified.
    #[error("room bounds need two horizontal planes, found {found}")]
    MissingRoomBounds { found: usize },

    /// A plane already belongs to a group; group ids are set once.
    #[error("plane already belongs to group {current}, cannot move it to group {requested}")]
    GroupAlreadyAssigned { current: usize, requested: usize },

    /// An external collaborator (segmentation, fitting, I/O) failed.
    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

impl Error {
    /// Shorthand for [`Error::DegenerateGeometry`].
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Whether the error only affects a single plane or group.
    ///
    /// Degenerate geometry is skipped per plane; everything else aborts the run.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_) | Self::InsufficientData { .. })
    }
}
