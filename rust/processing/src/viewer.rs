// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer that dumps every checkpoint to a numbered PLY file.

use std::path::{Path, PathBuf};

use roomshell_core::{Plane, PointCloud, Viewer};
use roomshell_pointcloud::{write_ply, PointCloudError};

/// Writes `NN_label.ply` into a directory for each checkpoint.
///
/// Write failures are logged and do not stop the run.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SnapshotWriter {
    /// Creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PointCloudError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| PointCloudError::IoWrite {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in checkpoint order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn file_name(&self, label: &str) -> String {
        let slug: String = label
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{:02}_{}.ply", self.written.len() + 1, slug)
    }
}

impl Viewer for SnapshotWriter {
    fn show_planes(&mut self, label: &str, planes: &[Plane]) {
        let mut cloud = PointCloud::with_capacity(planes.iter().map(Plane::len).sum());
        for plane in planes {
            cloud.append(plane.cloud());
        }
        self.show_cloud(label, &cloud);
    }

    fn show_cloud(&mut self, label: &str, cloud: &PointCloud) {
        let path = self.dir.join(self.file_name(label));
        match write_ply(&path, cloud) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), points = cloud.len(), "wrote snapshot");
                self.written.push(path);
            }
            Err(err) => tracing::warn!(label, error = %err, "failed to write snapshot"),
        }
    }
}
