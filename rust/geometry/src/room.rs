// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor and ceiling limits of the room

use roomshell_core::{Error, Orientation, Plane, Result};

/// Vertical limits of the room, taken from its floor and ceiling planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub bottom: f64,
    pub top: f64,
}

impl RoomBounds {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        let (bottom, top) = if a <= b { (a, b) } else { (b, a) };
        if !(top - bottom).is_finite() || top - bottom < 1e-6 {
            return Err(Error::degenerate(format!(
                "floor and ceiling coincide at z = {bottom}"
            )));
        }
        Ok(Self { bottom, top })
    }

    /// Picks the two horizontal planes with the most points as floor and
    /// ceiling. Returns the bounds and the indices of the two planes.
    pub fn from_horizontal_planes(planes: &[Plane]) -> Result<(Self, [usize; 2])> {
        let mut horizontal: Vec<usize> = planes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.orientation() == Orientation::Horizontal)
            .map(|(i, _)| i)
            .collect();
        if horizontal.len() < 2 {
            return Err(Error::MissingRoomBounds {
                found: horizontal.len(),
            });
        }
        // Stable sort keeps the earlier plane on ties
        horizontal.sort_by(|&a, &b| planes[b].len().cmp(&planes[a].len()));
        let (first, second) = (horizontal[0], horizontal[1]);

        let z = |i: usize| {
            planes[i].coefficients().z_offset().ok_or_else(|| {
                Error::degenerate(format!("horizontal plane {i} does not cross the z axis"))
            })
        };
        let bounds = Self::new(z(first)?, z(second)?)?;
        Ok((bounds, [first, second]))
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}
