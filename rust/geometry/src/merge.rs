// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging each group into one representative plane.

use roomshell_core::{Plane, PlaneFitter, PointCloud, Result};

use crate::clustering::Clustering;
use crate::params::WallParams;
use crate::room::RoomBounds;

/// One group after merging.
#[derive(Debug, Clone)]
pub struct MergedGroup {
    pub group: usize,
    /// Indices of the pre-merge members in the clustered collection.
    pub members: Vec<usize>,
    /// New plane holding every member point, tagged with the group id.
    pub representative: Plane,
    /// Whether the representative was refitted and refilled floor to ceiling.
    pub refitted: bool,
}

impl MergedGroup {
    pub fn is_trivial(&self) -> bool {
        self.members.len() < 2
    }
}

/// Builds the representative plane of every group.
///
/// Groups with several members are refitted with `fitter` and their points
/// are replaced by a grid spanning the room from floor to ceiling. Fitting
/// errors abort the run.
pub fn merge_groups<F: PlaneFitter + ?Sized>(
    planes: &[Plane],
    clustering: &Clustering,
    room: &RoomBounds,
    params: &WallParams,
    fitter: &F,
) -> Result<Vec<MergedGroup>> {
    let mut merged = Vec::with_capacity(clustering.group_count());

    for (group, members) in clustering.groups.iter().enumerate() {
        let Some(&first) = members.first() else {
            continue;
        };
        let first = &planes[first];

        let mut cloud = PointCloud::with_capacity(members.iter().map(|&i| planes[i].len()).sum());
        for &i in members {
            cloud.append(planes[i].cloud());
        }

        let refit = members.len() > 1;
        let coefficients = if refit {
            fitter
                .fit(&cloud, params.refit_inlier_ratio)?
                .aligned_with(&first.normal())
        } else {
            *first.coefficients()
        };

        let mut representative = Plane::new(cloud, coefficients)?.with_group(group);
        representative.set_color(first.color());

        let mut refitted = false;
        if refit {
            match representative.fill_between(params.point_pitch, room.top, room.bottom) {
                Ok(()) => refitted = true,
                Err(err) if err.is_local() => {
                    tracing::warn!(group, error = %err, "could not refill merged group");
                }
                Err(err) => return Err(err),
            }
            tracing::debug!(
                group,
                members = members.len(),
                points = representative.len(),
                "merged group"
            );
        }

        merged.push(MergedGroup {
            group,
            members: members.clone(),
            representative,
            refitted,
        });
    }

    tracing::info!(
        groups = merged.len(),
        refitted = merged.iter().filter(|m| m.refitted).count(),
        "merged wall groups"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomshell_core::{Error, PlaneCoefficients, Point3, Rgb, Vector3};

    /// Fits the plane through the first point with a fixed normal.
    struct FixedNormal(Vector3<f64>);

    impl PlaneFitter for FixedNormal {
        fn fit(&self, cloud: &PointCloud, _inlier_ratio: f64) -> Result<PlaneCoefficients> {
            let first = cloud.iter().next().ok_or(Error::InsufficientData {
                what: "fit",
                needed: 3,
                found: 0,
            })?;
            PlaneCoefficients::from_point_normal(&first.position, &self.0)
        }
    }

    struct Failing;

    impl PlaneFitter for Failing {
        fn fit(&self, _cloud: &PointCloud, _inlier_ratio: f64) -> Result<PlaneCoefficients> {
            Err(Error::Collaborator("no consensus".into()))
        }
    }

    fn wall(y0: f64, y1: f64, group: usize) -> Plane {
        let positions = [
            Point3::new(0.0, y0, 0.5),
            Point3::new(0.0, y1, 0.5),
            Point3::new(0.0, y0, 2.0),
            Point3::new(0.0, y1, 2.0),
        ];
        let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, 0.0).unwrap();
        let mut plane = Plane::new(PointCloud::from_positions(&positions, Rgb::WHITE), coefficients)
            .unwrap()
            .with_group(group);
        plane.set_color(Rgb::new(10, 20, 30));
        plane
    }

    fn fixture() -> (Vec<Plane>, Clustering) {
        let planes = vec![wall(0.0, 1.0, 0), wall(5.0, 6.0, 1), wall(1.2, 2.0, 0)];
        let clustering = Clustering {
            groups: vec![vec![0, 2], vec![1]],
        };
        (planes, clustering)
    }

    #[test]
    fn groups_become_one_plane_each() {
        let (planes, clustering) = fixture();
        let room = RoomBounds::new(0.0, 3.0).unwrap();
        let fitter = FixedNormal(-Vector3::x());
        let merged =
            merge_groups(&planes, &clustering, &room, &WallParams::default(), &fitter).unwrap();

        assert_eq!(merged.len(), 2);
        let wall = &merged[0];
        assert!(wall.refitted);
        assert_eq!(wall.representative.group(), Some(0));
        // Normal is flipped back to the members' side
        assert_relative_eq!(wall.representative.normal(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(wall.representative.top_z(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(wall.representative.bottom_z(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(wall.representative.right_up().y, 2.0, epsilon = 1e-9);
        assert!(wall
            .representative
            .cloud()
            .iter()
            .all(|p| p.color == Rgb::new(10, 20, 30)));
    }

    #[test]
    fn trivial_group_keeps_its_points() {
        let (planes, clustering) = fixture();
        let room = RoomBounds::new(0.0, 3.0).unwrap();
        let merged = merge_groups(
            &planes,
            &clustering,
            &room,
            &WallParams::default(),
            &FixedNormal(Vector3::x()),
        )
        .unwrap();
        let single = &merged[1];
        assert!(single.is_trivial());
        assert!(!single.refitted);
        assert_eq!(single.representative.len(), 4);
        assert_eq!(single.representative.group(), Some(1));
    }

    #[test]
    fn fitter_failure_is_fatal() {
        let (planes, clustering) = fixture();
        let room = RoomBounds::new(0.0, 3.0).unwrap();
        let result = merge_groups(&planes, &clustering, &room, &WallParams::default(), &Failing);
        assert!(matches!(result, Err(Error::Collaborator(_))));
    }
}
