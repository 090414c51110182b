// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extension of pre-merge members onto their group's representative plane.
//!
//! A member is a smaller patch that was merged into a group. Its vertical
//! edges are projected along its normal onto the representative's top-edge
//! line, which gives two foot points `X1` (left) and `X2` (right). The gap
//! between the member and the representative is closed with four patches:
//!
//! ```text
//!   rep line   X1 ---------------- X2
//!              |     top strip      |
//!   left cap   |                    |   right cap
//!              |                    |
//!   member     L ------------------ R
//! ```
//!
//! The representative then loses every point in the box spanned by `X1`,
//! `X2` and the room's floor and ceiling, so the two never overlap.

use nalgebra::{Matrix2, Vector2};
use roomshell_core::{fill_quad, Aabb, Error, Plane, Point2D, PointCloud, Result, Rgb};

use crate::merge::MergedGroup;
use crate::params::WallParams;
use crate::room::RoomBounds;

/// Relative determinant below which the member normal and the
/// representative edge count as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-9;

/// What [`extend_member`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extension {
    /// Foot of the member's left edge on the representative's line.
    pub x1: Point2D,
    /// Foot of the member's right edge on the representative's line.
    pub x2: Point2D,
    /// Region cleared from the representative.
    pub removal_box: Aabb,
    /// Points appended to the member.
    pub appended: usize,
    /// Points removed from the representative.
    pub removed: usize,
}

/// Totals of [`extend_groups`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionStats {
    pub extended: usize,
    pub skipped: usize,
    pub appended: usize,
    pub removed: usize,
}

/// Extends `member` onto `representative` and removes the covered part of
/// `representative`.
///
/// Fails with [`Error::DegenerateGeometry`] when the member normal has no
/// horizontal component, the representative's top edge has zero length, or
/// the member normal runs parallel to that edge. Nothing is modified then.
pub fn extend_member(
    member: &mut Plane,
    representative: &mut Plane,
    room: &RoomBounds,
    params: &WallParams,
) -> Result<Extension> {
    let normal = member.normal();
    let direction = Vector2::new(normal.x, normal.y);
    if direction.norm() < 1e-6 {
        return Err(Error::degenerate(
            "member normal has no horizontal component",
        ));
    }

    let edge_start = Point2D::from_xy(&representative.left_up());
    let edge_end = Point2D::from_xy(&representative.right_up());
    let edge = Vector2::new(edge_end.x - edge_start.x, edge_end.y - edge_start.y);
    if edge.norm() < 1e-12 {
        return Err(Error::degenerate(
            "representative top edge has zero length in plan view",
        ));
    }

    let left = Point2D::from_xy(&member.left_up());
    let right = Point2D::from_xy(&member.right_up());
    // Both feet run along the same normal, so the connectors left -> X1 and
    // right -> X2 are parallel and X1 always pairs with the left edge.
    let x1 = foot_along(left, direction, edge_start, edge)?;
    let x2 = foot_along(right, direction, edge_start, edge)?;

    let corners = *member.corners();
    let (top, bottom) = (corners.left_up.z, corners.left_down.z);
    let (p1, q1) = (x1.at_height(top), x1.at_height(bottom));
    let (p2, q2) = (x2.at_height(top), x2.at_height(bottom));

    let density = params.point_pitch;
    let mut patches = PointCloud::new();
    for patch in [
        fill_quad(p1, q1, corners.left_up, corners.left_down, density, Rgb::FILL),
        fill_quad(p2, q2, corners.right_up, corners.right_down, density, Rgb::FILL),
        fill_quad(p1, p2, corners.left_up, corners.right_up, density, Rgb::FILL),
        fill_quad(q1, q2, corners.left_down, corners.right_down, density, Rgb::FILL),
    ] {
        patches.append(&patch);
    }
    member.append(&patches);

    let removal_box = Aabb::from_corners(x1.at_height(room.bottom), x2.at_height(room.top))
        .expanded(params.density_step() / 2.0);
    let removed = representative.remove_within(&removal_box);
    if representative.is_empty() {
        tracing::warn!(
            group = ?representative.group(),
            removed,
            "member covers its whole representative, only the outline is left"
        );
    }

    tracing::debug!(
        appended = patches.len(),
        removed,
        "extended member onto representative"
    );

    Ok(Extension {
        x1,
        x2,
        removal_box,
        appended: patches.len(),
        removed,
    })
}

/// Intersection of the line through `origin` along `direction` with the line
/// through `edge_start` along `edge`.
fn foot_along(
    origin: Point2D,
    direction: Vector2<f64>,
    edge_start: Point2D,
    edge: Vector2<f64>,
) -> Result<Point2D> {
    // origin + t*direction = edge_start + s*edge
    let system = Matrix2::new(direction.x, -edge.x, direction.y, -edge.y);
    if system.determinant().abs() < PARALLEL_TOLERANCE * direction.norm() * edge.norm() {
        return Err(Error::degenerate(
            "member normal is parallel to the representative edge",
        ));
    }
    let rhs = Vector2::new(edge_start.x - origin.x, edge_start.y - origin.y);
    let solution = system
        .lu()
        .solve(&rhs)
        .ok_or_else(|| Error::degenerate("singular extension system"))?;
    let t = solution.x;
    let foot = Point2D::new(origin.x + t * direction.x, origin.y + t * direction.y);
    if !(foot.x.is_finite() && foot.y.is_finite()) {
        return Err(Error::degenerate("non-finite extension point"));
    }
    Ok(foot)
}

/// Extends every member of every group with more than one member.
///
/// `planes` is the clustered collection the group member indices point into.
/// Members with degenerate geometry are skipped with a warning.
pub fn extend_groups(
    planes: &mut [Plane],
    merged: &mut [MergedGroup],
    room: &RoomBounds,
    params: &WallParams,
) -> Result<ExtensionStats> {
    let mut stats = ExtensionStats::default();

    for group in merged.iter_mut().filter(|g| !g.is_trivial()) {
        for &index in &group.members {
            let Some(member) = planes.get_mut(index) else {
                tracing::warn!(group = group.group, index, "group member out of range");
                stats.skipped += 1;
                continue;
            };
            match extend_member(member, &mut group.representative, room, params) {
                Ok(extension) => {
                    stats.extended += 1;
                    stats.appended += extension.appended;
                    stats.removed += extension.removed;
                }
                Err(err) if err.is_local() => {
                    tracing::warn!(
                        group = group.group,
                        index,
                        error = %err,
                        "skipping member extension"
                    );
                    stats.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    tracing::info!(
        extended = stats.extended,
        skipped = stats.skipped,
        appended = stats.appended,
        removed = stats.removed,
        "extended group members"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomshell_core::{PlaneCoefficients, Point3, Vector3};

    fn wall_x(x: f64, y0: f64, y1: f64, z0: f64, z1: f64) -> Plane {
        let positions = [
            Point3::new(x, y0, z0),
            Point3::new(x, y1, z0),
            Point3::new(x, y0, z1),
            Point3::new(x, y1, z1),
        ];
        let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, -x).unwrap();
        Plane::new(PointCloud::from_positions(&positions, Rgb::WHITE), coefficients).unwrap()
    }

    fn params() -> WallParams {
        WallParams {
            point_pitch: 10.0,
            ..WallParams::default()
        }
    }

    fn room() -> RoomBounds {
        RoomBounds::new(0.0, 3.0).unwrap()
    }

    fn representative() -> Plane {
        let mut rep = wall_x(0.0, 0.0, 4.0, 0.0, 3.0).with_group(0);
        rep.fill(10.0);
        rep
    }

    #[test]
    fn offset_member_reaches_the_representative() {
        let mut rep = representative();
        let mut member = wall_x(0.2, 1.0, 2.0, 0.5, 2.0);
        let before = member.len();

        let ext = extend_member(&mut member, &mut rep, &room(), &params()).unwrap();
        assert_relative_eq!(ext.x1.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ext.x1.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(ext.x2.y, 2.0, epsilon = 1e-12);

        assert_eq!(member.len(), before + ext.appended);
        assert!(member.cloud().iter().filter(|p| p.color == Rgb::FILL).count() == ext.appended);
        assert!(ext.removed > 0);
        // Rest of the representative survives on both sides
        assert!(rep.cloud().iter().any(|p| p.position.y < 0.9));
        assert!(rep.cloud().iter().any(|p| p.position.y > 2.1));
    }

    #[test]
    fn feet_keep_left_and_right_on_a_slanted_representative() {
        let angle: f64 = 0.1;
        let normal = Vector3::new(angle.cos(), angle.sin(), 0.0);
        let along = Vector3::new(-angle.sin(), angle.cos(), 0.0);
        let positions: Vec<Point3<f64>> = [(0.0, 0.0), (4.0, 0.0), (0.0, 3.0), (4.0, 3.0)]
            .iter()
            .map(|&(s, z)| Point3::from(along * s) + Vector3::new(0.0, 0.0, z))
            .collect();
        let coefficients = PlaneCoefficients::from_point_normal(&Point3::origin(), &normal).unwrap();
        let mut rep = Plane::new(PointCloud::from_positions(&positions, Rgb::WHITE), coefficients)
            .unwrap()
            .with_group(0);
        rep.fill(10.0);

        let mut member = wall_x(0.4, 1.0, 2.0, 0.5, 2.0);
        let left = Point2D::from_xy(&member.left_up());
        let right = Point2D::from_xy(&member.right_up());
        let ext = extend_member(&mut member, &mut rep, &room(), &params()).unwrap();

        // Each foot sits on its own edge's line along the member normal
        assert_relative_eq!(ext.x1.y, left.y, epsilon = 1e-9);
        assert_relative_eq!(ext.x2.y, right.y, epsilon = 1e-9);
        for foot in [ext.x1, ext.x2] {
            assert_relative_eq!(normal.x * foot.x + normal.y * foot.y, 0.0, epsilon = 1e-9);
        }
        assert!(!roomshell_core::segments_intersect(left, ext.x1, right, ext.x2));
    }

    #[test]
    fn no_representative_point_left_in_removal_box() {
        let mut rep = representative();
        let mut member = wall_x(-0.3, 0.5, 3.0, 0.2, 2.8);
        let ext = extend_member(&mut member, &mut rep, &room(), &params()).unwrap();
        assert!(rep
            .cloud()
            .iter()
            .all(|p| !ext.removal_box.contains(&p.position)));
        assert_relative_eq!(ext.removal_box.min.z, -0.05, epsilon = 1e-12);
        assert_relative_eq!(ext.removal_box.max.z, 3.05, epsilon = 1e-12);
    }

    #[test]
    fn fully_covered_representative_is_emptied() {
        let mut rep = representative();
        let outline = *rep.corners();
        let mut member = wall_x(0.2, -0.5, 4.5, 0.5, 2.0);
        let ext = extend_member(&mut member, &mut rep, &room(), &params()).unwrap();
        assert!(rep.is_empty());
        assert_eq!(ext.removed, 41 * 31);
        assert_eq!(*rep.corners(), outline);
    }

    #[test]
    fn perpendicular_member_is_degenerate_and_untouched() {
        let mut rep = representative();
        let coefficients = PlaneCoefficients::new(0.0, 1.0, 0.0, -1.0).unwrap();
        let mut member = Plane::new(
            PointCloud::from_positions(
                &[
                    Point3::new(0.5, 1.0, 0.0),
                    Point3::new(1.5, 1.0, 0.0),
                    Point3::new(0.5, 1.0, 2.0),
                ],
                Rgb::WHITE,
            ),
            coefficients,
        )
        .unwrap();
        let (rep_len, member_len) = (rep.len(), member.len());
        let result = extend_member(&mut member, &mut rep, &room(), &params());
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
        assert_eq!(rep.len(), rep_len);
        assert_eq!(member.len(), member_len);
    }

    #[test]
    fn horizontal_member_is_degenerate() {
        let mut rep = representative();
        let coefficients = PlaneCoefficients::from_point_normal(&Point3::origin(), &Vector3::z()).unwrap();
        let mut floor = Plane::new(
            PointCloud::from_positions(
                &[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
                Rgb::WHITE,
            ),
            coefficients,
        )
        .unwrap();
        assert!(extend_member(&mut floor, &mut rep, &room(), &params()).is_err());
    }

    #[test]
    fn trivial_groups_are_not_extended() {
        let mut planes = vec![wall_x(0.2, 1.0, 2.0, 0.5, 2.0).with_group(0)];
        let mut merged = vec![MergedGroup {
            group: 0,
            members: vec![0],
            representative: representative(),
            refitted: false,
        }];
        let stats = extend_groups(&mut planes, &mut merged, &room(), &params()).unwrap();
        assert_eq!(stats, ExtensionStats::default());
    }

    #[test]
    fn degenerate_members_are_skipped() {
        let coefficients = PlaneCoefficients::new(0.0, 1.0, 0.0, -1.0).unwrap();
        let perpendicular = Plane::new(
            PointCloud::from_positions(
                &[Point3::new(0.5, 1.0, 0.0), Point3::new(1.5, 1.0, 2.0)],
                Rgb::WHITE,
            ),
            coefficients,
        )
        .unwrap();
        let mut planes = vec![wall_x(0.2, 1.0, 2.0, 0.5, 2.0), perpendicular];
        let mut merged = vec![MergedGroup {
            group: 0,
            members: vec![0, 1],
            representative: representative(),
            refitted: true,
        }];
        let stats = extend_groups(&mut planes, &mut merged, &room(), &params()).unwrap();
        assert_eq!(stats.extended, 1);
        assert_eq!(stats.skipped, 1);
    }
}
