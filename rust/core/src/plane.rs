// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar patch model.
//!
//! A [`Plane`] owns the points of one fitted surface together with its plane
//! equation and the bounding rectangle of its points projected onto the plane.
//! The rectangle is expressed in the plane's own frame:
//!
//! - `u` ("right") is horizontal, `z x n` for walls, `+x` for floors/ceilings
//! - `v` ("up") is `n x u`, which is `+z` for an exactly vertical wall
//!
//! Every mutation of the point cloud goes through a method that keeps the
//! corners in sync.

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::patch::fill_quad;
use crate::types::{Aabb, PointCloud, Rgb};

const AXIS_EPSILON: f64 = 1e-6;

/// Dominant direction of a plane's normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Normal dominated by z: floors and ceilings.
    Horizontal,
    /// Normal dominated by the x-y components: walls.
    Vertical,
}

impl Orientation {
    pub fn classify(normal: &Vector3<f64>) -> Self {
        if normal.z.abs() > normal.x.abs().max(normal.y.abs()) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Plane equation `a*x + b*y + c*z + d = 0` with a unit normal `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneCoefficients {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl PlaneCoefficients {
    /// Normalizes `(a, b, c)` to unit length, scaling `d` accordingly.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let norm = (a * a + b * b + c * c).sqrt();
        if !norm.is_finite() || norm < 1e-12 || !d.is_finite() {
            return Err(Error::degenerate(format!(
                "plane normal ({a}, {b}, {c}) cannot be normalized"
            )));
        }
        Ok(Self {
            a: a / norm,
            b: b / norm,
            c: c / norm,
            d: d / norm,
        })
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: &Point3<f64>, normal: &Vector3<f64>) -> Result<Self> {
        Self::new(normal.x, normal.y, normal.z, -normal.dot(&point.coords))
    }

    pub fn abcd(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.c)
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal().dot(&p.coords) + self.d
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal() * self.signed_distance(p)
    }

    /// Height at which the plane crosses the z axis, `None` for walls.
    pub fn z_offset(&self) -> Option<f64> {
        (self.c.abs() > AXIS_EPSILON).then(|| -self.d / self.c)
    }

    /// Same plane with the normal pointing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            a: -self.a,
            b: -self.b,
            c: -self.c,
            d: -self.d,
        }
    }

    /// Flips the normal if needed so it does not point away from `reference`.
    pub fn aligned_with(&self, reference: &Vector3<f64>) -> Self {
        if self.normal().dot(reference) < 0.0 {
            self.flipped()
        } else {
            *self
        }
    }

    /// Angle between the two unit normals, in degrees.
    pub fn angle_to(&self, other: &PlaneCoefficients) -> f64 {
        self.normal()
            .dot(&other.normal())
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }

    /// In-plane axes `(u, v)`.
    pub fn axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal();
        let u = Vector3::z().cross(&n);
        let u = if u.norm() > AXIS_EPSILON {
            u.normalize()
        } else {
            Vector3::x()
        };
        let v = n.cross(&u);
        (u, v)
    }

    /// Point of the plane closest to the origin.
    pub fn origin(&self) -> Point3<f64> {
        Point3::from(self.normal() * -self.d)
    }

    /// Point of the plane at frame coordinates `(s, t)`.
    pub fn point_at(&self, s: f64, t: f64) -> Point3<f64> {
        let (u, v) = self.axes();
        self.origin() + u * s + v * t
    }

    /// Frame coordinates `(s, t)` of the projection of `p`.
    pub fn frame_coords(&self, p: &Point3<f64>) -> (f64, f64) {
        let (u, v) = self.axes();
        (u.dot(&p.coords), v.dot(&p.coords))
    }
}

/// Bounding rectangle of a plane's points, in the plane's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub left_up: Point3<f64>,
    pub left_down: Point3<f64>,
    pub right_up: Point3<f64>,
    pub right_down: Point3<f64>,
}

impl Corners {
    /// Rectangle enclosing the projection of every point of `cloud`.
    pub fn from_cloud(coefficients: &PlaneCoefficients, cloud: &PointCloud) -> Option<Self> {
        let mut positions = cloud.positions();
        let first = positions.next()?;
        let (s0, t0) = coefficients.frame_coords(first);
        let (mut s_min, mut s_max, mut t_min, mut t_max) = (s0, s0, t0, t0);
        for p in positions {
            let (s, t) = coefficients.frame_coords(p);
            s_min = s_min.min(s);
            s_max = s_max.max(s);
            t_min = t_min.min(t);
            t_max = t_max.max(t);
        }
        Some(Self::from_extent(coefficients, s_min, s_max, t_min, t_max))
    }

    fn from_extent(
        coefficients: &PlaneCoefficients,
        s_min: f64,
        s_max: f64,
        t_min: f64,
        t_max: f64,
    ) -> Self {
        Self {
            left_up: coefficients.point_at(s_min, t_max),
            left_down: coefficients.point_at(s_min, t_min),
            right_up: coefficients.point_at(s_max, t_max),
            right_down: coefficients.point_at(s_max, t_min),
        }
    }

    pub fn top_z(&self) -> f64 {
        self.left_up.z.max(self.right_up.z)
    }

    pub fn bottom_z(&self) -> f64 {
        self.left_down.z.min(self.right_down.z)
    }
}

/// A planar patch of the room scan.
#[derive(Debug, Clone)]
pub struct Plane {
    cloud: PointCloud,
    corners: Corners,
    coefficients: PlaneCoefficients,
    orientation: Orientation,
    group: Option<usize>,
    color: Rgb,
}

impl Plane {
    /// Creates an ungrouped plane from its points and fitted equation.
    pub fn new(cloud: PointCloud, coefficients: PlaneCoefficients) -> Result<Self> {
        let corners = Corners::from_cloud(&coefficients, &cloud).ok_or(Error::InsufficientData {
            what: "plane points",
            needed: 1,
            found: 0,
        })?;
        Ok(Self {
            cloud,
            corners,
            orientation: Orientation::classify(&coefficients.normal()),
            coefficients,
            group: None,
            color: Rgb::SEGMENTED,
        })
    }

    /// Marks a freshly created plane (merge or fill output) as part of `group`.
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn into_cloud(self) -> PointCloud {
        self.cloud
    }

    pub fn len(&self) -> usize {
        self.cloud.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty()
    }

    pub fn corners(&self) -> &Corners {
        &self.corners
    }

    pub fn left_up(&self) -> Point3<f64> {
        self.corners.left_up
    }

    pub fn left_down(&self) -> Point3<f64> {
        self.corners.left_down
    }

    pub fn right_up(&self) -> Point3<f64> {
        self.corners.right_up
    }

    pub fn right_down(&self) -> Point3<f64> {
        self.corners.right_down
    }

    pub fn coefficients(&self) -> &PlaneCoefficients {
        &self.coefficients
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.coefficients.normal()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn group(&self) -> Option<usize> {
        self.group
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn top_z(&self) -> f64 {
        self.corners.top_z()
    }

    pub fn bottom_z(&self) -> f64 {
        self.corners.bottom_z()
    }

    /// Vertical extent of the bounding rectangle.
    pub fn height(&self) -> f64 {
        self.top_z() - self.bottom_z()
    }

    /// Assigns the plane to `group`. A group id is set at most once.
    pub fn assign_group(&mut self, group: usize) -> Result<()> {
        match self.group {
            Some(current) if current != group => Err(Error::GroupAlreadyAssigned {
                current,
                requested: group,
            }),
            _ => {
                self.group = Some(group);
                Ok(())
            }
        }
    }

    /// Recolors the plane and all of its points.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        self.cloud.set_color(color);
    }

    /// Replaces the plane equation, e.g. after a refit.
    pub fn refit(&mut self, coefficients: PlaneCoefficients) {
        self.coefficients = coefficients;
        self.orientation = Orientation::classify(&coefficients.normal());
        self.update_corners();
    }

    /// Appends points and grows the rectangle accordingly.
    pub fn append(&mut self, points: &PointCloud) {
        self.cloud.append(points);
        self.update_corners();
    }

    /// Removes every point inside `bbox`; returns how many were removed.
    ///
    /// A plane emptied this way keeps its last rectangle, so its top-edge line
    /// stays usable for later extensions. Check [`Plane::is_empty`] before
    /// reading the corners as a description of the points.
    pub fn remove_within(&mut self, bbox: &Aabb) -> usize {
        let removed = self.cloud.remove_within(bbox);
        if removed > 0 {
            self.update_corners();
        }
        removed
    }

    /// Replaces the points by a regular grid over the current rectangle.
    pub fn fill(&mut self, pitch: f64) {
        let c = self.corners;
        self.cloud = fill_quad(
            c.left_up,
            c.left_down,
            c.right_up,
            c.right_down,
            pitch,
            self.color,
        );
        self.update_corners();
    }

    /// Replaces the points by a regular grid spanning the current horizontal
    /// extent and running from `z_bottom` up to `z_top`.
    pub fn fill_between(&mut self, pitch: f64, z_top: f64, z_bottom: f64) -> Result<()> {
        let (_, v) = self.coefficients.axes();
        if v.z.abs() < AXIS_EPSILON {
            return Err(Error::degenerate(
                "cannot span a horizontal plane between two heights",
            ));
        }
        let origin_z = self.coefficients.origin().z;
        let t_top = (z_top - origin_z) / v.z;
        let t_bottom = (z_bottom - origin_z) / v.z;
        let (s_left, _) = self.coefficients.frame_coords(&self.corners.left_up);
        let (s_right, _) = self.coefficients.frame_coords(&self.corners.right_up);
        let corners = Corners::from_extent(
            &self.coefficients,
            s_left,
            s_right,
            t_top.min(t_bottom),
            t_top.max(t_bottom),
        );
        self.cloud = fill_quad(
            corners.left_up,
            corners.left_down,
            corners.right_up,
            corners.right_down,
            pitch,
            self.color,
        );
        self.update_corners();
        Ok(())
    }

    fn update_corners(&mut self) {
        if let Some(corners) = Corners::from_cloud(&self.coefficients, &self.cloud) {
            self.corners = corners;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall_x(x: f64, y0: f64, y1: f64, z0: f64, z1: f64) -> Plane {
        let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, -x).unwrap();
        let cloud = PointCloud::from_positions(
            &[
                Point3::new(x, y0, z0),
                Point3::new(x, y1, z0),
                Point3::new(x, y0, z1),
                Point3::new(x, y1, z1),
            ],
            Rgb::WHITE,
        );
        Plane::new(cloud, coefficients).unwrap()
    }

    #[test]
    fn coefficients_are_normalized() {
        let c = PlaneCoefficients::new(0.0, 0.0, 2.0, -6.0).unwrap();
        assert_relative_eq!(c.normal().norm(), 1.0);
        assert_relative_eq!(c.z_offset().unwrap(), 3.0);
    }

    #[test]
    fn zero_normal_is_degenerate() {
        assert!(matches!(
            PlaneCoefficients::new(0.0, 0.0, 0.0, 1.0),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn wall_corners_follow_frame() {
        let plane = wall_x(2.0, 0.0, 3.0, 0.0, 2.5);
        assert_eq!(plane.orientation(), Orientation::Vertical);
        // u = z x (1,0,0) = (0,1,0): left is low y, up is high z
        assert_relative_eq!(plane.left_up().y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.left_up().z, 2.5, epsilon = 1e-12);
        assert_relative_eq!(plane.right_down().y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(plane.right_down().z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.left_up().x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(plane.height(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_frame_uses_x_axis() {
        let coefficients = PlaneCoefficients::new(0.0, 0.0, 1.0, 0.0).unwrap();
        let (u, v) = coefficients.axes();
        assert_relative_eq!(u, Vector3::x());
        assert_relative_eq!(v, Vector3::y());
    }

    #[test]
    fn group_is_assigned_once() {
        let mut plane = wall_x(0.0, 0.0, 1.0, 0.0, 1.0);
        plane.assign_group(3).unwrap();
        plane.assign_group(3).unwrap();
        assert!(matches!(
            plane.assign_group(4),
            Err(Error::GroupAlreadyAssigned {
                current: 3,
                requested: 4
            })
        ));
    }

    #[test]
    fn fill_keeps_rectangle() {
        let mut plane = wall_x(1.0, 0.0, 1.0, 0.0, 1.0);
        plane.fill(10.0);
        assert_eq!(plane.len(), 121);
        assert_relative_eq!(plane.right_up().y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.top_z(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fill_between_spans_room_height() {
        let mut plane = wall_x(1.0, 0.0, 2.0, 0.5, 1.5);
        plane.fill_between(10.0, 3.0, 0.0).unwrap();
        assert_relative_eq!(plane.top_z(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(plane.bottom_z(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(plane.right_up().y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn remove_within_updates_corners() {
        let mut plane = wall_x(0.0, 0.0, 2.0, 0.0, 1.0);
        plane.fill(10.0);
        let bbox = Aabb::from_corners(Point3::new(-0.1, 1.05, -1.0), Point3::new(0.1, 2.5, 2.0));
        assert!(plane.remove_within(&bbox) > 0);
        assert_relative_eq!(plane.right_up().y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn emptied_plane_keeps_its_outline() {
        let mut plane = wall_x(0.0, 0.0, 2.0, 0.0, 1.0);
        plane.fill(10.0);
        let before = *plane.corners();
        let bbox = Aabb::from_corners(Point3::new(-0.1, -0.1, -0.1), Point3::new(0.1, 2.1, 1.1));
        assert_eq!(plane.remove_within(&bbox), 21 * 11);
        assert!(plane.is_empty());
        assert_eq!(*plane.corners(), before);
    }

    #[test]
    fn empty_cloud_is_rejected() {
        let coefficients = PlaneCoefficients::new(1.0, 0.0, 0.0, 0.0).unwrap();
        assert!(Plane::new(PointCloud::new(), coefficients).is_err());
    }
}
