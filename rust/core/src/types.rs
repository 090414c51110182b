// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core point and point-cloud types

use nalgebra::{Point2, Point3, Vector3};

/// A point in the x-y projection.
///
/// The 2D primitives only accept this type, so a 3D point has to be
/// projected explicitly with [`Point2D::from_xy`] before it can be used.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Drops the z coordinate.
    pub fn from_xy(p: &Point3<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Lifts the point back to 3D at height `z`.
    pub fn at_height(&self, z: f64) -> Point3<f64> {
        Point3::new(self.x, self.y, z)
    }
}

/// Opaque 8-bit RGB color tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const PEACH: Rgb = Rgb::new(255, 192, 203);

    /// Planes straight out of segmentation.
    pub const SEGMENTED: Rgb = Rgb::WHITE;
    /// Pre-merge members once their group has been merged.
    pub const MEMBER: Rgb = Rgb::BLUE;
    /// Patches synthesized while extending a member.
    pub const FILL: Rgb = Rgb::PEACH;
    /// Ceiling and floor boundary lines.
    pub const BOUNDARY: Rgb = Rgb::GREEN;

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0xAARRGGBB` with full alpha.
    pub fn to_argb(self) -> u32 {
        0xff00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::SEGMENTED
    }
}

/// A colored point of a scan or of synthesized geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredPoint {
    pub position: Point3<f64>,
    pub color: Rgb,
}

impl ColoredPoint {
    pub fn new(position: Point3<f64>, color: Rgb) -> Self {
        Self { position, color }
    }

    pub fn from_coords(x: f64, y: f64, z: f64, color: Rgb) -> Self {
        Self {
            position: Point3::new(x, y, z),
            color,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Builds a box from two arbitrary corners, normalizing min/max order.
    pub fn from_corners(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// An unordered collection of colored points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<ColoredPoint>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Builds a cloud of uniformly colored points.
    pub fn from_positions(positions: &[Point3<f64>], color: Rgb) -> Self {
        Self {
            points: positions
                .iter()
                .map(|p| ColoredPoint::new(*p, color))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: ColoredPoint) {
        self.points.push(point);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColoredPoint> {
        self.points.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.points.iter().map(|p| &p.position)
    }

    /// Appends a copy of every point of `other`.
    pub fn append(&mut self, other: &PointCloud) {
        self.points.extend_from_slice(&other.points);
    }

    /// Recolors every point.
    pub fn set_color(&mut self, color: Rgb) {
        for p in &mut self.points {
            p.color = color;
        }
    }

    /// Axis-aligned bounds, `None` for an empty cloud.
    pub fn bounds(&self) -> Option<Aabb> {
        let first = self.points.first()?.position;
        let mut min = first;
        let mut max = first;
        for p in &self.points[1..] {
            let q = &p.position;
            min = Point3::new(min.x.min(q.x), min.y.min(q.y), min.z.min(q.z));
            max = Point3::new(max.x.max(q.x), max.y.max(q.y), max.z.max(q.z));
        }
        Some(Aabb { min, max })
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.position.coords);
        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Removes every point inside `bbox`; returns how many were removed.
    pub fn remove_within(&mut self, bbox: &Aabb) -> usize {
        let before = self.points.len();
        self.points.retain(|p| !bbox.contains(&p.position));
        before - self.points.len()
    }

    /// Points whose `axis` coordinate lies in `[min, max]` (PCL-style pass-through).
    pub fn pass_through(&self, axis: usize, min: f64, max: f64) -> PointCloud {
        PointCloud {
            points: self
                .points
                .iter()
                .filter(|p| {
                    let v = p.position[axis];
                    v >= min && v <= max
                })
                .copied()
                .collect(),
        }
    }
}

impl FromIterator<ColoredPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = ColoredPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<ColoredPoint> for PointCloud {
    fn extend<I: IntoIterator<Item = ColoredPoint>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}
