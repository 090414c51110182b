// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthesis of filled quadrilateral patches.

use nalgebra::Point3;

use crate::types::{ColoredPoint, PointCloud, Rgb};

/// Samples along a span of `length` at `density` points per unit, endpoints included.
fn samples(length: f64, density: f64) -> usize {
    let n = (length * density).round();
    if n.is_finite() && n > 0.0 {
        n as usize + 1
    } else {
        1
    }
}

/// Fills the quadrilateral spanned by edge `a0 -> a1` and edge `b0 -> b1`.
///
/// Points are bilinearly interpolated: across from edge `a` to edge `b`, and
/// along from the `*0` ends to the `*1` ends, at `density` points per unit.
/// Degenerate quads collapse to a line or a single point.
pub fn fill_quad(
    a0: Point3<f64>,
    a1: Point3<f64>,
    b0: Point3<f64>,
    b1: Point3<f64>,
    density: f64,
    color: Rgb,
) -> PointCloud {
    let across = (b0 - a0).norm().max((b1 - a1).norm());
    let along = (a1 - a0).norm().max((b1 - b0).norm());
    let n_across = samples(across, density);
    let n_along = samples(along, density);

    let fraction = |i: usize, n: usize| {
        if n <= 1 {
            0.0
        } else {
            i as f64 / (n - 1) as f64
        }
    };

    let mut cloud = PointCloud::with_capacity(n_across * n_along);
    for i in 0..n_across {
        let s = fraction(i, n_across);
        let start = a0 + (b0 - a0) * s;
        let end = a1 + (b1 - a1) * s;
        for j in 0..n_along {
            let t = fraction(j, n_along);
            cloud.push(ColoredPoint::new(start + (end - start) * t, color));
        }
    }
    cloud
}
