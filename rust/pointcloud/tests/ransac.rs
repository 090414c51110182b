// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refitting stability of the RANSAC fitter.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roomshell_core::{Plane, PlaneFitter, Point3, PointCloud, Rgb};
use roomshell_pointcloud::Ransac;

fn slanted_patch() -> PointCloud {
    let mut rng = StdRng::seed_from_u64(9);
    let positions: Vec<_> = (0..900)
        .map(|i| {
            let u = (i % 30) as f64 * 0.1;
            let z = (i / 30) as f64 * 0.1;
            // Wall along the diagonal x = y
            Point3::new(u + rng.random_range(-0.004..0.004), u, z)
        })
        .collect();
    PointCloud::from_positions(&positions, Rgb::WHITE)
}

#[test]
fn refitting_a_refilled_plane_is_stable() {
    let fitter = Ransac::new(0.02).with_seed(1);
    let cloud = slanted_patch();

    let first = fitter.fit(&cloud, 0.8).unwrap();
    let mut plane = Plane::new(cloud, first).unwrap();
    plane.fill(20.0);

    let second = fitter.fit(plane.cloud(), 0.8).unwrap().aligned_with(&first.normal());
    assert!(first.angle_to(&second) < 1e-3);
    assert_relative_eq!(first.d(), second.d(), epsilon = 1e-6);
}

#[test]
fn refitting_the_same_cloud_is_identical() {
    let fitter = Ransac::new(0.02).with_seed(1);
    let cloud = slanted_patch();
    let a = fitter.fit(&cloud, 0.8).unwrap();
    let b = fitter.fit(&cloud, 0.8).unwrap();
    assert_eq!(a, b);
}
