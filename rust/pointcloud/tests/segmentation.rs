// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segmentation of a synthetic box room.

use approx::assert_relative_eq;
use roomshell_core::{Orientation, PlaneSegmenter, Point3, PointCloud, Rgb};
use roomshell_pointcloud::{Ransac, RegionGrowing, RoomSegmenter};

const STEP: f64 = 0.1;

/// 4 x 3 x 2.5 m room sampled every 10 cm.
fn box_room() -> PointCloud {
    let (nx, ny, nz) = (40, 30, 25);
    let mut positions = Vec::new();
    for i in 0..=nx {
        for j in 0..=ny {
            let (x, y) = (i as f64 * STEP, j as f64 * STEP);
            positions.push(Point3::new(x, y, 0.0));
            positions.push(Point3::new(x, y, nz as f64 * STEP));
        }
    }
    for k in 1..nz {
        let z = k as f64 * STEP;
        for j in 0..=ny {
            let y = j as f64 * STEP;
            positions.push(Point3::new(0.0, y, z));
            positions.push(Point3::new(nx as f64 * STEP, y, z));
        }
        for i in 1..nx {
            let x = i as f64 * STEP;
            positions.push(Point3::new(x, 0.0, z));
            positions.push(Point3::new(x, ny as f64 * STEP, z));
        }
    }
    PointCloud::from_positions(&positions, Rgb::WHITE)
}

fn segmenter() -> RoomSegmenter {
    RoomSegmenter {
        leaf_size: 0.05,
        k_search: 10,
        region_growing: RegionGrowing {
            min_cluster_size: 50,
            neighbours: 10,
            smoothness_threshold: 5.0,
            curvature_threshold: 1e-3,
        },
        ransac: Ransac::new(0.02).with_seed(42),
        min_inliers: 100,
        plane_vector_threshold: 0.9,
    }
}

#[test]
fn box_room_yields_six_planes() {
    let planes = segmenter().segment(&box_room()).unwrap();

    let horizontal: Vec<_> = planes
        .iter()
        .filter(|p| p.orientation() == Orientation::Horizontal)
        .collect();
    let vertical = planes.len() - horizontal.len();
    assert_eq!(horizontal.len(), 2);
    assert_eq!(vertical, 4);

    let mut heights: Vec<f64> = horizontal
        .iter()
        .map(|p| p.coefficients().z_offset().unwrap())
        .collect();
    heights.sort_by(f64::total_cmp);
    assert_relative_eq!(heights[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(heights[1], 2.5, epsilon = 1e-6);
}

#[test]
fn normals_face_into_the_room() {
    let planes = segmenter().segment(&box_room()).unwrap();
    let center = Point3::new(2.0, 1.5, 1.25);
    for plane in &planes {
        let on_plane = plane.coefficients().project(&center);
        assert!(plane.normal().dot(&(center - on_plane)) > 0.0);
        assert!(plane.cloud().iter().all(|p| p.color == Rgb::SEGMENTED));
    }
}

#[test]
fn empty_scan_is_rejected() {
    assert!(segmenter().segment(&PointCloud::new()).is_err());
}
