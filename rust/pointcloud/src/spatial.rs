// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! R-tree index for k-nearest-neighbour queries over scan points.

use nalgebra::Point3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A scan point stored in the tree with its position in the source slice.
#[derive(Clone, Debug)]
struct IndexedPoint {
    position: [f64; 3],
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Nearest-neighbour index over a fixed set of points.
///
/// Query cost depends on tree depth, not on how far apart the points are, so
/// isolated outliers are as cheap to query as dense surface points.
#[derive(Debug)]
pub struct PointIndex {
    points: Vec<Point3<f64>>,
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(index, p)| IndexedPoint {
                position: [p.x, p.y, p.z],
                index,
            })
            .collect();
        Self {
            points,
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Indices of the `k` points nearest to `query`, closest first.
    ///
    /// A point of the index queried by its own position is its own first neighbour.
    pub fn nearest(&self, query: &Point3<f64>, k: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&[query.x, query.y, query.z])
            .take(k)
            .map(|p| p.index)
            .collect()
    }
}
