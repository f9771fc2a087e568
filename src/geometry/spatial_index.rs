//! Nearest-neighbour search over scattered points.
//!
//! Backed by an R-tree from `rstar`. The medial-axis criterion queries it
//! once per grid node, so construction uses bulk loading.

use rstar::RTree;
use rstar::primitives::GeomWithData;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Point search capability.
pub trait NearestNeighbor {
    /// Index and Euclidean distance of the point closest to `(x, y)`.
    fn nearest(&self, x: f64, y: f64) -> Option<(usize, f64)>;

    /// Distances to the `k` closest points, ascending.
    fn k_nearest_distances(&self, x: f64, y: f64, k: usize) -> Vec<f64>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// True when nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// R-tree over 2D points, remembering each point's position in the input.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    /// Build the index from points in input order.
    pub fn new(points: &[(f64, f64)]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| GeomWithData::new([x, y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }
}

impl NearestNeighbor for PointIndex {
    fn nearest(&self, x: f64, y: f64) -> Option<(usize, f64)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[x, y])
            .next()
            .map(|(p, d2)| (p.data, d2.sqrt()))
    }

    fn k_nearest_distances(&self, x: f64, y: f64, k: usize) -> Vec<f64> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[x, y])
            .take(k)
            .map(|(_, d2)| d2.sqrt())
            .collect()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}
