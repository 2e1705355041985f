//! Nearest-road-node lookup backed by a k-d tree.
//!
//! The tree indexes `[longitude, latitude]` pairs, so its planar metric is
//! only an approximation of ground distance. Each query therefore pulls a
//! handful of planar candidates and ranks them by geodesic distance.
//!
//! Road nodes sharing one exact position are indexed once, under the
//! smallest identifier.

use std::collections::BTreeMap;

use kiddo::{KdTree, NearestNeighbour, SquaredEuclidean};

use super::geodesic_distance;
use crate::models::{Coordinate, NodeId, RawNode};

/// Planar candidates refined by geodesic distance per query. A node outside
/// the planar top 8 is never returned, even if it is nearer on the ground.
const SNAP_CANDIDATES: usize = 8;

/// A snapped position: the chosen road node and its geodesic distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Road node identifier.
    pub node: NodeId,
    /// Geodesic distance from the query point in meters.
    pub distance: f64,
}

/// Read-only spatial index over road nodes. Safe to query from many threads.
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, RawNode};
/// use locker_tour::distance::SpatialIndex;
///
/// let index = SpatialIndex::new(&[
///     RawNode::new(1, Coordinate::new(50.0, 20.0)),
///     RawNode::new(2, Coordinate::new(50.1, 20.1)),
/// ]);
/// let hit = index.nearest(&Coordinate::new(50.09, 20.09)).expect("non-empty");
/// assert_eq!(hit.node, 2);
/// ```
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    nodes: Vec<(NodeId, Coordinate)>,
}

impl SpatialIndex {
    /// Builds the index from road nodes.
    pub fn new(nodes: &[RawNode]) -> Self {
        // The tree rejects more than one bucket of items at an identical point.
        let mut distinct: BTreeMap<(u64, u64), (NodeId, Coordinate)> = BTreeMap::new();
        for n in nodes {
            let [x, y] = n.position.to_xy();
            // `+ 0.0` folds -0.0 into 0.0.
            let key = ((x + 0.0).to_bits(), (y + 0.0).to_bits());
            distinct
                .entry(key)
                .and_modify(|kept| {
                    if n.id < kept.0 {
                        *kept = (n.id, n.position);
                    }
                })
                .or_insert((n.id, n.position));
        }
        let nodes: Vec<(NodeId, Coordinate)> = distinct.into_values().collect();

        let mut tree: KdTree<f64, 2> = KdTree::with_capacity(nodes.len().max(1));
        for (i, (_, position)) in nodes.iter().enumerate() {
            tree.add(&position.to_xy(), i as u64);
        }
        Self { tree, nodes }
    }

    /// Number of distinct indexed positions.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the road node closest to `position`.
    ///
    /// Returns `None` if the index is empty.
    pub fn nearest(&self, position: &Coordinate) -> Option<Nearest> {
        if self.nodes.is_empty() {
            return None;
        }
        let k = SNAP_CANDIDATES.min(self.nodes.len());
        let candidates: Vec<NearestNeighbour<f64, u64>> =
            self.tree.nearest_n::<SquaredEuclidean>(&position.to_xy(), k);
        candidates
            .into_iter()
            .map(|c| {
                let (node, node_position) = self.nodes[c.item as usize];
                Nearest {
                    node,
                    distance: geodesic_distance(position, &node_position),
                }
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
