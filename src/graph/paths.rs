//! Single-source shortest paths over a frozen graph.
//!
//! # Algorithm
//!
//! Dijkstra with a binary-heap priority queue and lazy deletion: stale heap
//! entries are skipped when popped. Weights must be non-negative.
//!
//! The graph is first flattened into dense adjacency lists so that every run
//! owns only plain vectors (distances, predecessors, visited flags) and many
//! runs can proceed in parallel over one shared index.
//!
//! # Reference
//!
//! Dijkstra, E.W. (1959). "A note on two problems in connexion with graphs",
//! *Numerische Mathematik* 1, 269-271.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{Result, RoutingError};
use crate::models::{Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    cost: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties broken by index for determinism.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dense, read-only adjacency index for Dijkstra queries.
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
/// use locker_tour::graph::ShortestPaths;
///
/// let mut nodes: Vec<GraphNode> = (1..=3)
///     .map(|id| GraphNode::new(id, Coordinate::new(0.0, 0.0)))
///     .collect();
/// nodes[0].add_edge(2, 4.0);
/// nodes[1].add_edge(3, 1.0);
/// nodes[0].add_edge(3, 9.0);
/// let graph: Graph = nodes.into_iter().collect();
///
/// let paths = ShortestPaths::new(&graph);
/// assert_eq!(paths.distance(1, 3).unwrap(), Some(5.0));
/// assert_eq!(paths.path(1, 3).unwrap(), Some(vec![1, 2, 3]));
/// assert_eq!(paths.distance(3, 1).unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl ShortestPaths {
    /// Flattens `graph` into a dense index. Edges to unknown nodes are ignored.
    pub fn new(graph: &Graph) -> Self {
        let ids: Vec<NodeId> = graph.ids().collect();
        let index: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let adjacency = graph
            .nodes()
            .map(|node| {
                node.edges
                    .iter()
                    .filter_map(|e| index.get(&e.target).map(|&j| (j, e.weight)))
                    .collect()
            })
            .collect();
        Self {
            ids,
            index,
            adjacency,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Dense index of a node identifier.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Shortest distances from `source` to every node, in dense-index order.
    /// Unreachable nodes are `None`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::MissingNode`] if `source` is not indexed.
    pub fn distances_from(&self, source: NodeId) -> Result<Vec<Option<f64>>> {
        let s = self.require(source)?;
        let (dist, _) = self.run(s, None);
        Ok(dist)
    }

    /// Shortest distance from `source` to `target`, `None` if unreachable.
    pub fn distance(&self, source: NodeId, target: NodeId) -> Result<Option<f64>> {
        let s = self.require(source)?;
        let t = self.require(target)?;
        let (dist, _) = self.run(s, Some(t));
        Ok(dist[t])
    }

    /// Node sequence of a shortest path from `source` to `target`, both
    /// included. `None` if `target` is unreachable.
    pub fn path(&self, source: NodeId, target: NodeId) -> Result<Option<Vec<NodeId>>> {
        let s = self.require(source)?;
        let t = self.require(target)?;
        if s == t {
            return Ok(Some(vec![source]));
        }
        let (dist, pred) = self.run(s, Some(t));
        if dist[t].is_none() {
            return Ok(None);
        }

        let mut path = vec![t];
        let mut current = t;
        while current != s {
            current = pred[current].unwrap_or_else(|| {
                panic!("settled node {} has no predecessor", self.ids[current])
            });
            path.push(current);
        }
        path.reverse();
        Ok(Some(path.into_iter().map(|i| self.ids[i]).collect()))
    }

    fn require(&self, id: NodeId) -> Result<usize> {
        self.index_of(id).ok_or(RoutingError::MissingNode { node: id })
    }

    /// Runs Dijkstra from `source`, stopping early once `target` is settled.
    fn run(
        &self,
        source: usize,
        target: Option<usize>,
    ) -> (Vec<Option<f64>>, Vec<Option<usize>>) {
        let n = self.ids.len();
        let mut dist: Vec<Option<f64>> = vec![None; n];
        let mut pred: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut heap = BinaryHeap::new();

        dist[source] = Some(0.0);
        heap.push(HeapEntry {
            cost: 0.0,
            node: source,
        });

        while let Some(HeapEntry { cost, node }) = heap.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            if Some(node) == target {
                break;
            }
            for &(next, weight) in &self.adjacency[node] {
                let candidate = cost + weight;
                if dist[next].map_or(true, |d| candidate < d) {
                    dist[next] = Some(candidate);
                    pred[next] = Some(node);
                    heap.push(HeapEntry {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }
        (dist, pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, GraphNode};

    fn diamond() -> Graph {
        // 1 → 2 → 4 costs 2, 1 → 3 → 4 costs 5, 4 → 1 costs 1
        let mut nodes: Vec<GraphNode> = (1..=5)
            .map(|id| GraphNode::new(id, Coordinate::new(0.0, 0.0)))
            .collect();
        nodes[0].add_edge(2, 1.0);
        nodes[0].add_edge(3, 1.0);
        nodes[1].add_edge(4, 1.0);
        nodes[2].add_edge(4, 4.0);
        nodes[3].add_edge(1, 1.0);
        nodes.into_iter().collect()
    }

    #[test]
    fn test_distances_from() {
        let paths = ShortestPaths::new(&diamond());
        let dist = paths.distances_from(1).expect("indexed");
        assert_eq!(dist, vec![Some(0.0), Some(1.0), Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn test_path_reconstruction() {
        let paths = ShortestPaths::new(&diamond());
        assert_eq!(paths.path(1, 4).expect("indexed"), Some(vec![1, 2, 4]));
        assert_eq!(paths.path(3, 2).expect("indexed"), Some(vec![3, 4, 1, 2]));
        assert_eq!(paths.path(2, 2).expect("indexed"), Some(vec![2]));
        assert_eq!(paths.path(1, 5).expect("indexed"), None);
    }

    #[test]
    fn test_unknown_source() {
        let paths = ShortestPaths::new(&diamond());
        assert!(matches!(
            paths.distances_from(99),
            Err(RoutingError::MissingNode { node: 99 })
        ));
    }

    #[test]
    fn test_distance_early_exit_matches_full_run() {
        let paths = ShortestPaths::new(&diamond());
        let full = paths.distances_from(3).expect("indexed");
        for target in 1..=5 {
            let j = paths.index_of(target).expect("indexed");
            assert_eq!(paths.distance(3, target).expect("indexed"), full[j]);
        }
    }

    #[test]
    fn test_heap_entry_min_order() {
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry { cost: 3.0, node: 0 });
        heap.push(HeapEntry { cost: 1.0, node: 1 });
        heap.push(HeapEntry { cost: 2.0, node: 2 });
        assert_eq!(heap.pop().map(|e| e.node), Some(1));
    }
}
