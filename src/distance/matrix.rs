//! Dense distance matrix over terminal nodes.

use std::collections::HashMap;

use crate::models::{Graph, NodeId};

/// A dense n×n distance matrix keyed by terminal identifier, stored in
/// row-major order.
///
/// Built from the terminal (locker) graph so that fitness evaluation does
/// an O(1) lookup per tour leg. Pairs with no edge are stored as `None`.
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
/// use locker_tour::distance::DistanceMatrix;
///
/// let mut a = GraphNode::new(1, Coordinate::new(0.0, 0.0));
/// a.add_edge(2, 10.0);
/// let b = GraphNode::new(2, Coordinate::new(0.0, 0.0));
/// let graph: Graph = vec![a, b].into_iter().collect();
///
/// let dm = DistanceMatrix::from_graph(&graph);
/// assert_eq!(dm.get(1, 2), Some(10.0));
/// assert_eq!(dm.get(2, 1), None);
/// assert_eq!(dm.get(2, 2), Some(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    data: Vec<Option<f64>>,
}

impl DistanceMatrix {
    /// Creates a matrix over the given identifiers with only the diagonal set.
    pub fn new(ids: Vec<NodeId>) -> Self {
        let size = ids.len();
        let index = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut data = vec![None; size * size];
        for i in 0..size {
            data[i * size + i] = Some(0.0);
        }
        Self { ids, index, data }
    }

    /// Builds the matrix from every node and edge of `graph`.
    ///
    /// Parallel edges collapse to their minimum weight.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut dm = Self::new(graph.ids().collect());
        for node in graph.nodes() {
            for edge in &node.edges {
                if edge.target == node.id {
                    continue;
                }
                let weight = match dm.get(node.id, edge.target) {
                    Some(existing) => existing.min(edge.weight),
                    None => edge.weight,
                };
                dm.set(node.id, edge.target, weight);
            }
        }
        dm
    }

    /// Returns the distance from `from` to `to`, or `None` if either id is
    /// unknown or the pair is unreachable.
    pub fn get(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let i = *self.index.get(&from)?;
        let j = *self.index.get(&to)?;
        self.data[i * self.size() + j]
    }

    /// Sets the distance from `from` to `to`. Unknown ids are ignored.
    pub fn set(&mut self, from: NodeId, to: NodeId, distance: f64) {
        if let (Some(&i), Some(&j)) = (self.index.get(&from), self.index.get(&to)) {
            let size = self.size();
            self.data[i * size + j] = Some(distance);
        }
    }

    /// Number of terminals in this matrix.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Terminal identifiers in matrix order.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Returns `true` if every pair has equal forward and backward distance
    /// within `tol`. Missing entries must be missing in both directions.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.size();
        for i in 0..n {
            for j in (i + 1)..n {
                match (self.data[i * n + j], self.data[j * n + i]) {
                    (Some(a), Some(b)) if (a - b).abs() <= tol => {}
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// Number of ordered pairs without a distance.
    pub fn missing_pairs(&self) -> usize {
        self.data.iter().filter(|d| d.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, GraphNode};

    fn graph(edges: &[(NodeId, NodeId, f64)], ids: &[NodeId]) -> Graph {
        let mut g: Graph = ids
            .iter()
            .map(|&id| GraphNode::new(id, Coordinate::new(0.0, 0.0)))
            .collect();
        for &(a, b, w) in edges {
            g.node_mut(a).expect("node").add_edge(b, w);
        }
        g
    }

    #[test]
    fn test_from_graph() {
        let g = graph(&[(10, 20, 5.0), (20, 10, 5.0), (20, 30, 2.0)], &[10, 20, 30]);
        let dm = DistanceMatrix::from_graph(&g);
        assert_eq!(dm.size(), 3);
        assert_eq!(dm.get(10, 20), Some(5.0));
        assert_eq!(dm.get(20, 30), Some(2.0));
        assert_eq!(dm.get(30, 20), None);
        assert_eq!(dm.get(10, 99), None);
        assert_eq!(dm.missing_pairs(), 3);
    }

    #[test]
    fn test_parallel_edges_take_minimum() {
        let g = graph(&[(1, 2, 5.0), (1, 2, 3.0)], &[1, 2]);
        let dm = DistanceMatrix::from_graph(&g);
        assert_eq!(dm.get(1, 2), Some(3.0));
    }

    #[test]
    fn test_symmetric() {
        let g = graph(&[(1, 2, 5.0), (2, 1, 5.0)], &[1, 2, 3]);
        assert!(DistanceMatrix::from_graph(&g).is_symmetric(1e-10));
    }

    #[test]
    fn test_asymmetric_matrix() {
        let g = graph(&[(1, 2, 10.0), (2, 1, 15.0)], &[1, 2]);
        assert!(!DistanceMatrix::from_graph(&g).is_symmetric(1e-10));
        let g = graph(&[(1, 2, 10.0)], &[1, 2]);
        assert!(!DistanceMatrix::from_graph(&g).is_symmetric(1e-10));
    }

    #[test]
    fn test_set_unknown_ignored() {
        let mut dm = DistanceMatrix::new(vec![1, 2]);
        dm.set(1, 3, 4.0);
        dm.set(2, 1, 7.0);
        assert_eq!(dm.get(2, 1), Some(7.0));
        assert_eq!(dm.ids(), &[1, 2]);
    }
}
