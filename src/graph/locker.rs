//! Terminal-only distance graph and road-level path expansion.
//!
//! # Algorithm
//!
//! One Dijkstra run per terminal over the optimized road graph, restricted
//! afterwards to the other terminals. Runs are independent and execute on
//! the rayon pool against one shared [`ShortestPaths`] index.
//!
//! Expansion of a tour runs one early-exit Dijkstra per leg and walks the
//! predecessor chain back from the leg's target.
//!
//! # Complexity
//!
//! Construction: O(T · (E + V log V)) for T terminals.
//! Expansion: O(n · (E + V log V)) for a tour of n stops.

use rayon::prelude::*;

use super::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::ga::TourClosure;
use crate::models::{Graph, GraphNode, NodeId};

/// Derives the terminal graph from a frozen road graph and expands tours
/// back onto it.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::TourClosure;
/// use locker_tour::graph::LockerGraphBuilder;
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
///
/// let origin = Coordinate::new(0.0, 0.0);
/// let mut a = GraphNode::new(1, origin).with_terminal(101, origin);
/// let mut b = GraphNode::new(2, origin);
/// let mut c = GraphNode::new(3, origin).with_terminal(103, origin);
/// a.add_edge(2, 4.0);
/// b.add_edge(1, 4.0);
/// b.add_edge(3, 6.0);
/// c.add_edge(2, 6.0);
/// let road: Graph = vec![a, b, c].into_iter().collect();
///
/// let builder = LockerGraphBuilder::new(&road);
/// let lockers = builder.build().unwrap();
/// assert_eq!(lockers.len(), 2);
/// assert_eq!(lockers.weight(1, 3), Some(10.0));
///
/// let path = builder.expand_path(&[1, 3], TourClosure::Closed).unwrap();
/// assert_eq!(path, vec![1, 2, 3, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct LockerGraphBuilder<'a> {
    road: &'a Graph,
    paths: ShortestPaths,
}

impl<'a> LockerGraphBuilder<'a> {
    /// Indexes the road graph. The graph must not change afterwards.
    pub fn new(road: &'a Graph) -> Self {
        Self {
            road,
            paths: ShortestPaths::new(road),
        }
    }

    /// Builds a graph of exactly the terminal nodes with one edge per
    /// reachable ordered pair, weighted by road distance.
    ///
    /// Unreachable pairs get no edge. Nodes keep their road position and
    /// terminal marker; edges are sorted by target.
    pub fn build(&self) -> Result<Graph> {
        let terminals = self.road.terminal_ids();
        let nodes = terminals
            .par_iter()
            .map(|&id| self.terminal_node(id, &terminals))
            .collect::<Result<Vec<GraphNode>>>()?;

        let graph: Graph = nodes.into_iter().collect();
        let complete = terminals.len() * terminals.len().saturating_sub(1);
        if graph.edge_count() < complete {
            log::warn!(
                "locker graph: {} of {} terminal pairs are unreachable",
                complete - graph.edge_count(),
                complete
            );
        }
        log::info!(
            "locker graph: {} terminals, {} edges",
            graph.len(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn terminal_node(&self, id: NodeId, terminals: &[NodeId]) -> Result<GraphNode> {
        let source = self
            .road
            .node(id)
            .ok_or(RoutingError::MissingNode { node: id })?;
        let dist = self.paths.distances_from(id)?;

        let mut node = GraphNode::new(id, source.position);
        node.terminal = source.terminal;
        for &other in terminals {
            if other == id {
                continue;
            }
            let reached = self.paths.index_of(other).and_then(|j| dist[j]);
            if let Some(d) = reached {
                node.add_edge(other, d);
            }
        }
        Ok(node)
    }

    /// Expands a tour of terminal identifiers into the road nodes it drives
    /// through.
    ///
    /// Each leg contributes its start node followed by its interior road
    /// nodes; other terminals passed on the way are left out. A closed tour
    /// includes the leg back to the first stop but does not repeat it at the
    /// end. An open tour ends with its last stop.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Unreachable`] if a leg has no road path, and
    /// [`RoutingError::MissingNode`] for identifiers not in the road graph.
    pub fn expand_path(&self, tour: &[NodeId], closure: TourClosure) -> Result<Vec<NodeId>> {
        match tour {
            [] => return Ok(Vec::new()),
            [only] => {
                self.paths.index_of(*only).ok_or(RoutingError::MissingNode { node: *only })?;
                return Ok(vec![*only]);
            }
            _ => {}
        }

        let mut legs: Vec<(NodeId, NodeId)> = tour.windows(2).map(|w| (w[0], w[1])).collect();
        if closure == TourClosure::Closed {
            legs.push((tour[tour.len() - 1], tour[0]));
        }

        let segments = legs
            .par_iter()
            .map(|&(from, to)| self.segment(from, to))
            .collect::<Result<Vec<Vec<NodeId>>>>()?;

        let mut path: Vec<NodeId> = segments.into_iter().flatten().collect();
        if closure == TourClosure::Open {
            path.push(tour[tour.len() - 1]);
        }
        log::debug!("expanded {} stops into {} road nodes", tour.len(), path.len());
        Ok(path)
    }

    /// Start node plus non-terminal interior of the shortest `from → to` path.
    fn segment(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        let nodes = self
            .paths
            .path(from, to)?
            .ok_or(RoutingError::Unreachable { from, to })?;
        let interior_end = nodes.len().saturating_sub(1).max(1);

        let mut segment = Vec::with_capacity(interior_end);
        segment.push(from);
        segment.extend(
            nodes[1..interior_end]
                .iter()
                .copied()
                .filter(|&id| !self.road.node(id).is_some_and(GraphNode::is_terminal)),
        );
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::Coordinate;

    /// Builds a graph from `(from, to, weight)` triples; `terminals` get a
    /// marker with `locker_id = id + 100`.
    fn road(n: NodeId, edges: &[(NodeId, NodeId, f64)], terminals: &[NodeId]) -> Graph {
        let mut graph: Graph = (1..=n)
            .map(|id| {
                let node = GraphNode::new(id, Coordinate::new(0.0, id as f64 * 0.001));
                if terminals.contains(&id) {
                    let pos = node.position;
                    node.with_terminal(id + 100, pos)
                } else {
                    node
                }
            })
            .collect();
        for &(a, b, w) in edges {
            graph.node_mut(a).expect("node").add_edge(b, w);
        }
        graph
    }

    fn two_way(edges: &[(NodeId, NodeId, f64)]) -> Vec<(NodeId, NodeId, f64)> {
        edges
            .iter()
            .flat_map(|&(a, b, w)| [(a, b, w), (b, a, w)])
            .collect()
    }

    #[test]
    fn test_two_way_roads_give_symmetric_distances() {
        // Y shape: 1 - 4 - 2, 4 - 5 - 3
        let g = road(
            5,
            &two_way(&[(1, 4, 3.0), (4, 2, 2.0), (4, 5, 1.0), (5, 3, 7.0)]),
            &[1, 2, 3],
        );
        let lockers = LockerGraphBuilder::new(&g).build().expect("valid");
        assert_eq!(lockers.terminal_ids(), vec![1, 2, 3]);
        assert_eq!(lockers.edge_count(), 6);
        assert_eq!(lockers.weight(1, 2), Some(5.0));
        assert_eq!(lockers.weight(1, 3), Some(11.0));
        assert_eq!(lockers.weight(2, 3), Some(10.0));
        assert!(DistanceMatrix::from_graph(&lockers).is_symmetric(1e-9));
        assert!(lockers.validate().is_ok());
    }

    #[test]
    fn test_terminal_markers_kept() {
        let g = road(2, &two_way(&[(1, 2, 1.0)]), &[1, 2]);
        let lockers = LockerGraphBuilder::new(&g).build().expect("valid");
        let node = lockers.node(2).expect("terminal");
        assert_eq!(node.terminal.map(|t| t.locker_id), Some(102));
        assert_eq!(node.position, g.node(2).expect("road").position);
    }

    #[test]
    fn test_unreachable_pairs_omitted() {
        let g = road(3, &[(1, 2, 2.0), (2, 3, 2.0)], &[1, 3]);
        let lockers = LockerGraphBuilder::new(&g).build().expect("valid");
        assert_eq!(lockers.weight(1, 3), Some(4.0));
        assert_eq!(lockers.weight(3, 1), None);
        assert_eq!(lockers.edge_count(), 1);
    }

    #[test]
    fn test_edges_sorted_by_target() {
        let g = road(4, &two_way(&[(4, 1, 1.0), (4, 2, 1.0), (4, 3, 1.0)]), &[1, 2, 3, 4]);
        let lockers = LockerGraphBuilder::new(&g).build().expect("valid");
        let targets: Vec<NodeId> = lockers
            .node(3)
            .expect("terminal")
            .edges
            .iter()
            .map(|e| e.target)
            .collect();
        assert_eq!(targets, vec![1, 2, 4]);
    }

    #[test]
    fn test_no_terminals_gives_empty_graph() {
        let g = road(2, &two_way(&[(1, 2, 1.0)]), &[]);
        let lockers = LockerGraphBuilder::new(&g).build().expect("valid");
        assert!(lockers.is_empty());
    }

    #[test]
    fn test_expand_closed_skips_passing_terminals() {
        // 1 - 2 - 3 - 4 with terminals 1, 3, 4: going 1 → 4 passes terminal 3.
        let g = road(4, &two_way(&[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)]), &[1, 3, 4]);
        let builder = LockerGraphBuilder::new(&g);
        let path = builder
            .expand_path(&[1, 4], TourClosure::Closed)
            .expect("reachable");
        assert_eq!(path, vec![1, 2, 4, 2]);
    }

    #[test]
    fn test_expand_open_ends_at_last_stop() {
        let g = road(4, &two_way(&[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)]), &[1, 3, 4]);
        let builder = LockerGraphBuilder::new(&g);
        let path = builder
            .expand_path(&[1, 3, 4], TourClosure::Open)
            .expect("reachable");
        assert_eq!(path, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_expand_unreachable_leg_fails() {
        let g = road(2, &[(1, 2, 1.0)], &[1, 2]);
        let builder = LockerGraphBuilder::new(&g);
        assert_eq!(
            builder.expand_path(&[1, 2], TourClosure::Open).expect("reachable"),
            vec![1, 2]
        );
        assert!(matches!(
            builder.expand_path(&[1, 2], TourClosure::Closed),
            Err(RoutingError::Unreachable { from: 2, to: 1 })
        ));
    }

    #[test]
    fn test_expand_trivial_tours() {
        let g = road(2, &two_way(&[(1, 2, 1.0)]), &[1, 2]);
        let builder = LockerGraphBuilder::new(&g);
        assert!(builder
            .expand_path(&[], TourClosure::Closed)
            .expect("empty")
            .is_empty());
        assert_eq!(
            builder.expand_path(&[2], TourClosure::Closed).expect("single"),
            vec![2]
        );
        assert!(matches!(
            builder.expand_path(&[9], TourClosure::Closed),
            Err(RoutingError::MissingNode { node: 9 })
        ));
    }
}
