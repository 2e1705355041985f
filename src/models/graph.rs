//! Arena-backed directed graph of road (or terminal) nodes.
//!
//! Nodes live in an identifier-keyed map and edges store the target
//! identifier, so algorithms resolve neighbors through the arena and may
//! rewrite the edge lists of two different nodes independently.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::Coordinate;
use crate::error::{Result, RoutingError};

/// Node identifier, as carried by the map extract.
pub type NodeId = i64;

/// A directed, weighted edge. Weight is in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Target node identifier.
    pub target: NodeId,
    /// Non-negative length in meters.
    pub weight: f64,
}

impl Edge {
    /// Creates an edge.
    pub fn new(target: NodeId, weight: f64) -> Self {
        Self { target, weight }
    }
}

/// Marker for a road node that a delivery point was snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    /// Identifier of the original delivery point.
    pub locker_id: NodeId,
    /// Un-snapped position of the delivery point.
    pub locker_position: Coordinate,
}

/// A graph node with its outgoing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Identifier, unique within its graph.
    pub id: NodeId,
    /// Position of the road node.
    pub position: Coordinate,
    /// Outgoing edges in insertion order.
    pub edges: Vec<Edge>,
    /// Present if this node is a tour waypoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<Terminal>,
}

impl GraphNode {
    /// Creates a plain road node with no edges.
    pub fn new(id: NodeId, position: Coordinate) -> Self {
        Self {
            id,
            position,
            edges: Vec::new(),
            terminal: None,
        }
    }

    /// Marks this node as a terminal for the given delivery point.
    pub fn with_terminal(mut self, locker_id: NodeId, locker_position: Coordinate) -> Self {
        self.terminal = Some(Terminal {
            locker_id,
            locker_position,
        });
        self
    }

    /// Returns `true` if a delivery point is snapped to this node.
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Appends an outgoing edge.
    pub fn add_edge(&mut self, target: NodeId, weight: f64) {
        self.edges.push(Edge::new(target, weight));
    }

    /// Distinct outgoing neighbor identifiers.
    pub fn out_neighbors(&self) -> BTreeSet<NodeId> {
        self.edges.iter().map(|e| e.target).collect()
    }

    /// Index of the first edge pointing at `target`.
    pub fn edge_index(&self, target: NodeId) -> Option<usize> {
        self.edges.iter().position(|e| e.target == target)
    }

    /// Shortest direct edge weight to `target`, if any.
    pub fn weight_to(&self, target: NodeId) -> Option<f64> {
        self.edges
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.weight)
            .reduce(f64::min)
    }
}

/// A set of [`GraphNode`]s referenced by identifier.
///
/// Iteration is in ascending identifier order.
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
///
/// let mut graph = Graph::new();
/// let mut a = GraphNode::new(1, Coordinate::new(0.0, 0.0));
/// a.add_edge(2, 10.0);
/// graph.insert(a);
/// graph.insert(GraphNode::new(2, Coordinate::new(0.0, 0.001)));
///
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.weight(1, 2), Some(10.0));
/// assert!(graph.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<NodeId, GraphNode>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing any node with the same identifier.
    pub fn insert(&mut self, node: GraphNode) -> Option<GraphNode> {
        self.nodes.insert(node.id, node)
    }

    /// Removes a node. Edges pointing at it are left in place.
    pub fn remove(&mut self, id: NodeId) -> Option<GraphNode> {
        self.nodes.remove(&id)
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&id)
    }

    /// Returns `true` if the graph holds `id`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }

    /// All nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All node identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Terminal nodes in identifier order.
    pub fn terminals(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values().filter(|n| n.is_terminal())
    }

    /// Identifiers of all terminal nodes.
    pub fn terminal_ids(&self) -> Vec<NodeId> {
        self.terminals().map(|n| n.id).collect()
    }

    /// Shortest direct edge weight from `from` to `to`.
    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.node(from).and_then(|n| n.weight_to(to))
    }

    /// Drops every edge whose target is no longer in the graph.
    ///
    /// Returns the number of removed edges.
    pub fn retain_valid_edges(&mut self) -> usize {
        let ids: BTreeSet<NodeId> = self.nodes.keys().copied().collect();
        let mut removed = 0;
        for node in self.nodes.values_mut() {
            let before = node.edges.len();
            node.edges.retain(|e| ids.contains(&e.target));
            removed += before - node.edges.len();
        }
        removed
    }

    /// Checks that every edge target exists, no node loops onto itself, and
    /// every weight is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for node in self.nodes.values() {
            for edge in &node.edges {
                if !self.contains(edge.target) {
                    return Err(RoutingError::MissingNode { node: edge.target });
                }
                if edge.target == node.id {
                    return Err(RoutingError::SelfLoop { node: node.id });
                }
                if !edge.weight.is_finite() || edge.weight < 0.0 {
                    return Err(RoutingError::NegativeWeight {
                        from: node.id,
                        to: edge.target,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<GraphNode> for Graph {
    fn from_iter<I: IntoIterator<Item = GraphNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|n| (n.id, n)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId) -> GraphNode {
        GraphNode::new(id, Coordinate::new(0.0, id as f64))
    }

    #[test]
    fn test_terminal_marker() {
        let n = node(1).with_terminal(101, Coordinate::new(1.0, 1.0));
        assert!(n.is_terminal());
        assert_eq!(n.terminal.expect("terminal").locker_id, 101);
        assert!(!node(2).is_terminal());
    }

    #[test]
    fn test_weight_to_picks_minimum_parallel_edge() {
        let mut n = node(1);
        n.add_edge(2, 5.0);
        n.add_edge(2, 3.0);
        n.add_edge(3, 1.0);
        assert_eq!(n.weight_to(2), Some(3.0));
        assert_eq!(n.weight_to(4), None);
        assert_eq!(n.out_neighbors().len(), 2);
    }

    #[test]
    fn test_retain_valid_edges() {
        let mut a = node(1);
        a.add_edge(2, 1.0);
        a.add_edge(3, 1.0);
        let mut graph: Graph = vec![a, node(2)].into_iter().collect();
        assert_eq!(graph.retain_valid_edges(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_defects() {
        let mut a = node(1);
        a.add_edge(9, 1.0);
        let graph: Graph = vec![a].into_iter().collect();
        assert!(matches!(
            graph.validate(),
            Err(RoutingError::MissingNode { node: 9 })
        ));

        let mut b = node(1);
        b.add_edge(1, 1.0);
        let graph: Graph = vec![b].into_iter().collect();
        assert!(matches!(graph.validate(), Err(RoutingError::SelfLoop { node: 1 })));

        let mut c = node(1);
        c.add_edge(2, -1.0);
        let graph: Graph = vec![c, node(2)].into_iter().collect();
        assert!(matches!(
            graph.validate(),
            Err(RoutingError::NegativeWeight { from: 1, to: 2 })
        ));
    }

    #[test]
    fn test_terminal_ids_sorted() {
        let graph: Graph = vec![
            node(5).with_terminal(1, Coordinate::new(0.0, 0.0)),
            node(2),
            node(3).with_terminal(2, Coordinate::new(0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(graph.terminal_ids(), vec![3, 5]);
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec![2, 3, 5]);
    }

    #[test]
    fn test_graph_serde_roundtrip() {
        let mut a = node(1).with_terminal(10, Coordinate::new(1.0, 2.0));
        a.add_edge(2, 4.0);
        let graph: Graph = vec![a, node(2)].into_iter().collect();
        let json = serde_json::to_string(&graph).expect("serialize");
        let back: Graph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, graph);
    }
}
