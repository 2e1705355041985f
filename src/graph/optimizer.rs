//! Road graph contraction that preserves terminal-to-terminal distances.
//!
//! # Algorithm
//!
//! Each pass classifies every non-terminal node by its distinct outgoing and
//! incoming neighbor sets (incoming sets come from a reverse-adjacency index
//! built at the start of the pass and kept current as edges are rewired):
//!
//! - **dead end**: no outgoing neighbor, or a single neighbor that is both the
//!   only successor and the only predecessor (a turnaround);
//! - **pass-through**: two neighbors, each reachable in both directions, or one
//!   predecessor and a different single successor (one-way through traffic).
//!
//! Starting from terminals, then junctions, a flood fill over an explicit
//! stack walks every outgoing edge through consecutive pass-through nodes.
//! A walk that ends in a dead end deletes the edge and every node it crossed.
//! A walk that ends at a terminal or junction replaces the chain with a
//! single edge whose weight is the summed chain length (and likewise for the
//! reverse direction on two-way chains), keeping the smaller weight when a
//! parallel edge already exists. Passes repeat until the node count stops
//! decreasing; a final sweep drops edges to nodes that no longer exist.
//!
//! Terminal nodes are never removed or contracted through.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Edge, Graph, GraphNode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Terminal,
    DeadEnd,
    PassThrough,
    Junction,
}

/// A walk from a boundary node through pass-through nodes.
struct Chain {
    /// Pass-through nodes crossed, in walk order.
    interior: Vec<NodeId>,
    /// Last node before `end` (the walk origin if `interior` is empty).
    last: NodeId,
    /// Where the walk stopped.
    end: NodeId,
    /// Summed forward weight from the origin to `end`.
    length: f64,
    /// Summed weight from `end` back to the origin, if every hop has a reverse edge.
    reverse_length: Option<f64>,
    dead_end: bool,
}

/// Contracts `graph` to a fixed point.
///
/// Shortest-path distances between terminal nodes are unchanged; the result
/// holds every terminal plus the junctions that real route choices need.
/// Applying the optimizer to its own output changes nothing.
///
/// # Panics
///
/// Panics if a pass-through node has no edge leading past its predecessor,
/// which means the adjacency index and the edge lists disagree.
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
/// use locker_tour::graph::optimize_road_graph;
///
/// // ①  ⇆ 2 ⇆ 3 ⇆ ④
/// let mut nodes: Vec<GraphNode> = (1..=4)
///     .map(|id| GraphNode::new(id, Coordinate::new(0.0, id as f64)))
///     .collect();
/// nodes[0] = nodes[0].clone().with_terminal(101, Coordinate::new(0.0, 1.0));
/// nodes[3] = nodes[3].clone().with_terminal(104, Coordinate::new(0.0, 4.0));
/// for i in 0..3 {
///     nodes[i].add_edge(i as i64 + 2, 1.0);
///     nodes[i + 1].add_edge(i as i64 + 1, 1.0);
/// }
/// let graph: Graph = nodes.into_iter().collect();
///
/// let optimized = optimize_road_graph(graph);
/// assert_eq!(optimized.ids().collect::<Vec<_>>(), vec![1, 4]);
/// assert_eq!(optimized.weight(1, 4), Some(3.0));
/// assert_eq!(optimized.weight(4, 1), Some(3.0));
/// ```
pub fn optimize_road_graph(mut graph: Graph) -> Graph {
    let dangling = graph.retain_valid_edges();
    if dangling > 0 {
        log::warn!("dropped {} edges to unknown nodes before contraction", dangling);
    }

    let initial_nodes = graph.len();
    let initial_edges = graph.edge_count();
    let mut passes = 0;
    loop {
        let before = graph.len();
        Contraction::new(&mut graph).run();
        passes += 1;
        log::debug!(
            "contraction pass {}: nodes {} -> {}",
            passes,
            before,
            graph.len()
        );
        if graph.len() >= before {
            break;
        }
    }

    let spurious = graph.retain_valid_edges();
    log::info!(
        "road graph optimized in {} passes: nodes {} -> {}, edges {} -> {} ({} spurious removed)",
        passes,
        initial_nodes,
        graph.len(),
        initial_edges,
        graph.edge_count(),
        spurious
    );
    graph
}

/// State of a single contraction pass.
struct Contraction<'g> {
    graph: &'g mut Graph,
    incoming: HashMap<NodeId, BTreeSet<NodeId>>,
    to_visit: BTreeSet<NodeId>,
    retired: BTreeSet<NodeId>,
}

impl<'g> Contraction<'g> {
    fn new(graph: &'g mut Graph) -> Self {
        let ids: Vec<NodeId> = graph.ids().collect();
        for &id in &ids {
            if let Some(node) = graph.node_mut(id) {
                merge_parallel_edges(node);
            }
        }

        let mut incoming: HashMap<NodeId, BTreeSet<NodeId>> = HashMap::new();
        for node in graph.nodes() {
            for edge in &node.edges {
                incoming.entry(edge.target).or_default().insert(node.id);
            }
        }

        Self {
            graph,
            incoming,
            to_visit: ids.into_iter().collect(),
            retired: BTreeSet::new(),
        }
    }

    fn run(mut self) {
        // Seeding from boundaries first lets every chain be walked from its end.
        let mut seeds: Vec<(u8, NodeId)> = self
            .graph
            .ids()
            .map(|id| {
                let rank = match self.kind(id) {
                    NodeKind::Terminal => 0,
                    NodeKind::Junction => 1,
                    NodeKind::DeadEnd => 2,
                    NodeKind::PassThrough => 3,
                };
                (rank, id)
            })
            .collect();
        seeds.sort_unstable();

        let mut stack = Vec::new();
        for (_, seed) in seeds {
            if !self.to_visit.contains(&seed) {
                continue;
            }
            stack.push(seed);
            while let Some(first) = stack.pop() {
                if !self.to_visit.remove(&first) {
                    continue;
                }
                self.expand(first, &mut stack);
            }
        }

        self.sweep_dead_ends();

        let retired: Vec<NodeId> = self.retired.iter().copied().collect();
        for id in retired {
            self.graph.remove(id);
        }
        self.graph.retain_valid_edges();
    }

    /// Walks every outgoing edge of `first` and contracts what it finds.
    fn expand(&mut self, first: NodeId, stack: &mut Vec<NodeId>) {
        let mut to_delete = Vec::new();
        let edge_count = self.node(first).edges.len();

        for i in 0..edge_count {
            let Edge { target, weight } = self.node(first).edges[i];
            if !self.to_visit.contains(&target) {
                continue;
            }

            let chain = self.walk(first, target, weight);

            if chain.dead_end && chain.end != first {
                to_delete.push(i);
                self.retire(&chain.interior);
                self.retire(&[chain.end]);
            } else if chain.interior.is_empty() {
                continue;
            } else if chain.end == first {
                // The chain loops back to where it started.
                to_delete.push(i);
                if let Some(k) = self.node(first).edge_index(chain.last) {
                    to_delete.push(k);
                }
                self.retire(&chain.interior);
            } else {
                self.retire(&chain.interior);
                if self.connect(first, i, &chain) {
                    to_delete.push(i);
                }
                if self.to_visit.contains(&chain.end) {
                    stack.push(chain.end);
                }
            }
        }

        to_delete.sort_unstable();
        to_delete.dedup();
        let node = self.node_mut(first);
        for &i in to_delete.iter().rev() {
            node.edges.remove(i);
        }
    }

    /// Follows pass-through nodes from `start`, entered from `origin` over an
    /// edge of `weight`.
    fn walk(&mut self, origin: NodeId, start: NodeId, weight: f64) -> Chain {
        let mut prev = origin;
        let mut current = start;
        let mut length = weight;
        let mut reverse_length = self.node(start).weight_to(origin);
        let mut interior = Vec::new();

        let dead_end = loop {
            match self.kind(current) {
                NodeKind::DeadEnd => break true,
                NodeKind::PassThrough if self.to_visit.contains(&current) => {}
                _ => break false,
            }

            self.to_visit.remove(&current);
            interior.push(current);

            let next = self
                .node(current)
                .edges
                .iter()
                .find(|e| e.target != prev)
                .copied()
                .unwrap_or_else(|| {
                    panic!(
                        "pass-through node {} has no continuation past node {}",
                        current, prev
                    )
                });

            reverse_length = reverse_length
                .and_then(|r| self.node(next.target).weight_to(current).map(|w| r + w));
            length += next.weight;
            prev = current;
            current = next.target;
        };

        Chain {
            interior,
            last: prev,
            end: current,
            length,
            reverse_length,
            dead_end,
        }
    }

    /// Replaces the chain's boundary edges with direct edges between `first`
    /// and the chain end. Returns `true` if edge `i` of `first` became redundant.
    fn connect(&mut self, first: NodeId, i: usize, chain: &Chain) -> bool {
        let end = chain.end;

        if let Some(reverse) = chain.reverse_length {
            let node = self.node_mut(end);
            if let Some(to_last) = node.edge_index(chain.last) {
                match node.edge_index(first) {
                    Some(to_first) => {
                        let w = &mut node.edges[to_first].weight;
                        *w = w.min(reverse);
                        node.edges.remove(to_last);
                    }
                    None => node.edges[to_last] = Edge::new(first, reverse),
                }
                self.incoming.entry(first).or_default().insert(end);
            }
        }

        self.incoming.entry(end).or_default().insert(first);
        let node = self.node_mut(first);
        let existing = node
            .edges
            .iter()
            .enumerate()
            .position(|(j, e)| j != i && e.target == end);
        match existing {
            Some(j) => {
                let w = &mut node.edges[j].weight;
                *w = w.min(chain.length);
                true
            }
            None => {
                node.edges[i] = Edge::new(end, chain.length);
                false
            }
        }
    }

    /// Removes dead ends the flood fill left behind.
    fn sweep_dead_ends(&mut self) {
        let candidates: Vec<NodeId> = self
            .graph
            .ids()
            .filter(|id| !self.retired.contains(id))
            .collect();
        for id in candidates {
            if self.kind(id) != NodeKind::DeadEnd {
                continue;
            }
            let sources: Vec<NodeId> = self
                .incoming
                .get(&id)
                .map(|s| s.iter().copied().collect())
                .unwrap_or_default();
            for source in sources {
                if let Some(node) = self.graph.node_mut(source) {
                    node.edges.retain(|e| e.target != id);
                }
            }
            self.retire(&[id]);
        }
    }

    /// Marks nodes as removed and drops them from the reverse-adjacency index.
    fn retire(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.to_visit.remove(&id);
            self.retired.insert(id);
            let targets = self.node(id).out_neighbors();
            for target in targets {
                if let Some(sources) = self.incoming.get_mut(&target) {
                    sources.remove(&id);
                }
            }
        }
    }

    fn kind(&self, id: NodeId) -> NodeKind {
        let node = self.node(id);
        if node.is_terminal() {
            return NodeKind::Terminal;
        }
        let outgoing = node.out_neighbors();
        let empty = BTreeSet::new();
        let incoming = self.incoming.get(&id).unwrap_or(&empty);

        let single = outgoing.len() == 1 && incoming.len() == 1;
        if outgoing.is_empty() || (single && outgoing == *incoming) {
            NodeKind::DeadEnd
        } else if (outgoing.len() == 2 && outgoing == *incoming)
            || (single && outgoing.is_disjoint(incoming))
        {
            NodeKind::PassThrough
        } else {
            NodeKind::Junction
        }
    }

    fn node(&self, id: NodeId) -> &GraphNode {
        self.graph
            .node(id)
            .unwrap_or_else(|| panic!("node {} vanished during contraction", id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        self.graph
            .node_mut(id)
            .unwrap_or_else(|| panic!("node {} vanished during contraction", id))
    }
}

/// Collapses parallel edges to the minimum weight, keeping first-seen order.
fn merge_parallel_edges(node: &mut GraphNode) {
    let mut merged: Vec<Edge> = Vec::with_capacity(node.edges.len());
    for edge in &node.edges {
        match merged.iter_mut().find(|e| e.target == edge.target) {
            Some(existing) => existing.weight = existing.weight.min(edge.weight),
            None => merged.push(*edge),
        }
    }
    node.edges = merged;
}
