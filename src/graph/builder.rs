//! Road graph construction from a map extract.
//!
//! # Algorithm
//!
//! 1. Snap every delivery point to its nearest road node (parallel queries
//!    against a shared [`SpatialIndex`]).
//! 2. When several delivery points land on one road node, keep the closest
//!    and log the others.
//! 3. Create one [`GraphNode`] per road node, marking snapped nodes terminal.
//! 4. For each consecutive node pair of every road, add an edge weighted by
//!    geodesic length rounded up to a whole meter, plus the reverse edge for
//!    two-way roads.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::distance::{edge_length, SpatialIndex};
use crate::error::{Result, RoutingError};
use crate::models::{Graph, GraphNode, NodeId, RawNode, RoadSegment, Terminal};

/// A delivery point assigned to a road node.
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    /// Road node the delivery point was assigned to.
    pub road_node: NodeId,
    /// The delivery point itself.
    pub locker: RawNode,
    /// Geodesic distance between the two in meters.
    pub distance: f64,
}

/// Assigns each delivery point to its nearest road node.
///
/// At most one delivery point is kept per road node (the closest; ties keep
/// the earlier input). Losers are logged as warnings and dropped.
///
/// # Errors
///
/// [`RoutingError::EmptyRoadNetwork`] if `lockers` is non-empty but the index is empty.
pub fn snap_lockers(index: &SpatialIndex, lockers: &[RawNode]) -> Result<Vec<Snap>> {
    if lockers.is_empty() {
        return Ok(Vec::new());
    }
    if index.is_empty() {
        return Err(RoutingError::EmptyRoadNetwork);
    }

    let snaps: Vec<Snap> = lockers
        .par_iter()
        .filter_map(|locker| {
            index.nearest(&locker.position).map(|hit| Snap {
                road_node: hit.node,
                locker: locker.clone(),
                distance: hit.distance,
            })
        })
        .collect();

    let mut groups: BTreeMap<NodeId, Vec<Snap>> = BTreeMap::new();
    for snap in snaps {
        groups.entry(snap.road_node).or_default().push(snap);
    }

    let mut kept = Vec::with_capacity(groups.len());
    for (road_node, mut group) in groups {
        let mut best = 0;
        for (i, snap) in group.iter().enumerate() {
            if snap.distance < group[best].distance {
                best = i;
            }
        }
        let winner = group.swap_remove(best);
        if !group.is_empty() {
            let dropped: Vec<String> = group.iter().map(|s| s.locker.id.to_string()).collect();
            log::warn!(
                "road node {} shares multiple delivery points; keeping {}, dropping {}",
                road_node,
                winner.locker.id,
                dropped.join(", ")
            );
        }
        kept.push(winner);
    }
    Ok(kept)
}

/// Builds the directed road graph.
///
/// # Arguments
///
/// * `roads` — Road ways; consecutive node pairs become edges
/// * `nodes` — All road nodes referenced by `roads`
/// * `lockers` — Delivery points to snap onto road nodes
///
/// # Errors
///
/// * [`RoutingError::MissingNode`] if a road references a node not in `nodes`
/// * [`RoutingError::EmptyRoadNetwork`] if there are delivery points but no road nodes
///
/// # Examples
///
/// ```
/// use locker_tour::models::{Coordinate, RawNode, RoadSegment};
/// use locker_tour::graph::build_road_graph;
///
/// let nodes = vec![
///     RawNode::new(1, Coordinate::new(50.0, 20.0)),
///     RawNode::new(2, Coordinate::new(50.0, 20.001)),
/// ];
/// let roads = vec![RoadSegment::new(100, vec![1, 2], true)];
/// let lockers = vec![RawNode::new(900, Coordinate::new(50.00001, 20.0))];
///
/// let graph = build_road_graph(&roads, &nodes, &lockers).unwrap();
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.terminal_ids(), vec![1]);
/// assert!(graph.weight(1, 2).is_some());
/// assert!(graph.weight(2, 1).is_none());
/// ```
pub fn build_road_graph(
    roads: &[RoadSegment],
    nodes: &[RawNode],
    lockers: &[RawNode],
) -> Result<Graph> {
    let index = SpatialIndex::new(nodes);
    let snaps = snap_lockers(&index, lockers)?;

    let mut graph: Graph = nodes
        .iter()
        .map(|n| GraphNode::new(n.id, n.position))
        .collect();

    for snap in snaps {
        if let Some(node) = graph.node_mut(snap.road_node) {
            node.terminal = Some(Terminal {
                locker_id: snap.locker.id,
                locker_position: snap.locker.position,
            });
        }
    }

    for road in roads {
        for (a, b) in road.pairs() {
            if a == b {
                continue;
            }
            let pa = graph
                .node(a)
                .ok_or(RoutingError::MissingNode { node: a })?
                .position;
            let pb = graph
                .node(b)
                .ok_or(RoutingError::MissingNode { node: b })?
                .position;
            let weight = edge_length(&pa, &pb);

            if let Some(node) = graph.node_mut(a) {
                node.add_edge(b, weight);
            }
            if !road.one_way {
                if let Some(node) = graph.node_mut(b) {
                    node.add_edge(a, weight);
                }
            }
        }
    }

    log::debug!(
        "road graph built: nodes={} edges={} terminals={}",
        graph.len(),
        graph.edge_count(),
        graph.terminals().count()
    );
    Ok(graph)
}
