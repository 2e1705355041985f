//! Tour chromosome for the terminal TSP.
//!
//! A tour is a permutation of all terminal identifiers. Whether the leg from
//! the last stop back to the first counts is decided by
//! [`TourClosure`](super::TourClosure), not by the tour itself.

use serde::{Deserialize, Serialize};

use crate::models::NodeId;

/// An ordered visit sequence over terminal identifiers.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::Tour;
///
/// let tour = Tour::new(vec![7, 3, 5]);
/// assert_eq!(tour.nodes(), &[7, 3, 5]);
/// assert_eq!(tour.rotated_to_min().nodes(), &[3, 5, 7]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tour {
    nodes: Vec<NodeId>,
}

impl Tour {
    /// Creates a tour from a visit order.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// Returns the visit order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the number of stops.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tour has no stops.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the tour, returning the visit order.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Same cycle, rotated so the smallest identifier comes first.
    ///
    /// Only meaningful for closed tours, where every rotation has the same
    /// length.
    pub fn rotated_to_min(&self) -> Self {
        let mut nodes = self.nodes.clone();
        if let Some(start) = nodes
            .iter()
            .enumerate()
            .min_by_key(|&(_, id)| *id)
            .map(|(i, _)| i)
        {
            nodes.rotate_left(start);
        }
        Self { nodes }
    }
}

impl From<Vec<NodeId>> for Tour {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::new(nodes)
    }
}
