//! Raw map-extract records consumed by the road graph builder.

use serde::{Deserialize, Serialize};

use super::{Coordinate, NodeId};

/// A map node as delivered by the extract parser: a road node or a delivery point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Extract identifier.
    pub id: NodeId,
    /// Position of the node.
    pub position: Coordinate,
}

impl RawNode {
    /// Creates a raw node.
    pub fn new(id: NodeId, position: Coordinate) -> Self {
        Self { id, position }
    }
}

/// One road way: consecutive node pairs become graph edges.
///
/// # Examples
///
/// ```
/// use locker_tour::models::RoadSegment;
///
/// let road = RoadSegment::new(7, vec![1, 2, 3], true);
/// assert_eq!(road.pairs().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Extract identifier of the way.
    pub id: NodeId,
    /// Ordered node identifiers along the way.
    pub nodes: Vec<NodeId>,
    /// `true` if traffic only flows in node order.
    pub one_way: bool,
}

impl RoadSegment {
    /// Creates a road segment.
    pub fn new(id: NodeId, nodes: Vec<NodeId>, one_way: bool) -> Self {
        Self { id, nodes, one_way }
    }

    /// Consecutive `(a, b)` node pairs in travel order.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_short_road() {
        assert_eq!(RoadSegment::new(1, vec![5], false).pairs().count(), 0);
        assert_eq!(RoadSegment::new(1, vec![], false).pairs().count(), 0);
    }
}
