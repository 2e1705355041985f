//! Error type shared by every pipeline stage.

use crate::models::NodeId;

/// Errors produced while building graphs, evolving tours, or expanding paths.
#[derive(Debug)]
pub enum RoutingError {
    /// A road or an edge references a node identifier that is not in the graph.
    MissingNode {
        /// Identifier that could not be resolved.
        node: NodeId,
    },
    /// An edge points back at its own source node.
    SelfLoop {
        /// Node carrying the loop.
        node: NodeId,
    },
    /// An edge carries a negative or non-finite weight.
    NegativeWeight {
        /// Edge source.
        from: NodeId,
        /// Edge target.
        to: NodeId,
    },
    /// Delivery points were given but there is no road node to snap them to.
    EmptyRoadNetwork,
    /// No road path connects `from` to `to`.
    Unreachable {
        /// Segment start.
        from: NodeId,
        /// Segment end.
        to: NodeId,
    },
    /// The terminal graph has no edge between two consecutive tour stops.
    MissingEdge {
        /// Tour stop.
        from: NodeId,
        /// Next tour stop.
        to: NodeId,
    },
    /// Selection was asked to draw from an empty population.
    EmptyPopulation,
    /// Mutation needs at least two stops.
    TourTooShort {
        /// Actual number of stops.
        len: usize,
    },
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// Settings document could not be parsed.
    Json(serde_json::Error),
    /// Settings file could not be read.
    Io(std::io::Error),
}

impl std::fmt::Display for RoutingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::MissingNode { node } => write!(f, "node {} is not in the graph", node),
            RoutingError::SelfLoop { node } => write!(f, "node {} has an edge to itself", node),
            RoutingError::NegativeWeight { from, to } => {
                write!(f, "edge {} -> {} has an invalid weight", from, to)
            }
            RoutingError::EmptyRoadNetwork => write!(f, "road network has no nodes"),
            RoutingError::Unreachable { from, to } => {
                write!(f, "node {} is unreachable from node {}", to, from)
            }
            RoutingError::MissingEdge { from, to } => {
                write!(f, "no terminal edge between {} and {}", from, to)
            }
            RoutingError::EmptyPopulation => write!(f, "population is empty"),
            RoutingError::TourTooShort { len } => {
                write!(f, "tour of {} stops is too short to mutate", len)
            }
            RoutingError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            RoutingError::Json(e) => write!(f, "settings parse error: {}", e),
            RoutingError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Json(e) => Some(e),
            RoutingError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(e: serde_json::Error) -> Self {
        RoutingError::Json(e)
    }
}

impl From<std::io::Error> for RoutingError {
    fn from(e: std::io::Error) -> Self {
        RoutingError::Io(e)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RoutingError>;
