//! Domain model types for locker tour planning.
//!
//! Raw map-extract records (road segments and nodes), and the arena graph
//! that every later stage reads and rewrites.

mod coordinate;
mod graph;
mod road;

pub use coordinate::Coordinate;
pub use graph::{Edge, Graph, GraphNode, NodeId, Terminal};
pub use road::{RawNode, RoadSegment};
