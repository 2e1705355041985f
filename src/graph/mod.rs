//! Road and terminal graph construction.
//!
//! - [`build_road_graph`] — Directed road graph with delivery points snapped to road nodes
//! - [`optimize_road_graph`] — Contraction preserving terminal-to-terminal distances
//! - [`ShortestPaths`] — Dijkstra over a frozen graph
//! - [`LockerGraphBuilder`] — Terminal-only distance graph and tour expansion

mod builder;
mod locker;
mod optimizer;
mod paths;

pub use builder::{build_road_graph, snap_lockers, Snap};
pub use locker::LockerGraphBuilder;
pub use optimizer::optimize_road_graph;
pub use paths::ShortestPaths;
