//! # locker-tour
//!
//! Delivery tour planning over parcel lockers on a real street network:
//! road graph construction and contraction, terminal-to-terminal shortest
//! paths, and a genetic search for a short visiting order.
//!
//! ## Modules
//!
//! - [`models`] — Coordinates, raw map records, and the arena-backed [`Graph`](models::Graph)
//! - [`distance`] — Geodesic metric, nearest road node lookup, terminal distance matrix
//! - [`graph`] — Road graph builder and optimizer, Dijkstra, locker graph and path expansion
//! - [`ga`] — Tour chromosome, variation operators, selection, and the generational driver
//! - [`planner`] — The full pipeline producing a serializable [`TourPlan`](planner::TourPlan)
//! - [`error`] — [`RoutingError`] and the crate [`Result`] alias

pub mod distance;
pub mod error;
pub mod ga;
pub mod graph;
pub mod models;
pub mod planner;

pub use error::{Result, RoutingError};
