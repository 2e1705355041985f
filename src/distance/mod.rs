//! Distance primitives.
//!
//! Geodesic metric, nearest-road-node lookup, and a dense distance matrix
//! over terminal nodes.

mod geodesic;
mod matrix;
mod spatial;

pub use geodesic::{edge_length, geodesic_distance};
pub use matrix::DistanceMatrix;
pub use spatial::{Nearest, SpatialIndex};
