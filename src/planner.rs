//! End-to-end tour planning.
//!
//! Composes every stage: road graph construction, contraction, the terminal
//! distance graph, the genetic search, and expansion of the winning tour
//! back onto road nodes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::Result;
use crate::ga::{GaConfig, GaRunner, GeneticOptimizer, Tour, TourClosure};
use crate::graph::{build_road_graph, optimize_road_graph, LockerGraphBuilder};
use crate::models::{Graph, NodeId, RawNode, RoadSegment};

/// Everything a planning run produces, ready for persistence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPlan {
    /// Contracted road graph.
    pub road_graph: Graph,
    /// Terminal-only distance graph.
    pub locker_graph: Graph,
    /// Visit order over terminal road nodes.
    pub tour: Tour,
    /// Length of [`tour`](Self::tour) in meters.
    pub fitness: f64,
    /// Road nodes driven through, in order.
    pub path: Vec<NodeId>,
}

/// Plans a delivery tour over `lockers` on the road network given by
/// `roads` and `nodes`.
///
/// Closed tours are rotated to start at their smallest terminal before
/// expansion. With fewer than two terminals the genetic search is skipped.
///
/// # Errors
///
/// Configuration errors, input defects from graph construction, and
/// [`RoutingError::Unreachable`](crate::RoutingError::Unreachable) if the
/// chosen tour contains a leg with no road path.
pub fn plan_tour(
    roads: &[RoadSegment],
    nodes: &[RawNode],
    lockers: &[RawNode],
    config: &GaConfig,
) -> Result<TourPlan> {
    config.validate()?;

    let road = build_road_graph(roads, nodes, lockers)?;
    log::info!(
        "road graph: {} nodes, {} edges, {} terminals",
        road.len(),
        road.edge_count(),
        road.terminals().count()
    );
    let road = optimize_road_graph(road);

    let builder = LockerGraphBuilder::new(&road);
    let locker_graph = builder.build()?;
    let optimizer = GeneticOptimizer::new(&locker_graph, config.clone())?;

    let (tour, fitness) = if optimizer.terminals().len() < 2 {
        log::info!(
            "{} terminal(s), skipping genetic search",
            optimizer.terminals().len()
        );
        let tour = Tour::new(optimizer.terminals().to_vec());
        let fitness = optimizer.fitness(&tour)?;
        (tour, fitness)
    } else {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let result = GaRunner::run(&optimizer, &mut rng)?;
        (result.best, result.best_fitness)
    };

    let tour = match config.closure {
        TourClosure::Closed => tour.rotated_to_min(),
        TourClosure::Open => tour,
    };
    let path = builder.expand_path(tour.nodes(), config.closure)?;
    log::info!(
        "tour over {} terminals: {} m, {} road nodes",
        tour.len(),
        fitness,
        path.len()
    );

    Ok(TourPlan {
        road_graph: road,
        locker_graph,
        tour,
        fitness,
        path,
    })
}
