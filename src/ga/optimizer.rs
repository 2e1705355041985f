//! Fitness, selection, and one generational step of the tour search.
//!
//! # Algorithm
//!
//! A steady-state scheme over a fixed-size population. Each step replaces
//! `floor(mutation_rate · N)` slots with mutants and `floor(crossover_rate · N)`
//! slots with offspring. Parents come from tournaments (minimum fitness of
//! `k` draws with replacement); the slots they overwrite come from negative
//! tournaments (maximum fitness of `k` draws).
//!
//! Every selection in a step reads the population and fitness values as they
//! were when the step began; replacements go to a separate output population.
//!
//! # Complexity
//!
//! Fitness evaluation is O(N · n) for N tours of n stops, spread over the
//! rayon pool. Selection and variation add O((m + c) · (k + n)).

use rand::Rng;
use rayon::prelude::*;

use super::{crossover, mutate, GaConfig, MissingEdgePolicy, Tour, TourClosure};
use crate::distance::DistanceMatrix;
use crate::error::{Result, RoutingError};
use crate::models::{Graph, NodeId};

/// Evaluates and evolves tours over a terminal graph.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::{GaConfig, GeneticOptimizer, Tour};
/// use locker_tour::models::{Coordinate, Graph, GraphNode};
///
/// let mut a = GraphNode::new(1, Coordinate::new(0.0, 0.0));
/// let mut b = GraphNode::new(2, Coordinate::new(0.0, 0.0));
/// a.add_edge(2, 10.0);
/// b.add_edge(1, 10.0);
/// let lockers: Graph = vec![a, b].into_iter().collect();
///
/// let optimizer = GeneticOptimizer::new(&lockers, GaConfig::default()).unwrap();
/// assert_eq!(optimizer.fitness(&Tour::new(vec![1, 2])).unwrap(), 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    metric: DistanceMatrix,
    config: GaConfig,
}

impl GeneticOptimizer {
    /// Creates an optimizer over the edges of a terminal graph.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidConfig`] if `config` fails validation.
    pub fn new(lockers: &Graph, config: GaConfig) -> Result<Self> {
        Self::with_metric(DistanceMatrix::from_graph(lockers), config)
    }

    /// Creates an optimizer over a prepared distance matrix.
    pub fn with_metric(metric: DistanceMatrix, config: GaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { metric, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Terminal identifiers every tour must visit.
    pub fn terminals(&self) -> &[NodeId] {
        self.metric.ids()
    }

    /// Total length of a tour, including the closing leg when tours are
    /// closed.
    ///
    /// A leg between identical stops costs nothing. A leg without a terminal
    /// graph edge is handled by the configured [`MissingEdgePolicy`].
    ///
    /// # Errors
    ///
    /// [`RoutingError::MissingEdge`] under [`MissingEdgePolicy::Fail`].
    pub fn fitness(&self, tour: &Tour) -> Result<f64> {
        let nodes = tour.nodes();
        let mut total = 0.0;
        for pair in nodes.windows(2) {
            total += self.leg(pair[0], pair[1])?;
        }
        if self.config.closure == TourClosure::Closed {
            if let (Some(&last), Some(&first)) = (nodes.last(), nodes.first()) {
                total += self.leg(last, first)?;
            }
        }
        Ok(total)
    }

    fn leg(&self, from: NodeId, to: NodeId) -> Result<f64> {
        if from == to {
            return Ok(0.0);
        }
        match (self.metric.get(from, to), self.config.missing_edge) {
            (Some(d), _) => Ok(d),
            (None, MissingEdgePolicy::Penalty(penalty)) => Ok(penalty),
            (None, MissingEdgePolicy::Fail) => Err(RoutingError::MissingEdge { from, to }),
        }
    }

    /// Fitness of every tour, in population order.
    pub fn population_fitness(&self, population: &[Tour]) -> Result<Vec<f64>> {
        population.par_iter().map(|tour| self.fitness(tour)).collect()
    }

    /// Draws `tournament_size` tours with replacement and returns the fittest.
    ///
    /// `fitness[i]` must belong to `population[i]`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EmptyPopulation`] if `population` is empty.
    pub fn tournament<'p, R: Rng>(
        &self,
        population: &'p [Tour],
        fitness: &[f64],
        rng: &mut R,
    ) -> Result<&'p Tour> {
        debug_assert_eq!(population.len(), fitness.len());
        let winner = self.draw(fitness, rng, |candidate, best| candidate < best)?;
        Ok(&population[winner])
    }

    /// Draws `tournament_size` indices with replacement and returns the one
    /// with the worst fitness. Used to choose the slot a new tour replaces.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EmptyPopulation`] if `fitness` is empty.
    pub fn negative_tournament<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> Result<usize> {
        self.draw(fitness, rng, |candidate, worst| candidate > worst)
    }

    /// Index of the draw that `beats` every earlier draw.
    fn draw<R: Rng>(
        &self,
        fitness: &[f64],
        rng: &mut R,
        beats: impl Fn(f64, f64) -> bool,
    ) -> Result<usize> {
        if fitness.is_empty() {
            return Err(RoutingError::EmptyPopulation);
        }
        let mut chosen = rng.random_range(0..fitness.len());
        for _ in 1..self.config.tournament_size {
            let candidate = rng.random_range(0..fitness.len());
            if beats(fitness[candidate], fitness[chosen]) {
                chosen = candidate;
            }
        }
        Ok(chosen)
    }

    /// Produces the next generation.
    ///
    /// The result has the same length as `population`; slots not chosen by a
    /// negative tournament carry over unchanged.
    ///
    /// # Errors
    ///
    /// [`RoutingError::EmptyPopulation`] if any replacement is due and the
    /// population is empty, [`RoutingError::TourTooShort`] if a mutation is
    /// due and tours have fewer than two stops, plus fitness errors.
    pub fn step<R: Rng>(&self, population: &[Tour], rng: &mut R) -> Result<Vec<Tour>> {
        let fitness = self.population_fitness(population)?;
        let mut next = population.to_vec();

        for _ in 0..self.config.mutation_count() {
            let parent = self.tournament(population, &fitness, rng)?;
            let child = mutate(parent, rng)?;
            let victim = self.negative_tournament(&fitness, rng)?;
            next[victim] = child;
        }

        for _ in 0..self.config.crossover_count() {
            let a = self.tournament(population, &fitness, rng)?;
            let b = self.tournament(population, &fitness, rng)?;
            let child = crossover(a, b);
            let victim = self.negative_tournament(&fitness, rng)?;
            next[victim] = child;
        }

        Ok(next)
    }
}
