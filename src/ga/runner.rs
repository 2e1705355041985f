//! Generational driver loop.

use rand::Rng;

use super::{random_population, GeneticOptimizer, Tour};
use crate::error::{Result, RoutingError};

/// Outcome of a genetic search.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Fittest tour of the final population.
    pub best: Tour,
    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,
    /// Number of generational steps performed.
    pub generations: usize,
    /// Best fitness of the initial population followed by the best fitness
    /// after each generation.
    pub history: Vec<f64>,
}

/// Runs a [`GeneticOptimizer`] for its configured number of generations.
pub struct GaRunner;

impl GaRunner {
    /// Evolves a random initial population over the optimizer's terminals
    /// and returns the fittest tour of the final population.
    ///
    /// # Examples
    ///
    /// ```
    /// use locker_tour::ga::{GaConfig, GaRunner, GeneticOptimizer};
    /// use locker_tour::models::{Coordinate, Graph, GraphNode};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let ids = [1, 2, 3];
    /// let lockers: Graph = ids
    ///     .iter()
    ///     .map(|&a| {
    ///         let mut node = GraphNode::new(a, Coordinate::new(0.0, 0.0));
    ///         for &b in &ids {
    ///             if a != b {
    ///                 node.add_edge(b, 1.0);
    ///             }
    ///         }
    ///         node
    ///     })
    ///     .collect();
    ///
    /// let config = GaConfig::default()
    ///     .with_population_size(10)
    ///     .with_max_generations(5);
    /// let optimizer = GeneticOptimizer::new(&lockers, config).unwrap();
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let result = GaRunner::run(&optimizer, &mut rng).unwrap();
    /// assert_eq!(result.best.len(), 3);
    /// assert_eq!(result.best_fitness, 3.0);
    /// ```
    pub fn run<R: Rng>(optimizer: &GeneticOptimizer, rng: &mut R) -> Result<GaResult> {
        let config = optimizer.config();
        log::info!(
            "genetic search: {} terminals, population {}, {} generations, mutation {}, crossover {}, tournament {}",
            optimizer.terminals().len(),
            config.population_size,
            config.max_generations,
            config.mutation_rate,
            config.crossover_rate,
            config.tournament_size
        );

        let mut population =
            random_population(optimizer.terminals(), config.population_size, rng);
        let mut fitness = optimizer.population_fitness(&population)?;
        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(best_of(&fitness)?.1);

        for generation in 1..=config.max_generations {
            population = optimizer.step(&population, rng)?;
            fitness = optimizer.population_fitness(&population)?;
            let (_, best) = best_of(&fitness)?;
            history.push(best);
            log::debug!("generation {}: best fitness {}", generation, best);
        }

        let (index, best_fitness) = best_of(&fitness)?;
        log::info!("genetic search finished: best fitness {}", best_fitness);
        Ok(GaResult {
            best: population.swap_remove(index),
            best_fitness,
            generations: config.max_generations,
            history,
        })
    }
}

/// Index and value of the smallest fitness; the first one wins ties.
fn best_of(fitness: &[f64]) -> Result<(usize, f64)> {
    fitness
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, f)| match best {
            Some((_, b)) if b <= f => best,
            _ => Some((i, f)),
        })
        .ok_or(RoutingError::EmptyPopulation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{GaConfig, TourClosure};
    use crate::models::{Coordinate, Graph, GraphNode, NodeId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_lockers(ids: &[NodeId]) -> Graph {
        ids.iter()
            .map(|&a| {
                let mut node = GraphNode::new(a, Coordinate::new(0.0, 0.0));
                for &b in ids {
                    if a != b {
                        node.add_edge(b, (a - b).abs() as f64);
                    }
                }
                node
            })
            .collect()
    }

    #[test]
    fn test_best_of() {
        assert_eq!(best_of(&[3.0, 1.0, 1.0, 2.0]).expect("non-empty"), (1, 1.0));
        assert!(matches!(best_of(&[]), Err(RoutingError::EmptyPopulation)));
    }

    #[test]
    fn test_run_finds_line_optimum() {
        let ids: Vec<NodeId> = (1..=6).collect();
        let config = GaConfig::default()
            .with_population_size(60)
            .with_max_generations(150);
        let optimizer = GeneticOptimizer::new(&line_lockers(&ids), config).expect("valid");
        let mut rng = StdRng::seed_from_u64(42);
        let result = GaRunner::run(&optimizer, &mut rng).expect("run");

        // Any closed tour over points on a line is at least twice its span.
        assert_eq!(result.best_fitness, 10.0);
        assert_eq!(
            optimizer.fitness(&result.best).expect("edges"),
            result.best_fitness
        );
        let mut nodes = result.best.nodes().to_vec();
        nodes.sort_unstable();
        assert_eq!(nodes, ids);
    }

    #[test]
    fn test_history_length() {
        let ids: Vec<NodeId> = (1..=4).collect();
        let config = GaConfig::default()
            .with_population_size(8)
            .with_max_generations(12)
            .with_closure(TourClosure::Open);
        let optimizer = GeneticOptimizer::new(&line_lockers(&ids), config).expect("valid");
        let mut rng = StdRng::seed_from_u64(7);
        let result = GaRunner::run(&optimizer, &mut rng).expect("run");
        assert_eq!(result.generations, 12);
        assert_eq!(result.history.len(), 13);
        assert_eq!(result.history.last().copied(), Some(result.best_fitness));
        assert!(result.history.iter().all(|&f| f >= 3.0));
    }

    #[test]
    fn test_single_generation() {
        let ids: Vec<NodeId> = (1..=4).collect();
        let config = GaConfig::default()
            .with_population_size(5)
            .with_max_generations(1);
        let optimizer = GeneticOptimizer::new(&line_lockers(&ids), config).expect("valid");
        let mut rng = StdRng::seed_from_u64(1);
        let result = GaRunner::run(&optimizer, &mut rng).expect("run");
        assert_eq!(result.generations, 1);
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.history[1], result.best_fitness);
    }
}
