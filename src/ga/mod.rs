//! Genetic algorithm for ordering terminal visits.
//!
//! - [`Tour`] — Permutation chromosome over terminal identifiers
//! - [`random_population`], [`mutate`], [`crossover`] — Variation operators
//! - [`GaConfig`] — Rates, sizes, tour closure, and missing-edge policy
//! - [`GeneticOptimizer`] — Fitness, tournament selection, and one generational step
//! - [`GaRunner`] — Driver loop over a fixed number of generations

mod config;
mod operators;
mod optimizer;
mod runner;
mod tour;

pub use config::{GaConfig, MissingEdgePolicy, TourClosure, SETTINGS_SECTION};
pub use operators::{crossover, mutate, random_population, random_tour};
pub use optimizer::GeneticOptimizer;
pub use runner::{GaResult, GaRunner};
pub use tour::Tour;
