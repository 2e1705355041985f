//! Genetic search configuration.
//!
//! Settings come either from builder-style setters on [`GaConfig::default`]
//! or from the `geneticAlgorithmSettings` section of an application
//! settings JSON document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// Name of the settings section holding a [`GaConfig`].
pub const SETTINGS_SECTION: &str = "geneticAlgorithmSettings";

/// Whether a tour returns to its first stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TourClosure {
    /// The leg from the last stop back to the first is driven and counted.
    #[default]
    Closed,
    /// The tour ends at its last stop.
    Open,
}

/// Treatment of a tour leg with no edge in the terminal graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingEdgePolicy {
    /// The leg costs this many meters.
    Penalty(f64),
    /// Fitness evaluation fails with [`RoutingError::MissingEdge`].
    Fail,
}

impl Default for MissingEdgePolicy {
    fn default() -> Self {
        Self::Penalty(1e9)
    }
}

/// Configuration of the genetic tour search.
///
/// # Examples
///
/// ```
/// use locker_tour::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_max_generations(200)
///     .with_seed(42);
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.mutation_rate, 0.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GaConfig {
    /// Fraction of the population replaced by mutants each generation.
    #[serde(alias = "MutationRate")]
    pub mutation_rate: f64,
    /// Fraction of the population replaced by offspring each generation.
    #[serde(alias = "CrossoverRate")]
    pub crossover_rate: f64,
    /// Number of tours kept per generation.
    #[serde(alias = "PopulationSize")]
    pub population_size: usize,
    /// Candidates drawn per tournament.
    #[serde(alias = "TournamentSize")]
    pub tournament_size: usize,
    /// Number of generational steps.
    #[serde(alias = "MaxGenerations")]
    pub max_generations: usize,
    /// Whether tours close back on their first stop.
    pub closure: TourClosure,
    /// Cost of legs without a terminal-graph edge.
    pub missing_edge: MissingEdgePolicy,
    /// RNG seed. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            population_size: 100,
            tournament_size: 5,
            max_generations: 1000,
            closure: TourClosure::Closed,
            missing_edge: MissingEdgePolicy::default(),
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the tour closure.
    pub fn with_closure(mut self, closure: TourClosure) -> Self {
        self.closure = closure;
        self
    }

    /// Sets the missing-edge policy.
    pub fn with_missing_edge(mut self, policy: MissingEdgePolicy) -> Self {
        self.missing_edge = policy;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of mutants produced per generation.
    pub fn mutation_count(&self) -> usize {
        (self.mutation_rate * self.population_size as f64).floor() as usize
    }

    /// Number of offspring produced per generation.
    pub fn crossover_count(&self) -> usize {
        (self.crossover_rate * self.population_size as f64).floor() as usize
    }

    /// Checks sizes, generation count, and rates.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("populationSize must be positive"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournamentSize must be positive"));
        }
        if self.max_generations == 0 {
            return Err(invalid("maxGenerations must be positive"));
        }
        for (name, rate) in [
            ("mutationRate", self.mutation_rate),
            ("crossoverRate", self.crossover_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(invalid(&format!("{name} must be within [0, 1], got {rate}")));
            }
        }
        if let MissingEdgePolicy::Penalty(penalty) = self.missing_edge {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(invalid(&format!(
                    "missing edge penalty must be finite and non-negative, got {penalty}"
                )));
            }
        }
        Ok(())
    }

    /// Reads the `geneticAlgorithmSettings` section of a settings document.
    ///
    /// Fields absent from the section keep their defaults.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Json`] for malformed JSON, and
    /// [`RoutingError::InvalidConfig`] if the section is missing or the
    /// values fail [`validate`](Self::validate).
    pub fn from_settings_json(json: &str) -> Result<Self> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let section = document
            .get_mut(SETTINGS_SECTION)
            .map(serde_json::Value::take)
            .ok_or_else(|| invalid(&format!("missing section '{SETTINGS_SECTION}'")))?;
        let config: Self = serde_json::from_value(section)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a settings file such as `appsettings.json`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Io`] if the file cannot be read, otherwise as
    /// [`from_settings_json`](Self::from_settings_json).
    pub fn from_settings_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_settings_json(&json)?;
        log::debug!("loaded GA settings from {}", path.display());
        Ok(config)
    }
}

fn invalid(message: &str) -> RoutingError {
    RoutingError::InvalidConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GaConfig::default();
        assert_eq!(config.mutation_rate, 0.1);
        assert_eq!(config.crossover_rate, 0.7);
        assert_eq!(config.population_size, 100);
        assert_eq!(config.tournament_size, 5);
        assert_eq!(config.max_generations, 1000);
        assert_eq!(config.closure, TourClosure::Closed);
        assert_eq!(config.missing_edge, MissingEdgePolicy::Penalty(1e9));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_operation_counts_floor() {
        let config = GaConfig::default()
            .with_population_size(15)
            .with_mutation_rate(0.1)
            .with_crossover_rate(0.7);
        assert_eq!(config.mutation_count(), 1);
        assert_eq!(config.crossover_count(), 10);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(GaConfig::default().with_population_size(0).validate().is_err());
        assert!(GaConfig::default().with_tournament_size(0).validate().is_err());
        assert!(GaConfig::default().with_max_generations(0).validate().is_err());
        assert!(GaConfig::default().with_mutation_rate(1.5).validate().is_err());
        assert!(GaConfig::default().with_crossover_rate(-0.1).validate().is_err());
        assert!(GaConfig::default().with_mutation_rate(f64::NAN).validate().is_err());
        assert!(GaConfig::default()
            .with_missing_edge(MissingEdgePolicy::Penalty(f64::INFINITY))
            .validate()
            .is_err());
        assert!(GaConfig::default()
            .with_mutation_rate(0.0)
            .with_crossover_rate(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_load_settings_section() {
        let json = r#"
        {
            "logging": { "level": "info" },
            "geneticAlgorithmSettings": {
                "MutationRate": 0.05,
                "CrossoverRate": 0.7,
                "PopulationSize": 200,
                "TournamentSize": 5,
                "MaxGenerations": 1000
            }
        }"#;
        let config = GaConfig::from_settings_json(json).expect("valid");
        assert_eq!(config.mutation_rate, 0.05);
        assert_eq!(config.crossover_rate, 0.7);
        assert_eq!(config.population_size, 200);
        assert_eq!(config.tournament_size, 5);
        assert_eq!(config.max_generations, 1000);
    }

    #[test]
    fn test_load_camel_case_with_policies() {
        let json = r#"
        {
            "geneticAlgorithmSettings": {
                "populationSize": 30,
                "closure": "open",
                "missingEdge": "fail",
                "seed": 9
            }
        }"#;
        let config = GaConfig::from_settings_json(json).expect("valid");
        assert_eq!(config.population_size, 30);
        assert_eq!(config.mutation_rate, 0.1);
        assert_eq!(config.closure, TourClosure::Open);
        assert_eq!(config.missing_edge, MissingEdgePolicy::Fail);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_missing_section_fails() {
        let err = GaConfig::from_settings_json(r#"{ "other": {} }"#).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfig(_)));
        assert!(err.to_string().contains(SETTINGS_SECTION));
    }

    #[test]
    fn test_invalid_values_fail() {
        let json = r#"{ "geneticAlgorithmSettings": { "populationSize": 0 } }"#;
        assert!(matches!(
            GaConfig::from_settings_json(json),
            Err(RoutingError::InvalidConfig(_))
        ));
        let json = r#"{ "geneticAlgorithmSettings": { "MaxGenerations": 0 } }"#;
        let err = GaConfig::from_settings_json(json).unwrap_err();
        assert!(err.to_string().contains("maxGenerations"));
        assert!(matches!(
            GaConfig::from_settings_json("{ not json"),
            Err(RoutingError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let path = std::env::temp_dir().join("locker-tour-no-such-settings.json");
        assert!(matches!(
            GaConfig::from_settings_file(&path),
            Err(RoutingError::Io(_))
        ));
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let config = GaConfig::default().with_population_size(12).with_seed(5);
        let mut document = serde_json::Map::new();
        document.insert(
            SETTINGS_SECTION.to_string(),
            serde_json::to_value(&config).expect("serialize"),
        );
        let document = serde_json::Value::Object(document);
        let path = std::env::temp_dir().join(format!(
            "locker-tour-settings-{}.json",
            std::process::id()
        ));
        fs::write(&path, document.to_string()).expect("write");
        let loaded = GaConfig::from_settings_file(&path).expect("valid");
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(loaded, config);
    }
}
