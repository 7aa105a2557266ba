//! Genetic algorithm configuration and run reporting types.
//!
//! A [`PlannerConfig`] bundles everything one run needs: the environment,
//! the GA parameters and the termination conditions.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::Point;

use super::{ConfigError, EnvironmentConfig};

/// Top-level configuration for one planner run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Obstacles, bounds and evaluation constants.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Genetic operator parameters.
    #[serde(default)]
    pub algorithm: GeneticAlgorithmConfig,
    /// When the run stops.
    #[serde(default)]
    pub termination: TerminationConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl PlannerConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvolutionConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let config: Self = serde_json::from_str(&text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate environment and algorithm parameters.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.environment.validate()?;
        self.algorithm.validate()
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Individuals per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Random populations generated at start; the most diverse one is kept.
    #[serde(default = "default_initial_populations")]
    pub initial_populations: usize,
    /// Fittest individuals copied unchanged into every generation.
    #[serde(default = "default_elite_survivors")]
    pub elite_survivors: usize,
    /// Group size for tournament selection.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Trials per strategy when scoring combined selection.
    #[serde(default = "default_combined_selection_runs")]
    pub combined_selection_runs: usize,
    /// Probability that a survivor pair produces offspring (0.0-1.0).
    #[serde(default = "default_crossover_probability")]
    pub crossover_probability: f64,
    /// Probability that a non-elite individual is mutated (0.0-1.0).
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,
    /// Selection strategy.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Crossover operator.
    #[serde(default)]
    pub crossover: CrossoverOperator,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            initial_populations: default_initial_populations(),
            elite_survivors: default_elite_survivors(),
            tournament_size: default_tournament_size(),
            combined_selection_runs: default_combined_selection_runs(),
            crossover_probability: default_crossover_probability(),
            mutation_probability: default_mutation_probability(),
            selection: SelectionMethod::default(),
            crossover: CrossoverOperator::default(),
        }
    }
}

fn default_population_size() -> usize {
    100
}
fn default_initial_populations() -> usize {
    5
}
fn default_elite_survivors() -> usize {
    5
}
fn default_tournament_size() -> usize {
    5
}
fn default_combined_selection_runs() -> usize {
    5
}
fn default_crossover_probability() -> f64 {
    0.9
}
fn default_mutation_probability() -> f64 {
    0.25
}

/// Survivor selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Fitness-proportionate selection on inverted costs.
    RouletteWheel,
    /// Evenly spaced pointers over the roulette ruler.
    StochasticUniversal,
    /// Probability proportional to rank.
    LinearRank,
    /// Fittest of a random group.
    #[default]
    Tournament,
    /// The fittest half in rank order.
    Truncation,
    /// Whichever of the other five scores the highest reliability.
    Combined,
}

impl SelectionMethod {
    /// Short name used in logs and reports.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::RouletteWheel => "RWS",
            Self::StochasticUniversal => "SUS",
            Self::LinearRank => "LRS",
            Self::Tournament => "TOS",
            Self::Truncation => "TRS",
            Self::Combined => "CS",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Crossover operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverOperator {
    /// Single cut point, prefix/suffix exchange.
    OnePoint,
    /// Several cut points with alternating ownership.
    KPoint,
    /// Greedy lock-step splice of both parents.
    #[default]
    Intelligent,
}

/// Stop conditions for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// Maximum number of generations.
    #[serde(default = "default_generation_limit")]
    pub generation_limit: usize,
    /// Stop once the fittest cost is at or below this value.
    #[serde(default = "default_fitness_limit")]
    pub fitness_limit: f64,
    /// Only accept a feasible fittest path for the fitness limit.
    #[serde(default = "default_require_feasible")]
    pub require_feasible: bool,
    /// Keep a [`GenerationSummary`] for every generation.
    #[serde(default)]
    pub record_history: bool,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            generation_limit: default_generation_limit(),
            fitness_limit: default_fitness_limit(),
            require_feasible: default_require_feasible(),
            record_history: false,
        }
    }
}

fn default_generation_limit() -> usize {
    1_000_000
}
fn default_fitness_limit() -> f64 {
    160.0
}
fn default_require_feasible() -> bool {
    true
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Per-generation population statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub average_length: f64,
    pub diversity: f64,
    pub average_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub median_cost: f64,
}

/// Snapshot of a path for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSnapshot {
    /// Waypoints from origin to goal.
    pub waypoints: Vec<Point>,
    pub cost: f64,
    pub feasible: bool,
    /// Generation in which the path was the fittest.
    pub generation: usize,
}

/// Progress update sent after every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Current generation number (0 before the first step).
    pub generation: usize,
    /// Generation limit of the run.
    pub generation_limit: usize,
    /// Lowest cost seen so far.
    pub best_cost: f64,
    /// Whether the current fittest path is feasible.
    pub best_feasible: bool,
    /// Average cost of the current population.
    pub average_cost: f64,
    /// Cost standard deviation of the current population.
    pub diversity: f64,
    /// Generations since the best cost last improved.
    pub stagnation_count: usize,
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Fittest path of the final population.
    pub best: PathSnapshot,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Per-generation summaries, empty unless recording was enabled.
    pub history: Vec<GenerationSummary>,
}

/// Statistics from a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Total generations evolved.
    pub generations: usize,
    /// Lowest cost achieved.
    pub best_cost: f64,
    /// Average cost of the final population.
    pub final_average_cost: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    pub generations_per_second: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason a run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached the generation limit.
    GenerationLimit,
    /// Fittest path reached the fitness limit.
    FitnessReached,
    /// Cancelled through the engine's handle.
    Cancelled,
}

// ============================================================================
// Validation
// ============================================================================

/// Smallest population that still has two survivor pairs.
pub const MIN_POPULATION_SIZE: usize = 4;

/// Genetic algorithm configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Population size must be at least 4, got {0}")]
    PopulationTooSmall(usize),
    #[error("Elite survivors ({elite}) exceed half the population ({population})")]
    TooManyElites { elite: usize, population: usize },
    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,
    #[error("Combined selection runs must be at least 1")]
    InvalidCombinedRuns,
    #[error("Initial populations must be at least 1")]
    InvalidInitialPopulations,
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Environment config validation failed: {0}")]
    BaseConfigError(#[from] ConfigError),
}

impl GeneticAlgorithmConfig {
    /// Validate GA parameters.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.population_size < MIN_POPULATION_SIZE {
            return Err(EvolutionConfigError::PopulationTooSmall(self.population_size));
        }
        if self.elite_survivors > self.population_size / 2 {
            return Err(EvolutionConfigError::TooManyElites {
                elite: self.elite_survivors,
                population: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(EvolutionConfigError::InvalidTournamentSize);
        }
        if self.combined_selection_runs == 0 {
            return Err(EvolutionConfigError::InvalidCombinedRuns);
        }
        if self.initial_populations == 0 {
            return Err(EvolutionConfigError::InvalidInitialPopulations);
        }

        let check_probability = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(EvolutionConfigError::InvalidProbability { name, value })
            }
        };
        check_probability(self.crossover_probability, "crossover_probability")?;
        check_probability(self.mutation_probability, "mutation_probability")?;

        Ok(())
    }
}
