//! Genetic path search.
//!
//! # Overview
//!
//! - **Individuals** (`individual`): waypoint chromosomes with cached cost
//!   and feasibility, plus the mutation operators
//! - **Populations** (`population`): cost-ordered generations and their
//!   statistics
//! - **Selection** (`selection`): five survivor strategies and the
//!   reliability-driven combined selection
//! - **Crossover** (`crossover`): one-point, k-point and intelligent
//!   splicing
//! - **Search** (`search`): the generation step and the run engine
//!
//! # Example
//!
//! ```rust,no_run
//! use path_evolve::compute::evolution::EvolutionEngine;
//! use path_evolve::schema::PlannerConfig;
//!
//! let mut engine = EvolutionEngine::new(PlannerConfig::default()).unwrap();
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best cost = {:.3}",
//!         progress.generation, progress.best_cost);
//! }).unwrap();
//!
//! println!("Best path cost: {:.3}", result.best.cost);
//! ```

mod crossover;
mod individual;
mod population;
mod rng;
mod search;
mod selection;

pub use crossover::{CONVERGENCE_DISTANCE, intelligent, k_point, one_point};
pub use individual::{Individual, IndividualError, MutationOperator, SegmentCollisions};
pub use population::Population;
pub use rng::PathRng;
pub use search::{EvolutionEngine, evolve_generation};
pub use selection::{COMBINED_CANDIDATES, most_reliable, reliability, select_survivors};

use crate::schema::EvolutionConfigError;

/// Errors raised while evolving a population.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Cannot evolve an empty population")]
    EmptyPopulation,
    #[error("Population of {size} is below the minimum of {min}")]
    PopulationTooSmall { size: usize, min: usize },
    #[error("Generations are numbered from 1")]
    InvalidGeneration,
    #[error("Intelligent crossover did not reach the goal within {limit} nodes")]
    CrossoverDiverged { limit: usize },
    #[error("Invalid configuration: {0}")]
    Config(#[from] EvolutionConfigError),
}
