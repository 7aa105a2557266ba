//! Path Evolve - Genetic algorithm for collision-free robot paths.
//!
//! This crate evolves short, collision-free paths for a point robot moving
//! from the origin to a goal through a plane of polygonal obstacles.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and reporting types
//! - `compute`: Geometry, obstacles and the evolutionary search
//!
//! # Example
//!
//! ```rust,no_run
//! use path_evolve::{
//!     compute::{Environment, evolution::{PathRng, Population, evolve_generation}},
//!     schema::PlannerConfig,
//! };
//!
//! let config = PlannerConfig::default();
//! let env = Environment::new(&config.environment).unwrap();
//! let mut rng = PathRng::new(42);
//!
//! let mut population = Population::random(&env, config.algorithm.population_size, &mut rng);
//! for generation in 1..=100 {
//!     population = evolve_generation(&mut population, generation, &env, &config.algorithm, &mut rng)
//!         .unwrap();
//! }
//!
//! println!("Best path after 100 generations:\n{}", population.statistics_report());
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, Individual, Population};
pub use compute::{Environment, Obstacle, Point};
pub use schema::{EnvironmentConfig, PlannerConfig};
