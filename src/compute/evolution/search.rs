//! Generation step and the run engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info};

use crate::compute::Environment;
use crate::schema::{
    CrossoverOperator, EvolutionConfigError, EvolutionProgress, EvolutionResult, EvolutionStats,
    GenerationSummary, GeneticAlgorithmConfig, MIN_POPULATION_SIZE, PathSnapshot, PlannerConfig,
    StopReason,
};

use super::EvolutionError;
use super::crossover;
use super::individual::Individual;
use super::population::Population;
use super::rng::PathRng;
use super::selection::select_survivors;

/// Evolve `current` into the next generation.
///
/// Survivors fill the first half of the destination. Survivor pairs then
/// produce offspring (or are cloned unchanged) for the second half, and any
/// slot left over is filled with a random individual. Finally every
/// non-elite individual is mutated with the configured probability. The
/// returned population is sorted by cost.
///
/// `generation` is 1-based; it weighs the fitness term of combined selection.
/// `config` is validated first, and `current` must hold at least
/// [`MIN_POPULATION_SIZE`] individuals.
pub fn evolve_generation(
    current: &mut Population,
    generation: usize,
    env: &Environment,
    config: &GeneticAlgorithmConfig,
    rng: &mut PathRng,
) -> Result<Population, EvolutionError> {
    if generation == 0 {
        return Err(EvolutionError::InvalidGeneration);
    }
    if current.is_empty() {
        return Err(EvolutionError::EmptyPopulation);
    }
    if current.len() < MIN_POPULATION_SIZE {
        return Err(EvolutionError::PopulationTooSmall {
            size: current.len(),
            min: MIN_POPULATION_SIZE,
        });
    }
    config.validate()?;

    current.sort_by_cost();
    let survivors = select_survivors(config.selection, current, generation, config, rng);
    let half = survivors.len();

    let mut offspring = Vec::with_capacity(half);
    let mut i = 0;
    while i + 1 < half {
        if rng.chance(config.crossover_probability) {
            for mut child in breed(env, &survivors, i, config.crossover, rng)? {
                child.mutate(env, rng);
                offspring.push(child);
            }
        } else {
            offspring.push(survivors[i].clone());
            offspring.push(survivors[i + 1].clone());
        }
        i += 2;
    }

    let mut next = Population::empty(current.size());
    for individual in survivors.into_iter().chain(offspring) {
        next.push(individual);
    }
    next.fill_random(env, rng);
    next.sort_by_cost();

    let elite = config.elite_survivors.min(next.len());
    for individual in &mut next.individuals_mut()[elite..] {
        if rng.chance(config.mutation_probability) {
            individual.mutate(env, rng);
        }
    }
    next.sort_by_cost();

    Ok(next)
}

/// Two offspring from the survivor pair starting at `i`.
fn breed(
    env: &Environment,
    survivors: &[Individual],
    i: usize,
    operator: CrossoverOperator,
    rng: &mut PathRng,
) -> Result<[Individual; 2], EvolutionError> {
    let (first, second) = (&survivors[i], &survivors[i + 1]);
    match operator {
        CrossoverOperator::OnePoint => Ok(crossover::one_point(env, first, second, rng)),
        CrossoverOperator::KPoint => Ok(crossover::k_point(env, first, second, rng)),
        CrossoverOperator::Intelligent => {
            let last = survivors.len() - 1;
            let child = crossover::intelligent(env, first, second)?;
            let sibling = if i + 2 < last {
                crossover::intelligent(env, second, &survivors[i + 2])?
            } else {
                crossover::intelligent(env, &survivors[0], &survivors[last])?
            };
            Ok([child, sibling])
        }
    }
}

/// Runs generations until a stop condition holds.
pub struct EvolutionEngine {
    config: PlannerConfig,
    env: Environment,
    rng: PathRng,
    population: Population,
    history: Vec<GenerationSummary>,
    generation: usize,
    best_cost: f64,
    stagnation_count: usize,
    cancelled: Arc<AtomicBool>,
}

impl EvolutionEngine {
    /// Validate `config` and build the environment.
    pub fn new(config: PlannerConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let env = Environment::new(&config.environment).map_err(EvolutionConfigError::from)?;
        let seed = config.random_seed.unwrap_or_else(rand::random);
        debug!("Random seed: {seed}");

        Ok(Self {
            population: Population::empty(config.algorithm.population_size),
            config,
            env,
            rng: PathRng::new(seed),
            history: Vec::new(),
            generation: 0,
            best_cost: f64::INFINITY,
            stagnation_count: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations evolved so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Build the most diverse of several random initial populations.
    pub fn initialize(&mut self) {
        let algorithm = &self.config.algorithm;
        self.population = Population::most_diverse(
            &self.env,
            algorithm.population_size,
            algorithm.initial_populations,
            &mut self.rng,
        );
        self.generation = 0;
        self.history.clear();
        self.stagnation_count = 0;
        self.best_cost = self.population.fittest().map_or(f64::INFINITY, Individual::cost);

        info!(
            "Initial population of {} (diversity {:.3}, best cost {:.3})",
            self.population.len(),
            self.population.diversity(),
            self.best_cost
        );
    }

    /// Evolve one generation.
    pub fn step(&mut self) -> Result<(), EvolutionError> {
        let generation = self.generation + 1;
        if self.config.termination.record_history {
            self.history.push(self.population.summary(generation));
        }

        self.population = evolve_generation(
            &mut self.population,
            generation,
            &self.env,
            &self.config.algorithm,
            &mut self.rng,
        )?;
        self.generation = generation;

        let Some(fittest) = self.population.fittest() else {
            return Err(EvolutionError::EmptyPopulation);
        };
        if fittest.cost() < self.best_cost {
            self.best_cost = fittest.cost();
            self.stagnation_count = 0;
            info!(
                "Generation {generation}: best cost {:.3} (feasible: {})",
                fittest.cost(),
                fittest.is_feasible()
            );
        } else {
            self.stagnation_count += 1;
        }

        debug!(
            "Generation {generation}: average cost {:.3}, diversity {:.3}, average length {:.2}",
            self.population.average_cost(),
            self.population.diversity(),
            self.population.average_length()
        );

        Ok(())
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            generation_limit: self.config.termination.generation_limit,
            best_cost: self.best_cost,
            best_feasible: self
                .population
                .fittest()
                .is_some_and(Individual::is_feasible),
            average_cost: self.population.average_cost(),
            diversity: self.population.diversity(),
            stagnation_count: self.stagnation_count,
        }
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        let termination = &self.config.termination;
        if let Some(fittest) = self.population.fittest()
            && fittest.cost() <= termination.fitness_limit
            && (fittest.is_feasible() || !termination.require_feasible)
        {
            return Some(StopReason::FitnessReached);
        }

        if self.generation >= termination.generation_limit {
            return Some(StopReason::GenerationLimit);
        }

        None
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, callback: F) -> Result<EvolutionResult, EvolutionError>
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = Instant::now();

        self.initialize();
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            self.step()?;
            callback(&self.progress());
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        if self.config.termination.record_history {
            self.history.push(self.population.summary(self.generation + 1));
        }

        let best = self
            .population
            .fittest()
            .ok_or(EvolutionError::EmptyPopulation)?;
        info!(
            "Stopped after {} generations ({stop_reason:?}): best cost {:.3}, feasible {}",
            self.generation,
            best.cost(),
            best.is_feasible()
        );

        Ok(EvolutionResult {
            best: PathSnapshot {
                waypoints: best.chromosome().to_vec(),
                cost: best.cost(),
                feasible: best.is_feasible(),
                generation: self.generation,
            },
            stats: EvolutionStats {
                generations: self.generation,
                best_cost: self.best_cost,
                final_average_cost: self.population.average_cost(),
                elapsed_seconds: elapsed,
                generations_per_second: if elapsed > 0.0 {
                    self.generation as f64 / elapsed
                } else {
                    0.0
                },
                stop_reason,
            },
            history: self.history.clone(),
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}
