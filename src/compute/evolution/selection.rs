//! Survivor selection strategies.
//!
//! Every strategy first copies the elite survivors, then fills the remaining
//! slots up to half the population. The source population must be sorted by
//! cost.

use rayon::prelude::*;

use crate::schema::{GeneticAlgorithmConfig, SelectionMethod};

use super::individual::Individual;
use super::population::Population;
use super::rng::PathRng;

/// Strategies scored by combined selection, in scoring order.
pub const COMBINED_CANDIDATES: [SelectionMethod; 5] = [
    SelectionMethod::RouletteWheel,
    SelectionMethod::StochasticUniversal,
    SelectionMethod::LinearRank,
    SelectionMethod::Tournament,
    SelectionMethod::Truncation,
];

/// Choose `population.len() / 2` survivors from a sorted population.
pub fn select_survivors(
    method: SelectionMethod,
    population: &Population,
    generation: usize,
    config: &GeneticAlgorithmConfig,
    rng: &mut PathRng,
) -> Vec<Individual> {
    let method = match method {
        SelectionMethod::Combined => most_reliable(population, generation, config, rng),
        other => other,
    };
    run_strategy(method, population, config, rng)
}

fn run_strategy(
    method: SelectionMethod,
    population: &Population,
    config: &GeneticAlgorithmConfig,
    rng: &mut PathRng,
) -> Vec<Individual> {
    let individuals = population.individuals();
    let count = individuals.len() / 2;
    let mut survivors = Vec::with_capacity(count);

    // Elitism
    survivors.extend(
        individuals[..config.elite_survivors.min(count)]
            .iter()
            .cloned(),
    );

    match method {
        SelectionMethod::RouletteWheel => roulette_wheel(individuals, count, &mut survivors, rng),
        SelectionMethod::StochasticUniversal => {
            stochastic_universal(population, count, &mut survivors, rng)
        }
        SelectionMethod::LinearRank => linear_rank(individuals, count, &mut survivors, rng),
        SelectionMethod::Tournament => {
            tournament(individuals, count, config.tournament_size, &mut survivors, rng)
        }
        SelectionMethod::Truncation | SelectionMethod::Combined => {
            let start = survivors.len();
            survivors.extend(individuals[start..count].iter().cloned());
        }
    }

    survivors
}

/// Inverted-cost scale: the fittest gets the largest weight.
fn inversion_scale(individuals: &[Individual]) -> f64 {
    let (min, max) = individuals
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), individual| {
            (min.min(individual.cost()), max.max(individual.cost()))
        });
    min + max
}

fn roulette_wheel(
    individuals: &[Individual],
    count: usize,
    survivors: &mut Vec<Individual>,
    rng: &mut PathRng,
) {
    let n = individuals.len();
    let total: f64 = individuals.iter().map(Individual::cost).sum();
    let scale = inversion_scale(individuals);

    while survivors.len() < count {
        let mut remaining = rng.unit() * total;
        let mut j = 0;
        loop {
            remaining -= scale - individuals[j].cost();
            j += 1;
            if remaining <= 0.0 || j >= n {
                break;
            }
        }
        survivors.push(individuals[j - 1].clone());
    }
}

fn stochastic_universal(
    population: &Population,
    count: usize,
    survivors: &mut Vec<Individual>,
    rng: &mut PathRng,
) {
    let individuals = population.individuals();
    let scale = inversion_scale(individuals);
    let weights: Vec<f64> = individuals.iter().map(|i| scale - i.cost()).collect();

    if weights.iter().sum::<f64>() <= 0.0 {
        let start = survivors.len();
        survivors.extend(individuals[start..count].iter().cloned());
        return;
    }

    let spacing = population.average_cost();
    let mut pointer = rng.unit() * spacing;
    let mut cumulative = weights[0];
    let mut j = 0;

    while survivors.len() < count {
        if pointer < cumulative {
            survivors.push(individuals[j].clone());
            pointer += spacing;
        } else if j + 1 == individuals.len() {
            // Ruler exhausted: restart with a fresh offset.
            j = 0;
            cumulative = weights[0];
            pointer = rng.unit() * spacing;
        } else {
            j += 1;
            cumulative += weights[j];
        }
    }
}

fn linear_rank(
    individuals: &[Individual],
    count: usize,
    survivors: &mut Vec<Individual>,
    rng: &mut PathRng,
) {
    let n = individuals.len() as f64;
    let draw_scale = 1.0 / (n - 2.001);

    while survivors.len() < count {
        // A slot with no accepted rank is retried.
        for (j, individual) in individuals.iter().enumerate() {
            let threshold = (n - j as f64) / (n * (n - 1.0));
            if threshold <= rng.unit() * draw_scale {
                survivors.push(individual.clone());
                break;
            }
        }
    }
}

fn tournament(
    individuals: &[Individual],
    count: usize,
    size: usize,
    survivors: &mut Vec<Individual>,
    rng: &mut PathRng,
) {
    let n = individuals.len();

    while survivors.len() < count {
        let mut winner = rng.index(0, n);
        for _ in 1..size {
            let challenger = rng.index(0, n);
            if individuals[challenger].cost() < individuals[winner].cost() {
                winner = challenger;
            }
        }
        survivors.push(individuals[winner].clone());
    }
}

/// Reliability of `method` estimated from repeated trial selections.
///
/// Rewards survivor diversity early and fitness quality as generations
/// advance.
pub fn reliability(
    method: SelectionMethod,
    population: &Population,
    generation: usize,
    config: &GeneticAlgorithmConfig,
    rng: &mut PathRng,
) -> f64 {
    let cost_of = |individual: Option<&Individual>| individual.map_or(0.0, Individual::cost);
    let mut best = cost_of(population.fittest());
    let mut worst = cost_of(population.worst());
    let mut mean_diversity = 0.0;

    for _ in 0..config.combined_selection_runs {
        let mut survivors = Population::empty(population.len() / 2);
        for individual in run_strategy(method, population, config, rng) {
            survivors.push(individual);
        }

        best = best.max(cost_of(survivors.fittest()));
        worst = worst.min(cost_of(survivors.worst()));
        mean_diversity += survivors.diversity();
    }
    mean_diversity /= config.combined_selection_runs as f64;

    let generation = generation as f64;
    mean_diversity / generation
        + (generation - 1.0) * worst / (best * best + worst * worst).sqrt() / generation
}

/// Score every candidate strategy and return the most reliable one.
///
/// Trials for each strategy run in parallel on child RNGs seeded from `rng`
/// in a fixed order. The first strategy with the strictly highest score wins.
pub fn most_reliable(
    population: &Population,
    generation: usize,
    config: &GeneticAlgorithmConfig,
    rng: &mut PathRng,
) -> SelectionMethod {
    let seeds: Vec<u64> = COMBINED_CANDIDATES.iter().map(|_| rng.next_seed()).collect();
    let scores: Vec<f64> = COMBINED_CANDIDATES
        .par_iter()
        .zip(seeds)
        .map(|(&method, seed)| {
            reliability(method, population, generation, config, &mut PathRng::new(seed))
        })
        .collect();

    let mut chosen = 0;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if scores[chosen] < *score {
            chosen = index;
        }
    }

    log::debug!(
        "Combined selection scores: {}; using {}",
        COMBINED_CANDIDATES
            .iter()
            .zip(&scores)
            .map(|(method, score)| format!("{method}={score:.4}"))
            .collect::<Vec<_>>()
            .join(", "),
        COMBINED_CANDIDATES[chosen]
    );

    COMBINED_CANDIDATES[chosen]
}
