//! Crossover operators.

use crate::compute::{Environment, Point};

use super::EvolutionError;
use super::individual::Individual;
use super::rng::PathRng;

/// Parents whose nodes are closer than this are considered converged.
pub const CONVERGENCE_DISTANCE: f64 = 2.0;

/// Exchange prefixes at one random cut in `[2, min_len - 2]`.
///
/// The first offspring takes `parent1`'s prefix and `parent2`'s suffix (so it
/// has `parent2`'s length), the second the reverse.
pub fn one_point(
    env: &Environment,
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut PathRng,
) -> [Individual; 2] {
    let shared = parent1.length().min(parent2.length());
    let cut = rng.index(2, shared - 1);
    offspring_pair(env, parent1, parent2, &[cut])
}

/// Alternate ownership over `k` distinct sorted cuts in `[2, min_len - 2]`.
///
/// `k` is drawn from `[1, min_len - 3]`. The tail after the last cut always
/// comes from the parent whose length the offspring inherits, so both
/// offspring end at the goal.
pub fn k_point(
    env: &Environment,
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut PathRng,
) -> [Individual; 2] {
    let shared = parent1.length().min(parent2.length());
    let count = rng.index(1, shared - 2);
    let cuts = rng.distinct_indices(2, shared - 1, count);
    offspring_pair(env, parent1, parent2, &cuts)
}

fn offspring_pair(
    env: &Environment,
    parent1: &Individual,
    parent2: &Individual,
    cuts: &[usize],
) -> [Individual; 2] {
    [
        Individual::from_chromosome(env, splice(parent1, parent2, cuts)),
        Individual::from_chromosome(env, splice(parent2, parent1, cuts)),
    ]
}

/// `first` owns even segments, `second` owns odd segments and the tail.
fn splice(first: &Individual, second: &Individual, cuts: &[usize]) -> Vec<Point> {
    let mut chromosome = Vec::with_capacity(second.length());
    let mut start = 0;
    for (segment, &cut) in cuts.iter().enumerate() {
        let owner = if segment % 2 == 0 { first } else { second };
        chromosome.extend_from_slice(&owner.chromosome()[start..cut]);
        start = cut;
    }
    chromosome.extend_from_slice(&second.chromosome()[start..]);
    chromosome
}

/// Build one offspring by walking both parents in lock-step.
///
/// Where the parents' nodes nearly coincide the offspring follows the
/// feasible parent, or on equal feasibility the one whose next node is
/// closer to the goal. Elsewhere it keeps following the last chosen parent
/// (initially `parent2`) until a goal node is appended.
///
/// Fails with [`EvolutionError::CrossoverDiverged`] after
/// `2 * max(len1, len2)` nodes or when the followed parent runs out.
pub fn intelligent(
    env: &Environment,
    parent1: &Individual,
    parent2: &Individual,
) -> Result<Individual, EvolutionError> {
    let (first, second) = (parent1.chromosome(), parent2.chromosome());
    let shared = first.len().min(second.len());
    let limit = 2 * first.len().max(second.len());
    let goal = env.goal();

    let mut follow_first = false;
    let mut chromosome = Vec::with_capacity(limit);

    loop {
        let i = chromosome.len();
        if i >= limit {
            return Err(EvolutionError::CrossoverDiverged { limit });
        }

        let node = if i + 1 < shared && first[i].distance(&second[i]) < CONVERGENCE_DISTANCE {
            follow_first = if parent1.is_feasible() == parent2.is_feasible() {
                first[i + 1].distance(&goal) < second[i + 1].distance(&goal) + env.float_threshold()
            } else {
                parent1.is_feasible()
            };
            if follow_first { first[i] } else { second[i] }
        } else {
            let followed = if follow_first { first } else { second };
            *followed
                .get(i)
                .ok_or(EvolutionError::CrossoverDiverged { limit })?
        };

        chromosome.push(node);
        if env.is_goal(&node) {
            break;
        }
    }

    Ok(Individual::from_chromosome(env, chromosome))
}
