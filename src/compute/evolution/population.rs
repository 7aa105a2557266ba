//! Cost-ordered collections of individuals.

use std::fmt;

use rayon::prelude::*;

use crate::compute::Environment;
use crate::schema::GenerationSummary;

use super::individual::Individual;
use super::rng::PathRng;

/// A generation of individuals with a fixed target size.
///
/// After [`Population::sort_by_cost`] the individuals are ascending by cost,
/// so index 0 is the fittest.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
    size: usize,
}

impl Population {
    /// Empty population to be filled slot by slot.
    pub fn empty(size: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(size),
            size,
        }
    }

    /// Sorted population of `size` random individuals.
    ///
    /// Individuals are built in parallel, each from its own child RNG whose
    /// seed is drawn sequentially from `rng`, so the result only depends on
    /// the state of `rng`.
    pub fn random(env: &Environment, size: usize, rng: &mut PathRng) -> Self {
        let seeds: Vec<u64> = (0..size).map(|_| rng.next_seed()).collect();
        let individuals = seeds
            .into_par_iter()
            .map(|seed| Individual::random(env, &mut PathRng::new(seed)))
            .collect();

        let mut population = Self { individuals, size };
        population.sort_by_cost();
        population
    }

    /// The most diverse of `attempts + 1` random populations.
    pub fn most_diverse(env: &Environment, size: usize, attempts: usize, rng: &mut PathRng) -> Self {
        let mut best = Self::random(env, size, rng);
        let mut best_diversity = best.diversity();

        for attempt in 0..attempts {
            let candidate = Self::random(env, size, rng);
            let diversity = candidate.diversity();
            log::debug!("Initial population {}: diversity {diversity:.4}", attempt + 1);
            if diversity > best_diversity {
                best = candidate;
                best_diversity = diversity;
            }
        }

        best
    }

    /// Target number of individuals.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.individuals.len() >= self.size
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Append an individual; ignored once the population is full.
    pub fn push(&mut self, individual: Individual) {
        if !self.is_full() {
            self.individuals.push(individual);
        }
    }

    /// Top up with random individuals until the population is full.
    pub fn fill_random(&mut self, env: &Environment, rng: &mut PathRng) {
        while !self.is_full() {
            self.individuals.push(Individual::random(env, rng));
        }
    }

    /// Ascending sort by cost. Ties keep no particular order.
    pub fn sort_by_cost(&mut self) {
        self.individuals
            .sort_unstable_by(|a, b| a.cost().total_cmp(&b.cost()));
    }

    /// Lowest-cost individual (first one on ties).
    pub fn fittest(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|best, candidate| if candidate.cost() < best.cost() { candidate } else { best })
    }

    /// Highest-cost individual (first one on ties).
    pub fn worst(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .reduce(|worst, candidate| if candidate.cost() > worst.cost() { candidate } else { worst })
    }

    /// Sorts, then returns the lower-middle individual.
    pub fn median(&mut self) -> Option<&Individual> {
        if self.individuals.is_empty() {
            return None;
        }
        self.sort_by_cost();
        self.individuals.get((self.individuals.len() - 1) / 2)
    }

    pub fn total_cost(&self) -> f64 {
        self.individuals.iter().map(Individual::cost).sum()
    }

    pub fn average_cost(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.total_cost() / self.individuals.len() as f64
    }

    /// Mean chromosome length.
    pub fn average_length(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        let total: usize = self.individuals.iter().map(Individual::length).sum();
        total as f64 / self.individuals.len() as f64
    }

    /// Population standard deviation of cost.
    pub fn diversity(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        let mean = self.average_cost();
        let variance = self
            .individuals
            .iter()
            .map(|individual| (individual.cost() - mean).powi(2))
            .sum::<f64>()
            / self.individuals.len() as f64;
        variance.sqrt()
    }

    /// Individuals ordered by cost without reordering the population.
    fn ranked(&self) -> Vec<&Individual> {
        let mut ranked: Vec<&Individual> = self.individuals.iter().collect();
        ranked.sort_by(|a, b| a.cost().total_cmp(&b.cost()));
        ranked
    }

    /// Statistics for one generation.
    pub fn summary(&self, generation: usize) -> GenerationSummary {
        let ranked = self.ranked();
        let cost_at = |index: usize| ranked.get(index).map_or(0.0, |individual| individual.cost());

        GenerationSummary {
            generation,
            average_length: self.average_length(),
            diversity: self.diversity(),
            average_cost: self.average_cost(),
            min_cost: cost_at(0),
            max_cost: cost_at(ranked.len().saturating_sub(1)),
            median_cost: cost_at(ranked.len().saturating_sub(1) / 2),
        }
    }

    /// Fittest / least fit / median paths with average cost and diversity.
    pub fn statistics_report(&self) -> String {
        let ranked = self.ranked();
        let mut report = String::new();

        let rows = [
            ("Fittest", ranked.first()),
            ("Least Fit", ranked.last()),
            ("Median", ranked.get(ranked.len().saturating_sub(1) / 2)),
        ];
        for (label, individual) in rows {
            if let Some(individual) = individual {
                report.push_str(&format!(
                    "{label}:\t{individual}\n\tCost: {:.4}\n",
                    individual.cost()
                ));
            }
        }

        report.push_str(&format!("Average Cost:\t{:.4}\n", self.average_cost()));
        report.push_str(&format!("Diversity:\t{:.4}\n", self.diversity()));
        report
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, individual) in self.individuals.iter().enumerate() {
            writeln!(f, "{index:>4}: {:>10.4} {individual}", individual.cost())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Obstacle, Point};

    fn env() -> Environment {
        Environment::with_obstacles(vec![
            Obstacle::new(vec![
                Point::new(40.0, 30.0),
                Point::new(60.0, 30.0),
                Point::new(60.0, 50.0),
                Point::new(40.0, 50.0),
            ])
            .unwrap(),
        ])
    }

    #[test]
    fn test_random_population_sorted() {
        let env = env();
        let mut rng = PathRng::new(42);
        let population = Population::random(&env, 50, &mut rng);

        assert_eq!(population.len(), 50);
        assert!(population.is_full());
        for pair in population.individuals().windows(2) {
            assert!(pair[0].cost() <= pair[1].cost());
        }
        assert_eq!(
            population.fittest().unwrap().cost(),
            population.individuals()[0].cost()
        );
        assert_eq!(
            population.worst().unwrap().cost(),
            population.individuals()[49].cost()
        );
    }

    #[test]
    fn test_random_population_is_reproducible() {
        let env = env();
        let a = Population::random(&env, 20, &mut PathRng::new(8));
        let b = Population::random(&env, 20, &mut PathRng::new(8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_median_lower_middle() {
        let env = env();
        let mut rng = PathRng::new(1);
        let mut population = Population::random(&env, 10, &mut rng);
        let expected = population.individuals()[4].cost();
        assert_eq!(population.median().unwrap().cost(), expected);

        assert!(Population::empty(4).median().is_none());
    }

    #[test]
    fn test_statistics() {
        let env = Environment::with_obstacles(Vec::new());
        let mut population = Population::empty(3);
        for waypoints in [
            vec![(0.0, 0.0), (30.0, 0.0), (60.0, 0.0), (90.0, 40.0), (120.0, 80.0)],
            vec![(0.0, 0.0), (0.0, 20.0), (0.0, 40.0), (0.0, 80.0), (120.0, 80.0)],
            vec![(0.0, 0.0), (40.0, 0.0), (120.0, 0.0), (120.0, 40.0), (120.0, 80.0)],
        ] {
            let waypoints = waypoints.into_iter().map(Point::from).collect();
            population.push(Individual::from_waypoints(&env, waypoints).unwrap());
        }
        // Ignored once full.
        population.push(population.individuals()[0].clone());

        assert_eq!(population.len(), 3);
        assert!((population.total_cost() - 160.0 - 200.0 - 200.0).abs() < 1e-9);
        assert!((population.average_length() - 5.0).abs() < 1e-12);

        let mean = 560.0 / 3.0;
        let expected = (((160.0 - mean) * (160.0f64 - mean)
            + 2.0 * (200.0 - mean) * (200.0f64 - mean))
            / 3.0)
            .sqrt();
        assert!((population.diversity() - expected).abs() < 1e-9);

        let summary = population.summary(7);
        assert_eq!(summary.generation, 7);
        assert!((summary.min_cost - 160.0).abs() < 1e-9);
        assert!((summary.max_cost - 200.0).abs() < 1e-9);
        assert!((summary.median_cost - 200.0).abs() < 1e-9);

        let report = population.statistics_report();
        assert!(report.contains("Fittest:"));
        assert!(report.contains("Least Fit:"));
        assert!(report.contains("Diversity:"));
    }

    #[test]
    fn test_most_diverse_beats_first_draw() {
        let env = env();
        let first = Population::random(&env, 30, &mut PathRng::new(5));
        let best = Population::most_diverse(&env, 30, 4, &mut PathRng::new(5));
        assert!(best.diversity() >= first.diversity());
    }

    #[test]
    fn test_fill_random() {
        let env = env();
        let mut rng = PathRng::new(2);
        let mut population = Population::empty(6);
        population.fill_random(&env, &mut rng);
        assert_eq!(population.len(), 6);
        assert_eq!(population.to_string().lines().count(), 6);
    }
}
