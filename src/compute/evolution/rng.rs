//! Random source for the genetic operators.

use rand::prelude::*;

use crate::compute::{Environment, Point};

/// Random number generator wrapper for path operations.
#[derive(Debug, Clone)]
pub struct PathRng {
    rng: StdRng,
}

impl PathRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// Uniform draw from `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.rng.r#gen()
    }

    /// Bernoulli trial with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index in `[low, high)`.
    #[inline]
    pub fn index(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..high)
    }

    /// `count` distinct indices from `[low, high)`, ascending.
    pub fn distinct_indices(&mut self, low: usize, high: usize, count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = rand::seq::index::sample(&mut self.rng, high - low, count)
            .into_iter()
            .map(|i| i + low)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Uniform chromosome length within the environment's bounds.
    pub fn chromosome_length(&mut self, env: &Environment) -> usize {
        self.rng.gen_range(env.min_length()..=env.max_length())
    }

    /// Uniform waypoint within the environment's bounds.
    pub fn waypoint(&mut self, env: &Environment) -> Point {
        Point::new(
            self.unit() * env.width(),
            self.unit() * env.height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = PathRng::new(7);
        let mut b = PathRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_seed(), b.next_seed());
        }
    }

    #[test]
    fn test_waypoint_in_bounds() {
        let env = Environment::with_obstacles(Vec::new());
        let mut rng = PathRng::new(1);
        for _ in 0..1000 {
            let p = rng.waypoint(&env);
            assert!((0.0..env.width()).contains(&p.x));
            assert!((0.0..env.height()).contains(&p.y));
        }
    }

    #[test]
    fn test_distinct_indices() {
        let mut rng = PathRng::new(3);
        for count in 1..=5 {
            let indices = rng.distinct_indices(2, 7, count);
            assert_eq!(indices.len(), count);
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
            assert!(indices.iter().all(|i| (2..7).contains(i)));
        }
    }

    #[test]
    fn test_chromosome_length_in_bounds() {
        let env = Environment::with_obstacles(Vec::new());
        let mut rng = PathRng::new(2);
        let mut seen = [false; 11];
        for _ in 0..1000 {
            let len = rng.chromosome_length(&env);
            assert!((5..=10).contains(&len));
            seen[len] = true;
        }
        assert!(seen[5] && seen[10]);
    }
}
