//! Candidate paths (individuals) and their mutation operators.
//!
//! A chromosome is the ordered list of waypoints from the origin to the goal.
//! Cost and feasibility are cached on the individual and refreshed after every
//! structural change, so callers never observe a stale cost.

use std::fmt;

use crate::compute::{Environment, Point, Segment};

use super::rng::PathRng;

/// Rejected explicit chromosomes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndividualError {
    #[error("Chromosome length {length} outside [{min}, {max}]")]
    LengthOutOfBounds { length: usize, min: usize, max: usize },
    #[error("Path must start at the origin, starts at {0}")]
    StartNotOrigin(Point),
    #[error("Path must end at the goal {goal}, ends at {end}")]
    EndNotGoal { end: Point, goal: Point },
}

/// Intersection points of one path segment with obstacle boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCollisions {
    /// Index `i` of the segment `chromosome[i] -> chromosome[i + 1]`.
    pub segment: usize,
    /// Crossings ordered from the segment's start.
    pub points: Vec<Point>,
}

/// Structural mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    /// Insert a random interior waypoint.
    Add,
    /// Remove a random interior waypoint.
    Delete,
    /// Replace a random interior waypoint.
    Change,
    /// Greedily drop waypoints between collision-free segments.
    Shorten,
}

impl MutationOperator {
    pub const ALL: [MutationOperator; 4] = [
        MutationOperator::Add,
        MutationOperator::Delete,
        MutationOperator::Change,
        MutationOperator::Shorten,
    ];

    /// Operator tried next when this one does not apply.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::Add => Some(Self::Delete),
            Self::Delete => Some(Self::Change),
            Self::Change | Self::Shorten => None,
        }
    }

    /// Whether the operator can run on a chromosome of `length` waypoints.
    pub fn is_applicable(self, length: usize, env: &Environment) -> bool {
        match self {
            Self::Add => length < env.max_length(),
            Self::Delete => length > env.min_length(),
            Self::Change => length > 2,
            Self::Shorten => true,
        }
    }

    /// First applicable operator in the chain `self -> fallback -> ...`.
    pub fn resolve(self, length: usize, env: &Environment) -> Option<Self> {
        std::iter::successors(Some(self), |op| op.fallback())
            .find(|op| op.is_applicable(length, env))
    }
}

/// A candidate path with its cached cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    chromosome: Vec<Point>,
    cost: f64,
    feasible: bool,
}

impl Individual {
    /// Random individual with a length drawn uniformly from the bounds.
    pub fn random(env: &Environment, rng: &mut PathRng) -> Self {
        let length = rng.chromosome_length(env);
        Self::random_with_length(env, length, rng)
    }

    /// Origin, `length - 2` random interior waypoints, goal.
    ///
    /// `length` is clamped to the environment's chromosome bounds.
    pub fn random_with_length(env: &Environment, length: usize, rng: &mut PathRng) -> Self {
        let interior = length.clamp(env.min_length(), env.max_length()) - 2;
        let mut chromosome = Vec::with_capacity(interior + 2);
        chromosome.push(env.origin());
        chromosome.extend((0..interior).map(|_| rng.waypoint(env)));
        chromosome.push(env.goal());
        Self::from_chromosome(env, chromosome)
    }

    /// Individual from explicit waypoints.
    ///
    /// The path must start at the origin, end at the goal (both within the
    /// float threshold) and respect the chromosome length bounds.
    pub fn from_waypoints(env: &Environment, waypoints: Vec<Point>) -> Result<Self, IndividualError> {
        let length = waypoints.len();
        if length < env.min_length() || length > env.max_length() {
            return Err(IndividualError::LengthOutOfBounds {
                length,
                min: env.min_length(),
                max: env.max_length(),
            });
        }
        let (first, last) = (waypoints[0], waypoints[length - 1]);
        if !first.approx_eq(&env.origin(), env.float_threshold()) {
            return Err(IndividualError::StartNotOrigin(first));
        }
        if !env.is_goal(&last) {
            return Err(IndividualError::EndNotGoal {
                end: last,
                goal: env.goal(),
            });
        }
        Ok(Self::from_chromosome(env, waypoints))
    }

    /// Wrap an already valid chromosome and evaluate it.
    pub(crate) fn from_chromosome(env: &Environment, chromosome: Vec<Point>) -> Self {
        let mut individual = Self {
            chromosome,
            cost: 0.0,
            feasible: true,
        };
        individual.refresh(env);
        individual
    }

    pub fn chromosome(&self) -> &[Point] {
        &self.chromosome
    }

    /// Number of waypoints, including start and goal.
    #[inline]
    pub fn length(&self) -> usize {
        self.chromosome.len()
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Whether no segment touches any obstacle boundary.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Segment `chromosome[index] -> chromosome[index + 1]`.
    #[inline]
    pub fn segment(&self, index: usize) -> Segment {
        Segment::new(self.chromosome[index], self.chromosome[index + 1])
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.chromosome
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
    }

    /// Total Euclidean length of the path.
    pub fn path_length(&self) -> f64 {
        self.segments().map(|segment| segment.length()).sum()
    }

    /// Boundary crossings per segment, in ascending segment order.
    ///
    /// Crossings already reported for the previous segment (a waypoint lying
    /// exactly on a boundary) are removed so each crossing is counted once.
    /// Segments without crossings are omitted.
    pub fn detect_collisions(&self, env: &Environment) -> Vec<SegmentCollisions> {
        let threshold = env.float_threshold();
        let mut collisions: Vec<SegmentCollisions> = Vec::new();

        for (index, segment) in self.segments().enumerate() {
            let mut points = env.boundary_crossings(&segment);

            if let Some(previous) = collisions.last().filter(|c| c.segment + 1 == index) {
                for shared in &previous.points {
                    if let Some(pos) = points.iter().position(|p| p.approx_eq(shared, threshold)) {
                        points.remove(pos);
                    }
                }
            }

            if !points.is_empty() {
                collisions.push(SegmentCollisions {
                    segment: index,
                    points,
                });
            }
        }

        collisions
    }

    /// Distance travelled inside obstacles.
    ///
    /// Crossings are consumed as entry/exit pairs. An odd crossing count
    /// leaves the path inside an obstacle at the end of the segment; the
    /// distance then keeps accumulating over the following segments until
    /// the next crossing.
    pub fn collision_distance(&self, env: &Environment) -> f64 {
        let chromosome = &self.chromosome;
        let mut distance = 0.0;
        let mut inside = false;
        let mut offset = 0;
        let mut resume_from = 0;

        for SegmentCollisions { segment, points } in self.detect_collisions(env) {
            if inside {
                distance += (resume_from..segment)
                    .map(|i| chromosome[i].distance(&chromosome[i + 1]))
                    .sum::<f64>();
                distance += chromosome[segment].distance(&points[0]);
            }

            distance += points[offset..]
                .chunks_exact(2)
                .map(|pair| pair[0].distance(&pair[1]))
                .sum::<f64>();

            if (points.len() - offset) % 2 == 1 {
                inside = true;
                offset = 1;
                if let Some(last) = points.last() {
                    distance += last.distance(&chromosome[segment + 1]);
                }
            } else {
                inside = false;
                offset = 0;
            }

            resume_from = segment + 1;
        }

        distance
    }

    /// Recompute feasibility and cost from the chromosome.
    fn refresh(&mut self, env: &Environment) {
        let length = self.path_length();
        let feasible = self.segments().all(|segment| env.is_clear(&segment));
        self.feasible = feasible;
        self.cost = if self.feasible {
            length
        } else {
            length + env.penalty_factor() * (self.collision_distance(env) + 1.0)
        };
    }

    /// Apply a uniformly chosen mutation operator.
    ///
    /// Returns the operator that actually ran after falling back from
    /// inapplicable ones.
    pub fn mutate(&mut self, env: &Environment, rng: &mut PathRng) -> Option<MutationOperator> {
        let chosen = MutationOperator::ALL[rng.index(0, MutationOperator::ALL.len())];
        let operator = chosen.resolve(self.length(), env)?;
        self.apply(operator, env, rng);
        Some(operator)
    }

    /// Run `operator` unconditionally and refresh the cost.
    ///
    /// Callers resolve the operator first; `Add` and `Delete` do not check
    /// the length bounds.
    fn apply(&mut self, operator: MutationOperator, env: &Environment, rng: &mut PathRng) {
        let interior = 1..self.chromosome.len().saturating_sub(1);
        match operator {
            MutationOperator::Shorten => {
                self.shorten(env);
                return;
            }
            _ if interior.is_empty() => {}
            MutationOperator::Add => {
                let at = rng.index(interior.start, interior.end);
                let waypoint = rng.waypoint(env);
                self.chromosome.insert(at, waypoint);
            }
            MutationOperator::Delete => {
                self.chromosome.remove(rng.index(interior.start, interior.end));
            }
            MutationOperator::Change => {
                let at = rng.index(interior.start, interior.end);
                self.chromosome[at] = rng.waypoint(env);
            }
        }
        self.refresh(env);
    }

    /// Remove waypoints whose two adjacent segments are both collision-free.
    ///
    /// Scans repeat until a full pass removes nothing; the length never drops
    /// below the minimum.
    pub fn shorten(&mut self, env: &Environment) {
        loop {
            let mut removed = false;
            let mut i = 0;
            while i + 2 < self.chromosome.len() {
                if self.chromosome.len() > env.min_length()
                    && env.is_clear(&self.segment(i))
                    && env.is_clear(&self.segment(i + 1))
                {
                    self.chromosome.remove(i + 1);
                    removed = true;
                }
                i += 1;
            }
            if !removed {
                break;
            }
        }
        self.refresh(env);
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.chromosome.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({:06.2}, {:06.2})", p.x, p.y)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Obstacle;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square_env() -> Environment {
        Environment::with_obstacles(vec![
            Obstacle::new(vec![p(40.0, 30.0), p(60.0, 30.0), p(60.0, 50.0), p(40.0, 50.0)]).unwrap(),
        ])
    }

    fn empty_env() -> Environment {
        Environment::with_obstacles(Vec::new())
    }

    #[test]
    fn test_random_individual_endpoints() {
        let env = square_env();
        let mut rng = PathRng::new(42);

        for _ in 0..100 {
            let individual = Individual::random(&env, &mut rng);
            assert_eq!(individual.chromosome()[0], Point::ORIGIN);
            assert_eq!(*individual.chromosome().last().unwrap(), env.goal());
            assert!((5..=10).contains(&individual.length()));
            assert!(individual.cost() >= individual.path_length());
        }
    }

    #[test]
    fn test_feasible_cost_is_path_length() {
        let env = empty_env();
        let individual = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(30.0, 0.0), p(60.0, 0.0), p(90.0, 40.0), p(120.0, 80.0)],
        )
        .unwrap();

        assert!(individual.is_feasible());
        assert_eq!(individual.cost(), individual.path_length());
        assert!((individual.path_length() - 160.0).abs() < 1e-9);
        assert_eq!(individual.collision_distance(&env), 0.0);
    }

    #[test]
    fn test_square_crossing() {
        let env = square_env();
        let individual = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(0.0, 40.0), p(30.0, 40.0), p(70.0, 40.0), p(120.0, 80.0)],
        )
        .unwrap();

        let collisions = individual.detect_collisions(&env);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].segment, 2);
        assert_eq!(collisions[0].points.len(), 2);
        assert!(collisions[0].points[0].approx_eq(&p(40.0, 40.0), 1e-9));
        assert!(collisions[0].points[1].approx_eq(&p(60.0, 40.0), 1e-9));

        assert!(!individual.is_feasible());
        assert!((individual.collision_distance(&env) - 20.0).abs() < 1e-9);

        let expected = individual.path_length() + env.penalty_factor() * (20.0 + 1.0);
        assert!((individual.cost() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_waypoint_inside_obstacle() {
        let env = square_env();
        let individual = Individual::from_waypoints(
            &env,
            vec![
                p(0.0, 0.0),
                p(0.0, 40.0),
                p(30.0, 40.0),
                p(50.0, 40.0),
                p(70.0, 40.0),
                p(120.0, 80.0),
            ],
        )
        .unwrap();

        let collisions = individual.detect_collisions(&env);
        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].points.len(), 1);
        assert_eq!(collisions[1].points.len(), 1);
        assert!((individual.collision_distance(&env) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_inside_across_clear_segments() {
        let env = square_env();
        let waypoints = vec![
            p(0.0, 0.0),
            p(30.0, 40.0),
            p(45.0, 40.0),
            p(55.0, 45.0),
            p(70.0, 40.0),
            p(120.0, 80.0),
        ];
        let individual = Individual::from_waypoints(&env, waypoints.clone()).unwrap();

        let collisions = individual.detect_collisions(&env);
        let segments: Vec<usize> = collisions.iter().map(|c| c.segment).collect();
        assert_eq!(segments, vec![1, 3]);

        let exit = collisions[1].points[0];
        assert!((exit.x - 60.0).abs() < 1e-9);

        let expected = p(40.0, 40.0).distance(&waypoints[2])
            + waypoints[2].distance(&waypoints[3])
            + waypoints[3].distance(&exit);
        assert!((individual.collision_distance(&env) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_waypoint_on_boundary_counted_once() {
        let env = square_env();
        // (40, 40) lies on the left edge and is shared by segments 1 and 2.
        let individual = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(40.0, 40.0), p(70.0, 40.0), p(90.0, 60.0), p(120.0, 80.0)],
        )
        .unwrap();

        let collisions = individual.detect_collisions(&env);
        let total: usize = collisions.iter().map(|c| c.points.len()).sum();
        assert_eq!(total, 2);
        assert!((individual.collision_distance(&env) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_waypoints_rejects_wrong_goal() {
        let env = Environment::new(&crate::schema::EnvironmentConfig {
            chromosome: crate::schema::ChromosomeBounds {
                min_length: 4,
                max_length: 10,
            },
            ..Default::default()
        })
        .unwrap();

        let short = Individual::from_waypoints(&env, vec![p(0.0, 0.0), p(130.0, 90.0)]);
        assert!(matches!(
            short,
            Err(IndividualError::LengthOutOfBounds { length: 2, .. })
        ));

        let wrong_goal = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(10.0, 10.0), p(20.0, 20.0), p(130.0, 90.0)],
        );
        assert_eq!(
            wrong_goal.unwrap_err(),
            IndividualError::EndNotGoal {
                end: p(130.0, 90.0),
                goal: p(120.0, 80.0)
            }
        );

        let wrong_start = Individual::from_waypoints(
            &env,
            vec![p(1.0, 0.0), p(10.0, 10.0), p(20.0, 20.0), p(120.0, 80.0)],
        );
        assert!(matches!(wrong_start, Err(IndividualError::StartNotOrigin(_))));
    }

    #[test]
    fn test_clone_is_independent() {
        let env = square_env();
        let mut rng = PathRng::new(3);
        let original = Individual::random(&env, &mut rng);
        let mut copy = original.clone();

        assert_eq!(copy.chromosome(), original.chromosome());
        assert_eq!(copy.cost(), original.cost());

        copy.apply(MutationOperator::Change, &env, &mut rng);
        assert_ne!(copy.chromosome(), original.chromosome());
    }

    #[test]
    fn test_mutation_cascade() {
        let env = empty_env();

        assert_eq!(MutationOperator::Add.resolve(10, &env), Some(MutationOperator::Delete));
        assert_eq!(MutationOperator::Add.resolve(7, &env), Some(MutationOperator::Add));
        assert_eq!(MutationOperator::Delete.resolve(5, &env), Some(MutationOperator::Change));
        assert_eq!(MutationOperator::Shorten.resolve(5, &env), Some(MutationOperator::Shorten));

        let fixed = Environment::new(&crate::schema::EnvironmentConfig {
            chromosome: crate::schema::ChromosomeBounds {
                min_length: 6,
                max_length: 6,
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(MutationOperator::Add.resolve(6, &fixed), Some(MutationOperator::Change));
    }

    #[test]
    fn test_mutate_preserves_invariants() {
        let env = square_env();
        let mut rng = PathRng::new(11);
        let mut individual = Individual::random(&env, &mut rng);

        for _ in 0..500 {
            let before = individual.length();
            let operator = individual.mutate(&env, &mut rng).unwrap();
            match operator {
                MutationOperator::Add => assert_eq!(individual.length(), before + 1),
                MutationOperator::Delete => assert_eq!(individual.length(), before - 1),
                MutationOperator::Change => assert_eq!(individual.length(), before),
                MutationOperator::Shorten => assert!(individual.length() <= before),
            }
            assert!((5..=10).contains(&individual.length()));
            assert_eq!(individual.chromosome()[0], Point::ORIGIN);
            assert_eq!(*individual.chromosome().last().unwrap(), env.goal());

            let fresh = Individual::from_chromosome(&env, individual.chromosome().to_vec());
            assert_eq!(fresh.cost(), individual.cost());
        }
    }

    #[test]
    fn test_mutate_at_length_bounds() {
        let env = empty_env();
        let mut rng = PathRng::new(13);

        for _ in 0..200 {
            let mut longest = Individual::random_with_length(&env, env.max_length(), &mut rng);
            let operator = longest.mutate(&env, &mut rng).unwrap();
            assert_ne!(operator, MutationOperator::Add);
            assert!(longest.length() <= env.max_length());

            let mut shortest = Individual::random_with_length(&env, env.min_length(), &mut rng);
            let operator = shortest.mutate(&env, &mut rng).unwrap();
            assert_ne!(operator, MutationOperator::Delete);
            assert_eq!(shortest.length(), env.min_length());
        }
    }

    #[test]
    fn test_refresh_tracks_feasibility() {
        let env = square_env();
        let mut individual = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(30.0, 10.0), p(70.0, 20.0), p(100.0, 50.0), p(120.0, 80.0)],
        )
        .unwrap();
        assert!(individual.is_feasible());

        // Drop a waypoint into the square.
        individual.chromosome[2] = p(50.0, 40.0);
        individual.refresh(&env);
        assert!(!individual.is_feasible());
        assert!(individual.cost() > individual.path_length() + env.penalty_factor());
    }

    #[test]
    fn test_random_with_length_clamps_to_bounds() {
        let env = square_env();
        let mut rng = PathRng::new(21);

        for requested in [0, 1, 3] {
            let individual = Individual::random_with_length(&env, requested, &mut rng);
            assert_eq!(individual.length(), env.min_length());
            assert_eq!(individual.chromosome()[0], Point::ORIGIN);
            assert_eq!(*individual.chromosome().last().unwrap(), env.goal());
        }
        let individual = Individual::random_with_length(&env, 50, &mut rng);
        assert_eq!(individual.length(), env.max_length());

        // Short requests still give crossover enough room for its cuts.
        let a = Individual::random_with_length(&env, 3, &mut rng);
        let b = Individual::random_with_length(&env, 3, &mut rng);
        let [x, y] = crate::compute::evolution::k_point(&env, &a, &b, &mut rng);
        assert_eq!(x.length(), env.min_length());
        assert_eq!(y.length(), env.min_length());
    }

    #[test]
    fn test_shorten_straightens_clear_path() {
        let env = empty_env();
        let mut rng = PathRng::new(5);
        let mut individual = Individual::random_with_length(&env, 10, &mut rng);

        individual.shorten(&env);
        assert_eq!(individual.length(), env.min_length());

        let once = individual.chromosome().to_vec();
        individual.shorten(&env);
        assert_eq!(individual.chromosome(), once.as_slice());
    }

    #[test]
    fn test_display() {
        let env = empty_env();
        let individual = Individual::from_waypoints(
            &env,
            vec![p(0.0, 0.0), p(5.5, 1.25), p(30.0, 40.0), p(60.0, 70.0), p(120.0, 80.0)],
        )
        .unwrap();
        assert_eq!(
            individual.to_string(),
            "{(000.00, 000.00), (005.50, 001.25), (030.00, 040.00), (060.00, 070.00), (120.00, 080.00)}"
        );
    }
}
