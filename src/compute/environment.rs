//! Evaluation context shared by every individual.

use crate::schema::{ChromosomeBounds, ConfigError, EnvironmentConfig};

use super::geometry::{Point, Segment};
use super::obstacle::Obstacle;

/// Obstacles, bounds and evaluation constants.
///
/// Built once from an [`EnvironmentConfig`] and passed by reference into all
/// feasibility, cost and mutation operations.
#[derive(Debug, Clone)]
pub struct Environment {
    obstacles: Vec<Obstacle>,
    width: f64,
    height: f64,
    goal: Point,
    penalty_factor: f64,
    float_threshold: f64,
    bounds: ChromosomeBounds,
}

impl Environment {
    /// Validate `config` and build the environment.
    pub fn new(config: &EnvironmentConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let obstacles = config
            .obstacles
            .iter()
            .enumerate()
            .map(|(index, obstacle)| {
                Obstacle::try_from(obstacle)
                    .map_err(|source| ConfigError::InvalidObstacle { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            obstacles,
            width: config.width,
            height: config.height,
            goal: config.goal,
            penalty_factor: config.penalty_factor,
            float_threshold: config.float_threshold,
            bounds: config.chromosome,
        })
    }

    /// Default configuration with the given obstacles.
    pub fn with_obstacles(obstacles: Vec<Obstacle>) -> Self {
        let config = EnvironmentConfig::default();
        Self {
            obstacles,
            width: config.width,
            height: config.height,
            goal: config.goal,
            penalty_factor: config.penalty_factor,
            float_threshold: config.float_threshold,
            bounds: config.chromosome,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::ORIGIN
    }

    #[inline]
    pub fn goal(&self) -> Point {
        self.goal
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn penalty_factor(&self) -> f64 {
        self.penalty_factor
    }

    #[inline]
    pub fn float_threshold(&self) -> f64 {
        self.float_threshold
    }

    #[inline]
    pub fn min_length(&self) -> usize {
        self.bounds.min_length
    }

    #[inline]
    pub fn max_length(&self) -> usize {
        self.bounds.max_length
    }

    /// Whether `point` equals the goal within the float threshold.
    #[inline]
    pub fn is_goal(&self, point: &Point) -> bool {
        point.approx_eq(&self.goal, self.float_threshold)
    }

    /// Whether `segment` avoids every obstacle boundary.
    pub fn is_clear(&self, segment: &Segment) -> bool {
        !self.obstacles.iter().any(|obstacle| obstacle.intersects(segment))
    }

    /// Intersection points of `segment` with all obstacle boundaries.
    ///
    /// Points closer than the float threshold to an earlier point are
    /// dropped. The result is ordered by distance from `segment.start`.
    pub fn boundary_crossings(&self, segment: &Segment) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();

        for edge in self.obstacles.iter().flat_map(Obstacle::boundaries) {
            if !segment.intersects(&edge) {
                continue;
            }
            let Some(point) = segment.intersection_point(&edge) else {
                continue;
            };
            if !points
                .iter()
                .any(|seen| seen.approx_eq(&point, self.float_threshold))
            {
                points.push(point);
            }
        }

        let start = segment.start;
        points.sort_by(|a, b| start.distance(a).total_cmp(&start.distance(b)));
        points
    }
}
