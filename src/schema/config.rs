//! Configuration types for the path-planning environment.

use serde::{Deserialize, Serialize};

use crate::compute::{ObstacleError, Point};

/// Environment and path-evaluation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Width of the search area; waypoints are drawn from `[0, width)`.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Height of the search area; waypoints are drawn from `[0, height)`.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Fixed end point of every path. Paths always start at the origin.
    #[serde(default = "default_goal")]
    pub goal: Point,
    /// Polygonal obstacles.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    /// Weight of the collision distance in the cost of infeasible paths.
    #[serde(default = "default_penalty_factor")]
    pub penalty_factor: f64,
    /// Tolerance for floating-point point equality.
    #[serde(default = "default_float_threshold")]
    pub float_threshold: f64,
    /// Chromosome length bounds (waypoints including start and goal).
    #[serde(default)]
    pub chromosome: ChromosomeBounds,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            goal: default_goal(),
            obstacles: vec![
                ObstacleConfig {
                    vertices: vec![
                        Point::new(30.0, 20.0),
                        Point::new(50.0, 20.0),
                        Point::new(50.0, 50.0),
                        Point::new(30.0, 50.0),
                    ],
                },
                ObstacleConfig {
                    vertices: vec![
                        Point::new(75.0, 35.0),
                        Point::new(95.0, 35.0),
                        Point::new(85.0, 70.0),
                    ],
                },
            ],
            penalty_factor: default_penalty_factor(),
            float_threshold: default_float_threshold(),
            chromosome: ChromosomeBounds::default(),
        }
    }
}

fn default_width() -> f64 {
    120.0
}
fn default_height() -> f64 {
    80.0
}
fn default_goal() -> Point {
    Point::new(120.0, 80.0)
}
fn default_penalty_factor() -> f64 {
    20.0
}
fn default_float_threshold() -> f64 {
    1e-8
}

/// A polygon given by its vertices in boundary order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub vertices: Vec<Point>,
}

/// Allowed chromosome lengths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChromosomeBounds {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for ChromosomeBounds {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
        }
    }
}

fn default_min_length() -> usize {
    5
}
fn default_max_length() -> usize {
    10
}

/// Smallest `min_length` that leaves room for a crossover cut point.
pub const MIN_CHROMOSOME_LENGTH: usize = 4;

impl EnvironmentConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(0.0..=self.width).contains(&self.goal.x) || !(0.0..=self.height).contains(&self.goal.y)
        {
            return Err(ConfigError::GoalOutOfBounds(self.goal));
        }
        if !(self.penalty_factor >= 0.0) {
            return Err(ConfigError::InvalidPenalty(self.penalty_factor));
        }
        if !(self.float_threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.float_threshold));
        }
        let ChromosomeBounds {
            min_length,
            max_length,
        } = self.chromosome;
        if min_length < MIN_CHROMOSOME_LENGTH || max_length < min_length {
            return Err(ConfigError::InvalidChromosomeBounds {
                min: min_length,
                max: max_length,
            });
        }
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if obstacle.vertices.len() < crate::compute::MIN_OBSTACLE_VERTICES {
                return Err(ConfigError::InvalidObstacle {
                    index,
                    source: ObstacleError::TooFewVertices(obstacle.vertices.len()),
                });
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment dimensions (width, height) must be positive")]
    InvalidDimensions,
    #[error("Goal {0} lies outside the environment")]
    GoalOutOfBounds(Point),
    #[error("Penalty factor must be non-negative, got {0}")]
    InvalidPenalty(f64),
    #[error("Float threshold must be positive, got {0}")]
    InvalidThreshold(f64),
    #[error("Chromosome bounds must satisfy 4 <= min <= max, got min {min}, max {max}")]
    InvalidChromosomeBounds { min: usize, max: usize },
    #[error("Obstacle {index} is invalid: {source}")]
    InvalidObstacle {
        index: usize,
        #[source]
        source: ObstacleError,
    },
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
