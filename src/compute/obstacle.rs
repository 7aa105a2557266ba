//! Polygonal obstacles.

use std::fmt;

use crate::schema::ObstacleConfig;

use super::geometry::{Point, Segment};

/// Minimum vertex count of a closed polygon.
pub const MIN_OBSTACLE_VERTICES: usize = 3;

/// Obstacle construction errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObstacleError {
    #[error("Obstacle needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}

/// An immutable closed polygon.
///
/// The boundary connects consecutive vertices and wraps from the last vertex
/// back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    vertices: Vec<Point>,
}

impl Obstacle {
    /// Create an obstacle from its vertices in boundary order.
    pub fn new(vertices: Vec<Point>) -> Result<Self, ObstacleError> {
        if vertices.len() < MIN_OBSTACLE_VERTICES {
            return Err(ObstacleError::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Boundary edges in vertex order, closed with `vertices[n-1] -> vertices[0]`.
    pub fn boundaries(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Whether `segment` touches or crosses any boundary edge.
    pub fn intersects(&self, segment: &Segment) -> bool {
        self.boundaries().any(|edge| segment.intersects(&edge))
    }
}

impl TryFrom<&ObstacleConfig> for Obstacle {
    type Error = ObstacleError;

    fn try_from(config: &ObstacleConfig) -> Result<Self, Self::Error> {
        Self::new(config.vertices.clone())
    }
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obstacle: {{")?;
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{vertex}")?;
        }
        write!(f, "}}")
    }
}
