//! Compute module - Geometry, obstacles and the genetic path search.

mod environment;
mod geometry;
mod obstacle;

pub mod evolution;

pub use environment::*;
pub use geometry::*;
pub use obstacle::*;
