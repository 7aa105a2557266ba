//! Schema module - Configuration and reporting types for path evolution.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
