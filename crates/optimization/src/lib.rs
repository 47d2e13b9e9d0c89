//! Parameter sweeps over the Monte Carlo simulator.

pub mod error;
pub mod grid_search;
pub mod objective;

pub use error::{OptimizationError, OptimizationResult};
