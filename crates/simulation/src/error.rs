//! Errors raised while running the position engine and its strategies.

use uniswap_sim_domain::MathError;

/// Negative earned fees smaller than this fraction of the principal (or of
/// the amount they were computed from, and never below one unit) are
/// treated as rounding noise.
pub const FEE_EPSILON: f64 = 1e-3;

/// Simulation failures. Every variant is an input-contract or invariant
/// violation; nothing here is retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// Propagated from the liquidity math.
    #[error(transparent)]
    Math(#[from] MathError),
    /// Burn fraction outside `[0, 1]`.
    #[error("burn fraction must lie in [0, 1], got {0}")]
    InvalidFraction(f64),
    /// Trajectories do not share one starting price.
    #[error("trajectories must start from one price, got min {min} and max {max}")]
    HeterogeneousStart {
        /// Smallest starting price.
        min: f64,
        /// Largest starting price.
        max: f64,
    },
    /// No price snapshots were supplied.
    #[error("price path is empty")]
    EmptyPricePath,
    /// Earned fees went negative beyond [`FEE_EPSILON`].
    #[error("earned fees at index {index} fell to {value}, beyond rounding tolerance")]
    NegativeFees {
        /// Trajectory index.
        index: usize,
        /// Offending value.
        value: f64,
    },
    /// A configuration value is out of its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Convenience alias for simulation results.
pub type SimResult<T> = Result<T, SimulationError>;
