use uniswap_sim_simulation::SimulationError;

/// Grid search failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizationError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// No drift or no volatility values to search over.
    #[error("grid search needs at least one drift and one volatility")]
    EmptyGrid,
}

pub type OptimizationResult<T> = Result<T, OptimizationError>;
