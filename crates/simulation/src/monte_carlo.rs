use crate::error::SimResult;
use crate::hodl::{HodlComparison, compare_to_hodl};
use crate::price_path::{GeometricBrownianMotion, PricePathGenerator};
use crate::state::SimulationConfig;
use tracing::debug;

/// Samples GBM trajectories for a config and scores its strategy against
/// holding.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner {
    pub config: SimulationConfig,
}

impl MonteCarloRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Price snapshots for this config, time-major.
    pub fn sample_prices(&self) -> SimResult<Vec<Vec<f64>>> {
        let c = &self.config;
        let gbm = GeometricBrownianMotion::new(
            c.initial_price,
            c.drift,
            c.volatility,
            c.time_step,
            c.horizon,
        )?;
        let mut gbm = match c.seed {
            Some(seed) => gbm.with_seed(seed),
            None => gbm,
        };
        gbm.sample(c.trajectories)
    }

    pub fn run(&self) -> SimResult<HodlComparison> {
        let prices = self.sample_prices()?;
        self.run_on(&prices)
    }

    /// Runs the configured strategy on pre-generated snapshots.
    pub fn run_on(&self, prices: &[Vec<f64>]) -> SimResult<HodlComparison> {
        let c = &self.config;
        let start = prices.first().map(Vec::as_slice).unwrap_or_default();
        let mut strategy = c.strategy.build(start, c.range, c.fee)?;
        debug!(
            strategy = strategy.name(),
            drift = c.drift,
            volatility = c.volatility,
            "running monte carlo"
        );
        compare_to_hodl(strategy.as_mut(), prices, c.horizon)
    }
}
