//! Simulation configuration.

use crate::error::{SimResult, SimulationError};
use crate::strategies::StrategyKind;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uniswap_sim_domain::value_objects::{FeeTier, PriceRange};

/// Configuration for a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting price shared by every trajectory.
    pub initial_price: f64,
    /// GBM drift (mu).
    pub drift: f64,
    /// GBM volatility (sigma).
    pub volatility: f64,
    /// Time between snapshots.
    pub time_step: f64,
    /// Total simulated time.
    pub horizon: f64,
    /// Number of independent trajectories.
    pub trajectories: usize,
    /// RNG seed; `None` draws from the OS.
    pub seed: Option<u64>,
    /// Pool fee tier.
    pub fee: FeeTier,
    /// Initial price range of the strategy.
    pub range: PriceRange,
    /// Strategy to run.
    pub strategy: StrategyKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationConfig {
    /// Creates a config with the defaults: price 1, a 31 unit horizon
    /// sampled every 1/60, 1000 trajectories, a 1 % full range position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_price: 1.0,
            drift: 0.0,
            volatility: 0.5,
            time_step: 1.0 / 60.0,
            horizon: 31.0,
            trajectories: 1000,
            seed: None,
            fee: FeeTier::HIGH,
            range: PriceRange::full_range(),
            strategy: StrategyKind::SingleRange,
        }
    }

    /// Sets the starting price.
    #[must_use]
    pub fn with_initial_price(mut self, price: f64) -> Self {
        self.initial_price = price;
        self
    }

    /// Sets drift and volatility.
    #[must_use]
    pub fn with_dynamics(mut self, drift: f64, volatility: f64) -> Self {
        self.drift = drift;
        self.volatility = volatility;
        self
    }

    /// Sets the time step.
    #[must_use]
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Sets the horizon.
    #[must_use]
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the number of trajectories.
    #[must_use]
    pub fn with_trajectories(mut self, trajectories: usize) -> Self {
        self.trajectories = trajectories;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the fee tier.
    #[must_use]
    pub fn with_fee(mut self, fee: FeeTier) -> Self {
        self.fee = fee;
        self
    }

    /// Sets the fee from a decimal rate such as `0.003`.
    pub fn with_fee_rate(self, fee_rate: Decimal) -> SimResult<Self> {
        let rate = fee_rate.to_f64().ok_or_else(|| {
            SimulationError::InvalidParameter(format!("fee rate {fee_rate} is not representable"))
        })?;
        Ok(self.with_fee(FeeTier::new(rate)?))
    }

    /// Sets the price range.
    #[must_use]
    pub fn with_range(mut self, range: PriceRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Snapshots per trajectory: `floor(horizon / time_step)`.
    #[must_use]
    pub fn steps(&self) -> usize {
        let steps = (self.horizon / self.time_step).floor();
        if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        }
    }
}
