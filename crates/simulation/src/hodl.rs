//! Runs a strategy over a batch of price paths and scores it against holding.

use crate::error::{SimResult, SimulationError};
use crate::strategies::LiquidityStrategy;
use serde::{Deserialize, Serialize};
use tracing::info;
use uniswap_sim_domain::metrics::{hold_value, log_growth_rate};

/// Token0 deposited at the start of every run. The token1 deposit is worth
/// the same at the starting price.
pub const INITIAL_INVENTORY0: f64 = 10_000.0;

/// Outcome of one strategy run against a hold-only baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HodlComparison {
    /// Mean log growth of terminal strategy wealth per unit of horizon.
    pub growth_rate: f64,
    /// Same statistic for holding the initial deposit untouched.
    pub hodl_growth_rate: f64,
    /// Trajectory-mean wealth per snapshot, relative to the initial hold
    /// value.
    pub mean_wealth: Vec<f64>,
}

impl HodlComparison {
    /// `growth_rate - hodl_growth_rate`; positive when providing liquidity
    /// beat holding.
    pub fn excess(&self) -> f64 {
        self.growth_rate - self.hodl_growth_rate
    }
}

/// Deposits the initial capital into `strategy`, steps it through every
/// snapshot in `prices` and compares terminal wealth with holding.
///
/// # Arguments
/// * `strategy` - Anything implementing the strategy contract
/// * `prices` - Time-major snapshots; all trajectories must share the first
///   price
/// * `horizon` - Elapsed time the growth rates are expressed per
pub fn compare_to_hodl<S>(strategy: &mut S, prices: &[Vec<f64>], horizon: f64) -> SimResult<HodlComparison>
where
    S: LiquidityStrategy + ?Sized,
{
    let (first, last) = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SimulationError::EmptyPricePath),
    };
    if first.is_empty() {
        return Err(SimulationError::InvalidParameter(
            "price snapshots hold no trajectories".to_string(),
        ));
    }
    if !(horizon.is_finite() && horizon > 0.0) {
        return Err(SimulationError::InvalidParameter(format!(
            "horizon must be positive, got {horizon}"
        )));
    }

    let min = first.iter().copied().fold(f64::INFINITY, f64::min);
    let max = first.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min != max {
        return Err(SimulationError::HeterogeneousStart { min, max });
    }
    let initial_price = first[0];

    let n = first.len();
    let m0 = INITIAL_INVENTORY0;
    let m1 = INITIAL_INVENTORY0 * initial_price;
    let hodl0 = hold_value(m0, m1, initial_price);

    strategy.reset(first)?;
    strategy.mint(&vec![m0; n], &vec![m1; n])?;

    let mut mean_wealth = Vec::with_capacity(prices.len());
    let mut terminal = Vec::new();
    for price in prices {
        let amounts = strategy.update(price)?;
        // Valued at the observed price even where the pool did not trade.
        let wealth: Vec<f64> = amounts
            .value_in_token1(price)?
            .into_iter()
            .map(|v| v / hodl0)
            .collect();
        mean_wealth.push(wealth.iter().sum::<f64>() / n as f64);
        terminal = wealth;
    }

    let hodl_terminal: Vec<f64> = last.iter().map(|p| hold_value(m0, m1, *p) / hodl0).collect();
    let comparison = HodlComparison {
        growth_rate: log_growth_rate(&terminal, horizon),
        hodl_growth_rate: log_growth_rate(&hodl_terminal, horizon),
        mean_wealth,
    };

    info!(
        strategy = strategy.name(),
        trajectories = n,
        snapshots = prices.len(),
        growth_rate = comparison.growth_rate,
        hodl_growth_rate = comparison.hodl_growth_rate,
        "compared strategy to hodl"
    );
    Ok(comparison)
}
