//! Partial range allocation backed by idle reserves.

use super::LiquidityStrategy;
use crate::error::SimResult;
use crate::position::Position;
use tracing::debug;
use uniswap_sim_domain::math::price_tick::{TICK_BASE, half_width_ticks, recentered_range};
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// Puts only a share of each deposit into the range and keeps the rest in
/// idle "silos". The share is sized so that the range's reserves match what
/// a full range position would hold over the same interval.
///
/// Trajectories whose price leaves the range are burned, recentred, and
/// re-minted together with their silo balance.
#[derive(Debug, Clone)]
pub struct LiquiditySilos {
    position: Position,
    half_width: f64,
    portion: f64,
    silos: PairAmounts,
}

impl LiquiditySilos {
    pub fn new(price: &[f64], range: PriceRange, fee: FeeTier) -> SimResult<Self> {
        let half_width = half_width_ticks(range.lower(), range.upper());
        Ok(Self {
            position: Position::with_range(price, range, fee)?,
            half_width,
            portion: range_portion(half_width),
            silos: PairAmounts::zeros(price.len()),
        })
    }

    /// Share of each deposit that goes into the range.
    pub fn portion(&self) -> f64 {
        self.portion
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Reserves held outside the range.
    pub fn silos(&self) -> &PairAmounts {
        &self.silos
    }
}

/// `1 - 1.0001^(-half_width / 2)`
pub fn range_portion(half_width: f64) -> f64 {
    1.0 - TICK_BASE.powf(-half_width / 2.0)
}

impl LiquidityStrategy for LiquiditySilos {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        self.position.reset(price)?;
        self.silos = PairAmounts::zeros(price.len());
        Ok(())
    }

    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        let deposit = PairAmounts::new(amount0.to_vec(), amount1.to_vec())?;
        let offered = deposit.scaled(self.portion);
        let in_range = self.position.mint(&offered.amount0, &offered.amount1)?;
        self.silos.add_assign(&deposit.sub(&in_range)?)?;
        Ok(deposit)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        let amounts = self.position.update(price)?.add(&self.silos)?;

        let mask = self.position.out_of_range_mask(price)?;
        let (lower, upper): (Vec<f64>, Vec<f64>) = price
            .iter()
            .map(|p| recentered_range(*p, self.half_width))
            .unzip();

        let burned = self.position.burn_at(&mask, 1.0)?;
        self.position.set_range_at(&mask, &lower, &upper)?;

        let to_mint = burned.add(&self.silos.masked(&mask)?)?.scaled(self.portion);
        let used = self.position.mint(&to_mint.amount0, &to_mint.amount1)?;
        self.silos.add_assign(&burned.sub(&used)?)?;

        let moved = mask.iter().filter(|m| **m).count();
        debug!(moved, "recentred out of range trajectories");
        Ok(amounts)
    }

    fn name(&self) -> &'static str {
        "Liquidity Silos"
    }
}
