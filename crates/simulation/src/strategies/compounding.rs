//! Single range that reinvests its fees.

use super::{DEFAULT_REINVEST_FRACTION, LiquidityStrategy};
use crate::error::SimResult;
use crate::position::Position;
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// A static range position that mints its earned fees back into the same
/// range after every update.
#[derive(Debug, Clone)]
pub struct CompoundingStrategy {
    position: Position,
    /// Share of earned fees offered to `mint` each step.
    pub fraction: f64,
}

impl CompoundingStrategy {
    pub fn new(price: &[f64], range: PriceRange, fee: FeeTier) -> SimResult<Self> {
        Ok(Self {
            position: Position::with_range(price, range, fee)?,
            fraction: DEFAULT_REINVEST_FRACTION,
        })
    }

    /// Sets the share of fees reinvested each step.
    #[must_use]
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    fn compound(&mut self) -> SimResult<()> {
        let Some(earned) = self.position.collectable() else {
            return Ok(());
        };
        let offered = earned.scaled(self.fraction);
        let used = self.position.mint(&offered.amount0, &offered.amount1)?;
        self.position.deduct_earned(&used)
    }
}

impl LiquidityStrategy for CompoundingStrategy {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        self.position.reset(price)
    }

    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        self.position.mint(amount0, amount1)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        let amounts = self.position.update(price)?;
        self.compound()?;
        Ok(amounts)
    }

    fn name(&self) -> &'static str {
        "Compounding"
    }
}
