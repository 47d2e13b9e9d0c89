//! Main range plus single-sided side ranges funded from fees.

use super::{DEFAULT_REINVEST_FRACTION, LiquidityStrategy, recenter};
use crate::error::SimResult;
use crate::position::Position;
use tracing::debug;
use uniswap_sim_domain::math::price_tick::half_width_ticks;
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// Keeps the deposited capital in a main range and reinvests fees into two
/// side positions: token1 fees into the part of the range below the price,
/// token0 fees into the part above it. Side positions are rebuilt around the
/// current price every step.
#[derive(Debug, Clone)]
pub struct SplitCompoundingStrategy {
    position: Position,
    left: Position,
    right: Position,
    half_width: f64,
    recenter: bool,
    /// Share of earned fees offered to the side positions each step.
    pub fraction: f64,
}

impl SplitCompoundingStrategy {
    /// Requires every starting price to lie strictly inside `range`.
    pub fn new(price: &[f64], range: PriceRange, fee: FeeTier) -> SimResult<Self> {
        let position = Position::with_range(price, range, fee)?;
        let (left, right) = side_positions(&position, price)?;
        Ok(Self {
            position,
            left,
            right,
            half_width: half_width_ticks(range.lower(), range.upper()),
            recenter: false,
            fraction: DEFAULT_REINVEST_FRACTION,
        })
    }

    /// Recentres the main range on the current price after every step.
    #[must_use]
    pub fn recentered(mut self) -> Self {
        self.recenter = true;
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    fn compound(&mut self, price: &[f64]) -> SimResult<()> {
        let Some(earned) = self.position.collectable() else {
            return Ok(());
        };
        let mut earned = earned.clone();
        earned.add_assign(&self.left.burn(1.0)?)?;
        earned.add_assign(&self.right.burn(1.0)?)?;

        let lower = self.position.lower();
        let upper = self.position.upper();
        let fee = self.position.fee();

        let left_edge: Vec<f64> = price
            .iter()
            .zip(&upper)
            .zip(&lower)
            .map(|((p, u), l)| if p <= l { *u } else { p.min(*u) })
            .collect();
        let right_edge: Vec<f64> = price
            .iter()
            .zip(&lower)
            .zip(&upper)
            .map(|((p, l), u)| if p >= u { *l } else { p.max(*l) })
            .collect();
        self.left = Position::new(price, &lower, &left_edge, fee)?;
        self.right = Position::new(price, &right_edge, &upper, fee)?;

        let zeros = vec![0.0; price.len()];
        let offered = earned.scaled(self.fraction);
        let mut used = self.left.mint(&zeros, &offered.amount1)?;
        used.add_assign(&self.right.mint(&offered.amount0, &zeros)?)?;

        self.position.settle_remainder(&earned, &used)
    }
}

fn side_positions(position: &Position, price: &[f64]) -> SimResult<(Position, Position)> {
    let fee = position.fee();
    Ok((
        Position::new(price, &position.lower(), price, fee)?,
        Position::new(price, price, &position.upper(), fee)?,
    ))
}

impl LiquidityStrategy for SplitCompoundingStrategy {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        self.position.reset(price)?;
        (self.left, self.right) = side_positions(&self.position, price)?;
        Ok(())
    }

    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        self.position.mint(amount0, amount1)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        let mut amounts = self.position.update(price)?;
        amounts.add_assign(&self.left.update(price)?)?;
        amounts.add_assign(&self.right.update(price)?)?;

        self.compound(price)?;
        if self.recenter {
            debug!(half_width = self.half_width, "recentering main range");
            recenter(&mut self.position, price, self.half_width)?;
        }
        Ok(amounts)
    }

    fn name(&self) -> &'static str {
        if self.recenter {
            "Split Compounding (recentered)"
        } else {
            "Split Compounding"
        }
    }
}
