//! Recentred range paired with a fee-funded limit order.

use super::{DEFAULT_REINVEST_FRACTION, LiquidityStrategy, recenter};
use crate::error::SimResult;
use crate::position::Position;
use tracing::debug;
use uniswap_sim_domain::math::price_tick::{
    TICK_BASE, coerce_to_tick_spacing, half_width_ticks, price_to_tick, tick_to_price,
};
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// Minimum width of a limit order, in ticks.
pub const LIMIT_ORDER_WIDTH: i32 = 10;

/// Keeps all capital in a range recentred on the price every step and uses
/// earned fees to rebalance the portfolio through a narrow limit order.
///
/// When the order has been crossed, it is re-placed on the side of the
/// price that brings the two token values closer together. While the order
/// is still active, fees are added to it instead.
#[derive(Debug, Clone)]
pub struct LimitOrderStrategy {
    position: Position,
    limit_order: Position,
    half_width: f64,
    tick_spacing: i32,
    /// Share of earned fees offered to the limit order each step.
    pub fraction: f64,
}

impl LimitOrderStrategy {
    /// Requires every starting price to lie inside `range`, at least one tick
    /// above its lower bound.
    pub fn new(price: &[f64], range: PriceRange, fee: FeeTier) -> SimResult<Self> {
        let position = Position::with_range(price, range, fee)?;
        let limit_order = initial_limit_order(&position, price)?;
        Ok(Self {
            position,
            limit_order,
            half_width: half_width_ticks(range.lower(), range.upper()),
            tick_spacing: fee.tick_spacing(),
            fraction: DEFAULT_REINVEST_FRACTION,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn limit_order(&self) -> &Position {
        &self.limit_order
    }

    fn compound(&mut self, price: &[f64], amounts: &PairAmounts) -> SimResult<()> {
        let n = price.len();
        let inactive = self.limit_order.out_of_range_mask(price)?;

        let mut earned = match self.position.collectable() {
            Some(earned) => earned.clone(),
            None => PairAmounts::zeros(n),
        };
        earned.add_assign(&self.limit_order.burn(1.0)?)?;

        let width = f64::from(LIMIT_ORDER_WIDTH.max(self.tick_spacing));
        let mut lower = vec![0.0; n];
        let mut upper = vec![0.0; n];
        let mut x = vec![0.0; n];
        let mut y = vec![0.0; n];

        for i in 0..n {
            let p = price[i];
            let value0 = amounts.amount0[i] * p;
            let value1 = amounts.amount1[i];
            let excess0 = value0 > value1;

            let tick = price_to_tick(p);
            let (active_lower, active_upper) = coerce_to_tick_spacing(self.tick_spacing, tick, tick);
            let (tick_lower, tick_upper) = if excess0 {
                (active_upper, active_upper + width)
            } else {
                (active_lower - width, active_lower)
            };
            lower[i] = tick_to_price(tick_lower);
            upper[i] = tick_to_price(tick_upper);
            let m = (lower[i].sqrt() * upper[i].sqrt()).sqrt();

            let cap0 = earned.amount0[i] * self.fraction;
            let cap1 = earned.amount1[i] * self.fraction;
            if inactive[i] {
                // Spend just enough to even out the two token values.
                if excess0 {
                    x[i] = ((value0 - value1) / (p + m)).clamp(0.0, cap0.max(0.0));
                } else {
                    y[i] = ((value1 - value0) / (p + m) * m).clamp(0.0, cap1.max(0.0));
                }
            } else {
                x[i] = cap0;
                y[i] = cap1;
            }
        }

        self.limit_order.set_range_at(&inactive, &lower, &upper)?;
        let used = self.limit_order.mint(&x, &y)?;
        self.position.settle_remainder(&earned, &used)
    }
}

fn initial_limit_order(position: &Position, price: &[f64]) -> SimResult<Position> {
    let upper: Vec<f64> = price.iter().map(|p| p / TICK_BASE).collect();
    Position::new(price, &position.lower(), &upper, position.fee())
}

impl LiquidityStrategy for LimitOrderStrategy {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        self.position.reset(price)?;
        self.limit_order = initial_limit_order(&self.position, price)?;
        Ok(())
    }

    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        self.position.mint(amount0, amount1)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        let mut amounts = self.position.update(price)?;
        amounts.add_assign(&self.limit_order.update(price)?)?;

        self.compound(price, &amounts)?;
        debug!(half_width = self.half_width, "recentering main range");
        recenter(&mut self.position, price, self.half_width)?;
        Ok(amounts)
    }

    fn name(&self) -> &'static str {
        "Limit Order"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::tests::zigzag;

    fn strategy(price: &[f64]) -> LimitOrderStrategy {
        let range = PriceRange::new(0.5, 2.0).unwrap();
        LimitOrderStrategy::new(price, range, FeeTier::MEDIUM).unwrap()
    }

    #[test]
    fn test_initial_limit_order_sits_below_price() {
        let s = strategy(&[1.0, 1.5]);
        let upper = s.limit_order().upper();
        assert!((upper[0] - 1.0 / TICK_BASE).abs() < 1e-9);
        assert!((upper[1] - 1.5 / TICK_BASE).abs() < 1e-9);
        assert!((s.limit_order().lower()[0] - 0.5).abs() < 1e-9);
        assert_eq!(s.limit_order().liquidity(), &[0.0, 0.0]);
    }

    #[test]
    fn test_crossed_order_moves_to_the_excess_side() {
        let mut s = strategy(&[1.0, 1.0]);
        s.mint(&[100.0, 100.0], &[100.0, 100.0]).unwrap();
        // A rise leaves the position heavy in token1. A fall below the
        // range leaves it holding only token0.
        s.update(&[1.5, 0.45]).unwrap();

        let lower = s.limit_order().lower();
        let upper = s.limit_order().upper();
        // Token1 heavy: the order buys token0 below the price.
        assert!(upper[0] <= 1.5 && lower[0] < upper[0]);
        // Token0 heavy: the order sells token0 above the price.
        assert!(lower[1] >= 0.45 && upper[1] > lower[1]);
        // Widths are one tick spacing.
        for i in 0..2 {
            let ticks = price_to_tick(upper[i]) - price_to_tick(lower[i]);
            assert!((ticks - 60.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_main_range_is_recentred() {
        let mut s = strategy(&[1.0]);
        s.mint(&[100.0], &[100.0]).unwrap();
        s.update(&[1.7]).unwrap();
        let lower = s.position().lower()[0];
        let upper = s.position().upper()[0];
        assert!(((lower * upper).sqrt() - 1.7).abs() < 1e-6);
    }

    #[test]
    fn test_fees_stay_non_negative() {
        let mut s = strategy(&[1.0, 1.0]);
        s.mint(&[100.0, 100.0], &[100.0, 100.0]).unwrap();
        for price in zigzag(2) {
            s.update(&price).unwrap();
            let earned = s.position().collectable().unwrap();
            assert!(earned.min_value().unwrap().1 >= 0.0);
        }
    }

    #[test]
    fn test_reset_restores_initial_order() {
        let mut s = strategy(&[1.0]);
        s.mint(&[100.0], &[100.0]).unwrap();
        s.update(&[1.3]).unwrap();
        s.reset(&[1.0]).unwrap();
        assert_eq!(s.limit_order().liquidity(), &[0.0]);
        assert!((s.limit_order().upper()[0] - 1.0 / TICK_BASE).abs() < 1e-9);
    }
}
