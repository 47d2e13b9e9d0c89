//! Liquidity provision strategies.
//!
//! Every strategy exposes the same `reset / mint / update` contract as a bare
//! [`Position`], so the simulation driver can run any of them
//! interchangeably.

pub mod compounding;
pub mod limit_order;
pub mod liquidity_silos;
pub mod split_compounding;

pub use compounding::CompoundingStrategy;
pub use limit_order::LimitOrderStrategy;
pub use liquidity_silos::LiquiditySilos;
pub use split_compounding::SplitCompoundingStrategy;

use crate::constant_product::ConstantProductPosition;
use crate::error::SimResult;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use uniswap_sim_domain::math::price_tick::recentered_range;
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// Share of earned fees reinvested by the compounding strategies.
pub const DEFAULT_REINVEST_FRACTION: f64 = 0.99;

/// Contract between the simulation driver and a liquidity strategy.
///
/// All slices are indexed by trajectory and must have the batch length the
/// strategy was built with.
pub trait LiquidityStrategy {
    /// Reinitialises the strategy at `price`, dropping all liquidity.
    fn reset(&mut self, price: &[f64]) -> SimResult<()>;

    /// Deposits capital and returns the amounts the strategy accounts for.
    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts>;

    /// Advances to `price` and returns the total claimable value.
    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts>;

    /// Human readable name.
    fn name(&self) -> &'static str;
}

/// Strategy families that can be built from a price, a range and a fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// A single static range.
    #[default]
    SingleRange,
    /// A static range that reinvests its fees.
    Compounding,
    /// A static range whose fees fund single-sided side positions.
    SplitCompounding,
    /// Like `SplitCompounding`, recentred on the price every step.
    SplitCompoundingRecentered,
    /// A recentred range plus a fee-funded limit order.
    LimitOrder,
    /// A range holding only part of the capital, the rest kept aside.
    LiquiditySilos,
    /// A full-range constant product (V2) position.
    ConstantProduct,
}

impl StrategyKind {
    /// All variants, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SingleRange,
        Self::Compounding,
        Self::SplitCompounding,
        Self::SplitCompoundingRecentered,
        Self::LimitOrder,
        Self::LiquiditySilos,
        Self::ConstantProduct,
    ];

    /// Builds the strategy for a batch of trajectories starting at `price`.
    pub fn build(
        &self,
        price: &[f64],
        range: PriceRange,
        fee: FeeTier,
    ) -> SimResult<Box<dyn LiquidityStrategy>> {
        Ok(match self {
            Self::SingleRange => Box::new(Position::with_range(price, range, fee)?),
            Self::Compounding => Box::new(CompoundingStrategy::new(price, range, fee)?),
            Self::SplitCompounding => Box::new(SplitCompoundingStrategy::new(price, range, fee)?),
            Self::SplitCompoundingRecentered => {
                Box::new(SplitCompoundingStrategy::new(price, range, fee)?.recentered())
            }
            Self::LimitOrder => Box::new(LimitOrderStrategy::new(price, range, fee)?),
            Self::LiquiditySilos => Box::new(LiquiditySilos::new(price, range, fee)?),
            Self::ConstantProduct => Box::new(ConstantProductPosition::new(price, fee)?),
        })
    }
}

/// Burns `position` entirely and re-mints the proceeds into a range of
/// `2 * half_width` ticks around `price`. Whatever cannot be minted stays as
/// earned fees of the new position.
pub(crate) fn recenter(position: &mut Position, price: &[f64], half_width: f64) -> SimResult<()> {
    let (lower, upper): (Vec<f64>, Vec<f64>) = price
        .iter()
        .map(|p| recentered_range(*p, half_width))
        .unzip();

    let burned = position.burn(1.0)?;
    let mut recentered = Position::new(price, &lower, &upper, position.fee())?;
    let used = recentered.mint(&burned.amount0, &burned.amount1)?;
    recentered.settle_remainder(&burned, &used)?;

    *position = recentered;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::hodl::compare_to_hodl;
    use crate::price_path::{DeterministicPricePath, GeometricBrownianMotion, PricePathGenerator};

    /// A short zig-zag around 1.0 shared by the strategy tests.
    pub(crate) fn zigzag(count: usize) -> Vec<Vec<f64>> {
        let series = [1.0, 1.05, 0.97, 1.1, 0.9, 1.02, 1.2, 0.85, 1.0, 1.15];
        DeterministicPricePath::from_series(&series, count).snapshots
    }

    #[test]
    fn test_every_kind_runs_through_the_driver() {
        let range = PriceRange::new(0.5, 2.0).unwrap();
        let prices = zigzag(3);
        for kind in StrategyKind::ALL {
            let mut strategy = kind.build(&prices[0], range, FeeTier::MEDIUM).unwrap();
            let result = compare_to_hodl(strategy.as_mut(), &prices, 1.0).unwrap();
            assert!(result.growth_rate.is_finite(), "{}", strategy.name());
            assert_eq!(result.mean_wealth.len(), prices.len());
        }
    }

    #[test]
    fn test_every_kind_survives_extreme_grid_corners() {
        // Strong drift pushes amounts to ~1e13 where float noise exceeds 1e-3.
        for (drift, volatility) in [(2.0, 0.1), (-0.8, 2.0)] {
            let prices = GeometricBrownianMotion::new(1.0, drift, volatility, 1.0 / 60.0, 31.0)
                .unwrap()
                .with_seed(5)
                .sample(50)
                .unwrap();
            for kind in StrategyKind::ALL {
                let mut strategy = kind
                    .build(&prices[0], PriceRange::full_range(), FeeTier::HIGH)
                    .unwrap();
                let result = compare_to_hodl(strategy.as_mut(), &prices, 31.0);
                let result = result.unwrap_or_else(|e| {
                    panic!("{} at drift {drift}, volatility {volatility}: {e}", strategy.name())
                });
                assert!(result.growth_rate.is_finite(), "{}", strategy.name());
            }
        }
    }

    #[test]
    fn test_recenter_keeps_value() {
        let fee = FeeTier::MEDIUM;
        let range = PriceRange::new(0.5, 2.0).unwrap();
        let mut position = Position::with_range(&[1.0], range, fee).unwrap();
        position.mint(&[100.0], &[100.0]).unwrap();
        position.update(&[1.5]).unwrap();
        let before = position.amounts().unwrap().value_in_token1(&[1.5]).unwrap()[0];

        recenter(&mut position, &[1.5], 500.0).unwrap();
        let after = position.amounts().unwrap().value_in_token1(&[1.5]).unwrap()[0];
        assert!((before - after).abs() < 1e-6 * before);
        assert!(position.lower()[0] < 1.5 && position.upper()[0] > 1.5);
    }
}
