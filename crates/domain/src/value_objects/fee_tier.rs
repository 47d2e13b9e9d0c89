use crate::error::{MathError, MathResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Fraction of swap volume paid to liquidity providers.
///
/// Also acts as the no-trade band of the simulation: relative price moves
/// smaller than the fee are not arbitraged through the pool.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FeeTier(f64);

impl FeeTier {
    /// 0.05 % pool.
    pub const LOW: Self = Self(0.0005);
    /// 0.3 % pool.
    pub const MEDIUM: Self = Self(0.003);
    /// 1 % pool.
    pub const HIGH: Self = Self(0.01);

    pub fn new(rate: f64) -> MathResult<Self> {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(MathError::InvalidFeeTier(rate));
        }
        Ok(Self(rate))
    }

    pub fn from_bps(bps: u32) -> MathResult<Self> {
        let rate = Decimal::from(bps) / Decimal::from(10000);
        Self::new(rate.to_f64().ok_or(MathError::InvalidFeeTier(f64::NAN))?)
    }

    pub fn rate(&self) -> f64 {
        self.0
    }

    /// Fee rounded to whole basis points.
    pub fn to_bps(&self) -> u32 {
        Decimal::from_f64(self.0)
            .map(|d| (d * Decimal::from(10000)).round())
            .and_then(|d| d.to_u32())
            .unwrap_or(0)
    }

    /// Tick spacing of the canonical Uniswap V3 pool for this fee.
    pub fn tick_spacing(&self) -> i32 {
        match self.to_bps() {
            30 => 60,
            100 => 100,
            _ => 10,
        }
    }
}
