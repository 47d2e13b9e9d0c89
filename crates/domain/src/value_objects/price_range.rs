use crate::error::{MathError, MathResult};
use crate::math::price_tick::{MAX_TICK, MIN_TICK, tick_to_price};
use serde::{Deserialize, Serialize};

/// A price interval `[lower, upper]` with `0 < lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    lower: f64,
    upper: f64,
}

impl PriceRange {
    pub fn new(lower: f64, upper: f64) -> MathResult<Self> {
        if !(lower.is_finite() && lower > 0.0) {
            return Err(MathError::NonPositivePrice {
                index: 0,
                price: lower,
            });
        }
        if !(upper.is_finite() && lower < upper) {
            return Err(MathError::InvalidRange {
                index: 0,
                lower,
                upper,
            });
        }
        Ok(Self { lower, upper })
    }

    /// The widest range representable on the tick grid.
    pub fn full_range() -> Self {
        Self {
            lower: tick_to_price(f64::from(MIN_TICK)),
            upper: tick_to_price(f64::from(MAX_TICK)),
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }

    /// `(sqrt(lower), sqrt(upper))`.
    pub fn sqrt_bounds(&self) -> (f64, f64) {
        (self.lower.sqrt(), self.upper.sqrt())
    }

    /// Repeats the bounds for `len` trajectories.
    pub fn broadcast(&self, len: usize) -> (Vec<f64>, Vec<f64>) {
        (vec![self.lower; len], vec![self.upper; len])
    }
}
