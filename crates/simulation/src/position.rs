//! Batched concentrated liquidity position.
//!
//! One [`Position`] holds an independent Uniswap V3 range position for every
//! simulated trajectory. All state is stored as parallel vectors indexed by
//! trajectory, and every operation is elementwise over that index.

use crate::error::{FEE_EPSILON, SimResult, SimulationError};
use crate::strategies::LiquidityStrategy;
use tracing::{debug, warn};
use uniswap_sim_domain::error::{ensure_len, ensure_positive_prices};
use uniswap_sim_domain::math::liquidity_amounts::{
    amounts_for_liquidity_batch, check_ranges, liquidity_for_amounts_batch,
};
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};

/// A batch of concentrated liquidity positions sharing one fee tier.
#[derive(Debug, Clone)]
pub struct Position {
    price_sqrt: Vec<f64>,
    lower_sqrt: Vec<f64>,
    upper_sqrt: Vec<f64>,
    fee: FeeTier,
    liquidity: Vec<f64>,
    /// `None` until the first `update`, so "never accrued" stays distinct
    /// from "accrued zero".
    earned: Option<PairAmounts>,
}

impl Position {
    /// Creates an empty position for each trajectory.
    ///
    /// # Arguments
    /// * `price` - Current price per trajectory
    /// * `lower` - Lower range bound per trajectory
    /// * `upper` - Upper range bound per trajectory
    /// * `fee` - Fee tier of the pool
    pub fn new(price: &[f64], lower: &[f64], upper: &[f64], fee: FeeTier) -> SimResult<Self> {
        let n = price.len();
        ensure_len(n, lower.len())?;
        ensure_len(n, upper.len())?;
        ensure_positive_prices(price)?;
        ensure_positive_prices(lower)?;

        let lower_sqrt = sqrt_all(lower);
        let upper_sqrt = sqrt_all(upper);
        check_ranges(&lower_sqrt, &upper_sqrt)?;

        Ok(Self {
            price_sqrt: sqrt_all(price),
            lower_sqrt,
            upper_sqrt,
            fee,
            liquidity: vec![0.0; n],
            earned: None,
        })
    }

    /// Creates a position with the same range for every trajectory.
    pub fn with_range(price: &[f64], range: PriceRange, fee: FeeTier) -> SimResult<Self> {
        let (lower, upper) = range.broadcast(price.len());
        Self::new(price, &lower, &upper, fee)
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.price_sqrt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price_sqrt.is_empty()
    }

    /// Price the position was last arbitraged to.
    pub fn price(&self) -> Vec<f64> {
        square_all(&self.price_sqrt)
    }

    pub fn lower(&self) -> Vec<f64> {
        square_all(&self.lower_sqrt)
    }

    pub fn upper(&self) -> Vec<f64> {
        square_all(&self.upper_sqrt)
    }

    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    pub fn liquidity(&self) -> &[f64] {
        &self.liquidity
    }

    /// Fees earned and not yet withdrawn, `None` before the first update.
    pub fn collectable(&self) -> Option<&PairAmounts> {
        self.earned.as_ref()
    }

    /// Reserves backing the current liquidity at the current price.
    pub fn principal(&self) -> SimResult<PairAmounts> {
        Ok(amounts_for_liquidity_batch(
            &self.price_sqrt,
            &self.lower_sqrt,
            &self.upper_sqrt,
            &self.liquidity,
        )?)
    }

    /// Total claimable value: principal plus earned fees.
    pub fn amounts(&self) -> SimResult<PairAmounts> {
        let principal = self.principal()?;
        match &self.earned {
            Some(earned) => Ok(principal.add(earned)?),
            None => Ok(principal),
        }
    }

    /// Trajectories whose `price` lies outside their range.
    pub fn out_of_range_mask(&self, price: &[f64]) -> SimResult<Vec<bool>> {
        ensure_len(self.len(), price.len())?;
        Ok(price
            .iter()
            .zip(self.lower_sqrt.iter().zip(&self.upper_sqrt))
            .map(|(p, (a, b))| *p < a * a || *p > b * b)
            .collect())
    }

    /// Reinitialises the price and clears liquidity and earned fees.
    ///
    /// Range and fee tier are preserved.
    pub fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        ensure_len(self.len(), price.len())?;
        ensure_positive_prices(price)?;

        self.price_sqrt = sqrt_all(price);
        self.liquidity = vec![0.0; price.len()];
        self.earned = None;
        Ok(())
    }

    /// Adds as much liquidity as `amount0` and `amount1` allow at the current
    /// price and returns the amounts actually consumed.
    pub fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        let mut liquidity = liquidity_for_amounts_batch(
            &self.price_sqrt,
            &self.lower_sqrt,
            &self.upper_sqrt,
            amount0,
            amount1,
        )?;
        // Negative requests mint nothing.
        for l in liquidity.iter_mut() {
            *l = l.max(0.0);
        }

        for (held, added) in self.liquidity.iter_mut().zip(&liquidity) {
            *held += added;
        }

        Ok(amounts_for_liquidity_batch(
            &self.price_sqrt,
            &self.lower_sqrt,
            &self.upper_sqrt,
            &liquidity,
        )?)
    }

    /// Moves every trajectory to `price` and accrues swap fees.
    ///
    /// Trajectories whose relative move is below the fee tier are not
    /// arbitraged and keep their previous price. For the rest, the change in
    /// reserves between the old and new price (both clipped to the range)
    /// approximates the arbitrage flow: a token0 inflow is charged the fee in
    /// token0, otherwise the token1 inflow is charged in token1.
    ///
    /// Returns principal at the new price plus all earned fees.
    pub fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        let n = self.len();
        ensure_len(n, price.len())?;
        ensure_positive_prices(price)?;

        let fee = self.fee.rate();
        let price_sqrt: Vec<f64> = price
            .iter()
            .zip(&self.price_sqrt)
            .map(|(p, old_sqrt)| {
                if (p / (old_sqrt * old_sqrt) - 1.0).abs() >= fee {
                    p.sqrt()
                } else {
                    *old_sqrt
                }
            })
            .collect();

        let previous = amounts_for_liquidity_batch(
            &self.clip_to_range(&self.price_sqrt),
            &self.lower_sqrt,
            &self.upper_sqrt,
            &self.liquidity,
        )?;
        let current = amounts_for_liquidity_batch(
            &self.clip_to_range(&price_sqrt),
            &self.lower_sqrt,
            &self.upper_sqrt,
            &self.liquidity,
        )?;
        let diff = current.sub(&previous)?;

        let mut earned = self.earned.take().unwrap_or_else(|| PairAmounts::zeros(n));
        for i in 0..n {
            if diff.amount0[i] > 0.0 {
                earned.amount0[i] += diff.amount0[i] * fee;
            } else {
                earned.amount1[i] += diff.amount1[i] * fee;
            }
        }

        let moved = price_sqrt
            .iter()
            .zip(&self.price_sqrt)
            .filter(|(new, old)| new != old)
            .count();
        debug!(trajectories = n, moved, "position updated");

        self.price_sqrt = price_sqrt;
        self.settle_earned(earned)?;
        self.amounts()
    }

    /// Removes `fraction` of liquidity and earned fees from every trajectory.
    pub fn burn(&mut self, fraction: f64) -> SimResult<PairAmounts> {
        let factors = vec![fraction; self.len()];
        self.burn_by(fraction, &factors)
    }

    /// Removes `fraction` of liquidity and earned fees from the trajectories
    /// selected by `mask`; the rest are left untouched.
    pub fn burn_at(&mut self, mask: &[bool], fraction: f64) -> SimResult<PairAmounts> {
        ensure_len(self.len(), mask.len())?;
        let factors: Vec<f64> = mask
            .iter()
            .map(|&m| if m { fraction } else { 0.0 })
            .collect();
        self.burn_by(fraction, &factors)
    }

    fn burn_by(&mut self, fraction: f64, factors: &[f64]) -> SimResult<PairAmounts> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SimulationError::InvalidFraction(fraction));
        }

        let to_burn: Vec<f64> = self
            .liquidity
            .iter()
            .zip(factors)
            .map(|(l, f)| l * f)
            .collect();
        for (held, burned) in self.liquidity.iter_mut().zip(&to_burn) {
            *held -= burned;
        }

        let burned = amounts_for_liquidity_batch(
            &self.price_sqrt,
            &self.lower_sqrt,
            &self.upper_sqrt,
            &to_burn,
        )?;

        match self.earned.as_mut() {
            Some(earned) => {
                let withdrawn = earned.scaled_by(factors)?;
                *earned = earned.sub(&withdrawn)?;
                Ok(burned.add(&withdrawn)?)
            }
            None => Ok(burned),
        }
    }

    /// Subtracts `used` from earned fees, e.g. after reinvesting them.
    pub fn deduct_earned(&mut self, used: &PairAmounts) -> SimResult<()> {
        let earned = match &self.earned {
            Some(earned) => earned.clone(),
            None => PairAmounts::zeros(self.len()),
        };
        self.settle_remainder(&earned, used)
    }

    /// Replaces earned fees with `total - used`, e.g. the leftovers of a
    /// burn that was re-minted elsewhere.
    ///
    /// Rounding noise scales with `total` as well as with the principal, so
    /// both bound the tolerance.
    pub fn settle_remainder(&mut self, total: &PairAmounts, used: &PairAmounts) -> SimResult<()> {
        let remainder = total.sub(used)?;
        let mut scale = self.principal()?;
        for (s, t) in scale
            .amount0
            .iter_mut()
            .zip(&total.amount0)
            .chain(scale.amount1.iter_mut().zip(&total.amount1))
        {
            *s = s.max(t.abs());
        }
        self.settle_scaled(remainder, &scale)
    }

    /// Replaces earned fees, clipping rounding noise below zero.
    ///
    /// Entries below `-FEE_EPSILON` times the trajectory's principal in that
    /// token (at least one unit) mean the fee accounting is broken and are
    /// rejected.
    pub fn settle_earned(&mut self, earned: PairAmounts) -> SimResult<()> {
        let scale = self.principal()?;
        self.settle_scaled(earned, &scale)
    }

    fn settle_scaled(&mut self, mut earned: PairAmounts, scale: &PairAmounts) -> SimResult<()> {
        ensure_len(self.len(), earned.len())?;
        ensure_len(self.len(), scale.len())?;
        let entries = earned
            .amount0
            .iter()
            .zip(&scale.amount0)
            .chain(earned.amount1.iter().zip(&scale.amount1))
            .enumerate();
        for (k, (value, s)) in entries {
            let index = k % self.len();
            if *value < -FEE_EPSILON * s.max(1.0) {
                return Err(SimulationError::NegativeFees {
                    index,
                    value: *value,
                });
            }
            if *value < 0.0 {
                warn!(index, value = *value, "clipping negative earned fees");
            }
        }
        earned.clamp_non_negative();
        self.earned = Some(earned);
        Ok(())
    }

    /// Moves the range of the selected trajectories.
    ///
    /// Selected trajectories must hold no liquidity, so burn them first.
    pub fn set_range_at(&mut self, mask: &[bool], lower: &[f64], upper: &[f64]) -> SimResult<()> {
        let n = self.len();
        ensure_len(n, mask.len())?;
        ensure_len(n, lower.len())?;
        ensure_len(n, upper.len())?;

        let mut lower_sqrt = self.lower_sqrt.clone();
        let mut upper_sqrt = self.upper_sqrt.clone();
        for i in (0..n).filter(|&i| mask[i]) {
            if self.liquidity[i] != 0.0 {
                return Err(SimulationError::InvalidParameter(format!(
                    "cannot move the range of trajectory {i} while it holds liquidity"
                )));
            }
            lower_sqrt[i] = lower[i].sqrt();
            upper_sqrt[i] = upper[i].sqrt();
        }
        check_ranges(&lower_sqrt, &upper_sqrt)?;

        self.lower_sqrt = lower_sqrt;
        self.upper_sqrt = upper_sqrt;
        Ok(())
    }

    fn clip_to_range(&self, price_sqrt: &[f64]) -> Vec<f64> {
        price_sqrt
            .iter()
            .zip(self.lower_sqrt.iter().zip(&self.upper_sqrt))
            .map(|(s, (a, b))| s.clamp(*a, *b))
            .collect()
    }
}

impl LiquidityStrategy for Position {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        Position::reset(self, price)
    }

    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        Position::mint(self, amount0, amount1)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        Position::update(self, price)
    }

    fn name(&self) -> &'static str {
        "Single Range"
    }
}

pub(crate) fn sqrt_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.sqrt()).collect()
}

fn square_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v * v).collect()
}
