//! Batched full-range constant product (Uniswap V2 style) position.

use crate::error::SimResult;
use crate::strategies::LiquidityStrategy;
use uniswap_sim_domain::error::{ensure_amounts, ensure_len, ensure_positive_prices};
use uniswap_sim_domain::math::constant_product::{arbitrage_to_price, should_arbitrage};
use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts};

/// A constant product pool owned entirely by the liquidity provider, one per
/// trajectory. Fees are not tracked separately: the arbitrage step leaves
/// them in the reserves.
#[derive(Debug, Clone)]
pub struct ConstantProductPosition {
    price: Vec<f64>,
    fee: FeeTier,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl ConstantProductPosition {
    pub fn new(price: &[f64], fee: FeeTier) -> SimResult<Self> {
        ensure_positive_prices(price)?;
        let n = price.len();
        Ok(Self {
            price: price.to_vec(),
            fee,
            x: vec![0.0; n],
            y: vec![0.0; n],
        })
    }

    pub fn len(&self) -> usize {
        self.price.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }

    pub fn price(&self) -> &[f64] {
        &self.price
    }

    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    /// Current reserves.
    pub fn amounts(&self) -> PairAmounts {
        PairAmounts {
            amount0: self.x.clone(),
            amount1: self.y.clone(),
        }
    }

    /// Pool invariant `x * y` per trajectory.
    pub fn k(&self) -> Vec<f64> {
        self.x.iter().zip(&self.y).map(|(x, y)| x * y).collect()
    }
}

impl LiquidityStrategy for ConstantProductPosition {
    fn reset(&mut self, price: &[f64]) -> SimResult<()> {
        ensure_len(self.len(), price.len())?;
        ensure_positive_prices(price)?;
        let n = price.len();
        self.price = price.to_vec();
        self.x = vec![0.0; n];
        self.y = vec![0.0; n];
        Ok(())
    }

    /// Deposits at the pool price; the scarcer side bounds the deposit.
    fn mint(&mut self, amount0: &[f64], amount1: &[f64]) -> SimResult<PairAmounts> {
        let n = self.len();
        ensure_len(n, amount0.len())?;
        ensure_len(n, amount1.len())?;
        ensure_amounts(amount0)?;
        ensure_amounts(amount1)?;

        let mut used = PairAmounts::zeros(n);
        for i in 0..n {
            let value = (amount0[i] * self.price[i]).min(amount1[i]);
            let dx = value / self.price[i];
            self.x[i] += dx;
            self.y[i] += value;
            used.amount0[i] = dx;
            used.amount1[i] = value;
        }
        Ok(used)
    }

    fn update(&mut self, price: &[f64]) -> SimResult<PairAmounts> {
        ensure_len(self.len(), price.len())?;
        ensure_positive_prices(price)?;

        let fee = self.fee.rate();
        for (i, new_price) in price.iter().enumerate() {
            let old_price = self.price[i];
            if !should_arbitrage(old_price, *new_price, fee) {
                continue;
            }
            let (x, y) = arbitrage_to_price(self.x[i], self.y[i], old_price, *new_price, fee);
            self.x[i] = x;
            self.y[i] = y;
            self.price[i] = *new_price;
        }
        Ok(self.amounts())
    }

    fn name(&self) -> &'static str {
        "Constant Product"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_bounded_by_scarcer_side() {
        let mut pos = ConstantProductPosition::new(&[4.0, 4.0], FeeTier::MEDIUM).unwrap();
        let used = pos.mint(&[10.0, 10.0], &[100.0, 20.0]).unwrap();
        assert_eq!(used.get(0), (10.0, 40.0));
        assert_eq!(used.get(1), (5.0, 20.0));
        assert_eq!(pos.k(), vec![400.0, 100.0]);
    }

    #[test]
    fn test_small_moves_do_not_trade() {
        let mut pos = ConstantProductPosition::new(&[1.0], FeeTier::HIGH).unwrap();
        pos.mint(&[100.0], &[100.0]).unwrap();
        let amounts = pos.update(&[1.005]).unwrap();
        assert_eq!(amounts.get(0), (100.0, 100.0));
        assert_eq!(pos.price(), &[1.0]);
    }

    #[test]
    fn test_arbitrage_moves_reserves_to_price() {
        let mut pos = ConstantProductPosition::new(&[1.0, 1.0], FeeTier::MEDIUM).unwrap();
        pos.mint(&[100.0, 100.0], &[100.0, 100.0]).unwrap();
        let amounts = pos.update(&[1.5, 0.6]).unwrap();

        // Rising price drains token0, falling price drains token1.
        assert!(amounts.amount0[0] < 100.0 && amounts.amount1[0] > 100.0);
        assert!(amounts.amount0[1] > 100.0 && amounts.amount1[1] < 100.0);
        for (i, p) in [1.5, 0.6].into_iter().enumerate() {
            assert!((amounts.amount1[i] / amounts.amount0[i] - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reset_empties_pool() {
        let mut pos = ConstantProductPosition::new(&[1.0], FeeTier::MEDIUM).unwrap();
        pos.mint(&[1.0], &[1.0]).unwrap();
        pos.reset(&[2.0]).unwrap();
        assert_eq!(pos.amounts(), PairAmounts::zeros(1));
        assert_eq!(pos.price(), &[2.0]);
        assert!(pos.reset(&[1.0, 1.0]).is_err());
    }
}
