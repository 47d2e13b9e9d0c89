use crate::error::{MathResult, ensure_len};
use serde::{Deserialize, Serialize};

/// Token0 and token1 amounts for a batch of trajectories.
///
/// Stored as two parallel vectors so that element `i` of each belongs to
/// trajectory `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PairAmounts {
    pub amount0: Vec<f64>,
    pub amount1: Vec<f64>,
}

impl PairAmounts {
    /// Builds a pair from two vectors of equal length.
    pub fn new(amount0: Vec<f64>, amount1: Vec<f64>) -> MathResult<Self> {
        ensure_len(amount0.len(), amount1.len())?;
        Ok(Self { amount0, amount1 })
    }

    /// A batch of `len` zero pairs.
    pub fn zeros(len: usize) -> Self {
        Self {
            amount0: vec![0.0; len],
            amount1: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.amount0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amount0.is_empty()
    }

    /// Returns `(amount0, amount1)` of trajectory `index`.
    pub fn get(&self, index: usize) -> (f64, f64) {
        (self.amount0[index], self.amount1[index])
    }

    /// Elementwise sum.
    pub fn add(&self, other: &Self) -> MathResult<Self> {
        ensure_len(self.len(), other.len())?;
        Ok(Self {
            amount0: zip_with(&self.amount0, &other.amount0, |a, b| a + b),
            amount1: zip_with(&self.amount1, &other.amount1, |a, b| a + b),
        })
    }

    /// Elementwise difference `self - other`.
    pub fn sub(&self, other: &Self) -> MathResult<Self> {
        ensure_len(self.len(), other.len())?;
        Ok(Self {
            amount0: zip_with(&self.amount0, &other.amount0, |a, b| a - b),
            amount1: zip_with(&self.amount1, &other.amount1, |a, b| a - b),
        })
    }

    pub fn add_assign(&mut self, other: &Self) -> MathResult<()> {
        ensure_len(self.len(), other.len())?;
        for (a, b) in self.amount0.iter_mut().zip(&other.amount0) {
            *a += b;
        }
        for (a, b) in self.amount1.iter_mut().zip(&other.amount1) {
            *a += b;
        }
        Ok(())
    }

    /// Multiplies both tokens of every trajectory by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            amount0: self.amount0.iter().map(|a| a * factor).collect(),
            amount1: self.amount1.iter().map(|a| a * factor).collect(),
        }
    }

    /// Multiplies both tokens of trajectory `i` by `factors[i]`.
    pub fn scaled_by(&self, factors: &[f64]) -> MathResult<Self> {
        ensure_len(self.len(), factors.len())?;
        Ok(Self {
            amount0: zip_with(&self.amount0, factors, |a, f| a * f),
            amount1: zip_with(&self.amount1, factors, |a, f| a * f),
        })
    }

    /// Keeps trajectories selected by `mask`, zeroing the rest.
    pub fn masked(&self, mask: &[bool]) -> MathResult<Self> {
        ensure_len(self.len(), mask.len())?;
        let pick = |v: &[f64]| {
            v.iter()
                .zip(mask)
                .map(|(a, &m)| if m { *a } else { 0.0 })
                .collect()
        };
        Ok(Self {
            amount0: pick(&self.amount0),
            amount1: pick(&self.amount1),
        })
    }

    /// Clamps every negative entry to zero.
    pub fn clamp_non_negative(&mut self) {
        for a in self.amount0.iter_mut().chain(self.amount1.iter_mut()) {
            if *a < 0.0 {
                *a = 0.0;
            }
        }
    }

    /// Smallest entry across both tokens, `None` for an empty batch.
    pub fn min_value(&self) -> Option<(usize, f64)> {
        self.amount0
            .iter()
            .enumerate()
            .chain(self.amount1.iter().enumerate())
            .map(|(i, a)| (i, *a))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Token1-denominated value per trajectory: `amount0 * price + amount1`.
    pub fn value_in_token1(&self, prices: &[f64]) -> MathResult<Vec<f64>> {
        ensure_len(self.len(), prices.len())?;
        Ok(self
            .amount0
            .iter()
            .zip(&self.amount1)
            .zip(prices)
            .map(|((a0, a1), p)| a0 * p + a1)
            .collect())
    }
}

fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = PairAmounts::new(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let b = PairAmounts::new(vec![0.5, 0.5], vec![1.0, 1.0]).unwrap();

        let sum = a.add(&b).unwrap();
        assert_eq!(sum.amount0, vec![1.5, 2.5]);
        assert_eq!(sum.amount1, vec![4.0, 5.0]);

        let diff = a.sub(&b).unwrap();
        assert_eq!(diff.get(1), (1.5, 3.0));

        assert_eq!(a.scaled(2.0).amount1, vec![6.0, 8.0]);
        assert_eq!(a.scaled_by(&[0.0, 1.0]).unwrap().amount0, vec![0.0, 2.0]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(PairAmounts::new(vec![1.0], vec![]).is_err());
        let a = PairAmounts::zeros(2);
        assert!(a.add(&PairAmounts::zeros(3)).is_err());
    }

    #[test]
    fn test_masked_and_clamp() {
        let mut a = PairAmounts::new(vec![-1.0, 2.0], vec![3.0, -4.0]).unwrap();
        let m = a.masked(&[false, true]).unwrap();
        assert_eq!(m.amount0, vec![0.0, 2.0]);
        assert_eq!(m.amount1, vec![0.0, -4.0]);

        assert_eq!(a.min_value(), Some((1, -4.0)));
        a.clamp_non_negative();
        assert_eq!(a.amount0, vec![0.0, 2.0]);
        assert_eq!(a.amount1, vec![3.0, 0.0]);
    }

    #[test]
    fn test_value_in_token1() {
        let a = PairAmounts::new(vec![2.0], vec![10.0]).unwrap();
        assert_eq!(a.value_in_token1(&[5.0]).unwrap(), vec![20.0]);
    }
}
