//! Errors raised by the domain layer.

/// Input-contract violations detected by the liquidity math and value objects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MathError {
    /// A range whose lower bound is not strictly below its upper bound.
    #[error("invalid range at index {index}: lower {lower} must be below upper {upper}")]
    InvalidRange {
        /// Trajectory index.
        index: usize,
        /// Lower bound (price or sqrt price, as given).
        lower: f64,
        /// Upper bound (price or sqrt price, as given).
        upper: f64,
    },
    /// A price that is zero, negative or not finite.
    #[error("price at index {index} must be positive and finite, got {price}")]
    NonPositivePrice {
        /// Trajectory index.
        index: usize,
        /// Offending price.
        price: f64,
    },
    /// Batched inputs of different lengths.
    #[error("batch length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Length of the reference batch.
        expected: usize,
        /// Length of the offending batch.
        found: usize,
    },
    /// Fee tier outside the open interval (0, 1).
    #[error("fee tier must lie in (0, 1), got {0}")]
    InvalidFeeTier(f64),
    /// A token amount or liquidity that is negative or not finite.
    #[error("amount at index {index} must be non-negative and finite, got {value}")]
    NonFiniteAmount {
        /// Trajectory index.
        index: usize,
        /// Offending value.
        value: f64,
    },
}

/// Convenience alias for domain results.
pub type MathResult<T> = Result<T, MathError>;

/// Checks that `found` has the same length as the reference batch.
pub fn ensure_len(expected: usize, found: usize) -> MathResult<()> {
    if expected != found {
        return Err(MathError::LengthMismatch { expected, found });
    }
    Ok(())
}

/// Checks that every price in the batch is strictly positive and finite.
pub fn ensure_positive_prices(prices: &[f64]) -> MathResult<()> {
    match prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        Some((index, &price)) => Err(MathError::NonPositivePrice { index, price }),
        None => Ok(()),
    }
}

/// Checks that every amount in the batch is non-negative and finite.
pub fn ensure_amounts(amounts: &[f64]) -> MathResult<()> {
    match amounts
        .iter()
        .enumerate()
        .find(|(_, a)| !(a.is_finite() && **a >= 0.0))
    {
        Some((index, &value)) => Err(MathError::NonFiniteAmount { index, value }),
        None => Ok(()),
    }
}

/// Checks that every value in the batch is finite.
pub fn ensure_finite(values: &[f64]) -> MathResult<()> {
    match values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(MathError::NonFiniteAmount { index, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len(3, 3).is_ok());
        assert_eq!(
            ensure_len(3, 2),
            Err(MathError::LengthMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_ensure_positive_prices_reports_index() {
        assert!(ensure_positive_prices(&[1.0, 2.0]).is_ok());
        match ensure_positive_prices(&[1.0, 0.0, -1.0]) {
            Err(MathError::NonPositivePrice { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected NonPositivePrice, got {other:?}"),
        }
        assert!(ensure_positive_prices(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_ensure_amounts() {
        assert!(ensure_amounts(&[0.0, 5.0]).is_ok());
        assert!(ensure_amounts(&[1.0, -0.5]).is_err());
        assert!(ensure_amounts(&[f64::INFINITY]).is_err());
        assert!(ensure_finite(&[-1.0, 0.0]).is_ok());
        assert!(ensure_finite(&[f64::NAN]).is_err());
    }
}
