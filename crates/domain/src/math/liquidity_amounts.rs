//! Conversions between liquidity and token amounts for a price range.
//!
//! All prices are square roots of token1-per-token0 prices. The scalar
//! functions follow the Uniswap V3 periphery `LiquidityAmounts` formulas and
//! return `NaN` when the range is not strictly ordered; the `*_batch`
//! functions validate their inputs up front and apply the scalar functions
//! elementwise, so no `NaN` escapes this module.

use crate::error::{MathError, MathResult, ensure_finite, ensure_len, ensure_positive_prices};
use crate::value_objects::PairAmounts;

/// Where the current price sits relative to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRegime {
    /// `price <= lower`: the position is entirely token0.
    Below,
    /// `lower < price < upper`: both tokens are held.
    InRange,
    /// `price >= upper`: the position is entirely token1.
    Above,
}

impl PriceRegime {
    /// Classifies `sqrt_price` against `[sqrt_a, sqrt_b]`.
    ///
    /// Boundaries belong to the single-sided regimes.
    pub fn classify(sqrt_price: f64, sqrt_a: f64, sqrt_b: f64) -> Self {
        if sqrt_price <= sqrt_a {
            Self::Below
        } else if sqrt_price >= sqrt_b {
            Self::Above
        } else {
            Self::InRange
        }
    }
}

/// Liquidity supported by `amount0` over `[sqrt_a, sqrt_b]`.
/// L = amount0 * sqrt_a * sqrt_b / (sqrt_b - sqrt_a)
pub fn liquidity_for_amount0(sqrt_a: f64, sqrt_b: f64, amount0: f64) -> f64 {
    if !(sqrt_a < sqrt_b) {
        return f64::NAN;
    }
    amount0 * sqrt_a * sqrt_b / (sqrt_b - sqrt_a)
}

/// Liquidity supported by `amount1` over `[sqrt_a, sqrt_b]`.
/// L = amount1 / (sqrt_b - sqrt_a)
pub fn liquidity_for_amount1(sqrt_a: f64, sqrt_b: f64, amount1: f64) -> f64 {
    if !(sqrt_a < sqrt_b) {
        return f64::NAN;
    }
    amount1 / (sqrt_b - sqrt_a)
}

/// Token0 held by `liquidity` across the whole of `[sqrt_a, sqrt_b]`.
/// amount0 = L * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)
pub fn amount0_for_liquidity(sqrt_a: f64, sqrt_b: f64, liquidity: f64) -> f64 {
    if !(sqrt_a < sqrt_b) {
        return f64::NAN;
    }
    liquidity * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)
}

/// Token1 held by `liquidity` across the whole of `[sqrt_a, sqrt_b]`.
/// amount1 = L * (sqrt_b - sqrt_a)
pub fn amount1_for_liquidity(sqrt_a: f64, sqrt_b: f64, liquidity: f64) -> f64 {
    if !(sqrt_a < sqrt_b) {
        return f64::NAN;
    }
    liquidity * (sqrt_b - sqrt_a)
}

/// Largest liquidity that neither token amount is exceeded by.
pub fn liquidity_for_amounts(
    sqrt_price: f64,
    sqrt_a: f64,
    sqrt_b: f64,
    amount0: f64,
    amount1: f64,
) -> MathResult<f64> {
    check_price(0, sqrt_price)?;
    check_range(0, sqrt_a, sqrt_b)?;
    let liquidity = match PriceRegime::classify(sqrt_price, sqrt_a, sqrt_b) {
        PriceRegime::Below => liquidity_for_amount0(sqrt_a, sqrt_b, amount0),
        PriceRegime::Above => liquidity_for_amount1(sqrt_a, sqrt_b, amount1),
        PriceRegime::InRange => liquidity_for_amount0(sqrt_price, sqrt_b, amount0)
            .min(liquidity_for_amount1(sqrt_a, sqrt_price, amount1)),
    };
    assert!(
        !liquidity.is_nan(),
        "unresolved price regime: sqrt_price={sqrt_price} range=[{sqrt_a}, {sqrt_b}]"
    );
    Ok(liquidity)
}

/// Reserves `(amount0, amount1)` held by `liquidity` at `sqrt_price`.
pub fn amounts_for_liquidity(
    sqrt_price: f64,
    sqrt_a: f64,
    sqrt_b: f64,
    liquidity: f64,
) -> MathResult<(f64, f64)> {
    check_price(0, sqrt_price)?;
    check_range(0, sqrt_a, sqrt_b)?;
    let amounts = match PriceRegime::classify(sqrt_price, sqrt_a, sqrt_b) {
        PriceRegime::Below => (amount0_for_liquidity(sqrt_a, sqrt_b, liquidity), 0.0),
        PriceRegime::Above => (0.0, amount1_for_liquidity(sqrt_a, sqrt_b, liquidity)),
        PriceRegime::InRange => (
            amount0_for_liquidity(sqrt_price, sqrt_b, liquidity),
            amount1_for_liquidity(sqrt_a, sqrt_price, liquidity),
        ),
    };
    assert!(
        !(amounts.0.is_nan() || amounts.1.is_nan()),
        "unresolved price regime: sqrt_price={sqrt_price} range=[{sqrt_a}, {sqrt_b}]"
    );
    Ok(amounts)
}

/// Elementwise [`liquidity_for_amounts`] over a batch of trajectories.
pub fn liquidity_for_amounts_batch(
    sqrt_price: &[f64],
    sqrt_a: &[f64],
    sqrt_b: &[f64],
    amount0: &[f64],
    amount1: &[f64],
) -> MathResult<Vec<f64>> {
    let n = sqrt_price.len();
    for len in [sqrt_a.len(), sqrt_b.len(), amount0.len(), amount1.len()] {
        ensure_len(n, len)?;
    }
    check_ranges(sqrt_a, sqrt_b)?;
    ensure_positive_prices(sqrt_price)?;
    ensure_finite(amount0)?;
    ensure_finite(amount1)?;

    (0..n)
        .map(|i| liquidity_for_amounts(sqrt_price[i], sqrt_a[i], sqrt_b[i], amount0[i], amount1[i]))
        .collect()
}

/// Elementwise [`amounts_for_liquidity`] over a batch of trajectories.
pub fn amounts_for_liquidity_batch(
    sqrt_price: &[f64],
    sqrt_a: &[f64],
    sqrt_b: &[f64],
    liquidity: &[f64],
) -> MathResult<PairAmounts> {
    let n = sqrt_price.len();
    for len in [sqrt_a.len(), sqrt_b.len(), liquidity.len()] {
        ensure_len(n, len)?;
    }
    check_ranges(sqrt_a, sqrt_b)?;
    ensure_positive_prices(sqrt_price)?;
    ensure_finite(liquidity)?;

    let mut amounts = PairAmounts::zeros(n);
    for i in 0..n {
        let (a0, a1) = amounts_for_liquidity(sqrt_price[i], sqrt_a[i], sqrt_b[i], liquidity[i])?;
        amounts.amount0[i] = a0;
        amounts.amount1[i] = a1;
    }
    Ok(amounts)
}

/// Validates that every range in the batch is positive and strictly ordered.
pub fn check_ranges(sqrt_a: &[f64], sqrt_b: &[f64]) -> MathResult<()> {
    ensure_len(sqrt_a.len(), sqrt_b.len())?;
    sqrt_a
        .iter()
        .zip(sqrt_b)
        .enumerate()
        .try_for_each(|(i, (a, b))| check_range(i, *a, *b))
}

fn check_price(index: usize, sqrt_price: f64) -> MathResult<()> {
    if !(sqrt_price.is_finite() && sqrt_price > 0.0) {
        return Err(MathError::NonPositivePrice {
            index,
            price: sqrt_price,
        });
    }
    Ok(())
}

fn check_range(index: usize, sqrt_a: f64, sqrt_b: f64) -> MathResult<()> {
    if !(sqrt_a > 0.0 && sqrt_a < sqrt_b && sqrt_b.is_finite()) {
        return Err(MathError::InvalidRange {
            index,
            lower: sqrt_a,
            upper: sqrt_b,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= TOL * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_single_sided_formulas() {
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // amount1 = 1000 * (2 - 1) = 1000
        // amount0 = 1000 * (2 - 1) / (1 * 2) = 500
        assert!(close(amount1_for_liquidity(1.0, 2.0, 1000.0), 1000.0));
        assert!(close(amount0_for_liquidity(1.0, 2.0, 1000.0), 500.0));

        assert!(close(liquidity_for_amount0(1.0, 2.0, 500.0), 1000.0));
        assert!(close(liquidity_for_amount1(1.0, 2.0, 1000.0), 1000.0));
    }

    #[test]
    fn test_unordered_range_is_nan() {
        assert!(liquidity_for_amount0(2.0, 1.0, 1.0).is_nan());
        assert!(liquidity_for_amount1(1.0, 1.0, 1.0).is_nan());
        assert!(amount0_for_liquidity(2.0, 2.0, 1.0).is_nan());
        assert!(amount1_for_liquidity(3.0, 2.0, 1.0).is_nan());
    }

    #[test]
    fn test_invalid_range_fails_fast() {
        assert!(matches!(
            liquidity_for_amounts(1.5, 2.0, 1.0, 1.0, 1.0),
            Err(MathError::InvalidRange { .. })
        ));
        assert!(amounts_for_liquidity(1.5, 2.0, 2.0, 1.0).is_err());

        match amounts_for_liquidity_batch(&[1.0, 1.0], &[0.5, 2.0], &[2.0, 1.0], &[1.0, 1.0]) {
            Err(MathError::InvalidRange { index, .. }) => assert_eq!(index, 1),
            other => panic!("Expected InvalidRange, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_length_mismatch() {
        let res = liquidity_for_amounts_batch(&[1.0, 1.0], &[0.5], &[2.0, 2.0], &[1.0, 1.0], &[1.0, 1.0]);
        assert!(matches!(res, Err(MathError::LengthMismatch { .. })));
    }

    #[test]
    fn test_regime_classification() {
        assert_eq!(PriceRegime::classify(0.5, 1.0, 2.0), PriceRegime::Below);
        assert_eq!(PriceRegime::classify(1.0, 1.0, 2.0), PriceRegime::Below);
        assert_eq!(PriceRegime::classify(1.5, 1.0, 2.0), PriceRegime::InRange);
        assert_eq!(PriceRegime::classify(2.0, 1.0, 2.0), PriceRegime::Above);
        assert_eq!(PriceRegime::classify(3.0, 1.0, 2.0), PriceRegime::Above);
    }

    #[test]
    fn test_reserve_curve_continuity_at_bounds() {
        let (a, b, l) = (1.0, 2.0, 1000.0);

        let at_lower = amounts_for_liquidity(a, a, b, l).unwrap();
        let above_lower = amounts_for_liquidity(a + 1e-12, a, b, l).unwrap();
        assert!(close(at_lower.0, above_lower.0));
        assert!(above_lower.1.abs() < 1e-6);
        assert_eq!(at_lower.1, 0.0);

        let at_upper = amounts_for_liquidity(b, a, b, l).unwrap();
        let below_upper = amounts_for_liquidity(b - 1e-12, a, b, l).unwrap();
        assert!(close(at_upper.1, below_upper.1));
        assert!(below_upper.0.abs() < 1e-6);
        assert_eq!(at_upper.0, 0.0);
    }

    #[test]
    fn test_regime_boundary_exactness() {
        let (a, b) = (1.0, 2.0);
        let (x, y) = (500.0, 800.0);

        let at_lower = liquidity_for_amounts(a, a, b, x, y).unwrap();
        assert_eq!(at_lower, liquidity_for_amount0(a, b, x));
        let near_lower = liquidity_for_amounts(a + 1e-12, a, b, x, y).unwrap();
        assert!(close(at_lower, near_lower));

        let at_upper = liquidity_for_amounts(b, a, b, x, y).unwrap();
        assert_eq!(at_upper, liquidity_for_amount1(a, b, y));
        let near_upper = liquidity_for_amounts(b - 1e-12, a, b, x, y).unwrap();
        assert!(close(at_upper, near_upper));
    }

    #[test]
    fn test_mint_consumes_at_most_requested() {
        let cases = [
            (1.2, 1.0, 2.0, 100.0, 100.0),
            (1.9, 1.0, 2.0, 100.0, 1.0),
            (1.05, 1.0, 2.0, 0.5, 1000.0),
            (10.0, 3.0, 30.0, 1e4, 1e6),
        ];
        for (p, a, b, x, y) in cases {
            let l = liquidity_for_amounts(p, a, b, x, y).unwrap();
            let (ux, uy) = amounts_for_liquidity(p, a, b, l).unwrap();
            assert!(ux <= x * (1.0 + TOL));
            assert!(uy <= y * (1.0 + TOL));
            assert!(close(ux, x) || close(uy, y), "binding constraint not saturated");
        }
    }

    #[test]
    fn test_out_of_range_degeneracy() {
        let l = 1000.0;
        // Range entirely below the price: all token1.
        let (x, y) = amounts_for_liquidity(3.0, 1.0, 2.0, l).unwrap();
        assert_eq!(x, 0.0);
        assert!(close(y, amount1_for_liquidity(1.0, 2.0, l)));
        // Range entirely above the price: all token0.
        let (x, y) = amounts_for_liquidity(0.5, 1.0, 2.0, l).unwrap();
        assert_eq!(y, 0.0);
        assert!(close(x, amount0_for_liquidity(1.0, 2.0, l)));
    }

    #[test]
    fn test_batch_matches_scalar() {
        let sqrt_p = [0.5, 1.5, 3.0];
        let sqrt_a = [1.0, 1.0, 1.0];
        let sqrt_b = [2.0, 2.0, 2.0];
        let liquidity = liquidity_for_amounts_batch(&sqrt_p, &sqrt_a, &sqrt_b, &[10.0; 3], &[10.0; 3]).unwrap();
        let amounts = amounts_for_liquidity_batch(&sqrt_p, &sqrt_a, &sqrt_b, &liquidity).unwrap();
        for i in 0..3 {
            let l = liquidity_for_amounts(sqrt_p[i], 1.0, 2.0, 10.0, 10.0).unwrap();
            assert_eq!(liquidity[i], l);
            assert_eq!(amounts.get(i), amounts_for_liquidity(sqrt_p[i], 1.0, 2.0, l).unwrap());
        }
    }

    #[test]
    fn test_scalar_rejects_bad_price() {
        for p in [f64::NAN, 0.0, -1.0, f64::INFINITY] {
            assert!(matches!(
                liquidity_for_amounts(p, 1.0, 2.0, 10.0, 10.0),
                Err(MathError::NonPositivePrice { index: 0, .. })
            ));
            assert!(matches!(
                amounts_for_liquidity(p, 1.0, 2.0, 10.0),
                Err(MathError::NonPositivePrice { index: 0, .. })
            ));
        }
    }
}
