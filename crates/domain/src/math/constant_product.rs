//! Full-range (Uniswap V2 style) reserve math with a fee-adjusted arbitrage step.

/// Whether a move from `old_price` to `new_price` is large enough for an
/// arbitrageur to trade through a pool charging `fee`.
///
/// The no-trade band is `[1 - fee, 1 / (1 - fee)]` around the old price.
pub fn should_arbitrage(old_price: f64, new_price: f64, fee: f64) -> bool {
    let ratio = new_price / old_price;
    ratio > 1.0 / (1.0 - fee) || ratio < 1.0 - fee
}

/// Reserves `(x, y)` after arbitrage moves the pool to `price`.
///
/// With `gamma = 1 + fee` the arbitrageur supplies
/// `a = (-x (2 + fee) + sqrt((x fee)^2 + 4 gamma k / price)) / (2 gamma)` of
/// token0 when the price falls, or the analogous `b` of token1 when it rises;
/// the other reserve is then set so that `y = price * x`.
pub fn arbitrage_to_price(x: f64, y: f64, old_price: f64, price: f64, fee: f64) -> (f64, f64) {
    let gamma = 1.0 + fee;
    let k = x * y;

    let (x, y) = if price > old_price {
        let b = (-y * (2.0 + fee) + ((y * fee).powi(2) + 4.0 * gamma * k * price).sqrt())
            / (2.0 * gamma);
        let y = y + b;
        (y / price, y)
    } else {
        let a = (-x * (2.0 + fee) + ((x * fee).powi(2) + 4.0 * gamma * k / price).sqrt())
            / (2.0 * gamma);
        let x = x + a;
        (x, price * x)
    };

    (x.max(0.0), y.max(0.0))
}

/// Calculates the constant product K
pub fn calculate_k(x: f64, y: f64) -> f64 {
    x * y
}
