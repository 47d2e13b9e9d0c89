/// Continuously compounded growth rate, averaged over trajectories.
///
/// `G = mean(ln(wealth_ratio)) / horizon`, where each ratio is terminal
/// wealth divided by initial wealth.
pub fn log_growth_rate(wealth_ratios: &[f64], horizon: f64) -> f64 {
    if wealth_ratios.is_empty() {
        return 0.0;
    }
    let mean_log = wealth_ratios.iter().map(|r| r.ln()).sum::<f64>() / wealth_ratios.len() as f64;
    mean_log / horizon
}

/// Token1-denominated value of holding `amount0` and `amount1` at `price`.
pub fn hold_value(amount0: f64, amount1: f64, price: f64) -> f64 {
    amount0 * price + amount1
}
