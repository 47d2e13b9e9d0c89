/// Base of the Uniswap V3 tick grid: `price = 1.0001^tick`.
pub const TICK_BASE: f64 = 1.0001;
/// Lowest usable tick.
pub const MIN_TICK: i32 = -887_272;
/// Highest usable tick.
pub const MAX_TICK: i32 = 887_272;

/// Returns the price corresponding to a (possibly fractional) tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: f64) -> f64 {
    TICK_BASE.powf(tick)
}

/// Returns the unrounded tick corresponding to a price.
/// tick = log_1.0001(P)
pub fn price_to_tick(price: f64) -> f64 {
    price.ln() / TICK_BASE.ln()
}

/// Half the width of `[lower, upper]`, measured in ticks.
pub fn half_width_ticks(lower: f64, upper: f64) -> f64 {
    (upper.ln() - lower.ln()) / (2.0 * TICK_BASE.ln())
}

/// Snaps a tick interval outwards onto multiples of `spacing`.
///
/// The lower tick is floored; the upper tick moves to the multiple just
/// above its floor, so a degenerate interval becomes one spacing wide.
pub fn coerce_to_tick_spacing(spacing: i32, lower_tick: f64, upper_tick: f64) -> (f64, f64) {
    let s = f64::from(spacing);
    let lower = lower_tick - lower_tick.rem_euclid(s);
    let upper = upper_tick - (upper_tick.rem_euclid(s) - s);
    (lower, upper)
}

/// A range of `2 * half_width` ticks centred on `price`.
///
/// Near the edges of the tick grid the range is shifted inwards so that it
/// keeps its full width.
pub fn recentered_range(price: f64, half_width: f64) -> (f64, f64) {
    let center = price_to_tick(price);
    let (lower, upper) = if center < 0.0 {
        let lower = (center - half_width).max(f64::from(MIN_TICK));
        (lower, lower + 2.0 * half_width)
    } else {
        let upper = (center + half_width).min(f64::from(MAX_TICK));
        (upper - 2.0 * half_width, upper)
    };
    (tick_to_price(lower), tick_to_price(upper))
}
