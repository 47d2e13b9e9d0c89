//! Domain layer for the concentrated liquidity simulator.
//!
//! Pure value objects and closed-form math: the liquidity/amount bijection
//! of Uniswap V3 ranges, tick helpers, full-range reserve math and growth
//! metrics. Nothing here holds simulation state.

pub mod error;
pub mod math;
pub mod metrics;
pub mod value_objects;

pub use error::{MathError, MathResult};
