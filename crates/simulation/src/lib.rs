//! Batched Uniswap V3 position engine and Monte Carlo driver.
//!
//! A [`position::Position`] tracks one range position per simulated
//! trajectory. Strategies built on top of it share the
//! [`strategies::LiquidityStrategy`] contract, and [`hodl::compare_to_hodl`]
//! runs any of them over a batch of price paths and scores the result
//! against holding the initial deposit.

pub mod constant_product;
pub mod error;
pub mod hodl;
pub mod monte_carlo;
pub mod position;
pub mod prelude;
pub mod price_path;
pub mod state;
pub mod strategies;

pub use error::{SimResult, SimulationError};
