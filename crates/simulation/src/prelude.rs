//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use uniswap_sim_simulation::prelude::*;
//!
//! let range = PriceRange::new(0.5, 2.0).unwrap();
//! let prices = DeterministicPricePath::from_series(&[1.0, 1.2, 0.9, 1.0], 4).snapshots;
//! let mut strategy = StrategyKind::Compounding
//!     .build(&prices[0], range, FeeTier::MEDIUM)
//!     .unwrap();
//! let result = compare_to_hodl(strategy.as_mut(), &prices, 1.0).unwrap();
//! assert!(result.growth_rate.is_finite());
//! ```

// Errors
pub use crate::error::{FEE_EPSILON, SimResult, SimulationError};

// Driver
pub use crate::hodl::{HodlComparison, INITIAL_INVENTORY0, compare_to_hodl};
pub use crate::monte_carlo::MonteCarloRunner;

// Positions
pub use crate::constant_product::ConstantProductPosition;
pub use crate::position::Position;

// Price path generators
pub use crate::price_path::{DeterministicPricePath, GeometricBrownianMotion, PricePathGenerator};

// Configuration
pub use crate::state::SimulationConfig;

// Strategies
pub use crate::strategies::{
    CompoundingStrategy, LimitOrderStrategy, LiquiditySilos, LiquidityStrategy,
    SplitCompoundingStrategy, StrategyKind,
};

// Domain value objects
pub use uniswap_sim_domain::value_objects::{FeeTier, PairAmounts, PriceRange};
