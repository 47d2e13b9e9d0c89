pub mod fee_tier;
pub mod pair_amounts;
pub mod price_range;

pub use fee_tier::FeeTier;
pub use pair_amounts::PairAmounts;
pub use price_range::PriceRange;
