pub mod constant_product;
pub mod liquidity_amounts;
pub mod price_tick;
