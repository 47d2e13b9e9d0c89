pub mod growth;

pub use growth::{hold_value, log_growth_rate};
