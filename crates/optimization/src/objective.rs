use std::cmp::Ordering;
use uniswap_sim_simulation::hodl::HodlComparison;

/// Scores a strategy run; higher is better.
pub trait ObjectiveFunction {
    fn evaluate(&self, result: &HodlComparison) -> f64;
    fn compare(&self, a: &HodlComparison, b: &HodlComparison) -> Ordering {
        self.evaluate(a)
            .partial_cmp(&self.evaluate(b))
            .unwrap_or(Ordering::Equal)
    }
}

/// Growth in excess of holding.
pub struct MaximizeExcessGrowth;
impl ObjectiveFunction for MaximizeExcessGrowth {
    fn evaluate(&self, result: &HodlComparison) -> f64 {
        result.excess()
    }
}

/// Raw strategy growth, ignoring the baseline.
pub struct MaximizeGrowth;
impl ObjectiveFunction for MaximizeGrowth {
    fn evaluate(&self, result: &HodlComparison) -> f64 {
        result.growth_rate
    }
}
