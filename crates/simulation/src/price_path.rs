//! Price trajectory generators.
//!
//! Generators produce snapshots: one `Vec<f64>` per time step, each holding
//! the price of every trajectory at that step.

use crate::error::{SimResult, SimulationError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;
use uniswap_sim_domain::error::ensure_len;

pub trait PricePathGenerator {
    /// Draws `count` trajectories, returned time-major.
    fn sample(&mut self, count: usize) -> SimResult<Vec<Vec<f64>>>;
}

/// Geometric Brownian motion sampled on a uniform grid.
#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    pub initial_price: f64,
    pub drift: f64,      // mu
    pub volatility: f64, // sigma
    pub time_step: f64,  // dt
    steps: usize,
    rng: StdRng,
}

impl GeometricBrownianMotion {
    /// Creates a generator over `[0, horizon]` with `floor(horizon / time_step)`
    /// snapshots, the first of which is `initial_price`.
    pub fn new(
        initial_price: f64,
        drift: f64,
        volatility: f64,
        time_step: f64,
        horizon: f64,
    ) -> SimResult<Self> {
        if !(initial_price.is_finite() && initial_price > 0.0) {
            return Err(SimulationError::InvalidParameter(format!(
                "initial price must be positive, got {initial_price}"
            )));
        }
        if !(volatility.is_finite() && volatility >= 0.0) || !drift.is_finite() {
            return Err(SimulationError::InvalidParameter(format!(
                "drift {drift} and volatility {volatility} must be finite, volatility non-negative"
            )));
        }
        if !(time_step > 0.0 && horizon.is_finite()) {
            return Err(SimulationError::InvalidParameter(format!(
                "time step must be positive, got {time_step}"
            )));
        }
        let steps = (horizon / time_step).floor();
        if steps < 1.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "horizon {horizon} is shorter than one time step {time_step}"
            )));
        }

        Ok(Self {
            initial_price,
            drift,
            volatility,
            time_step,
            steps: steps as usize,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Makes sampling reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of snapshots per trajectory, including the initial one.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl PricePathGenerator for GeometricBrownianMotion {
    fn sample(&mut self, count: usize) -> SimResult<Vec<Vec<f64>>> {
        let dt = self.time_step;
        let normal = Normal::new(0.0, dt.sqrt())
            .map_err(|e| SimulationError::InvalidParameter(e.to_string()))?;
        let drift_term = (self.drift - 0.5 * self.volatility.powi(2)) * dt;

        let mut snapshots = Vec::with_capacity(self.steps);
        let mut current = vec![self.initial_price; count];
        snapshots.push(current.clone());

        for _ in 1..self.steps {
            for price in current.iter_mut() {
                let noise = normal.sample(&mut self.rng);
                *price *= (drift_term + self.volatility * noise).exp();
            }
            snapshots.push(current.clone());
        }

        debug!(steps = self.steps, count, "sampled gbm trajectories");
        Ok(snapshots)
    }
}

/// A fixed series replayed identically for every trajectory.
#[derive(Debug, Clone)]
pub struct DeterministicPricePath {
    pub snapshots: Vec<Vec<f64>>,
}

impl DeterministicPricePath {
    /// Wraps snapshots that are already time-major.
    pub fn new(snapshots: Vec<Vec<f64>>) -> Self {
        Self { snapshots }
    }

    /// Broadcasts one price series to `count` identical trajectories.
    pub fn from_series(series: &[f64], count: usize) -> Self {
        Self {
            snapshots: series.iter().map(|p| vec![*p; count]).collect(),
        }
    }
}

impl PricePathGenerator for DeterministicPricePath {
    fn sample(&mut self, count: usize) -> SimResult<Vec<Vec<f64>>> {
        for row in &self.snapshots {
            ensure_len(count, row.len())?;
        }
        Ok(self.snapshots.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbm_shape_and_start() {
        let mut gbm = GeometricBrownianMotion::new(100.0, 0.0, 0.2, 1.0 / 60.0, 31.0)
            .unwrap()
            .with_seed(7);
        assert_eq!(gbm.steps(), 1860);

        let path = gbm.sample(5).unwrap();
        assert_eq!(path.len(), 1860);
        assert!(path.iter().all(|row| row.len() == 5));
        assert_eq!(path[0], vec![100.0; 5]);
        assert!(path.iter().flatten().all(|p| *p > 0.0));

        // Trajectories diverge.
        let last = path.last().unwrap();
        assert!(last.iter().any(|p| *p != last[0]));
    }

    #[test]
    fn test_gbm_seed_is_reproducible() {
        let make = || {
            GeometricBrownianMotion::new(1.0, 0.1, 0.5, 0.01, 1.0)
                .unwrap()
                .with_seed(42)
        };
        assert_eq!(make().sample(3).unwrap(), make().sample(3).unwrap());
        assert_ne!(
            make().sample(3).unwrap(),
            make().with_seed(43).sample(3).unwrap()
        );
    }

    #[test]
    fn test_zero_volatility_is_deterministic_growth() {
        let mu = 0.3;
        let dt = 0.1;
        let mut gbm = GeometricBrownianMotion::new(2.0, mu, 0.0, dt, 1.0).unwrap();
        let path = gbm.sample(2).unwrap();
        for (i, row) in path.iter().enumerate() {
            let expected = 2.0 * (mu * dt * i as f64).exp();
            assert!((row[0] - expected).abs() < 1e-9);
            assert_eq!(row[0], row[1]);
        }
    }

    #[test]
    fn test_gbm_log_drift() {
        // E[ln(S_t / S_0)] = (mu - sigma^2 / 2) t
        let (mu, sigma, dt) = (0.5, 0.4, 0.05);
        let mut gbm = GeometricBrownianMotion::new(1.0, mu, sigma, dt, 1.0)
            .unwrap()
            .with_seed(1);
        let path = gbm.sample(4000).unwrap();
        let t = (path.len() - 1) as f64 * dt;
        let mean = path.last().unwrap().iter().map(|p| p.ln()).sum::<f64>() / 4000.0;
        let expected = (mu - 0.5 * sigma * sigma) * t;
        // Standard error is sigma * sqrt(t / n) ~= 0.006.
        assert!((mean - expected).abs() < 0.03, "{mean} vs {expected}");
    }

    #[test]
    fn test_gbm_rejects_bad_parameters() {
        assert!(GeometricBrownianMotion::new(0.0, 0.0, 0.1, 0.1, 1.0).is_err());
        assert!(GeometricBrownianMotion::new(1.0, 0.0, -0.1, 0.1, 1.0).is_err());
        assert!(GeometricBrownianMotion::new(1.0, 0.0, 0.1, 0.0, 1.0).is_err());
        assert!(GeometricBrownianMotion::new(1.0, 0.0, 0.1, 0.5, 0.2).is_err());
    }

    #[test]
    fn test_deterministic_path() {
        let mut path = DeterministicPricePath::from_series(&[1.0, 2.0, 3.0], 2);
        let snapshots = path.sample(2).unwrap();
        assert_eq!(snapshots, vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]]);
        assert!(path.sample(3).is_err());
    }
}
