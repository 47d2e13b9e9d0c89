//! Parallel sweep of strategy performance over GBM drift and volatility.

use crate::error::{OptimizationError, OptimizationResult};
use crate::objective::ObjectiveFunction;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uniswap_sim_simulation::hodl::HodlComparison;
use uniswap_sim_simulation::monte_carlo::MonteCarloRunner;
use uniswap_sim_simulation::state::SimulationConfig;

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Runs one Monte Carlo simulation per `(mu, sigma)` pair.
#[derive(Debug, Clone)]
pub struct GridSearch {
    /// Everything but drift and volatility.
    pub base: SimulationConfig,
    pub mus: Vec<f64>,
    pub sigmas: Vec<f64>,
}

/// Result of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub mu: f64,
    pub sigma: f64,
    pub result: HodlComparison,
}

/// Cells indexed `[sigma][mu]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceGrid {
    pub mus: Vec<f64>,
    pub sigmas: Vec<f64>,
    pub cells: Vec<Vec<GridCell>>,
}

impl GridSearch {
    pub fn new(base: SimulationConfig, mus: Vec<f64>, sigmas: Vec<f64>) -> Self {
        Self { base, mus, sigmas }
    }

    /// Config of the cell at row-major `index`. A seeded base config gives
    /// every cell its own derived seed.
    fn cell_config(&self, index: usize) -> SimulationConfig {
        let mu = self.mus[index % self.mus.len()];
        let sigma = self.sigmas[index / self.mus.len()];
        let config = self.base.clone().with_dynamics(mu, sigma);
        match self.base.seed {
            Some(seed) => config.with_seed(seed.wrapping_add(index as u64 + 1)),
            None => config,
        }
    }

    pub fn run(&self) -> OptimizationResult<PerformanceGrid> {
        if self.mus.is_empty() || self.sigmas.is_empty() {
            return Err(OptimizationError::EmptyGrid);
        }

        let total = self.mus.len() * self.sigmas.len();
        info!(
            cells = total,
            strategy = ?self.base.strategy,
            trajectories = self.base.trajectories,
            "starting grid search"
        );

        let flat = (0..total)
            .into_par_iter()
            .map(|index| -> OptimizationResult<GridCell> {
                let config = self.cell_config(index);
                let (mu, sigma) = (config.drift, config.volatility);
                let result = MonteCarloRunner::new(config).run()?;
                info!(mu, sigma, excess = result.excess(), "grid cell done");
                Ok(GridCell { mu, sigma, result })
            })
            .collect::<OptimizationResult<Vec<_>>>()?;

        let cells = flat
            .chunks(self.mus.len())
            .map(<[GridCell]>::to_vec)
            .collect();

        Ok(PerformanceGrid {
            mus: self.mus.clone(),
            sigmas: self.sigmas.clone(),
            cells,
        })
    }
}

impl PerformanceGrid {
    /// `G - G_hodl` per cell.
    pub fn excess(&self) -> Vec<Vec<f64>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.result.excess()).collect())
            .collect()
    }

    /// `(G, G_hodl)` per cell.
    pub fn growth_rates(&self) -> Vec<Vec<[f64; 2]>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| [c.result.growth_rate, c.result.hodl_growth_rate])
                    .collect()
            })
            .collect()
    }

    /// Drift and volatility coordinates of every cell, in the same layout as
    /// `cells`.
    pub fn meshgrid(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let x = self.sigmas.iter().map(|_| self.mus.clone()).collect();
        let y = self
            .sigmas
            .iter()
            .map(|s| vec![*s; self.mus.len()])
            .collect();
        (x, y)
    }

    /// Largest excess growth, ignoring NaN cells.
    pub fn max_excess(&self) -> Option<f64> {
        self.excess()
            .into_iter()
            .flatten()
            .filter(|e| !e.is_nan())
            .max_by(f64::total_cmp)
    }

    /// Cell scoring highest under `objective`.
    pub fn best_by(&self, objective: &dyn ObjectiveFunction) -> Option<&GridCell> {
        self.cells
            .iter()
            .flatten()
            .max_by(|a, b| objective.compare(&a.result, &b.result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{MaximizeExcessGrowth, MaximizeGrowth};

    fn base() -> SimulationConfig {
        SimulationConfig::new()
            .with_time_step(0.1)
            .with_horizon(2.0)
            .with_trajectories(16)
            .with_seed(5)
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_grid_shape() {
        let search = GridSearch::new(base(), linspace(-0.5, 1.0, 3), linspace(0.1, 1.0, 2));
        let grid = search.run().unwrap();

        assert_eq!(grid.cells.len(), 2);
        assert!(grid.cells.iter().all(|row| row.len() == 3));
        assert_eq!(grid.cells[1][2].mu, 1.0);
        assert_eq!(grid.cells[1][2].sigma, 1.0);
        assert_eq!(grid.cells[0][0].mu, -0.5);
        assert_eq!(grid.cells[0][0].sigma, 0.1);

        let (x, y) = grid.meshgrid();
        assert_eq!(x[1], grid.mus);
        assert_eq!(y[1], vec![1.0; 3]);
        assert_eq!(grid.growth_rates()[0].len(), 3);
    }

    #[test]
    fn test_seeded_grid_is_reproducible() {
        let search = GridSearch::new(base(), vec![0.0, 0.5], vec![0.5]);
        let a = search.run().unwrap();
        let b = search.run().unwrap();
        assert_eq!(a, b);
        // Cells draw different paths.
        assert_ne!(
            a.cells[0][0].result.hodl_growth_rate,
            a.cells[0][1].result.hodl_growth_rate
        );
    }

    #[test]
    fn test_best_by_objective() {
        let search = GridSearch::new(base(), vec![-0.5, 0.0, 0.5], vec![0.3, 0.9]);
        let grid = search.run().unwrap();

        let best = grid.best_by(&MaximizeExcessGrowth).unwrap();
        assert_eq!(Some(best.result.excess()), grid.max_excess());

        let fastest = grid.best_by(&MaximizeGrowth).unwrap();
        let max_growth = grid
            .cells
            .iter()
            .flatten()
            .map(|c| c.result.growth_rate)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(fastest.result.growth_rate, max_growth);
    }

    #[test]
    fn test_empty_grid() {
        let search = GridSearch::new(base(), vec![], vec![0.5]);
        assert_eq!(search.run(), Err(OptimizationError::EmptyGrid));
    }
}
