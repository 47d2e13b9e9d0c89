//! Command Line Interface for the Uniswap V3 liquidity simulator.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use prettytable::{Cell, Row, Table, row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::env;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::info;
use uniswap_sim_domain::value_objects::PriceRange;
use uniswap_sim_optimization::grid_search::{GridSearch, PerformanceGrid, linspace};
use uniswap_sim_optimization::objective::MaximizeExcessGrowth;
use uniswap_sim_simulation::monte_carlo::MonteCarloRunner;
use uniswap_sim_simulation::state::SimulationConfig;
use uniswap_sim_simulation::strategies::StrategyKind;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "uniswap-sim")]
#[command(about = "Monte Carlo simulator for Uniswap V3 liquidity versus holding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one Monte Carlo simulation
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// GBM drift
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        mu: f64,

        /// GBM volatility
        #[arg(long, default_value_t = 0.5)]
        sigma: f64,
    },
    /// Run every strategy on the same sampled price paths
    Compare {
        #[command(flatten)]
        run: RunArgs,

        /// GBM drift
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        mu: f64,

        /// GBM volatility
        #[arg(long, default_value_t = 0.5)]
        sigma: f64,
    },
    /// Sweep drift and volatility and store the growth grid
    Grid {
        #[command(flatten)]
        run: RunArgs,

        #[arg(long, default_value_t = -0.8, allow_hyphen_values = true)]
        mu_min: f64,

        #[arg(long, default_value_t = 2.0)]
        mu_max: f64,

        #[arg(long, default_value_t = 20)]
        mu_count: usize,

        #[arg(long, default_value_t = 0.1)]
        sigma_min: f64,

        #[arg(long, default_value_t = 2.0)]
        sigma_max: f64,

        #[arg(long, default_value_t = 20)]
        sigma_count: usize,

        /// Output directory (defaults to $RESULTS_DIR, then `results`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Strategy to simulate
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Single)]
    strategy: StrategyArg,

    /// Starting price
    #[arg(long, default_value_t = 1.0)]
    price: f64,

    /// Time step between snapshots
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Simulated horizon
    #[arg(long, default_value_t = 31.0)]
    horizon: f64,

    /// Number of trajectories
    #[arg(short, long, default_value_t = 1000)]
    trajectories: usize,

    /// Fee tier as a fraction, e.g. 0.003
    #[arg(long, default_value = "0.01")]
    fee: Decimal,

    /// Lower price bound (full range when omitted)
    #[arg(long, requires = "upper")]
    lower: Option<f64>,

    /// Upper price bound
    #[arg(long, requires = "lower")]
    upper: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Single,
    Compounding,
    Split,
    SplitRecentered,
    LimitOrder,
    Silos,
    V2,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Single => StrategyKind::SingleRange,
            StrategyArg::Compounding => StrategyKind::Compounding,
            StrategyArg::Split => StrategyKind::SplitCompounding,
            StrategyArg::SplitRecentered => StrategyKind::SplitCompoundingRecentered,
            StrategyArg::LimitOrder => StrategyKind::LimitOrder,
            StrategyArg::Silos => StrategyKind::LiquiditySilos,
            StrategyArg::V2 => StrategyKind::ConstantProduct,
        }
    }
}

impl RunArgs {
    fn config(&self) -> Result<SimulationConfig> {
        let range = match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => PriceRange::new(lower, upper)?,
            _ => PriceRange::full_range(),
        };
        let mut config = SimulationConfig::new()
            .with_initial_price(self.price)
            .with_time_step(self.dt)
            .with_horizon(self.horizon)
            .with_trajectories(self.trajectories)
            .with_range(range)
            .with_strategy(self.strategy.into())
            .with_fee_rate(self.fee)?;
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

/// Layout of `grid.json`.
#[derive(Serialize)]
struct GridReport {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    strategy: StrategyKind,
    fee: f64,
    trajectories: usize,
    x_grid: Vec<Vec<f64>>,
    y_grid: Vec<Vec<f64>>,
    z_grid: Vec<Vec<[f64; 2]>>,
}

impl GridReport {
    fn new(config: &SimulationConfig, grid: &PerformanceGrid) -> Self {
        let (x_grid, y_grid) = grid.meshgrid();
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            strategy: config.strategy,
            fee: config.fee.rate(),
            trajectories: config.trajectories,
            x_grid,
            y_grid,
            z_grid: grid.growth_rates(),
        }
    }
}

fn results_dir(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| {
        env::var("RESULTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("results"))
    })
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { run, mu, sigma } => {
            let config = run.config()?.with_dynamics(mu, sigma);
            println!(
                "🚀 Simulating {} trajectories over {} steps...",
                config.trajectories,
                config.steps()
            );
            let runner = MonteCarloRunner::new(config);
            let result = runner.run()?;

            let mut table = Table::new();
            table.set_titles(row!["Strategy", "G", "G hodl", "G - G hodl", "Final wealth"]);
            table.add_row(row![
                format!("{:?}", runner.config.strategy),
                format!("{:.6}", result.growth_rate),
                format!("{:.6}", result.hodl_growth_rate),
                format!("{:+.6}", result.excess()),
                format!("{:.4}", result.mean_wealth.last().copied().unwrap_or(1.0)),
            ]);
            table.printstd();
        }
        Commands::Compare { run, mu, sigma } => {
            let config = run.config()?.with_dynamics(mu, sigma);
            let prices = MonteCarloRunner::new(config.clone()).sample_prices()?;
            println!(
                "🔍 Comparing strategies on {} trajectories (mu {mu}, sigma {sigma})...",
                config.trajectories
            );

            let mut table = Table::new();
            table.set_titles(row!["Strategy", "G", "G hodl", "G - G hodl"]);
            for kind in StrategyKind::ALL {
                let runner = MonteCarloRunner::new(config.clone().with_strategy(kind));
                let result = runner
                    .run_on(&prices)
                    .with_context(|| format!("strategy {kind:?} failed"))?;
                table.add_row(row![
                    format!("{kind:?}"),
                    format!("{:.6}", result.growth_rate),
                    format!("{:.6}", result.hodl_growth_rate),
                    format!("{:+.6}", result.excess()),
                ]);
            }
            table.printstd();
        }
        Commands::Grid {
            run,
            mu_min,
            mu_max,
            mu_count,
            sigma_min,
            sigma_max,
            sigma_count,
            output,
        } => {
            let config = run.config()?;
            let mus = linspace(mu_min, mu_max, mu_count);
            let sigmas = linspace(sigma_min, sigma_max, sigma_count);
            println!(
                "🚀 Running {} x {} grid with {} trajectories per cell...",
                mus.len(),
                sigmas.len(),
                config.trajectories
            );

            let grid = GridSearch::new(config.clone(), mus, sigmas).run()?;

            let dir = results_dir(output);
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
            let path = dir.join("grid.json");
            let report = GridReport::new(&config, &grid);
            serde_json::to_writer_pretty(File::create(&path)?, &report)?;
            info!(path = %path.display(), run_id = %report.run_id, "grid written");

            let mut table = Table::new();
            let mut titles = vec![Cell::new("sigma \\ mu")];
            titles.extend(grid.mus.iter().map(|mu| Cell::new(&format!("{mu:.2}"))));
            table.set_titles(Row::new(titles));
            for (sigma, row) in grid.sigmas.iter().zip(grid.excess()) {
                let mut cells = vec![Cell::new(&format!("{sigma:.2}"))];
                cells.extend(row.iter().map(|e| Cell::new(&format!("{e:+.4}"))));
                table.add_row(Row::new(cells));
            }
            table.printstd();

            if let Some(best) = grid.best_by(&MaximizeExcessGrowth) {
                println!(
                    "✅ Best excess growth {:+.6} at mu {:.2}, sigma {:.2}",
                    best.result.excess(),
                    best.mu,
                    best.sigma
                );
            }
            println!("📊 Results written to {}", path.display());
        }
    }

    Ok(())
}
