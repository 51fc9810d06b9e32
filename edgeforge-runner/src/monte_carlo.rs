//! Monte Carlo trade-order resampling.
//!
//! Each simulation shuffles the trade profits (Fisher–Yates, seeded per
//! simulation from the run's RNG hierarchy) and replays them into an equity
//! curve starting at zero. Confidence intervals are nearest-rank picks from
//! the sorted outcomes: lower = sorted[floor(n * tail)],
//! upper = sorted[floor(n * (1 - tail))], with tail = (1 - level) / 2.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use edgeforge_core::rng::{RngHierarchy, RngStream};
use edgeforge_core::Trade;

const TAIL_95: f64 = 0.025;
const TAIL_99: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonteCarloConfig {
    /// Number of shuffled replays (default 1000).
    pub simulations: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { simulations: 1000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, other: &ConfidenceInterval) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

/// Distribution summary of one metric across all simulations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub mean: f64,
    pub ci95: ConfidenceInterval,
    pub ci99: ConfidenceInterval,
}

impl MetricDistribution {
    /// Summarize raw outcomes. Empty input gives all zeros.
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_by(f64::total_cmp);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        Self {
            mean,
            ci95: nearest_rank_interval(&samples, TAIL_95),
            ci99: nearest_rank_interval(&samples, TAIL_99),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloReport {
    pub simulations: usize,
    pub trade_count: usize,
    pub net_profit: MetricDistribution,
    pub max_drawdown: MetricDistribution,
    pub win_rate: MetricDistribution,
}

/// Outcome of replaying one ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Replay {
    net_profit: f64,
    max_drawdown: f64,
    win_rate: f64,
}

fn replay(profits: &[f64]) -> Replay {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;
    let mut wins = 0usize;
    for &p in profits {
        equity += p;
        peak = peak.max(equity);
        max_drawdown = max_drawdown.max(peak - equity);
        if p > 0.0 {
            wins += 1;
        }
    }
    Replay {
        net_profit: equity,
        max_drawdown,
        win_rate: wins as f64 / profits.len() as f64,
    }
}

fn nearest_rank_interval(sorted: &[f64], tail: f64) -> ConfidenceInterval {
    let n = sorted.len();
    let pick = |q: f64| sorted[((n as f64 * q).floor() as usize).min(n - 1)];
    ConfidenceInterval {
        lower: pick(tail),
        upper: pick(1.0 - tail),
    }
}

/// Resample the order of `trades` and summarize the outcome distributions.
pub fn run_monte_carlo(
    trades: &[Trade],
    config: &MonteCarloConfig,
    rng: &RngHierarchy,
) -> MonteCarloReport {
    if trades.is_empty() {
        return MonteCarloReport::default();
    }

    let base: Vec<f64> = trades.iter().map(|t| t.profit).collect();
    let mut net_profit = Vec::with_capacity(config.simulations);
    let mut max_drawdown = Vec::with_capacity(config.simulations);
    let mut win_rate = Vec::with_capacity(config.simulations);

    let mut order = base.clone();
    for sim in 0..config.simulations {
        order.copy_from_slice(&base);
        order.shuffle(&mut rng.rng_for(RngStream::MonteCarlo, sim as u64, 0));
        let r = replay(&order);
        net_profit.push(r.net_profit);
        max_drawdown.push(r.max_drawdown);
        win_rate.push(r.win_rate);
    }

    MonteCarloReport {
        simulations: config.simulations,
        trade_count: trades.len(),
        net_profit: MetricDistribution::from_samples(net_profit),
        max_drawdown: MetricDistribution::from_samples(max_drawdown),
        win_rate: MetricDistribution::from_samples(win_rate),
    }
}
