//! Walk-forward validation: re-test one strategy across contiguous windows.
//!
//! The series is cut into `periods` equal windows of `floor(n / periods)`
//! bars. Windows `0..periods - 1` are evaluated: the first `in_sample_ratio`
//! of each window is in-sample, the rest out-of-sample. The last window is
//! never evaluated.
//!
//! Robustness is out-of-sample net profit / in-sample net profit, reported
//! only when the in-sample denominator is meaningfully positive.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use edgeforge_core::{BacktestError, BacktestResult, Backtester, Bar, StrategyDefinition};

/// In-sample profit at or below this magnitude is treated as zero.
const NEAR_ZERO_PROFIT: f64 = 1e-9;

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalkForwardConfig {
    /// Number of equal windows (default 4; `periods - 1` are evaluated).
    pub periods: usize,
    /// In-sample fraction of each window (default 0.7).
    pub in_sample_ratio: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            periods: 4,
            in_sample_ratio: 0.7,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Bar index ranges of one window. All ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    pub index: usize,
    pub start: usize,
    pub in_sample_end: usize,
    pub end: usize,
}

impl WindowBounds {
    pub fn in_sample(&self) -> std::ops::Range<usize> {
        self.start..self.in_sample_end
    }

    pub fn out_of_sample(&self) -> std::ops::Range<usize> {
        self.in_sample_end..self.end
    }
}

/// How the robustness ratio was computed (or why it wasn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobustnessFlag {
    /// In-sample net profit positive, ratio computed.
    Normal,
    /// In-sample net profit indistinguishable from zero.
    NearZeroInSample,
    /// In-sample net profit negative, ratio would be misleading.
    NegativeInSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkForwardWindow {
    pub bounds: WindowBounds,
    /// First and last bar time of the whole window.
    pub period: TimeSpan,
    pub in_sample_result: BacktestResult,
    pub out_of_sample_result: BacktestResult,
    pub robustness: Option<f64>,
    pub robustness_flag: RobustnessFlag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkForwardReport {
    pub windows: Vec<WalkForwardWindow>,
    /// Mean of the defined robustness ratios.
    pub mean_robustness: Option<f64>,
}

// ─── Window creation ─────────────────────────────────────────────────

/// Window bounds for a series of `total_bars` bars. Windows shorter than one
/// bar are not produced.
pub fn create_windows(total_bars: usize, config: &WalkForwardConfig) -> Vec<WindowBounds> {
    let periods = config.periods.max(1);
    let length = total_bars / periods;
    if length == 0 {
        return Vec::new();
    }

    (0..periods - 1)
        .map(|index| {
            let start = index * length;
            let in_sample_end = start + (length as f64 * config.in_sample_ratio).floor() as usize;
            WindowBounds {
                index,
                start,
                in_sample_end: in_sample_end.min(start + length),
                end: start + length,
            }
        })
        .collect()
}

/// Classify an in-sample / out-of-sample profit pair.
pub fn robustness(in_sample_profit: f64, out_of_sample_profit: f64) -> (Option<f64>, RobustnessFlag) {
    if in_sample_profit > NEAR_ZERO_PROFIT {
        (
            Some(out_of_sample_profit / in_sample_profit),
            RobustnessFlag::Normal,
        )
    } else if in_sample_profit.abs() <= NEAR_ZERO_PROFIT {
        (None, RobustnessFlag::NearZeroInSample)
    } else {
        (None, RobustnessFlag::NegativeInSample)
    }
}

// ─── Orchestration ───────────────────────────────────────────────────

/// Backtest `strategy` on every evaluated window of `bars`.
pub fn run_walk_forward(
    bars: &[Bar],
    strategy: &StrategyDefinition,
    config: &WalkForwardConfig,
    engine: &Backtester,
) -> Result<WalkForwardReport, BacktestError> {
    let all_bounds = create_windows(bars.len(), config);
    if all_bounds.is_empty() {
        warn!(
            bars = bars.len(),
            periods = config.periods,
            "walk-forward: too few bars for a single window"
        );
    }

    let mut windows = Vec::with_capacity(all_bounds.len());
    for bounds in all_bounds {
        let in_sample_result =
            backtest_slice(&bars[bounds.in_sample()], strategy, engine, bounds.index, "in-sample")?;
        let out_of_sample_result = backtest_slice(
            &bars[bounds.out_of_sample()],
            strategy,
            engine,
            bounds.index,
            "out-of-sample",
        )?;
        let (ratio, flag) = robustness(in_sample_result.net_profit, out_of_sample_result.net_profit);

        windows.push(WalkForwardWindow {
            bounds,
            period: TimeSpan {
                start: bars[bounds.start].time,
                end: bars[bounds.end - 1].time,
            },
            in_sample_result,
            out_of_sample_result,
            robustness: ratio,
            robustness_flag: flag,
        });
    }

    let defined: Vec<f64> = windows.iter().filter_map(|w| w.robustness).collect();
    let mean_robustness = if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    };

    Ok(WalkForwardReport {
        windows,
        mean_robustness,
    })
}

/// An empty slice is a zero-trade result, not an error.
fn backtest_slice(
    bars: &[Bar],
    strategy: &StrategyDefinition,
    engine: &Backtester,
    window: usize,
    side: &str,
) -> Result<BacktestResult, BacktestError> {
    if bars.is_empty() {
        warn!(window, side, "walk-forward: empty slice evaluated as zero trades");
        return Ok(BacktestResult::empty());
    }
    engine.run(bars, strategy)
}
