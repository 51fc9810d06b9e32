//! Indicator library.
//!
//! Every indicator is a pure function from a bar window to a numeric series of
//! the same length. Values inside the warmup (`lookback()`) are `f64::NAN`;
//! signal comparisons against NaN are false, which is how "not enough history"
//! becomes a false signal without any special casing.
//!
//! Multi-line indicators (Bollinger, Stochastic, ADX, Aroon, pivots,
//! Fibonacci) are exposed as separate instances per line so the single-series
//! `Indicator` trait stays unchanged.
//!
//! # Look-ahead contamination guard
//! No value at bar t may depend on bar t+1 or later. Every indicator must pass
//! the truncated-vs-full series test in `tests/lookahead_test.rs`.

pub mod adx;
pub mod aroon;
pub mod bollinger;
pub mod cci;
pub mod choppiness;
pub mod cmf;
pub mod ema;
pub mod fibonacci;
pub mod linreg;
pub mod pivots;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod wilder;

pub use adx::{Adx, AdxLine};
pub use aroon::{Aroon, AroonLine};
pub use bollinger::{Bollinger, BollingerBand};
pub use cci::Cci;
pub use choppiness::Choppiness;
pub use cmf::ChaikinMoneyFlow;
pub use ema::Ema;
pub use fibonacci::{FibLevel, FibonacciRetracement};
pub use linreg::LinRegSlope;
pub use pivots::{PivotLevel, PivotPoints};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine};

use crate::domain::Bar;

/// A named numeric series computed from bars.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "bb_upper_20_2").
    fn name(&self) -> &str;

    /// Number of leading bars that are NaN.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole bar slice.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Highest high and lowest low over `bars[start..=end]`.
pub(crate) fn window_extremes(bars: &[Bar], start: usize, end: usize) -> (f64, f64) {
    bars[start..=end]
        .iter()
        .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), b| {
            (hi.max(b.high), lo.min(b.low))
        })
}

/// Synthetic bars from close prices for tests.
///
/// open = previous close (or close for the first bar), high/low one point
/// beyond the body, volume 1000, one bar per day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Bars from explicit (open, high, low, close) tuples for tests.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            time: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
