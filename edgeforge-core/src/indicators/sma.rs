//! Simple Moving Average (SMA).
//!
//! Trailing arithmetic mean over `period` values.
//! Lookback: period - 1.

use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&closes(bars), self.period)
    }
}

/// Rolling mean of an arbitrary series.
///
/// NaN inputs are skipped over: a window containing any NaN yields NaN, and
/// the first valid output appears `period - 1` values after the first
/// non-NaN input. This lets composed indicators (Stochastic %D, CCI) feed a
/// warmup-padded series straight in.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let mut sum = 0.0;
    let mut valid_run = 0usize;
    for i in 0..n {
        let v = values[i];
        if v.is_nan() {
            sum = 0.0;
            valid_run = 0;
            continue;
        }
        sum += v;
        valid_run += 1;
        if valid_run > period {
            sum -= values[i - period];
        }
        if valid_run >= period {
            result[i] = sum / period as f64;
        }
    }

    result
}
