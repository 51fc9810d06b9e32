//! Fibonacci retracement levels over a trailing high/low window.
//!
//! level = highest_high - ratio * (highest_high - lowest_low)
//! Lookback: period - 1.

use super::{window_extremes, Indicator};
use crate::domain::Bar;

/// Retracement ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FibLevel {
    Fib236,
    Fib382,
    Fib500,
    Fib618,
}

impl FibLevel {
    pub fn ratio(self) -> f64 {
        match self {
            FibLevel::Fib236 => 0.236,
            FibLevel::Fib382 => 0.382,
            FibLevel::Fib500 => 0.5,
            FibLevel::Fib618 => 0.618,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FibonacciRetracement {
    period: usize,
    level: FibLevel,
    name: String,
}

impl FibonacciRetracement {
    pub fn new(period: usize, level: FibLevel) -> Self {
        assert!(period >= 1, "Fibonacci period must be >= 1");
        Self {
            period,
            level,
            name: format!("fib_{}_{period}", (level.ratio() * 1000.0).round()),
        }
    }
}

impl Indicator for FibonacciRetracement {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }
        for i in (self.period - 1)..n {
            let (hi, lo) = window_extremes(bars, i + 1 - self.period, i);
            result[i] = hi - self.level.ratio() * (hi - lo);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn levels_within_window_range() {
        let bars = make_ohlc_bars(&[
            (105.0, 110.0, 100.0, 105.0),
            (105.0, 108.0, 102.0, 104.0),
            (104.0, 106.0, 101.0, 103.0),
        ]);
        let fib = |l| FibonacciRetracement::new(3, l).compute(&bars)[2];
        assert_approx(fib(FibLevel::Fib236), 110.0 - 2.36, DEFAULT_EPSILON);
        assert_approx(fib(FibLevel::Fib500), 105.0, DEFAULT_EPSILON);
        assert_approx(fib(FibLevel::Fib618), 110.0 - 6.18, DEFAULT_EPSILON);
    }

    #[test]
    fn fib_name() {
        assert_eq!(FibonacciRetracement::new(20, FibLevel::Fib382).name(), "fib_382_20");
    }
}
