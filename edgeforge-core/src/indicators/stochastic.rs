//! Stochastic oscillator (slow form).
//!
//! raw %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over `period` bars
//! %K     = SMA(raw %K, smooth_k)
//! %D     = SMA(%K, smooth_d)
//!
//! A window with no range yields 50 (close sits mid-range by convention).
//! Two lines (separate Indicator instances).

use super::sma::sma_of_series;
use super::{window_extremes, Indicator};
use crate::domain::Bar;

/// Which line of the stochastic oscillator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn k(period: usize, smooth_k: usize, smooth_d: usize) -> Self {
        Self::with_line(period, smooth_k, smooth_d, StochasticLine::K)
    }

    pub fn d(period: usize, smooth_k: usize, smooth_d: usize) -> Self {
        Self::with_line(period, smooth_k, smooth_d, StochasticLine::D)
    }

    fn with_line(period: usize, smooth_k: usize, smooth_d: usize, line: StochasticLine) -> Self {
        assert!(
            period >= 1 && smooth_k >= 1 && smooth_d >= 1,
            "Stochastic periods must be >= 1"
        );
        let tag = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            period,
            smooth_k,
            smooth_d,
            line,
            name: format!("stoch_{tag}_{period}_{smooth_k}_{smooth_d}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.period - 1 + self.smooth_k - 1;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.smooth_d - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut raw = vec![f64::NAN; n];
        if n >= self.period {
            for i in (self.period - 1)..n {
                let (hi, lo) = window_extremes(bars, i + 1 - self.period, i);
                let range = hi - lo;
                raw[i] = if range > 0.0 {
                    100.0 * (bars[i].close - lo) / range
                } else {
                    50.0
                };
            }
        }

        let k = sma_of_series(&raw, self.smooth_k);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => sma_of_series(&k, self.smooth_d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn fast_k_known_value() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 8.0, 11.0),
            (11.0, 14.0, 10.0, 13.0),
            (13.0, 13.5, 9.0, 12.0),
        ]);
        // highest 14, lowest 8 → (12 - 8) / 6 * 100
        let result = Stochastic::k(3, 1, 1).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 400.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn slow_lines_are_smoothed() {
        let bars = make_ohlc_bars(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 9.0, 12.0),
            (12.0, 12.0, 9.0, 9.0),
            (9.0, 12.0, 9.0, 10.5),
        ]);
        let raw = Stochastic::k(2, 1, 1).compute(&bars);
        let k = Stochastic::k(2, 2, 2).compute(&bars);
        let d = Stochastic::d(2, 2, 2).compute(&bars);

        assert_approx(k[2], (raw[1] + raw[2]) / 2.0, DEFAULT_EPSILON);
        assert!(d[2].is_nan());
        assert_approx(d[3], (k[2] + k[3]) / 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_midpoint() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 3]);
        let result = Stochastic::k(3, 1, 1).compute(&bars);
        assert_approx(result[2], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn stochastic_lookback() {
        assert_eq!(Stochastic::k(14, 3, 3).lookback(), 15);
        assert_eq!(Stochastic::d(14, 3, 3).lookback(), 17);
    }
}
