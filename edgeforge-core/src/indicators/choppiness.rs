//! Choppiness Index.
//!
//! CHOP = 100 * log10(sum(TR, period) / (highest_high - lowest_low)) / log10(period)
//!
//! A window with no range reads 100 (maximally choppy).
//! Lookback: period (every true range in the window needs a previous close).

use super::wilder::true_range;
use super::{window_extremes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Choppiness {
    period: usize,
    name: String,
}

impl Choppiness {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "Choppiness period must be >= 2");
        Self {
            period,
            name: format!("chop_{period}"),
        }
    }
}

impl Indicator for Choppiness {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.period {
            return result;
        }

        let tr = true_range(bars);
        let log_period = (self.period as f64).log10();
        for i in self.period..n {
            let start = i + 1 - self.period;
            let sum_tr: f64 = tr[start..=i].iter().sum();
            let (hi, lo) = window_extremes(bars, start, i);
            let range = hi - lo;
            result[i] = if range < 1e-10 {
                100.0
            } else {
                100.0 * (sum_tr / range).log10() / log_period
            };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn trending_window_scores_low() {
        // Each bar covers a fresh price unit: sum TR == range → log10(1) = 0
        let bars = make_ohlc_bars(&[
            (0.0, 1.0, 0.0, 1.0),
            (1.0, 2.0, 1.0, 2.0),
            (2.0, 3.0, 2.0, 3.0),
            (3.0, 4.0, 3.0, 4.0),
        ]);
        let result = Choppiness::new(3).compute(&bars);
        assert!(result[2].is_nan());
        assert_approx(result[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn overlapping_window_scores_high() {
        // TR 2 on each bar within a range of 2 → log10(3) / log10(3) = 100
        let bars = make_ohlc_bars(&[(1.0, 2.0, 0.0, 1.0); 4]);
        let result = Choppiness::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn flat_window_is_hundred() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 4]);
        let result = Choppiness::new(3).compute(&bars);
        assert_approx(result[3], 100.0, DEFAULT_EPSILON);
    }
}
