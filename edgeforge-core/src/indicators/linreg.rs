//! Least-squares slope of close over a trailing window, in price units per bar.
//!
//! Lookback: period - 1. A degenerate window (period 1) has slope 0.

use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct LinRegSlope {
    period: usize,
    name: String,
}

impl LinRegSlope {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "linear regression period must be >= 1");
        Self {
            period,
            name: format!("linreg_slope_{period}"),
        }
    }
}

impl Indicator for LinRegSlope {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let values = closes(bars);
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let p = self.period as f64;
        let sum_x = p * (p - 1.0) / 2.0;
        let sum_xx = (p - 1.0) * p * (2.0 * p - 1.0) / 6.0;
        let denominator = p * sum_xx - sum_x * sum_x;

        for i in (self.period - 1)..n {
            if denominator.abs() < 1e-12 {
                result[i] = 0.0;
                continue;
            }
            let window = &values[i + 1 - self.period..=i];
            let (sum_y, sum_xy) = window
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(sy, sxy), (x, &y)| (sy + y, sxy + x as f64 * y));
            result[i] = (p * sum_xy - sum_x * sum_y) / denominator;
        }

        result
    }
}
