//! Commodity Channel Index.
//!
//! tp = (high + low + close) / 3
//! CCI = (tp - SMA(tp)) / (0.015 * mean absolute deviation of tp)
//! A window with no deviation yields 0.
//! Lookback: period - 1.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

const LAMBERT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let tp: Vec<f64> = bars
            .iter()
            .map(|b| (b.high + b.low + b.close) / 3.0)
            .collect();
        let mean = sma_of_series(&tp, self.period);

        mean.iter()
            .enumerate()
            .map(|(i, &m)| {
                if m.is_nan() {
                    return f64::NAN;
                }
                let deviation = tp[i + 1 - self.period..=i]
                    .iter()
                    .map(|v| (v - m).abs())
                    .sum::<f64>()
                    / self.period as f64;
                if deviation == 0.0 {
                    0.0
                } else {
                    (tp[i] - m) / (LAMBERT * deviation)
                }
            })
            .collect()
    }
}
