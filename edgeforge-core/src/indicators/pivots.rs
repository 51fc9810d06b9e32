//! Classic floor pivots from the previous bar's high, low and close.
//!
//! P  = (H + L + C) / 3
//! R1 = 2P - L, S1 = 2P - H
//! R2 = P + (H - L), S2 = P - (H - L)
//! R3 = H + 2(P - L), S3 = L - 2(H - P)
//!
//! Lookback: 1.

use super::Indicator;
use crate::domain::Bar;

/// Which support/resistance level to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotLevel {
    R1,
    R2,
    R3,
    S1,
    S2,
    S3,
}

impl PivotLevel {
    fn from_prev(self, prev: &Bar) -> f64 {
        let (h, l, c) = (prev.high, prev.low, prev.close);
        let p = (h + l + c) / 3.0;
        match self {
            PivotLevel::R1 => 2.0 * p - l,
            PivotLevel::S1 => 2.0 * p - h,
            PivotLevel::R2 => p + (h - l),
            PivotLevel::S2 => p - (h - l),
            PivotLevel::R3 => h + 2.0 * (p - l),
            PivotLevel::S3 => l - 2.0 * (h - p),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PivotPoints {
    level: PivotLevel,
    name: String,
}

impl PivotPoints {
    pub fn new(level: PivotLevel) -> Self {
        Self {
            level,
            name: format!("pivot_{level:?}").to_lowercase(),
        }
    }
}

impl Indicator for PivotPoints {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        for (i, pair) in bars.windows(2).enumerate() {
            result[i + 1] = self.level.from_prev(&pair[0]);
        }
        result
    }
}
