//! Aroon: how recently the window's extreme high and low occurred.
//!
//! Up   = 100 * (period - bars_since_highest_high) / period
//! Down = 100 * (period - bars_since_lowest_low) / period
//! Oscillator = Up - Down
//!
//! The window is the trailing `period` bars; ties resolve to the earliest
//! bar. Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// Which line of the Aroon system to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AroonLine {
    Up,
    Down,
    Oscillator,
}

#[derive(Debug, Clone)]
pub struct Aroon {
    period: usize,
    line: AroonLine,
    name: String,
}

impl Aroon {
    pub fn up(period: usize) -> Self {
        Self::with_line(period, AroonLine::Up)
    }

    pub fn down(period: usize) -> Self {
        Self::with_line(period, AroonLine::Down)
    }

    pub fn oscillator(period: usize) -> Self {
        Self::with_line(period, AroonLine::Oscillator)
    }

    fn with_line(period: usize, line: AroonLine) -> Self {
        assert!(period >= 1, "Aroon period must be >= 1");
        let tag = match line {
            AroonLine::Up => "up",
            AroonLine::Down => "down",
            AroonLine::Oscillator => "osc",
        };
        Self {
            period,
            line,
            name: format!("aroon_{tag}_{period}"),
        }
    }

    fn score(&self, bars_since: usize) -> f64 {
        100.0 * (self.period - bars_since) as f64 / self.period as f64
    }
}

impl Indicator for Aroon {
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
            let start = i + 1 - self.period;
            let (mut hi_idx, mut lo_idx) = (start, start);
            for j in start..=i {
                if bars[j].high > bars[hi_idx].high {
                    hi_idx = j;
                }
                if bars[j].low < bars[lo_idx].low {
                    lo_idx = j;
                }
            }
            let up = self.score(i - hi_idx);
            let down = self.score(i - lo_idx);
            result[i] = match self.line {
                AroonLine::Up => up,
                AroonLine::Down => down,
                AroonLine::Oscillator => up - down,
            };
        }

        result
    }
}
