//! Chaikin Money Flow.
//!
//! multiplier = ((close - low) - (high - close)) / (high - low), 0 for a flat bar
//! CMF = sum(multiplier * volume) / sum(volume) over `period` bars, 0 when
//! the window has no volume.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ChaikinMoneyFlow {
    period: usize,
    name: String,
}

impl ChaikinMoneyFlow {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CMF period must be >= 1");
        Self {
            period,
            name: format!("cmf_{period}"),
        }
    }
}

fn money_flow_multiplier(bar: &Bar) -> f64 {
    let range = bar.range();
    if range == 0.0 {
        0.0
    } else {
        ((bar.close - bar.low) - (bar.high - bar.close)) / range
    }
}

impl Indicator for ChaikinMoneyFlow {
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
            let window = &bars[i + 1 - self.period..=i];
            let (flow, volume) = window.iter().fold((0.0, 0.0), |(f, v), b| {
                (f + money_flow_multiplier(b) * b.volume, v + b.volume)
            });
            result[i] = if volume == 0.0 { 0.0 } else { flow / volume };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn closes_at_high_give_plus_one() {
        let bars = make_ohlc_bars(&[(10.0, 12.0, 9.0, 12.0); 3]);
        let result = ChaikinMoneyFlow::new(3).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volume_weighting() {
        let mut bars = make_ohlc_bars(&[(10.0, 12.0, 8.0, 12.0), (10.0, 12.0, 8.0, 8.0)]);
        bars[0].volume = 300.0;
        bars[1].volume = 100.0;
        // (1 * 300 + -1 * 100) / 400
        let result = ChaikinMoneyFlow::new(2).compute(&bars);
        assert_approx(result[1], 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_volume_is_zero() {
        let mut bars = make_ohlc_bars(&[(10.0, 12.0, 8.0, 12.0); 2]);
        for b in &mut bars {
            b.volume = 0.0;
        }
        let result = ChaikinMoneyFlow::new(2).compute(&bars);
        assert_approx(result[1], 0.0, DEFAULT_EPSILON);
    }
}
