//! Close versus Fibonacci retracement levels of the trailing 20-bar range.

use super::greater;
use crate::domain::Bar;
use crate::indicators::{FibLevel, FibonacciRetracement, Indicator};

const PERIOD: usize = 20;

signal_set! {
    FibonacciSignal {
        PriceAbove236 => "PriceAbove236Retracement",
        PriceAbove382 => "PriceAbove382Retracement",
        PriceAbove500 => "PriceAbove500Retracement",
        PriceAbove618 => "PriceAbove618Retracement",
        PriceBelow236 => "PriceBelow236Retracement",
        PriceBelow382 => "PriceBelow382Retracement",
        PriceBelow500 => "PriceBelow500Retracement",
        PriceBelow618 => "PriceBelow618Retracement",
    }
}

impl FibonacciSignal {
    fn params(self) -> (FibLevel, bool) {
        match self {
            FibonacciSignal::PriceAbove236 => (FibLevel::Fib236, true),
            FibonacciSignal::PriceAbove382 => (FibLevel::Fib382, true),
            FibonacciSignal::PriceAbove500 => (FibLevel::Fib500, true),
            FibonacciSignal::PriceAbove618 => (FibLevel::Fib618, true),
            FibonacciSignal::PriceBelow236 => (FibLevel::Fib236, false),
            FibonacciSignal::PriceBelow382 => (FibLevel::Fib382, false),
            FibonacciSignal::PriceBelow500 => (FibLevel::Fib500, false),
            FibonacciSignal::PriceBelow618 => (FibLevel::Fib618, false),
        }
    }

    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let (level, close_above) = self.params();
        let levels = FibonacciRetracement::new(PERIOD, level).compute(bars);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        if close_above {
            greater(&closes, &levels)
        } else {
            greater(&levels, &closes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn close_near_top_of_range() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        // range 99..120: 23.6% level ≈ 115.0, close 119
        assert!(FibonacciSignal::PriceAbove236.evaluate(&bars)[19]);
        assert!(!FibonacciSignal::PriceBelow618.evaluate(&bars)[19]);
        assert!(!FibonacciSignal::PriceAbove236.evaluate(&bars)[18]);
    }
}
