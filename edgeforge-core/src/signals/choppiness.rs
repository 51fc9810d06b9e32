//! Choppiness Index(14) thresholds.

use super::{above, below};
use crate::domain::Bar;
use crate::indicators::{Choppiness, Indicator};

const PERIOD: usize = 14;

signal_set! {
    ChoppinessSignal {
        ChoppinessIndexAbove70 => "ChoppinessIndexAbove70",
        ChoppinessIndexAbove65 => "ChoppinessIndexAbove65",
        ChoppinessIndexAbove60 => "ChoppinessIndexAbove60",
        ChoppinessIndexBelow40 => "ChoppinessIndexBelow40",
        ChoppinessIndexBelow35 => "ChoppinessIndexBelow35",
        ChoppinessIndexBelow30 => "ChoppinessIndexBelow30",
    }
}

impl ChoppinessSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let chop = Choppiness::new(PERIOD).compute(bars);
        match self {
            ChoppinessSignal::ChoppinessIndexAbove70 => above(&chop, 70.0),
            ChoppinessSignal::ChoppinessIndexAbove65 => above(&chop, 65.0),
            ChoppinessSignal::ChoppinessIndexAbove60 => above(&chop, 60.0),
            ChoppinessSignal::ChoppinessIndexBelow40 => below(&chop, 40.0),
            ChoppinessSignal::ChoppinessIndexBelow35 => below(&chop, 35.0),
            ChoppinessSignal::ChoppinessIndexBelow30 => below(&chop, 30.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, make_ohlc_bars};

    #[test]
    fn sideways_market_is_choppy() {
        let bars = make_ohlc_bars(&[(1.0, 2.0, 0.0, 1.0); 16]);
        let fired = ChoppinessSignal::ChoppinessIndexAbove70.evaluate(&bars);
        assert!(!fired[13]);
        assert!(fired[14]);
    }

    #[test]
    fn clean_trend_is_not_choppy() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + 5.0 * i as f64).collect();
        let bars = make_bars(&closes);
        assert!(ChoppinessSignal::ChoppinessIndexBelow40.evaluate(&bars)[19]);
    }
}
