//! Aroon(14) line relationships and oscillator thresholds.

use super::{above, below, greater};
use crate::domain::Bar;
use crate::indicators::{Aroon, Indicator};

const PERIOD: usize = 14;

signal_set! {
    AroonSignal {
        AroonUpAboveDown => "AroonUpAboveDown",
        AroonUpBelowDown => "AroonUpBelowDown",
        AroonOscAbove90 => "AroonOscAbove90",
        AroonOscAbove80 => "AroonOscAbove80",
        AroonOscBelowMinus90 => "AroonOscBelowMinus90",
        AroonOscBelowMinus80 => "AroonOscBelowMinus80",
    }
}

impl AroonSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let osc = || Aroon::oscillator(PERIOD).compute(bars);
        match self {
            AroonSignal::AroonUpAboveDown => greater(
                &Aroon::up(PERIOD).compute(bars),
                &Aroon::down(PERIOD).compute(bars),
            ),
            AroonSignal::AroonUpBelowDown => greater(
                &Aroon::down(PERIOD).compute(bars),
                &Aroon::up(PERIOD).compute(bars),
            ),
            AroonSignal::AroonOscAbove90 => above(&osc(), 90.0),
            AroonSignal::AroonOscAbove80 => above(&osc(), 80.0),
            AroonSignal::AroonOscBelowMinus90 => below(&osc(), -90.0),
            AroonSignal::AroonOscBelowMinus80 => below(&osc(), -80.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn uptrend_reads_strong_aroon() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let above_down = AroonSignal::AroonUpAboveDown.evaluate(&bars);
        assert!(!above_down[12]);
        assert!(above_down[13]);
        // up 100, down 100/14 → oscillator ≈ 92.9
        assert!(AroonSignal::AroonOscAbove90.evaluate(&bars)[19]);
        assert!(!AroonSignal::AroonOscBelowMinus80.evaluate(&bars)[19]);
    }
}
