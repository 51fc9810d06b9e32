//! Bollinger band breaches.
//!
//! PriceAboveUpper / PriceBelowLower compare the bar's high / low with the
//! (20, 2) bands; the CloseAbove / CloseBelow family compares the close with
//! the 20-bar bands at 1, 2 and 3 standard deviations.

use super::greater;
use crate::domain::Bar;
use crate::indicators::{Bollinger, Indicator};

const PERIOD: usize = 20;

signal_set! {
    BollingerSignal {
        PriceAboveUpper => "PriceAboveUpper",
        PriceBelowLower => "PriceBelowLower",
        CloseAboveBb2Upper => "CloseAboveBB2_20Upper",
        CloseBelowBb2Lower => "CloseBelowBB2_20Lower",
        CloseAboveBb3Upper => "CloseAboveBB3_20Upper",
        CloseBelowBb3Lower => "CloseBelowBB3_20Lower",
        CloseAboveBb1Upper => "CloseAboveBB1_20Upper",
        CloseBelowBb1Lower => "CloseBelowBB1_20Lower",
    }
}

impl BollingerSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let upper = |k: f64| Bollinger::upper(PERIOD, k).compute(bars);
        let lower = |k: f64| Bollinger::lower(PERIOD, k).compute(bars);

        match self {
            BollingerSignal::PriceAboveUpper => greater(&highs, &upper(2.0)),
            BollingerSignal::PriceBelowLower => greater(&lower(2.0), &lows),
            BollingerSignal::CloseAboveBb1Upper => greater(&closes, &upper(1.0)),
            BollingerSignal::CloseAboveBb2Upper => greater(&closes, &upper(2.0)),
            BollingerSignal::CloseAboveBb3Upper => greater(&closes, &upper(3.0)),
            BollingerSignal::CloseBelowBb1Lower => greater(&lower(1.0), &closes),
            BollingerSignal::CloseBelowBb2Lower => greater(&lower(2.0), &closes),
            BollingerSignal::CloseBelowBb3Lower => greater(&lower(3.0), &closes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn spike_breaks_the_upper_band() {
        let mut closes = vec![100.0; 25];
        closes[24] = 130.0;
        let bars = make_bars(&closes);
        assert!(BollingerSignal::CloseAboveBb1Upper.evaluate(&bars)[24]);
        assert!(BollingerSignal::CloseAboveBb2Upper.evaluate(&bars)[24]);
        assert!(BollingerSignal::PriceAboveUpper.evaluate(&bars)[24]);
        assert!(!BollingerSignal::CloseBelowBb1Lower.evaluate(&bars)[24]);
    }

    #[test]
    fn flat_market_touches_collapsed_bands_with_wicks() {
        // Bands collapse onto 100; wicks at 101 / 99 breach them, closes do not.
        let bars = make_bars(&[100.0; 21]);
        assert!(BollingerSignal::PriceAboveUpper.evaluate(&bars)[20]);
        assert!(BollingerSignal::PriceBelowLower.evaluate(&bars)[20]);
        assert!(!BollingerSignal::CloseAboveBb3Upper.evaluate(&bars)[20]);
        assert!(!BollingerSignal::PriceAboveUpper.evaluate(&bars)[18]);
    }
}
