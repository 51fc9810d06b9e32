//! Oscillator thresholds and crosses: RSI(14), slow Stochastic(14, 3, 3), ADX(14).

use super::{above, below, crosses_above};
use crate::domain::Bar;
use crate::indicators::{Adx, Indicator, Rsi, Stochastic};

const PERIOD: usize = 14;
const SMOOTH: usize = 3;

signal_set! {
    OscillatorSignal {
        RsiBelow30 => "RSIBelow30",
        RsiAbove70 => "RSIAbove70",
        StochasticBelow20 => "StochasticBelow20",
        StochasticAbove80 => "StochasticAbove80",
        StochKCrossAboveD => "StochKCrossAboveD",
        StochKCrossBelowD => "StochKCrossBelowD",
        AdxAbove30 => "ADXAbove30",
    }
}

impl OscillatorSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let stoch_k = || Stochastic::k(PERIOD, SMOOTH, SMOOTH).compute(bars);
        let stoch_d = || Stochastic::d(PERIOD, SMOOTH, SMOOTH).compute(bars);
        match self {
            OscillatorSignal::RsiBelow30 => below(&Rsi::new(PERIOD).compute(bars), 30.0),
            OscillatorSignal::RsiAbove70 => above(&Rsi::new(PERIOD).compute(bars), 70.0),
            OscillatorSignal::StochasticBelow20 => below(&stoch_k(), 20.0),
            OscillatorSignal::StochasticAbove80 => above(&stoch_k(), 80.0),
            OscillatorSignal::StochKCrossAboveD => crosses_above(&stoch_k(), &stoch_d()),
            OscillatorSignal::StochKCrossBelowD => crosses_above(&stoch_d(), &stoch_k()),
            OscillatorSignal::AdxAbove30 => above(&Adx::new(PERIOD).compute(bars), 30.0),
        }
    }
}
