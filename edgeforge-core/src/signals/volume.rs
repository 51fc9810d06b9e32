//! Volume direction and Chaikin Money Flow(20) thresholds.

use super::{above, below, per_bar};
use crate::domain::Bar;
use crate::indicators::{ChaikinMoneyFlow, Indicator};

const CMF_PERIOD: usize = 20;

signal_set! {
    VolumeSignal {
        VolumeIncreasing => "VolumeIncreasing",
        VolumeDecreasing => "VolumeDecreasing",
        CmfAbove40 => "CMFAbove40",
        CmfAbove35 => "CMFAbove35",
        CmfAbove30 => "CMFAbove30",
        CmfBelowMinus40 => "CMFBelowMinus40",
        CmfBelowMinus30 => "CMFBelowMinus30",
        CmfBelowMinus20 => "CMFBelowMinus20",
    }
}

impl VolumeSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let cmf = || ChaikinMoneyFlow::new(CMF_PERIOD).compute(bars);
        match self {
            VolumeSignal::VolumeIncreasing => {
                per_bar(bars, |b, i| i > 0 && b[i].volume > b[i - 1].volume)
            }
            VolumeSignal::VolumeDecreasing => {
                per_bar(bars, |b, i| i > 0 && b[i].volume < b[i - 1].volume)
            }
            VolumeSignal::CmfAbove40 => above(&cmf(), 0.40),
            VolumeSignal::CmfAbove35 => above(&cmf(), 0.35),
            VolumeSignal::CmfAbove30 => above(&cmf(), 0.30),
            VolumeSignal::CmfBelowMinus40 => below(&cmf(), -0.40),
            VolumeSignal::CmfBelowMinus30 => below(&cmf(), -0.30),
            VolumeSignal::CmfBelowMinus20 => below(&cmf(), -0.20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, make_ohlc_bars};

    #[test]
    fn volume_direction_against_previous_bar() {
        let mut bars = make_bars(&[10.0, 10.0, 10.0, 10.0]);
        for (b, v) in bars.iter_mut().zip([100.0, 200.0, 150.0, 150.0]) {
            b.volume = v;
        }
        assert_eq!(
            VolumeSignal::VolumeIncreasing.evaluate(&bars),
            vec![false, true, false, false]
        );
        assert_eq!(
            VolumeSignal::VolumeDecreasing.evaluate(&bars),
            vec![false, false, true, false]
        );
    }

    #[test]
    fn accumulation_reads_positive_money_flow() {
        let bars = make_ohlc_bars(&[(10.0, 12.0, 9.0, 12.0); 21]);
        let fired = VolumeSignal::CmfAbove40.evaluate(&bars);
        assert!(!fired[18]);
        assert!(fired[19]);
        assert!(!VolumeSignal::CmfBelowMinus20.evaluate(&bars)[19]);
    }
}
