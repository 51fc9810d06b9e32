//! CCI(20) thresholds and 14-bar linear-regression slope thresholds.

use super::{above, below};
use crate::domain::Bar;
use crate::indicators::{Cci, Indicator, LinRegSlope};

const CCI_PERIOD: usize = 20;
const SLOPE_PERIOD: usize = 14;

signal_set! {
    TrendSignal {
        CciAbove250 => "CCIAbove250",
        CciAbove200 => "CCIAbove200",
        CciAbove150 => "CCIAbove150",
        CciAbove100 => "CCIAbove100",
        CciBelowMinus250 => "CCIBelowMinus250",
        CciBelowMinus200 => "CCIBelowMinus200",
        CciBelowMinus150 => "CCIBelowMinus150",
        CciBelowMinus100 => "CCIBelowMinus100",
        LinRegSlopeAbove5 => "LinRegSlopeAbove5",
        LinRegSlopeAbove10 => "LinRegSlopeAbove10",
        LinRegSlopeBelowMinus5 => "LinRegSlopeBelowMinus5",
        LinRegSlopeBelowMinus10 => "LinRegSlopeBelowMinus10",
    }
}

impl TrendSignal {
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let cci = || Cci::new(CCI_PERIOD).compute(bars);
        let slope = || LinRegSlope::new(SLOPE_PERIOD).compute(bars);
        match self {
            TrendSignal::CciAbove250 => above(&cci(), 250.0),
            TrendSignal::CciAbove200 => above(&cci(), 200.0),
            TrendSignal::CciAbove150 => above(&cci(), 150.0),
            TrendSignal::CciAbove100 => above(&cci(), 100.0),
            TrendSignal::CciBelowMinus250 => below(&cci(), -250.0),
            TrendSignal::CciBelowMinus200 => below(&cci(), -200.0),
            TrendSignal::CciBelowMinus150 => below(&cci(), -150.0),
            TrendSignal::CciBelowMinus100 => below(&cci(), -100.0),
            TrendSignal::LinRegSlopeAbove5 => above(&slope(), 5.0),
            TrendSignal::LinRegSlopeAbove10 => above(&slope(), 10.0),
            TrendSignal::LinRegSlopeBelowMinus5 => below(&slope(), -5.0),
            TrendSignal::LinRegSlopeBelowMinus10 => below(&slope(), -10.0),
        }
    }
}
