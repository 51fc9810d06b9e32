//! Close versus classic floor pivots of the previous bar.

use super::greater;
use crate::domain::Bar;
use crate::indicators::{Indicator, PivotLevel, PivotPoints};

signal_set! {
    PivotSignal {
        PriceAboveS1 => "PriceAboveS1",
        PriceAboveS2 => "PriceAboveS2",
        PriceAboveS3 => "PriceAboveS3",
        PriceBelowR1 => "PriceBelowR1",
        PriceBelowR2 => "PriceBelowR2",
        PriceBelowR3 => "PriceBelowR3",
        PriceBelowS1 => "PriceBelowS1",
        PriceBelowS2 => "PriceBelowS2",
        PriceBelowS3 => "PriceBelowS3",
        PriceAboveR1 => "PriceAboveR1",
        PriceAboveR2 => "PriceAboveR2",
        PriceAboveR3 => "PriceAboveR3",
    }
}

impl PivotSignal {
    /// (level, close_above_level)
    fn params(self) -> (PivotLevel, bool) {
        match self {
            PivotSignal::PriceAboveS1 => (PivotLevel::S1, true),
            PivotSignal::PriceAboveS2 => (PivotLevel::S2, true),
            PivotSignal::PriceAboveS3 => (PivotLevel::S3, true),
            PivotSignal::PriceBelowR1 => (PivotLevel::R1, false),
            PivotSignal::PriceBelowR2 => (PivotLevel::R2, false),
            PivotSignal::PriceBelowR3 => (PivotLevel::R3, false),
            PivotSignal::PriceBelowS1 => (PivotLevel::S1, false),
            PivotSignal::PriceBelowS2 => (PivotLevel::S2, false),
            PivotSignal::PriceBelowS3 => (PivotLevel::S3, false),
            PivotSignal::PriceAboveR1 => (PivotLevel::R1, true),
            PivotSignal::PriceAboveR2 => (PivotLevel::R2, true),
            PivotSignal::PriceAboveR3 => (PivotLevel::R3, true),
        }
    }

    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let (level, close_above) = self.params();
        let levels = PivotPoints::new(level).compute(bars);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        if close_above {
            greater(&closes, &levels)
        } else {
            greater(&levels, &closes)
        }
    }
}
