//! Moving-average relationships (fast above/below slow).

use super::greater;
use crate::domain::Bar;
use crate::indicators::{Ema, Indicator, Sma};

signal_set! {
    MaCrossSignal {
        Sma50AboveSma200 => "SMA50AboveSMA200",
        Sma50BelowSma200 => "SMA50BelowSMA200",
        Sma7AboveSma21 => "SMA7AboveSMA21",
        Sma7BelowSma21 => "SMA7BelowSMA21",
        Ema20AboveEma50 => "EMA20AboveEMA50",
        Ema20BelowEma50 => "EMA20BelowEMA50",
        Sma21AboveSma50 => "SMA21AboveSMA50",
        Sma21BelowSma50 => "SMA21BelowSMA50",
    }
}

#[derive(Clone, Copy)]
enum Average {
    Simple,
    Exponential,
}

impl MaCrossSignal {
    /// (kind, fast, slow, fast_above_slow)
    fn params(self) -> (Average, usize, usize, bool) {
        use Average::*;
        match self {
            MaCrossSignal::Sma50AboveSma200 => (Simple, 50, 200, true),
            MaCrossSignal::Sma50BelowSma200 => (Simple, 50, 200, false),
            MaCrossSignal::Sma7AboveSma21 => (Simple, 7, 21, true),
            MaCrossSignal::Sma7BelowSma21 => (Simple, 7, 21, false),
            MaCrossSignal::Ema20AboveEma50 => (Exponential, 20, 50, true),
            MaCrossSignal::Ema20BelowEma50 => (Exponential, 20, 50, false),
            MaCrossSignal::Sma21AboveSma50 => (Simple, 21, 50, true),
            MaCrossSignal::Sma21BelowSma50 => (Simple, 21, 50, false),
        }
    }

    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let (kind, fast, slow, fast_above) = self.params();
        let series = |period| match kind {
            Average::Simple => Sma::new(period).compute(bars),
            Average::Exponential => Ema::new(period).compute(bars),
        };
        let (f, s) = (series(fast), series(slow));
        if fast_above {
            greater(&f, &s)
        } else {
            greater(&s, &f)
        }
    }
}
