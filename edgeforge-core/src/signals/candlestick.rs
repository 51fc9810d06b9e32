//! Candlestick patterns: OHLC predicates over one to three consecutive bars.
//!
//! A pattern that needs `k` bars reads false on the first `k - 1` bars.

use super::per_bar;
use crate::domain::Bar;

signal_set! {
    CandlePattern {
        BullishEngulfing => "BullishEngulfing",
        BearishEngulfing => "BearishEngulfing",
        UpCandle => "UpCandle",
        DownCandle => "DownCandle",
        ThreeUpCandles => "ThreeUpCandles",
        ThreeDownCandles => "ThreeDownCandles",
        BullishHarami => "BullishHarami",
        BearishHarami => "BearishHarami",
        Doji => "Doji",
        Hammer => "Hammer",
        ShootingStar => "ShootingStar",
        EveningStar => "EveningStar",
        MorningStar => "MorningStar",
    }
}

impl CandlePattern {
    /// Number of bars the pattern spans.
    pub fn span(self) -> usize {
        match self {
            CandlePattern::UpCandle
            | CandlePattern::DownCandle
            | CandlePattern::Doji
            | CandlePattern::Hammer
            | CandlePattern::ShootingStar => 1,
            CandlePattern::BullishEngulfing
            | CandlePattern::BearishEngulfing
            | CandlePattern::BullishHarami
            | CandlePattern::BearishHarami => 2,
            CandlePattern::ThreeUpCandles
            | CandlePattern::ThreeDownCandles
            | CandlePattern::EveningStar
            | CandlePattern::MorningStar => 3,
        }
    }

    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        let span = self.span();
        per_bar(bars, |bars, i| {
            if i + 1 < span {
                return false;
            }
            let w = &bars[i + 1 - span..=i];
            match self {
                CandlePattern::UpCandle => w[0].is_bullish(),
                CandlePattern::DownCandle => w[0].is_bearish(),
                CandlePattern::Doji => doji(&w[0]),
                CandlePattern::Hammer => hammer(&w[0]),
                CandlePattern::ShootingStar => shooting_star(&w[0]),
                CandlePattern::BullishEngulfing => bullish_engulfing(&w[0], &w[1]),
                CandlePattern::BearishEngulfing => bearish_engulfing(&w[0], &w[1]),
                CandlePattern::BullishHarami => bullish_harami(&w[0], &w[1]),
                CandlePattern::BearishHarami => bearish_harami(&w[0], &w[1]),
                CandlePattern::ThreeUpCandles => three_white_soldiers(&w[0], &w[1], &w[2]),
                CandlePattern::ThreeDownCandles => three_black_crows(&w[0], &w[1], &w[2]),
                CandlePattern::MorningStar => morning_star(&w[0], &w[1], &w[2]),
                CandlePattern::EveningStar => evening_star(&w[0], &w[1], &w[2]),
            }
        })
    }
}

fn doji(b: &Bar) -> bool {
    b.body() < b.range() * 0.1
}

/// Bullish body closing on the high, with almost no lower shadow.
fn hammer(b: &Bar) -> bool {
    b.is_bullish()
        && b.close == b.high
        && b.close - b.open > b.range() * 0.6
        && b.open - b.low < b.range() * 0.1
}

/// Bearish body closing on the low, with almost no upper shadow.
fn shooting_star(b: &Bar) -> bool {
    b.is_bearish()
        && b.close == b.low
        && b.open - b.close > b.range() * 0.6
        && b.high - b.open < b.range() * 0.1
}

fn bullish_engulfing(a: &Bar, b: &Bar) -> bool {
    a.is_bearish() && b.is_bullish() && b.open < a.close && b.close > a.open
}

fn bearish_engulfing(a: &Bar, b: &Bar) -> bool {
    a.is_bullish() && b.is_bearish() && b.open > a.close && b.close < a.open
}

/// Second bar's whole range sits inside the first bar's body.
fn bullish_harami(a: &Bar, b: &Bar) -> bool {
    a.is_bearish()
        && b.is_bullish()
        && b.high < a.open
        && b.low > a.close
        && b.body() < a.body() * 0.6
}

fn bearish_harami(a: &Bar, b: &Bar) -> bool {
    a.is_bullish()
        && b.is_bearish()
        && b.high < a.close
        && b.low > a.open
        && b.body() < a.body() * 0.6
}

fn three_white_soldiers(a: &Bar, b: &Bar, c: &Bar) -> bool {
    let small_upper_shadow = |x: &Bar| x.high - x.close <= (x.close - x.open) * 0.1;
    [a, b, c].iter().all(|x| x.is_bullish() && small_upper_shadow(x))
        && b.close > a.close
        && c.close > b.close
}

fn three_black_crows(a: &Bar, b: &Bar, c: &Bar) -> bool {
    let small_lower_shadow = |x: &Bar| x.close - x.low <= (x.open - x.close) * 0.1;
    [a, b, c].iter().all(|x| x.is_bearish() && small_lower_shadow(x))
        && b.close < a.close
        && c.close < b.close
}

/// Bearish bar, small middle body gapped below both neighbours, bullish bar.
fn morning_star(a: &Bar, b: &Bar, c: &Bar) -> bool {
    a.is_bearish()
        && b.body() < a.body() * 0.3
        && c.is_bullish()
        && b.high < a.low
        && b.high < c.low
}

fn evening_star(a: &Bar, b: &Bar, c: &Bar) -> bool {
    a.is_bullish()
        && b.body() < a.body() * 0.3
        && c.is_bearish()
        && b.low > a.high
        && b.low > c.high
}
