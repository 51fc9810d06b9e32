//! ADX: Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from consecutive bars
//! 2. Wilder-smooth +DM, -DM and TR over `period`
//! 3. +DI = 100 * sm(+DM) / sm(TR), -DI = 100 * sm(-DM) / sm(TR)
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Lookback: period for the DI lines, 2 * period - 1 for ADX.

use super::wilder::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

/// Which line of the directional movement system to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdxLine {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    line: AdxLine,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self::with_line(period, AdxLine::Adx)
    }

    pub fn plus_di(period: usize) -> Self {
        Self::with_line(period, AdxLine::PlusDi)
    }

    pub fn minus_di(period: usize) -> Self {
        Self::with_line(period, AdxLine::MinusDi)
    }

    fn with_line(period: usize, line: AdxLine) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        let tag = match line {
            AdxLine::Adx => "adx",
            AdxLine::PlusDi => "plus_di",
            AdxLine::MinusDi => "minus_di",
        };
        Self {
            period,
            line,
            name: format!("{tag}_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            AdxLine::Adx => 2 * self.period - 1,
            AdxLine::PlusDi | AdxLine::MinusDi => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];
        let mut tr = true_range(bars);
        tr[0] = f64::NAN;

        for i in 1..n {
            let high_diff = bars[i].high - bars[i - 1].high;
            let low_diff = bars[i - 1].low - bars[i].low;
            plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 {
                high_diff
            } else {
                0.0
            };
            minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 {
                low_diff
            } else {
                0.0
            };
        }

        let smooth_tr = wilder_smooth(&tr, self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let di = |dm: &[f64]| -> Vec<f64> {
            dm.iter()
                .zip(&smooth_tr)
                .map(|(&d, &t)| {
                    if d.is_nan() || t.is_nan() {
                        f64::NAN
                    } else if t == 0.0 {
                        0.0
                    } else {
                        100.0 * d / t
                    }
                })
                .collect()
        };
        let plus_di = di(&smooth_plus);
        let minus_di = di(&smooth_minus);

        match self.line {
            AdxLine::PlusDi => plus_di,
            AdxLine::MinusDi => minus_di,
            AdxLine::Adx => {
                let dx: Vec<f64> = plus_di
                    .iter()
                    .zip(&minus_di)
                    .map(|(&p, &m)| {
                        if p.is_nan() || m.is_nan() {
                            f64::NAN
                        } else if p + m == 0.0 {
                            0.0
                        } else {
                            100.0 * (p - m).abs() / (p + m)
                        }
                    })
                    .collect();
                wilder_smooth(&dx, self.period)
            }
        }
    }
}
