//! True range and Wilder's recursive average, shared by ADX and Choppiness.

use crate::domain::Bar;

/// True range per bar.
///
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high - low, |high - prev_close|, |low - prev_close|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                return bar.range();
            }
            let pc = bars[i - 1].close;
            bar.range()
                .max((bar.high - pc).abs())
                .max((bar.low - pc).abs())
        })
        .collect()
}

/// Wilder smoothing: seed with the mean of the first `period` valid values,
/// then avg[t] = (avg[t-1] * (period - 1) + x[t]) / period.
///
/// Leading NaN values are treated as warmup and skipped.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + period;
    if seed_end > n || values[start..seed_end].iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut avg = values[start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = avg;

    let p = period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            break;
        }
        avg = (avg * (p - 1.0) + values[i]) / p;
        result[i] = avg;
    }

    result
}
