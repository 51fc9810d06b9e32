//! Precomputed signal series for one bar slice.
//!
//! Every evaluator is a pure function of the bars, so a book built once can
//! be shared read-only by every backtest over the same slice.

use std::collections::HashMap;

use tracing::debug;

use super::SignalKey;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct SignalBook {
    len: usize,
    series: HashMap<SignalKey, Vec<bool>>,
}

impl SignalBook {
    /// Evaluate the whole registry over `bars`.
    pub fn precompute(bars: &[Bar]) -> Self {
        Self::for_keys(bars, SignalKey::all().iter().copied())
    }

    /// Evaluate only the given keys over `bars`. Duplicates are evaluated once.
    pub fn for_keys(bars: &[Bar], keys: impl IntoIterator<Item = SignalKey>) -> Self {
        let mut series = HashMap::new();
        for key in keys {
            series.entry(key).or_insert_with(|| key.evaluate(bars));
        }
        debug!(bars = bars.len(), signals = series.len(), "signal book computed");
        Self {
            len: bars.len(),
            series,
        }
    }

    /// Number of bars each series covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: SignalKey) -> bool {
        self.series.contains_key(&key)
    }

    pub fn series(&self, key: SignalKey) -> Option<&[bool]> {
        self.series.get(&key).map(Vec::as_slice)
    }

    /// OR of the members' series. `Err(key)` names the first member the book
    /// does not hold.
    pub fn group(&self, keys: &[SignalKey]) -> Result<Vec<bool>, SignalKey> {
        let mut fired = vec![false; self.len];
        for &key in keys {
            let series = self.series(key).ok_or(key)?;
            for (slot, &hit) in fired.iter_mut().zip(series) {
                *slot |= hit;
            }
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;
    use crate::signals::{evaluate_group, CandlePattern, OscillatorSignal};

    #[test]
    fn book_matches_direct_evaluation() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).cos() * 8.0).collect();
        let bars = make_bars(&closes);
        let book = SignalBook::precompute(&bars);
        assert_eq!(book.len(), 40);
        for &key in SignalKey::all() {
            assert_eq!(book.series(key).unwrap(), key.evaluate(&bars).as_slice(), "{key}");
        }
    }

    #[test]
    fn group_matches_free_function() {
        let bars = make_bars(&[10.0, 11.0, 10.5, 12.0, 11.0]);
        let keys = [
            SignalKey::Candle(CandlePattern::UpCandle),
            SignalKey::Candle(CandlePattern::Doji),
        ];
        let book = SignalBook::for_keys(&bars, keys);
        assert_eq!(book.group(&keys).unwrap(), evaluate_group(&bars, &keys));
    }

    #[test]
    fn missing_key_is_reported() {
        let bars = make_bars(&[10.0, 11.0]);
        let book = SignalBook::for_keys(&bars, [SignalKey::Candle(CandlePattern::UpCandle)]);
        let missing = SignalKey::Oscillator(OscillatorSignal::RsiAbove70);
        assert!(!book.contains(missing));
        assert_eq!(book.group(&[missing]), Err(missing));
    }
}
