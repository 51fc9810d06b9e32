//! Signal registry: typed keys mapped to per-bar boolean series.
//!
//! Signals are position-agnostic. Each evaluator receives the bar window and
//! nothing else, and returns one `bool` per bar aligned by index. Bars inside
//! an indicator's warmup read `false`, so no evaluator ever looks ahead.
//!
//! The `{namespace, name}` string pair only exists at the serialization
//! boundary (`SignalRef`). Inside the crates a signal is a `SignalKey`, a
//! closed enum with one sub-enum per namespace.

macro_rules! signal_set {
    ($(#[$meta:meta])* $set:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $set {
            $($variant),+
        }

        impl $set {
            pub const ALL: &'static [$set] = &[$($set::$variant),+];

            /// Serialized name within the namespace.
            pub fn name(self) -> &'static str {
                match self {
                    $($set::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.name() == name)
            }
        }
    };
}

pub mod aroon;
pub mod bollinger;
pub mod book;
pub mod candlestick;
pub mod choppiness;
pub mod fibonacci;
pub mod moving_average;
pub mod oscillator;
pub mod pivots;
pub mod trend;
pub mod volume;

pub use aroon::AroonSignal;
pub use bollinger::BollingerSignal;
pub use book::SignalBook;
pub use candlestick::CandlePattern;
pub use choppiness::ChoppinessSignal;
pub use fibonacci::FibonacciSignal;
pub use moving_average::MaCrossSignal;
pub use oscillator::OscillatorSignal;
pub use pivots::PivotSignal;
pub use trend::TrendSignal;
pub use volume::VolumeSignal;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Signal family; the first half of the serialized identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalNamespace {
    CandlestickPatterns,
    OscillatorSignals,
    MovingAverageCrossovers,
    BollingerBandSignals,
    VolumeSignals,
    TrendIndicators,
    AroonSignals,
    ChoppinessSignals,
    SupportResistanceSignals,
    FibonacciSignals,
}

impl SignalNamespace {
    pub const ALL: [SignalNamespace; 10] = [
        SignalNamespace::CandlestickPatterns,
        SignalNamespace::OscillatorSignals,
        SignalNamespace::MovingAverageCrossovers,
        SignalNamespace::BollingerBandSignals,
        SignalNamespace::VolumeSignals,
        SignalNamespace::TrendIndicators,
        SignalNamespace::AroonSignals,
        SignalNamespace::ChoppinessSignals,
        SignalNamespace::SupportResistanceSignals,
        SignalNamespace::FibonacciSignals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalNamespace::CandlestickPatterns => "CandlestickPatterns",
            SignalNamespace::OscillatorSignals => "OscillatorSignals",
            SignalNamespace::MovingAverageCrossovers => "MovingAverageCrossovers",
            SignalNamespace::BollingerBandSignals => "BollingerBandSignals",
            SignalNamespace::VolumeSignals => "VolumeSignals",
            SignalNamespace::TrendIndicators => "TrendIndicators",
            SignalNamespace::AroonSignals => "AroonSignals",
            SignalNamespace::ChoppinessSignals => "ChoppinessSignals",
            SignalNamespace::SupportResistanceSignals => "SupportResistanceSignals",
            SignalNamespace::FibonacciSignals => "FibonacciSignals",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == s)
    }

    /// Every signal registered under this namespace, in registry order.
    pub fn signals(self) -> Vec<SignalKey> {
        fn wrap<T: Copy>(all: &[T], f: fn(T) -> SignalKey) -> Vec<SignalKey> {
            all.iter().copied().map(f).collect()
        }
        match self {
            SignalNamespace::CandlestickPatterns => wrap(CandlePattern::ALL, SignalKey::Candle),
            SignalNamespace::OscillatorSignals => wrap(OscillatorSignal::ALL, SignalKey::Oscillator),
            SignalNamespace::MovingAverageCrossovers => {
                wrap(MaCrossSignal::ALL, SignalKey::MovingAverage)
            }
            SignalNamespace::BollingerBandSignals => wrap(BollingerSignal::ALL, SignalKey::Bollinger),
            SignalNamespace::VolumeSignals => wrap(VolumeSignal::ALL, SignalKey::Volume),
            SignalNamespace::TrendIndicators => wrap(TrendSignal::ALL, SignalKey::Trend),
            SignalNamespace::AroonSignals => wrap(AroonSignal::ALL, SignalKey::Aroon),
            SignalNamespace::ChoppinessSignals => wrap(ChoppinessSignal::ALL, SignalKey::Choppiness),
            SignalNamespace::SupportResistanceSignals => wrap(PivotSignal::ALL, SignalKey::Pivot),
            SignalNamespace::FibonacciSignals => wrap(FibonacciSignal::ALL, SignalKey::Fibonacci),
        }
    }
}

impl fmt::Display for SignalNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strongly-typed reference to one registered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SignalRef", into = "SignalRef")]
pub enum SignalKey {
    Candle(CandlePattern),
    Oscillator(OscillatorSignal),
    MovingAverage(MaCrossSignal),
    Bollinger(BollingerSignal),
    Volume(VolumeSignal),
    Trend(TrendSignal),
    Aroon(AroonSignal),
    Choppiness(ChoppinessSignal),
    Pivot(PivotSignal),
    Fibonacci(FibonacciSignal),
}

impl SignalKey {
    /// The full registry, namespace by namespace.
    pub fn all() -> &'static [SignalKey] {
        static ALL: OnceLock<Vec<SignalKey>> = OnceLock::new();
        ALL.get_or_init(|| {
            SignalNamespace::ALL
                .into_iter()
                .flat_map(SignalNamespace::signals)
                .collect()
        })
    }

    pub fn namespace(self) -> SignalNamespace {
        match self {
            SignalKey::Candle(_) => SignalNamespace::CandlestickPatterns,
            SignalKey::Oscillator(_) => SignalNamespace::OscillatorSignals,
            SignalKey::MovingAverage(_) => SignalNamespace::MovingAverageCrossovers,
            SignalKey::Bollinger(_) => SignalNamespace::BollingerBandSignals,
            SignalKey::Volume(_) => SignalNamespace::VolumeSignals,
            SignalKey::Trend(_) => SignalNamespace::TrendIndicators,
            SignalKey::Aroon(_) => SignalNamespace::AroonSignals,
            SignalKey::Choppiness(_) => SignalNamespace::ChoppinessSignals,
            SignalKey::Pivot(_) => SignalNamespace::SupportResistanceSignals,
            SignalKey::Fibonacci(_) => SignalNamespace::FibonacciSignals,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SignalKey::Candle(s) => s.name(),
            SignalKey::Oscillator(s) => s.name(),
            SignalKey::MovingAverage(s) => s.name(),
            SignalKey::Bollinger(s) => s.name(),
            SignalKey::Volume(s) => s.name(),
            SignalKey::Trend(s) => s.name(),
            SignalKey::Aroon(s) => s.name(),
            SignalKey::Choppiness(s) => s.name(),
            SignalKey::Pivot(s) => s.name(),
            SignalKey::Fibonacci(s) => s.name(),
        }
    }

    pub fn parse(namespace: &str, name: &str) -> Result<SignalKey, UnknownSignal> {
        let unknown = || UnknownSignal {
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        let ns = SignalNamespace::parse(namespace).ok_or_else(unknown)?;
        let key = match ns {
            SignalNamespace::CandlestickPatterns => CandlePattern::from_name(name).map(SignalKey::Candle),
            SignalNamespace::OscillatorSignals => {
                OscillatorSignal::from_name(name).map(SignalKey::Oscillator)
            }
            SignalNamespace::MovingAverageCrossovers => {
                MaCrossSignal::from_name(name).map(SignalKey::MovingAverage)
            }
            SignalNamespace::BollingerBandSignals => {
                BollingerSignal::from_name(name).map(SignalKey::Bollinger)
            }
            SignalNamespace::VolumeSignals => VolumeSignal::from_name(name).map(SignalKey::Volume),
            SignalNamespace::TrendIndicators => TrendSignal::from_name(name).map(SignalKey::Trend),
            SignalNamespace::AroonSignals => AroonSignal::from_name(name).map(SignalKey::Aroon),
            SignalNamespace::ChoppinessSignals => {
                ChoppinessSignal::from_name(name).map(SignalKey::Choppiness)
            }
            SignalNamespace::SupportResistanceSignals => {
                PivotSignal::from_name(name).map(SignalKey::Pivot)
            }
            SignalNamespace::FibonacciSignals => {
                FibonacciSignal::from_name(name).map(SignalKey::Fibonacci)
            }
        };
        key.ok_or_else(unknown)
    }

    /// Per-bar boolean series for this signal.
    pub fn evaluate(self, bars: &[Bar]) -> Vec<bool> {
        match self {
            SignalKey::Candle(s) => s.evaluate(bars),
            SignalKey::Oscillator(s) => s.evaluate(bars),
            SignalKey::MovingAverage(s) => s.evaluate(bars),
            SignalKey::Bollinger(s) => s.evaluate(bars),
            SignalKey::Volume(s) => s.evaluate(bars),
            SignalKey::Trend(s) => s.evaluate(bars),
            SignalKey::Aroon(s) => s.evaluate(bars),
            SignalKey::Choppiness(s) => s.evaluate(bars),
            SignalKey::Pivot(s) => s.evaluate(bars),
            SignalKey::Fibonacci(s) => s.evaluate(bars),
        }
    }

    /// Uniform pick: namespace first, then a signal within it.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> SignalKey {
        let ns = SignalNamespace::ALL[rng.gen_range(0..SignalNamespace::ALL.len())];
        let signals = ns.signals();
        signals[rng.gen_range(0..signals.len())]
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace(), self.name())
    }
}

impl FromStr for SignalKey {
    type Err = UnknownSignal;

    /// Parses the dotted `namespace.name` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s.split_once('.').unwrap_or((s, ""));
        SignalKey::parse(namespace, name)
    }
}

/// A `{namespace, name}` pair that does not resolve to a registered signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal {namespace}.{name}")]
pub struct UnknownSignal {
    pub namespace: String,
    pub name: String,
}

/// Wire form of a signal identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRef {
    pub namespace: String,
    pub name: String,
}

impl From<SignalKey> for SignalRef {
    fn from(key: SignalKey) -> Self {
        SignalRef {
            namespace: key.namespace().as_str().to_string(),
            name: key.name().to_string(),
        }
    }
}

impl TryFrom<SignalRef> for SignalKey {
    type Error = UnknownSignal;

    fn try_from(r: SignalRef) -> Result<Self, Self::Error> {
        SignalKey::parse(&r.namespace, &r.name)
    }
}

/// Evaluate one signal over the bar window.
pub fn evaluate(bars: &[Bar], key: SignalKey) -> Vec<bool> {
    key.evaluate(bars)
}

/// OR across a group: a bar fires when any member fires. An empty group
/// never fires.
pub fn evaluate_group(bars: &[Bar], keys: &[SignalKey]) -> Vec<bool> {
    let mut fired = vec![false; bars.len()];
    for key in keys {
        for (slot, hit) in fired.iter_mut().zip(key.evaluate(bars)) {
            *slot |= hit;
        }
    }
    fired
}

// ─── Series helpers shared by the namespace modules ──────────────────

/// `series[i] > threshold`; NaN reads false.
pub(crate) fn above(series: &[f64], threshold: f64) -> Vec<bool> {
    series.iter().map(|&v| v > threshold).collect()
}

/// `series[i] < threshold`; NaN reads false.
pub(crate) fn below(series: &[f64], threshold: f64) -> Vec<bool> {
    series.iter().map(|&v| v < threshold).collect()
}

/// `a[i] > b[i]`; NaN on either side reads false.
pub(crate) fn greater(a: &[f64], b: &[f64]) -> Vec<bool> {
    a.iter().zip(b).map(|(&x, &y)| x > y).collect()
}

/// `a` moves from at-or-below `b` on the previous bar to above it now.
pub(crate) fn crosses_above(a: &[f64], b: &[f64]) -> Vec<bool> {
    let mut out = vec![false; a.len()];
    for i in 1..a.len() {
        out[i] = a[i] > b[i] && a[i - 1] <= b[i - 1];
    }
    out
}

/// Per-bar predicate over `bars[i]` with its bar history.
pub(crate) fn per_bar(bars: &[Bar], pred: impl Fn(&[Bar], usize) -> bool) -> Vec<bool> {
    (0..bars.len()).map(|i| pred(bars, i)).collect()
}
