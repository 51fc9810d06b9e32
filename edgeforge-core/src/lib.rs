//! EdgeForge Core — bars, indicators, signal registry, backtest engine.
//!
//! This crate contains everything that turns raw price bars into a scored
//! trade list:
//! - Domain types (bars, trades, strategy definitions)
//! - Indicator library (pure series functions over a bar window)
//! - Signal registry mapping a typed `SignalKey` to a per-bar boolean series
//! - Bar-by-bar position simulator with fixed-precedence exit logic
//! - Deterministic RNG hierarchy shared by the optimizer and validation suite

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod rng;
pub mod signals;

pub use domain::{
    Bar, Direction, EntryGroupId, EntryGroups, EntryMode, EntryReason, ExitReason,
    StrategyDefinition, Trade,
};
pub use engine::{run_backtest, BacktestError, BacktestResult, Backtester};
pub use signals::{SignalBook, SignalKey, SignalNamespace};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the run thread hands across a channel
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Trade>();
        require_sync::<Trade>();
        require_send::<StrategyDefinition>();
        require_sync::<StrategyDefinition>();
        require_send::<BacktestResult>();
        require_sync::<BacktestResult>();
        require_send::<SignalBook>();
        require_sync::<SignalBook>();
        require_send::<Backtester>();
        require_sync::<Backtester>();
        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
    }

    /// Architecture contract: signal evaluation sees bars only.
    ///
    /// `SignalKey::evaluate` takes `&[Bar]` and nothing else, so a signal
    /// cannot observe position state or anything outside its bar window.
    #[test]
    fn signal_evaluation_has_no_position_parameter() {
        fn _check(key: SignalKey, bars: &[Bar]) -> Vec<bool> {
            key.evaluate(bars)
        }
    }
}
