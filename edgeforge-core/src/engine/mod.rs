//! Backtest engine: a single forward pass over interior bars.
//!
//! State machine: Flat → Long/Short → Flat, one position at a time.
//!
//! - The first and last bar are never simulated: bar 0 has no previous close
//!   for momentum, and the last bar is left for the caller's next slice. A
//!   position still open after the loop is not force-closed.
//! - Entries fill at the signal bar's close. Exits are checked from the next
//!   bar on, in fixed precedence: stop loss, profit target, trailing stop.
//! - The exit price is the close, clamped into [stop level, target level] so a
//!   bar that gaps through a level books the level itself.

pub mod result;

pub use result::{BacktestResult, Ledger};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::trace;

use crate::domain::{
    Bar, Direction, EntryGroupId, EntryMode, EntryReason, ExitReason, StrategyDefinition, Trade,
};
use crate::signals::{SignalBook, SignalKey};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("no bars provided for backtest")]
    EmptyInput,
    #[error("signal book covers {book} bars but {bars} bars were given")]
    BookLengthMismatch { book: usize, bars: usize },
    #[error("signal {0} is missing from the signal book")]
    MissingSignal(SignalKey),
}

/// Backtest with the default tick size (one tick = one price unit).
pub fn run_backtest(
    bars: &[Bar],
    strategy: &StrategyDefinition,
) -> Result<BacktestResult, BacktestError> {
    Backtester::default().run(bars, strategy)
}

/// Position simulator. Tick distances are converted to price with `tick_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backtester {
    tick_size: f64,
}

impl Default for Backtester {
    fn default() -> Self {
        Self { tick_size: 1.0 }
    }
}

impl Backtester {
    pub fn new(tick_size: f64) -> Self {
        Self { tick_size }
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Evaluate the strategy's signals over `bars`, then simulate.
    pub fn run(
        &self,
        bars: &[Bar],
        strategy: &StrategyDefinition,
    ) -> Result<BacktestResult, BacktestError> {
        if bars.is_empty() {
            return Err(BacktestError::EmptyInput);
        }
        let keys = strategy
            .entry_groups
            .iter()
            .flat_map(|(_, group)| group.iter().copied());
        let book = SignalBook::for_keys(bars, keys);
        self.run_with_book(bars, &book, strategy)
    }

    /// Simulate with signal series taken from a book precomputed over `bars`.
    pub fn run_with_book(
        &self,
        bars: &[Bar],
        book: &SignalBook,
        strategy: &StrategyDefinition,
    ) -> Result<BacktestResult, BacktestError> {
        if bars.is_empty() {
            return Err(BacktestError::EmptyInput);
        }
        if book.len() != bars.len() {
            return Err(BacktestError::BookLengthMismatch {
                book: book.len(),
                bars: bars.len(),
            });
        }

        let mut groups = Vec::with_capacity(EntryGroupId::ALL.len());
        for id in EntryGroupId::ALL {
            let keys = strategy.entry_groups.get(id);
            let fired = book.group(keys).map_err(BacktestError::MissingSignal)?;
            groups.push(EntryGroup {
                active: !keys.is_empty(),
                fired,
            });
        }

        let exits = ExitLevels {
            profit_target: strategy.profit_target_ticks as f64 * self.tick_size,
            stop_loss: strategy.stop_loss_ticks as f64 * self.tick_size,
            trailing_stop: strategy.trailing_stop_ticks as f64 * self.tick_size,
        };

        let mut ledger = Ledger::default();
        let mut open: Option<OpenPosition> = None;

        for i in 1..bars.len().saturating_sub(1) {
            let bar = &bars[i];
            match open.take() {
                None => {
                    let prev = &bars[i - 1];
                    if let Some(direction) = entry_direction(strategy.mode, &groups, i, bar, prev) {
                        open = Some(OpenPosition {
                            index: i,
                            time: bar.time,
                            price: bar.close,
                            direction,
                            best: bar.close,
                            reason: EntryReason::for_mode(strategy.mode, direction),
                        });
                    }
                }
                Some(mut pos) => match pos.check_exit(bar, &exits) {
                    Some((exit_reason, exit_price)) => ledger.record(pos.close(
                        i,
                        bar.time,
                        exit_price,
                        exit_reason,
                    )),
                    None => open = Some(pos),
                },
            }
        }

        let result = ledger.finish();
        trace!(
            mode = ?strategy.mode,
            trades = result.total_trades,
            net_profit = result.net_profit,
            "backtest finished"
        );
        Ok(result)
    }
}

struct EntryGroup {
    /// Non-empty groups take part in Confirmations mode.
    active: bool,
    fired: Vec<bool>,
}

struct ExitLevels {
    profit_target: f64,
    stop_loss: f64,
    trailing_stop: f64,
}

/// Direction to enter on bar `i`, if the mode's entry rule fires.
fn entry_direction(
    mode: EntryMode,
    groups: &[EntryGroup],
    i: usize,
    bar: &Bar,
    prev: &Bar,
) -> Option<Direction> {
    let momentum = Direction::from_momentum(bar.close, prev.close);
    match mode {
        EntryMode::Signals => groups.iter().any(|g| g.fired[i]).then_some(momentum),
        EntryMode::Confirmations => {
            // Every active group votes with the bar's momentum, so the
            // votes never cancel out.
            let mut active = groups.iter().filter(|g| g.active).peekable();
            let confirmed = active.peek().is_some() && active.all(|g| g.fired[i]);
            confirmed.then_some(momentum)
        }
        EntryMode::Split => {
            if groups[0].fired[i] && bar.close > prev.close {
                Some(Direction::Long)
            } else if groups[1].fired[i] && bar.close < prev.close {
                Some(Direction::Short)
            } else {
                None
            }
        }
    }
}

struct OpenPosition {
    index: usize,
    time: NaiveDateTime,
    price: f64,
    direction: Direction,
    /// Most favourable price seen since entry (highest high long, lowest low short).
    best: f64,
    reason: EntryReason,
}

impl OpenPosition {
    /// Update the favourable extreme with this bar, then test exits in
    /// precedence order. Returns the exit reason and fill price.
    fn check_exit(&mut self, bar: &Bar, exits: &ExitLevels) -> Option<(ExitReason, f64)> {
        let entry = self.price;
        let trailing_on = exits.trailing_stop > 0.0;
        match self.direction {
            Direction::Long => {
                self.best = self.best.max(bar.high);
                let reason = if bar.low <= entry - exits.stop_loss {
                    ExitReason::StopLoss
                } else if bar.high >= entry + exits.profit_target {
                    ExitReason::ProfitTarget
                } else if trailing_on && bar.low <= self.best - exits.trailing_stop {
                    ExitReason::TrailingStop
                } else {
                    return None;
                };
                let price = (entry + exits.profit_target).min(bar.close.max(entry - exits.stop_loss));
                Some((reason, price))
            }
            Direction::Short => {
                self.best = self.best.min(bar.low);
                let reason = if bar.high >= entry + exits.stop_loss {
                    ExitReason::StopLoss
                } else if bar.low <= entry - exits.profit_target {
                    ExitReason::ProfitTarget
                } else if trailing_on && bar.high >= self.best + exits.trailing_stop {
                    ExitReason::TrailingStop
                } else {
                    return None;
                };
                let price = (entry - exits.profit_target).max(bar.close.min(entry + exits.stop_loss));
                Some((reason, price))
            }
        }
    }

    fn close(self, index: usize, time: NaiveDateTime, exit_price: f64, exit_reason: ExitReason) -> Trade {
        let quantity = 1.0;
        Trade {
            entry_time: self.time,
            exit_time: time,
            entry_index: self.index,
            exit_index: index,
            entry_price: self.price,
            exit_price,
            quantity,
            direction: self.direction,
            profit: (exit_price - self.price) * self.direction.sign() * quantity,
            entry_reason: self.reason,
            exit_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryGroups;
    use crate::indicators::{make_bars, make_ohlc_bars};
    use crate::signals::{CandlePattern, VolumeSignal};

    fn up_candle() -> SignalKey {
        SignalKey::Candle(CandlePattern::UpCandle)
    }

    fn strategy(mode: EntryMode, groups: EntryGroups, pt: u32, sl: u32, ts: u32) -> StrategyDefinition {
        StrategyDefinition::new(mode, groups, pt, sl, ts)
    }

    fn group1(keys: Vec<SignalKey>) -> EntryGroups {
        EntryGroups::new(keys, vec![], vec![])
    }

    // ─── Boundary policy ─────────────────────────────────────────────

    #[test]
    fn empty_bars_is_an_error() {
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 5, 5, 0);
        assert_eq!(run_backtest(&[], &s), Err(BacktestError::EmptyInput));
    }

    #[test]
    fn two_bars_never_trade() {
        let bars = make_bars(&[100.0, 101.0]);
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 5, 5, 0);
        assert_eq!(run_backtest(&bars, &s).unwrap().total_trades, 0);
    }

    #[test]
    fn book_length_must_match() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let book = SignalBook::precompute(&bars[..2]);
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 5, 5, 0);
        assert_eq!(
            Backtester::default().run_with_book(&bars, &book, &s),
            Err(BacktestError::BookLengthMismatch { book: 2, bars: 3 })
        );
    }

    // ─── Entries ─────────────────────────────────────────────────────

    #[test]
    fn rising_closes_single_long_trade() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 5, 5, 0);
        let r = run_backtest(&bars, &s).unwrap();

        assert_eq!(r.total_trades, 1);
        let t = &r.trades[0];
        assert_eq!(t.direction, Direction::Long);
        assert_eq!(t.entry_index, 1);
        assert_eq!(t.entry_price, bars[1].close);
        // high reaches entry + 5 on bar 5; close 105 is below the target
        assert_eq!(t.exit_index, 5);
        assert_eq!(t.exit_reason, ExitReason::ProfitTarget);
        assert_eq!(t.exit_price, 105.0);
        assert_eq!(t.profit, 4.0);
    }

    #[test]
    fn no_signals_no_trades() {
        let bars = make_bars(&[100.0; 8]);
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 5, 5, 0);
        let r = run_backtest(&bars, &s).unwrap();
        assert_eq!(r.total_trades, 0);
        assert!(r.profit_factor.is_infinite());
    }

    #[test]
    fn confirmations_need_every_active_group() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        // volume is constant, so VolumeIncreasing never fires
        let never = SignalKey::Volume(VolumeSignal::VolumeIncreasing);
        let blocked = strategy(
            EntryMode::Confirmations,
            EntryGroups::new(vec![up_candle()], vec![never], vec![]),
            5,
            5,
            0,
        );
        assert_eq!(run_backtest(&bars, &blocked).unwrap().total_trades, 0);

        let confirmed = strategy(
            EntryMode::Confirmations,
            EntryGroups::new(vec![up_candle()], vec![], vec![up_candle()]),
            5,
            5,
            0,
        );
        let r = run_backtest(&bars, &confirmed).unwrap();
        assert_eq!(r.total_trades, 1);
        assert_eq!(r.trades[0].entry_reason, EntryReason::AllConfirmed);
    }

    #[test]
    fn confirmations_with_no_active_group_never_enter() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0]);
        let s = strategy(EntryMode::Confirmations, EntryGroups::default(), 5, 5, 0);
        assert_eq!(run_backtest(&bars, &s).unwrap().total_trades, 0);
    }

    #[test]
    fn split_uses_group_two_for_shorts() {
        let closes: Vec<f64> = (0..10).map(|i| 200.0 - i as f64).collect();
        let bars = make_bars(&closes);
        let down = SignalKey::Candle(CandlePattern::DownCandle);
        // group 1 cannot go long on falling closes
        let long_only = strategy(EntryMode::Split, group1(vec![down]), 5, 5, 0);
        assert_eq!(run_backtest(&bars, &long_only).unwrap().total_trades, 0);

        let s = strategy(
            EntryMode::Split,
            EntryGroups::new(vec![], vec![down], vec![]),
            5,
            5,
            0,
        );
        let r = run_backtest(&bars, &s).unwrap();
        assert_eq!(r.total_trades, 1);
        let t = &r.trades[0];
        assert_eq!(t.direction, Direction::Short);
        assert_eq!(t.entry_reason, EntryReason::SplitShort);
        assert_eq!(t.exit_reason, ExitReason::ProfitTarget);
        assert_eq!(t.profit, 4.0);
    }

    #[test]
    fn split_ignores_third_group() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let s = strategy(
            EntryMode::Split,
            EntryGroups::new(vec![], vec![], vec![up_candle()]),
            5,
            5,
            0,
        );
        assert_eq!(run_backtest(&bars, &s).unwrap().total_trades, 0);
    }

    // ─── Exits ───────────────────────────────────────────────────────

    /// Bar 0 and bar 1 bullish (entry at bar 1's close 100), then `rest`.
    fn long_then(rest: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let mut data = vec![(98.0, 99.5, 97.5, 99.0), (99.0, 100.5, 98.5, 100.0)];
        data.extend_from_slice(rest);
        data.push((100.0, 100.0, 100.0, 100.0));
        make_ohlc_bars(&data)
    }

    fn long_strategy(pt: u32, sl: u32, ts: u32) -> StrategyDefinition {
        strategy(EntryMode::Signals, group1(vec![up_candle()]), pt, sl, ts)
    }

    #[test]
    fn stop_loss_wins_over_profit_target() {
        // Wide bar touches both levels
        let bars = long_then(&[(100.0, 106.0, 94.0, 101.0)]);
        let r = run_backtest(&bars, &long_strategy(5, 5, 0)).unwrap();
        assert_eq!(r.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(r.trades[0].exit_price, 101.0);
    }

    #[test]
    fn gap_through_stop_books_the_stop_level() {
        let bars = long_then(&[(90.0, 91.0, 88.0, 89.0)]);
        let r = run_backtest(&bars, &long_strategy(5, 5, 0)).unwrap();
        let t = &r.trades[0];
        assert_eq!(t.exit_reason, ExitReason::StopLoss);
        assert_eq!(t.exit_price, 95.0);
        assert_eq!(t.profit, -5.0);
    }

    #[test]
    fn gap_through_target_books_the_target_level() {
        let bars = long_then(&[(110.0, 112.0, 109.0, 111.0)]);
        let r = run_backtest(&bars, &long_strategy(5, 5, 0)).unwrap();
        assert_eq!(r.trades[0].exit_price, 105.0);
        assert_eq!(r.trades[0].profit, 5.0);
    }

    #[test]
    fn trailing_stop_follows_the_high() {
        let bars = long_then(&[
            (101.5, 104.0, 101.5, 104.0), // best 104, trail 101
            (104.0, 104.0, 100.5, 101.0), // low 100.5 <= 101
        ]);
        let r = run_backtest(&bars, &long_strategy(20, 20, 3)).unwrap();
        let t = &r.trades[0];
        assert_eq!(t.exit_reason, ExitReason::TrailingStop);
        assert_eq!(t.exit_index, 3);
        assert_eq!(t.exit_price, 101.0);
    }

    #[test]
    fn zero_trailing_ticks_disable_trailing_exit() {
        let bars = long_then(&[
            (101.5, 104.0, 101.5, 104.0),
            (104.0, 104.0, 100.5, 101.0),
        ]);
        let r = run_backtest(&bars, &long_strategy(20, 20, 0)).unwrap();
        assert_eq!(r.total_trades, 0);
    }

    #[test]
    fn tick_size_scales_exit_distances() {
        let bars = long_then(&[(100.0, 103.0, 99.0, 102.0)]);
        // 10 ticks of 0.25 = 2.5 price units
        let r = Backtester::new(0.25).run(&bars, &long_strategy(10, 10, 0)).unwrap();
        assert_eq!(r.trades[0].exit_reason, ExitReason::ProfitTarget);
        assert_eq!(r.trades[0].exit_price, 102.0);
    }

    #[test]
    fn open_position_is_not_closed_at_series_end() {
        let bars = long_then(&[(100.0, 101.0, 99.0, 100.5)]);
        let r = run_backtest(&bars, &long_strategy(50, 50, 0)).unwrap();
        assert_eq!(r.total_trades, 0);
    }

    // ─── Determinism ─────────────────────────────────────────────────

    #[test]
    fn repeated_runs_are_identical() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 12.0).collect();
        let bars = make_bars(&closes);
        let s = strategy(EntryMode::Signals, group1(vec![up_candle()]), 4, 6, 2);
        let a = run_backtest(&bars, &s).unwrap();
        let b = run_backtest(&bars, &s).unwrap();
        assert_eq!(a, b);

        let book = SignalBook::precompute(&bars);
        let c = Backtester::default().run_with_book(&bars, &book, &s).unwrap();
        assert_eq!(a, c);
    }
}
