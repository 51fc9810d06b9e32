//! Trade — a completed round trip produced by the backtest engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::strategy::EntryMode;

/// Position direction. Serialized as +1 / -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Direction implied by bar-to-bar momentum: rising close is long,
    /// anything else is short.
    pub fn from_momentum(close: f64, prev_close: f64) -> Self {
        if close > prev_close {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

impl From<Direction> for i8 {
    fn from(d: Direction) -> i8 {
        match d {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Direction::Long),
            -1 => Ok(Direction::Short),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

/// Which entry rule opened the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryReason {
    AnySignal,
    AllConfirmed,
    SplitLong,
    SplitShort,
}

impl EntryReason {
    pub fn for_mode(mode: EntryMode, direction: Direction) -> Self {
        match (mode, direction) {
            (EntryMode::Signals, _) => EntryReason::AnySignal,
            (EntryMode::Confirmations, _) => EntryReason::AllConfirmed,
            (EntryMode::Split, Direction::Long) => EntryReason::SplitLong,
            (EntryMode::Split, Direction::Short) => EntryReason::SplitShort,
        }
    }
}

/// Which exit rule closed the position. Declaration order is the
/// precedence order used when several rules trigger on the same bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitReason {
    StopLoss,
    ProfitTarget,
    TrailingStop,
}

/// A completed round-trip trade. Created only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Bar index of the entry, relative to the simulated slice.
    pub entry_index: usize,
    /// Bar index of the exit, relative to the simulated slice.
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub direction: Direction,
    pub profit: f64,
    pub entry_reason: EntryReason,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_serializes_as_sign() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Direction::Short).unwrap(), "-1");
        let d: Direction = serde_json::from_str("-1").unwrap();
        assert_eq!(d, Direction::Short);
        assert!(serde_json::from_str::<Direction>("0").is_err());
    }

    #[test]
    fn momentum_direction() {
        assert_eq!(Direction::from_momentum(101.0, 100.0), Direction::Long);
        assert_eq!(Direction::from_momentum(99.0, 100.0), Direction::Short);
        // Flat bar goes short
        assert_eq!(Direction::from_momentum(100.0, 100.0), Direction::Short);
    }

    #[test]
    fn exit_precedence_order() {
        assert!(ExitReason::StopLoss < ExitReason::ProfitTarget);
        assert!(ExitReason::ProfitTarget < ExitReason::TrailingStop);
    }

    #[test]
    fn entry_reason_for_split_follows_direction() {
        assert_eq!(
            EntryReason::for_mode(EntryMode::Split, Direction::Short),
            EntryReason::SplitShort
        );
        assert_eq!(
            EntryReason::for_mode(EntryMode::Signals, Direction::Short),
            EntryReason::AnySignal
        );
    }
}
