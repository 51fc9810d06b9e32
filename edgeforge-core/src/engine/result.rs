//! Backtest summary and the running ledger that produces it.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Summary statistics plus the full trade list of one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// winners / total, 0 without trades.
    pub win_rate: f64,
    /// Cumulative profit, rounded to cents after every trade.
    pub net_profit: f64,
    pub gross_profit: f64,
    /// Sum of losing trades' absolute profit (zero-profit trades count here).
    pub gross_loss: f64,
    /// gross_profit / gross_loss; infinite when there are no losses.
    #[serde(with = "unbounded_f64")]
    pub profit_factor: f64,
    /// Largest peak-to-trough decline of cumulative net profit.
    pub max_drawdown: f64,
    pub average_win: f64,
    /// Mean losing trade, reported as a non-positive number.
    pub average_loss: f64,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    /// Result of a run that never traded.
    pub fn empty() -> Self {
        Ledger::default().finish()
    }

    /// Replay a trade list, in order, through a fresh ledger.
    pub fn from_trades(trades: impl IntoIterator<Item = Trade>) -> Self {
        let mut ledger = Ledger::default();
        for trade in trades {
            ledger.record(trade);
        }
        ledger.finish()
    }

    pub fn has_trades(&self) -> bool {
        self.total_trades > 0
    }
}

/// Round to cents, halves toward positive infinity.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Trade-by-trade accumulator for the result statistics.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    trades: Vec<Trade>,
    winners: usize,
    losers: usize,
    net_profit: f64,
    gross_profit: f64,
    gross_loss: f64,
    peak: f64,
    max_drawdown: f64,
}

impl Ledger {
    pub fn record(&mut self, trade: Trade) {
        self.net_profit = round_cents(self.net_profit + trade.profit);
        if trade.is_winner() {
            self.winners += 1;
            self.gross_profit += trade.profit;
        } else {
            self.losers += 1;
            self.gross_loss += trade.profit.abs();
        }
        // Peak starts at zero equity, so an opening loss counts as drawdown.
        self.peak = self.peak.max(self.net_profit);
        self.max_drawdown = self.max_drawdown.max(self.peak - self.net_profit);
        self.trades.push(trade);
    }

    pub fn finish(self) -> BacktestResult {
        let total = self.trades.len();
        BacktestResult {
            total_trades: total,
            winning_trades: self.winners,
            losing_trades: self.losers,
            win_rate: if total == 0 {
                0.0
            } else {
                self.winners as f64 / total as f64
            },
            net_profit: self.net_profit,
            gross_profit: self.gross_profit,
            gross_loss: self.gross_loss,
            profit_factor: if self.gross_loss == 0.0 {
                f64::INFINITY
            } else {
                self.gross_profit / self.gross_loss
            },
            max_drawdown: self.max_drawdown,
            average_win: if self.winners == 0 {
                0.0
            } else {
                self.gross_profit / self.winners as f64
            },
            average_loss: if self.losers == 0 {
                0.0
            } else {
                -self.gross_loss / self.losers as f64
            },
            trades: self.trades,
        }
    }
}

/// JSON has no infinity. Non-finite values travel as the strings
/// "Infinity", "-Infinity" and "NaN"; `null` reads back as infinity.
pub mod unbounded_f64 {
    use serde::de::{self, Deserializer};
    use serde::ser::Serializer;
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(f64::INFINITY),
            Some(Repr::Number(v)) => Ok(v),
            Some(Repr::Text(s)) => match s.as_str() {
                "Infinity" | "inf" => Ok(f64::INFINITY),
                "-Infinity" | "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(de::Error::custom(format!("invalid number: {other}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, EntryReason, ExitReason};
    use chrono::NaiveDate;

    fn trade(profit: f64) -> Trade {
        let t = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Trade {
            entry_time: t,
            exit_time: t,
            entry_index: 1,
            exit_index: 2,
            entry_price: 100.0,
            exit_price: 100.0 + profit,
            quantity: 1.0,
            direction: Direction::Long,
            profit,
            entry_reason: EntryReason::AnySignal,
            exit_reason: ExitReason::ProfitTarget,
        }
    }

    #[test]
    fn empty_result() {
        let r = BacktestResult::empty();
        assert_eq!(r.total_trades, 0);
        assert_eq!(r.win_rate, 0.0);
        assert!(r.profit_factor.is_infinite());
        assert_eq!(r.max_drawdown, 0.0);
    }

    #[test]
    fn accounting_identities() {
        let r = BacktestResult::from_trades([10.0, -4.0, 0.0, 6.0].map(trade));
        assert_eq!(r.total_trades, 4);
        assert_eq!(r.winning_trades, 2);
        // zero-profit trades are losers
        assert_eq!(r.losing_trades, 2);
        assert_eq!(r.win_rate, 0.5);
        assert_eq!(r.net_profit, 12.0);
        assert_eq!(r.gross_profit, 16.0);
        assert_eq!(r.gross_loss, 4.0);
        assert_eq!(r.profit_factor, 4.0);
        assert_eq!(r.average_win, 8.0);
        assert_eq!(r.average_loss, -2.0);
        assert_eq!(r.max_drawdown, 4.0);
    }

    #[test]
    fn opening_loss_is_drawdown() {
        let r = BacktestResult::from_trades([-5.0, 2.0].map(trade));
        assert_eq!(r.max_drawdown, 5.0);
    }

    #[test]
    fn net_profit_rounds_to_cents() {
        let r = BacktestResult::from_trades([0.106, 0.001].map(trade));
        assert_eq!(r.net_profit, 0.11);
        assert_eq!(round_cents(-0.125), -0.12);
    }

    #[test]
    fn infinite_profit_factor_survives_json() {
        let r = BacktestResult::from_trades([3.0].map(trade));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["profitFactor"], "Infinity");
        let back: BacktestResult = serde_json::from_value(json).unwrap();
        assert!(back.profit_factor.is_infinite());

        let finite = BacktestResult::from_trades([3.0, -1.0].map(trade));
        let json = serde_json::to_value(&finite).unwrap();
        assert_eq!(json["profitFactor"], 3.0);
    }
}
