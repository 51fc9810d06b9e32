//! Fitness function: weighted blend of normalized backtest metrics.
//!
//! Five components, each roughly in [0, 1]:
//! - profit factor / 3, capped at 1
//! - win rate
//! - 1 - drawdown / 100, floored at 0
//! - log10(net profit + 1) / 3 capped at 1, or net profit / 1000 floored at -0.5 for losses
//! - trades / minimum trades, capped at 1
//!
//! Outside seeding, each violated constraint scales the score down.

use edgeforge_core::BacktestResult;

use crate::settings::{Constraints, FitnessWeights};

const TOO_FEW_TRADES_PENALTY: f64 = 0.5;
const LOW_WIN_RATE_PENALTY: f64 = 0.7;
const DEEP_DRAWDOWN_PENALTY: f64 = 0.8;

/// Score one backtest. Always >= 0; exactly 0 without trades.
pub fn score(
    result: &BacktestResult,
    weights: &FitnessWeights,
    constraints: &Constraints,
    is_initializing: bool,
) -> f64 {
    if !result.has_trades() {
        return 0.0;
    }

    let [pf, wr, dd, np, tc] = components(result, constraints);
    let total_weight = weights.sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let mut fitness = (weights.profit_factor * pf
        + weights.win_rate * wr
        + weights.max_drawdown * dd
        + weights.net_profit * np
        + weights.trade_count * tc)
        / total_weight;

    if !is_initializing {
        if result.total_trades < constraints.minimum_trades {
            fitness *= TOO_FEW_TRADES_PENALTY;
        }
        if result.win_rate < constraints.minimum_win_rate {
            fitness *= LOW_WIN_RATE_PENALTY;
        }
        if result.max_drawdown > constraints.maximum_drawdown {
            fitness *= DEEP_DRAWDOWN_PENALTY;
        }
    }

    fitness.max(0.0)
}

/// Normalized components in weight order.
fn components(result: &BacktestResult, constraints: &Constraints) -> [f64; 5] {
    let profit_factor = if result.profit_factor.is_nan() {
        0.0
    } else {
        result.profit_factor.min(3.0) / 3.0
    };
    let drawdown = (1.0 - result.max_drawdown / 100.0).max(0.0);
    let profit = if result.net_profit > 0.0 {
        ((result.net_profit + 1.0).log10() / 3.0).min(1.0)
    } else {
        (result.net_profit / 1000.0).max(-0.5)
    };
    let trade_count =
        (result.total_trades as f64 / constraints.minimum_trades.max(1) as f64).min(1.0);
    [profit_factor, result.win_rate, drawdown, profit, trade_count]
}
