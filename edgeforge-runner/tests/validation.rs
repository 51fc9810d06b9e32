//! Walk-forward windowing and Monte Carlo interval properties.

use chrono::NaiveDate;
use proptest::prelude::*;

use edgeforge_core::rng::RngHierarchy;
use edgeforge_core::signals::CandlePattern;
use edgeforge_core::{
    Backtester, Bar, Direction, EntryGroups, EntryMode, EntryReason, ExitReason, SignalKey,
    StrategyDefinition, Trade,
};
use edgeforge_runner::monte_carlo::{run_monte_carlo, MonteCarloConfig};
use edgeforge_runner::walk_forward::{create_windows, run_walk_forward, WalkForwardConfig};

fn make_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.5).sin() * 5.0;
            let open = if i % 2 == 0 { close - 1.0 } else { close + 1.0 };
            Bar {
                time: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

fn up_candle_strategy() -> StrategyDefinition {
    StrategyDefinition::new(
        EntryMode::Signals,
        EntryGroups::new(vec![SignalKey::Candle(CandlePattern::UpCandle)], vec![], vec![]),
        3,
        3,
        0,
    )
}

#[test]
fn hundred_bars_four_periods_gives_three_ordered_windows() {
    let bars = make_bars(100);
    let report = run_walk_forward(
        &bars,
        &up_candle_strategy(),
        &WalkForwardConfig::default(),
        &Backtester::new(1.0),
    )
    .unwrap();

    assert_eq!(report.windows.len(), 3);
    for pair in report.windows.windows(2) {
        assert!(pair[0].bounds.end <= pair[1].bounds.start);
        assert!(pair[0].period.end < pair[1].period.start);
    }
    for w in &report.windows {
        assert!(w.bounds.start < w.bounds.in_sample_end);
        assert!(w.bounds.in_sample_end < w.bounds.end);
        assert_eq!(w.bounds.end - w.bounds.start, 25);
    }

    let defined: Vec<f64> = report.windows.iter().filter_map(|w| w.robustness).collect();
    match report.mean_robustness {
        Some(mean) => {
            let expected = defined.iter().sum::<f64>() / defined.len() as f64;
            assert!((mean - expected).abs() < 1e-12);
        }
        None => assert!(defined.is_empty()),
    }
}

#[test]
fn too_few_bars_yields_no_windows() {
    let bars = make_bars(3);
    let report = run_walk_forward(
        &bars,
        &up_candle_strategy(),
        &WalkForwardConfig::default(),
        &Backtester::new(1.0),
    )
    .unwrap();
    assert!(report.windows.is_empty());
    assert_eq!(report.mean_robustness, None);
}

fn trade(profit: f64, i: i64) -> Trade {
    let t = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i);
    Trade {
        entry_time: t,
        exit_time: t,
        entry_index: i as usize,
        exit_index: i as usize,
        entry_price: 100.0,
        exit_price: 100.0 + profit,
        quantity: 1.0,
        direction: Direction::Long,
        profit,
        entry_reason: EntryReason::AnySignal,
        exit_reason: ExitReason::ProfitTarget,
    }
}

proptest! {
    #[test]
    fn ci99_contains_ci95(
        profits in prop::collection::vec(-50.0f64..50.0, 1..40),
        seed in any::<u64>(),
        simulations in 1usize..200,
    ) {
        let trades: Vec<Trade> = profits
            .iter()
            .enumerate()
            .map(|(i, p)| trade(*p, i as i64))
            .collect();
        let report = run_monte_carlo(
            &trades,
            &MonteCarloConfig { simulations },
            &RngHierarchy::new(seed),
        );
        prop_assert_eq!(report.simulations, simulations);
        for metric in [report.net_profit, report.max_drawdown, report.win_rate] {
            prop_assert!(metric.ci99.contains(&metric.ci95));
            prop_assert!(metric.ci95.lower <= metric.ci95.upper);
        }
        // Order never changes the total.
        let total: f64 = profits.iter().sum();
        prop_assert!((report.net_profit.mean - total).abs() < 1e-6);
    }

    #[test]
    fn windows_are_disjoint_and_in_bounds(
        total in 0usize..2000,
        periods in 2usize..12,
        ratio in 0.05f64..0.95,
    ) {
        let config = WalkForwardConfig { periods, in_sample_ratio: ratio };
        let windows = create_windows(total, &config);
        if total / periods == 0 {
            prop_assert!(windows.is_empty());
        } else {
            prop_assert_eq!(windows.len(), periods - 1);
        }
        for w in &windows {
            prop_assert!(w.start <= w.in_sample_end && w.in_sample_end <= w.end);
            prop_assert!(w.end <= total);
        }
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
