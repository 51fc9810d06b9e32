//! Criterion benchmarks for the backtest hot path.
//!
//! 1. Signal book precompute over the whole registry
//! 2. One backtest against a precomputed book
//! 3. One backtest evaluating its own signals

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use edgeforge_core::domain::Bar;
use edgeforge_core::signals::{CandlePattern, MaCrossSignal, OscillatorSignal};
use edgeforge_core::{Backtester, EntryGroups, EntryMode, SignalBook, SignalKey, StrategyDefinition};

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Bar {
                time: base + chrono::Duration::days(i as i64),
                open,
                high: close + 1.5,
                low: open - 1.5,
                close,
                volume: 1_000_000.0 + (i % 500) as f64,
            }
        })
        .collect()
}

fn strategy() -> StrategyDefinition {
    StrategyDefinition::new(
        EntryMode::Signals,
        EntryGroups::new(
            vec![SignalKey::Candle(CandlePattern::BullishEngulfing)],
            vec![SignalKey::Oscillator(OscillatorSignal::RsiBelow30)],
            vec![SignalKey::MovingAverage(MaCrossSignal::Sma7AboveSma21)],
        ),
        20,
        15,
        8,
    )
}

fn bench_signal_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_book");
    for n in [500, 2000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| SignalBook::precompute(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_backtest(c: &mut Criterion) {
    let bars = make_bars(2000);
    let book = SignalBook::precompute(&bars);
    let s = strategy();
    let engine = Backtester::default();

    c.bench_function("backtest_with_book_2000", |b| {
        b.iter(|| engine.run_with_book(black_box(&bars), &book, black_box(&s)))
    });
    c.bench_function("backtest_standalone_2000", |b| {
        b.iter(|| engine.run(black_box(&bars), black_box(&s)))
    });
}

criterion_group!(benches, bench_signal_book, bench_backtest);
criterion_main!(benches);
