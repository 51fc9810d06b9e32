//! EdgeForge CLI — optimize, backtest, and signal listing commands.
//!
//! Commands:
//! - `optimize`: run the genetic search over a bar file, streaming every run
//!   message to stdout as one JSON line. `{"command":"stop"}` on stdin stops it.
//! - `backtest`: backtest one strategy definition and print the result
//! - `signals`: list every registered signal as `namespace.name`
//!
//! Logs go to stderr so stdout carries protocol messages only.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use edgeforge_core::{Backtester, Bar, SignalKey, StrategyDefinition};
use edgeforge_runner::settings::{OptimizationSettings, SettingsUpdate};
use edgeforge_runner::{spawn_run, CancelToken, RunCommand, RunStatus, StartRequest};

#[derive(Parser)]
#[command(
    name = "edgeforge",
    about = "EdgeForge CLI: genetic search for bar-pattern trading rules"
)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve strategies over a bar series and validate the winner.
    Optimize {
        /// JSON array of bars: {time, open, high, low, close, volume}.
        #[arg(long)]
        bars: PathBuf,

        /// TOML settings preset. Defaults apply when omitted.
        #[arg(long)]
        settings: Option<PathBuf>,

        #[arg(long)]
        population: Option<usize>,

        #[arg(long)]
        generations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads for offspring scoring.
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Backtest a single strategy definition.
    Backtest {
        #[arg(long)]
        bars: PathBuf,

        /// JSON strategy definition.
        #[arg(long)]
        strategy: PathBuf,

        /// Price distance of one tick.
        #[arg(long, default_value_t = 1.0)]
        tick_size: f64,
    },
    /// List every registered signal.
    Signals,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Optimize {
            bars,
            settings,
            population,
            generations,
            seed,
            threads,
        } => {
            let mut updates = Vec::new();
            updates.extend(population.map(SettingsUpdate::PopulationSize));
            updates.extend(generations.map(SettingsUpdate::Generations));
            updates.extend(seed.map(SettingsUpdate::Seed));
            updates.extend(threads.map(SettingsUpdate::Threads));
            run_optimize(&bars, settings.as_deref(), updates)
        }
        Commands::Backtest {
            bars,
            strategy,
            tick_size,
        } => run_backtest(&bars, &strategy, tick_size),
        Commands::Signals => {
            list_signals();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = Targets::new()
        .with_target("edgeforge_core", level)
        .with_target("edgeforge_runner", level)
        .with_target("edgeforge_cli", level)
        .with_default(Level::WARN);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bars from {}", path.display()))?;
    let bars: Vec<Bar> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse bars in {}", path.display()))?;
    info!(bars = bars.len(), path = %path.display(), "loaded bars");
    Ok(bars)
}

fn run_optimize(
    bars_path: &Path,
    settings_path: Option<&Path>,
    updates: Vec<SettingsUpdate>,
) -> Result<()> {
    let bars = load_bars(bars_path)?;
    let mut settings = match settings_path {
        Some(path) => OptimizationSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => OptimizationSettings::default(),
    };
    for update in updates {
        debug!(?update, "applying settings override");
        settings
            .apply(update)
            .context("invalid command-line override")?;
    }

    let handle = spawn_run(StartRequest { bars, settings }).context("failed to start run thread")?;
    watch_stdin(handle.cancel_token());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for message in handle.messages().iter() {
        serde_json::to_writer(&mut out, &message).context("failed to encode run message")?;
        writeln!(out)?;
        out.flush()?;
    }

    match handle.join() {
        RunStatus::Error => bail!("run ended with an error"),
        status => {
            info!(?status, "run finished");
            Ok(())
        }
    }
}

/// Read protocol commands from stdin on a detached thread. Only `stop`
/// has an effect on a run that is already going.
fn watch_stdin(cancel: CancelToken) {
    let spawned = thread::Builder::new()
        .name("edgeforge-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<RunCommand>(&line) {
                    Ok(RunCommand::Stop) => {
                        info!("stop requested");
                        cancel.cancel();
                    }
                    Ok(RunCommand::Start(_)) => warn!("run already active; start ignored"),
                    Err(e) => warn!(error = %e, "unrecognized command on stdin"),
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "stdin commands unavailable");
    }
}

fn run_backtest(bars_path: &Path, strategy_path: &Path, tick_size: f64) -> Result<()> {
    let bars = load_bars(bars_path)?;
    let text = std::fs::read_to_string(strategy_path)
        .with_context(|| format!("failed to read strategy from {}", strategy_path.display()))?;
    let strategy: StrategyDefinition = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse strategy in {}", strategy_path.display()))?;

    if !(tick_size.is_finite() && tick_size > 0.0) {
        bail!("tick size must be positive, got {tick_size}");
    }
    let result = Backtester::new(tick_size)
        .run(&bars, &strategy)
        .context("backtest failed")?;
    info!(
        strategy = %strategy.fingerprint(),
        trades = result.total_trades,
        net_profit = result.net_profit,
        "backtest complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn list_signals() {
    for key in SignalKey::all() {
        println!("{}.{}", key.namespace().as_str(), key.name());
    }
}
