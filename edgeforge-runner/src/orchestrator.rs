//! Run orchestration: validate → optimize → validate the winner → report.
//!
//! `run_blocking` is the whole pipeline on the calling thread. `spawn_run`
//! moves it onto a named background thread and streams `RunMessage`s over an
//! mpsc channel, so a multi-generation run never blocks the caller.
//!
//! Every run ends with exactly one terminal message (complete, stopped or
//! error). Input problems are caught before any optimizer work starts.

use std::io;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{error, info};

use edgeforge_core::BacktestError;

use crate::cancel::CancelToken;
use crate::genetic::{GeneticOptimizer, OptimizationOutcome, OptimizerError, RunContext};
use crate::input::{validate_request, InputError};
use crate::monte_carlo::run_monte_carlo;
use crate::protocol::{CompleteReport, RunCommand, RunMessage, RunStatus, StartRequest};
use crate::walk_forward::run_walk_forward;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
    #[error("optimization failed: {0}")]
    Optimizer(#[from] OptimizerError),
    #[error("validation backtest failed: {0}")]
    Backtest(#[from] BacktestError),
}

/// Run the full pipeline on this thread, handing every message to `sink`.
pub fn run_blocking(
    request: &StartRequest,
    mut sink: impl FnMut(RunMessage),
    cancel: &CancelToken,
) -> RunStatus {
    let terminal = match execute(request, &mut sink, cancel) {
        Ok(Some(report)) => RunMessage::Complete(Box::new(report)),
        Ok(None) => RunMessage::Stopped,
        Err(e) => {
            error!(error = %e, "run failed");
            RunMessage::Error {
                message: e.to_string(),
            }
        }
    };
    let status = terminal.terminal_status().unwrap_or(RunStatus::Error);
    sink(terminal);
    status
}

/// `Ok(None)` when the run was cancelled.
fn execute(
    request: &StartRequest,
    sink: &mut impl FnMut(RunMessage),
    cancel: &CancelToken,
) -> Result<Option<CompleteReport>, RunError> {
    let settings = &request.settings;
    let bars = request.bars.as_slice();
    let split = validate_request(bars, settings)?;
    let (in_sample, out_of_sample) = bars.split_at(split);

    let optimizer = GeneticOptimizer::new(settings, in_sample, out_of_sample)?;
    let mut ctx = RunContext::new(cancel.clone());
    let best = match optimizer.run(&mut ctx, &mut |p| sink(RunMessage::Progress(p)))? {
        OptimizationOutcome::Finished(best) => best,
        OptimizationOutcome::Stopped => return Ok(None),
    };
    if cancel.is_cancelled() {
        return Ok(None);
    }

    let walk_forward_report =
        run_walk_forward(bars, &best.combination, &settings.walk_forward, optimizer.engine())?;

    let trades: Vec<_> = best
        .in_sample_result
        .trades
        .iter()
        .chain(&best.out_of_sample_result.trades)
        .cloned()
        .collect();
    let monte_carlo_report = run_monte_carlo(&trades, &settings.monte_carlo, optimizer.rng());

    info!(
        generations = ctx.generation,
        best_fitness = best.fitness,
        trades = trades.len(),
        windows = walk_forward_report.windows.len(),
        "run complete"
    );

    Ok(Some(CompleteReport {
        best_individual: best,
        walk_forward_report,
        monte_carlo_report,
    }))
}

// ─── Background run ──────────────────────────────────────────────────

/// A run executing on its own thread.
pub struct RunHandle {
    cancel: CancelToken,
    messages: Receiver<RunMessage>,
    join: JoinHandle<RunStatus>,
}

/// Start `request` on a background thread named `edgeforge-run`.
pub fn spawn_run(request: StartRequest) -> io::Result<RunHandle> {
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let worker_cancel = cancel.clone();
    let join = thread::Builder::new()
        .name("edgeforge-run".into())
        .spawn(move || {
            // A dropped receiver only means nobody is listening any more.
            run_blocking(
                &request,
                |msg| {
                    let _ = tx.send(msg);
                },
                &worker_cancel,
            )
        })?;
    Ok(RunHandle {
        cancel,
        messages: rx,
        join,
    })
}

impl RunHandle {
    /// Request cancellation; the run ends with `Stopped` at its next yield point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn messages(&self) -> &Receiver<RunMessage> {
        &self.messages
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Apply a protocol command to this run. A second `start` is ignored.
    pub fn handle(&self, command: &RunCommand) {
        match command {
            RunCommand::Stop => self.stop(),
            RunCommand::Start(_) => info!("run already active; start ignored"),
        }
    }

    /// Wait for the run thread to finish.
    pub fn join(self) -> RunStatus {
        self.join.join().unwrap_or_else(|_| {
            error!("run thread panicked");
            RunStatus::Error
        })
    }
}
