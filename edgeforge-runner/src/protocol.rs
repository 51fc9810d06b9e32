//! Run protocol: commands into a run, messages out of it.
//!
//! JSON shapes:
//! - `{"command": "start", "bars": [...], "settings": {...}}`
//! - `{"command": "stop"}`
//! - `{"type": "progress" | "complete" | "error" | "stopped", ...}`

use serde::{Deserialize, Serialize};

use edgeforge_core::Bar;

use crate::genetic::Individual;
use crate::monte_carlo::MonteCarloReport;
use crate::settings::OptimizationSettings;
use crate::walk_forward::WalkForwardReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub bars: Vec<Bar>,
    pub settings: OptimizationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum RunCommand {
    Start(StartRequest),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    /// 0 while seeding, then 1-based generation number.
    pub generation: usize,
    pub total_generations: usize,
    /// Best fitness seen so far in the run; never decreases.
    pub best_fitness: f64,
    pub is_initializing: bool,
    pub top_strategies: Vec<Individual>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReport {
    pub best_individual: Individual,
    pub walk_forward_report: WalkForwardReport,
    pub monte_carlo_report: MonteCarloReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RunMessage {
    Progress(ProgressReport),
    Complete(Box<CompleteReport>),
    Error { message: String },
    Stopped,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Complete,
    Stopped,
    Error,
}

impl RunMessage {
    /// `Some` for the single message that ends a run.
    pub fn terminal_status(&self) -> Option<RunStatus> {
        match self {
            RunMessage::Progress(_) => None,
            RunMessage::Complete(_) => Some(RunStatus::Complete),
            RunMessage::Error { .. } => Some(RunStatus::Error),
            RunMessage::Stopped => Some(RunStatus::Stopped),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_status().is_some()
    }
}
