//! EdgeForge Runner — genetic search, validation, run orchestration.
//!
//! This crate builds on `edgeforge-core` to provide:
//! - Optimization settings with TOML presets and typed updates
//! - Fitness scoring with constraint penalties
//! - Genetic optimizer (seed, elitism, crossover, mutation, early stopping)
//! - Walk-forward and Monte Carlo validation of the winning strategy
//! - Run protocol messages and a background run thread with cancellation

pub mod cancel;
pub mod fitness;
pub mod genetic;
pub mod input;
pub mod monte_carlo;
pub mod orchestrator;
pub mod protocol;
pub mod settings;
pub mod walk_forward;

pub use cancel::CancelToken;
pub use genetic::{
    GeneticOptimizer, Individual, OptimizationOutcome, OptimizerError, RunContext,
};
pub use input::{validate_request, InputError};
pub use monte_carlo::{
    run_monte_carlo, ConfidenceInterval, MetricDistribution, MonteCarloConfig, MonteCarloReport,
};
pub use orchestrator::{run_blocking, spawn_run, RunError, RunHandle};
pub use protocol::{
    CompleteReport, ProgressReport, RunCommand, RunMessage, RunStatus, StartRequest,
};
pub use settings::{
    Constraints, ExitRule, ExitRuleKind, FitnessComponent, FitnessWeights, OptimizationSettings,
    PinnedSignals, SettingsError, SettingsUpdate, TickRange,
};
pub use walk_forward::{
    run_walk_forward, RobustnessFlag, WalkForwardConfig, WalkForwardReport, WalkForwardWindow,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn protocol_types_cross_threads() {
        assert_send::<RunMessage>();
        assert_send::<StartRequest>();
        assert_send::<CancelToken>();
        assert_sync::<CancelToken>();
        assert_send::<OptimizationSettings>();
        assert_sync::<OptimizationSettings>();
    }

    #[test]
    fn optimizer_is_shareable_with_workers() {
        assert_sync::<GeneticOptimizer<'static>>();
    }
}
