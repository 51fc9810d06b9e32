//! Optimization settings: defaults, TOML presets, validation, typed updates.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgeforge_core::{EntryGroups, EntryMode};

use crate::monte_carlo::MonteCarloConfig;
use crate::walk_forward::WalkForwardConfig;

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("missing exit rule: {0:?}")]
    MissingExitRule(ExitRuleKind),
    #[error("exit rule {0:?} configured more than once")]
    DuplicateExitRule(ExitRuleKind),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ─── Fitness weights and constraints ─────────────────────────────────

/// Relative weight of each fitness component. Normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessWeights {
    pub profit_factor: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub net_profit: f64,
    pub trade_count: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            profit_factor: 1.0,
            win_rate: 1.0,
            max_drawdown: 1.0,
            net_profit: 1.0,
            trade_count: 1.0,
        }
    }
}

/// Names one fitness component, for typed weight updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessComponent {
    ProfitFactor,
    WinRate,
    MaxDrawdown,
    NetProfit,
    TradeCount,
}

impl FitnessWeights {
    pub fn get(&self, component: FitnessComponent) -> f64 {
        match component {
            FitnessComponent::ProfitFactor => self.profit_factor,
            FitnessComponent::WinRate => self.win_rate,
            FitnessComponent::MaxDrawdown => self.max_drawdown,
            FitnessComponent::NetProfit => self.net_profit,
            FitnessComponent::TradeCount => self.trade_count,
        }
    }

    fn set(&mut self, component: FitnessComponent, value: f64) {
        let slot = match component {
            FitnessComponent::ProfitFactor => &mut self.profit_factor,
            FitnessComponent::WinRate => &mut self.win_rate,
            FitnessComponent::MaxDrawdown => &mut self.max_drawdown,
            FitnessComponent::NetProfit => &mut self.net_profit,
            FitnessComponent::TradeCount => &mut self.trade_count,
        };
        *slot = value;
    }

    pub fn sum(&self) -> f64 {
        self.profit_factor + self.win_rate + self.max_drawdown + self.net_profit + self.trade_count
    }

    fn values(&self) -> [f64; 5] {
        [
            self.profit_factor,
            self.win_rate,
            self.max_drawdown,
            self.net_profit,
            self.trade_count,
        ]
    }
}

/// Soft constraints; a violation scales fitness down outside seeding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub minimum_trades: usize,
    pub minimum_win_rate: f64,
    /// Price units, compared with `BacktestResult::max_drawdown`.
    pub maximum_drawdown: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            minimum_trades: 10,
            minimum_win_rate: 0.45,
            maximum_drawdown: 15.0,
        }
    }
}

// ─── Exit rules ──────────────────────────────────────────────────────

/// Inclusive tick range sampled on a `step` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub enabled: bool,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl TickRange {
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        Self {
            enabled: true,
            min,
            max,
            step,
        }
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), SettingsError> {
        if self.min > self.max {
            return Err(invalid(field, format!("min {} > max {}", self.min, self.max)));
        }
        if self.step == 0 {
            return Err(invalid(field, "step must be >= 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitRuleKind {
    ProfitTarget,
    StopLoss,
    TrailingStop,
}

impl ExitRuleKind {
    /// Tick value used when the rule is disabled or absent.
    ///
    /// A disabled trailing stop is 0, which the engine treats as off, rather
    /// than a fixed 8-tick trail. Profit target and stop loss fall back to 20.
    pub fn fallback_ticks(self) -> u32 {
        match self {
            ExitRuleKind::ProfitTarget => 20,
            ExitRuleKind::StopLoss => 20,
            ExitRuleKind::TrailingStop => 0,
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, ExitRuleKind::TrailingStop)
    }
}

/// One configured exit rule and its sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExitRule {
    ProfitTarget(TickRange),
    StopLoss(TickRange),
    TrailingStop(TickRange),
}

impl ExitRule {
    pub fn kind(&self) -> ExitRuleKind {
        match self {
            ExitRule::ProfitTarget(_) => ExitRuleKind::ProfitTarget,
            ExitRule::StopLoss(_) => ExitRuleKind::StopLoss,
            ExitRule::TrailingStop(_) => ExitRuleKind::TrailingStop,
        }
    }

    pub fn range(&self) -> &TickRange {
        match self {
            ExitRule::ProfitTarget(r) | ExitRule::StopLoss(r) | ExitRule::TrailingStop(r) => r,
        }
    }
}

fn default_exit_rules() -> Vec<ExitRule> {
    vec![
        ExitRule::ProfitTarget(TickRange::new(10, 50, 5)),
        ExitRule::StopLoss(TickRange::new(10, 50, 5)),
        ExitRule::TrailingStop(TickRange::new(5, 25, 2).disabled()),
    ]
}

// ─── Pinned signals ──────────────────────────────────────────────────

/// User-chosen entry groups that every seeded individual starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedSignals {
    pub mode: EntryMode,
    /// When set, the mode is still drawn at random and may mutate.
    #[serde(default)]
    pub randomize_mode: bool,
    #[serde(flatten)]
    pub groups: EntryGroups,
}

// ─── Settings ────────────────────────────────────────────────────────

/// Everything one optimization run needs besides the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationSettings {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    /// Probability that a child is bred by crossover rather than copied.
    pub crossover_rate: f64,
    pub elitism_rate: f64,
    /// Leading fraction of the bars used for fitness; the rest is held out.
    pub in_sample_percentage: f64,
    /// Stop after this many generations without a new best; `None` never stops early.
    pub early_stopping_generations: Option<usize>,
    pub fitness_weights: FitnessWeights,
    pub constraints: Constraints,
    /// Required on the wire: absent means no rules, which fails validation.
    /// TOML presets fall back to the default rules instead.
    #[serde(default)]
    pub exit_rules: Vec<ExitRule>,
    /// Price distance of one tick.
    pub tick_size: f64,
    pub seed: u64,
    /// Worker threads for offspring scoring; 1 scores on the run thread.
    pub threads: usize,
    /// Log every scored individual at debug level.
    pub debug: bool,
    pub pinned_signals: Option<PinnedSignals>,
    pub walk_forward: WalkForwardConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 3,
            mutation_rate: 0.15,
            crossover_rate: 1.0,
            elitism_rate: 0.1,
            in_sample_percentage: 0.7,
            early_stopping_generations: None,
            fitness_weights: FitnessWeights::default(),
            constraints: Constraints::default(),
            exit_rules: default_exit_rules(),
            tick_size: 1.0,
            seed: 42,
            threads: 1,
            debug: false,
            pinned_signals: None,
            walk_forward: WalkForwardConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
        }
    }
}

impl OptimizationSettings {
    /// Parse a TOML preset. A preset without `[[exitRules]]` gets the default rules.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = toml::from_str(s)?;
        if settings.exit_rules.is_empty() {
            settings.exit_rules = default_exit_rules();
        }
        Ok(settings)
    }

    /// Load a TOML preset and validate it.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn exit_rule(&self, kind: ExitRuleKind) -> Option<&TickRange> {
        self.exit_rules
            .iter()
            .find(|r| r.kind() == kind)
            .map(ExitRule::range)
    }

    /// Number of individuals carried over unchanged each generation.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elitism_rate).floor() as usize).min(self.population_size)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population_size < 2 {
            return Err(invalid("populationSize", "must be >= 2"));
        }
        for (field, rate) in [
            ("mutationRate", self.mutation_rate),
            ("crossoverRate", self.crossover_rate),
            ("elitismRate", self.elitism_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(field, format!("{rate} is outside [0, 1]")));
            }
        }
        if !(self.in_sample_percentage > 0.0 && self.in_sample_percentage < 1.0) {
            return Err(invalid("inSamplePercentage", "must be strictly between 0 and 1"));
        }
        if self.early_stopping_generations == Some(0) {
            return Err(invalid("earlyStoppingGenerations", "must be >= 1 when set"));
        }
        if self
            .fitness_weights
            .values()
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(invalid("fitnessWeights", "weights must be finite and non-negative"));
        }
        if self.fitness_weights.sum() <= 0.0 {
            return Err(invalid("fitnessWeights", "weights must have a positive sum"));
        }
        if self.constraints.minimum_trades == 0 {
            return Err(invalid("constraints.minimumTrades", "must be >= 1"));
        }

        for kind in [
            ExitRuleKind::ProfitTarget,
            ExitRuleKind::StopLoss,
            ExitRuleKind::TrailingStop,
        ] {
            let count = self.exit_rules.iter().filter(|r| r.kind() == kind).count();
            if count > 1 {
                return Err(SettingsError::DuplicateExitRule(kind));
            }
            if count == 0 && kind.is_required() {
                return Err(SettingsError::MissingExitRule(kind));
            }
        }
        for rule in &self.exit_rules {
            rule.range().validate("exitRules")?;
        }

        if !(self.tick_size.is_finite() && self.tick_size > 0.0) {
            return Err(invalid("tickSize", "must be positive"));
        }
        if self.threads == 0 {
            return Err(invalid("threads", "must be >= 1"));
        }
        if self.walk_forward.periods < 2 {
            return Err(invalid("walkForward.periods", "must be >= 2"));
        }
        let ratio = self.walk_forward.in_sample_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(invalid("walkForward.inSampleRatio", "must be strictly between 0 and 1"));
        }
        if self.monte_carlo.simulations == 0 {
            return Err(invalid("monteCarlo.simulations", "must be >= 1"));
        }
        Ok(())
    }

    /// Apply one field update. The settings are left untouched when the
    /// result would not validate.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let mut next = self.clone();
        match update {
            SettingsUpdate::PopulationSize(v) => next.population_size = v,
            SettingsUpdate::Generations(v) => next.generations = v,
            SettingsUpdate::MutationRate(v) => next.mutation_rate = v,
            SettingsUpdate::CrossoverRate(v) => next.crossover_rate = v,
            SettingsUpdate::ElitismRate(v) => next.elitism_rate = v,
            SettingsUpdate::InSamplePercentage(v) => next.in_sample_percentage = v,
            SettingsUpdate::EarlyStoppingGenerations(v) => next.early_stopping_generations = v,
            SettingsUpdate::FitnessWeight(component, v) => next.fitness_weights.set(component, v),
            SettingsUpdate::MinimumTrades(v) => next.constraints.minimum_trades = v,
            SettingsUpdate::MinimumWinRate(v) => next.constraints.minimum_win_rate = v,
            SettingsUpdate::MaximumDrawdown(v) => next.constraints.maximum_drawdown = v,
            SettingsUpdate::ExitRule(rule) => {
                next.exit_rules.retain(|r| r.kind() != rule.kind());
                next.exit_rules.push(rule);
            }
            SettingsUpdate::RemoveExitRule(kind) => next.exit_rules.retain(|r| r.kind() != kind),
            SettingsUpdate::TickSize(v) => next.tick_size = v,
            SettingsUpdate::Seed(v) => next.seed = v,
            SettingsUpdate::Threads(v) => next.threads = v,
            SettingsUpdate::Debug(v) => next.debug = v,
            SettingsUpdate::PinnedSignals(v) => next.pinned_signals = v,
            SettingsUpdate::WalkForwardPeriods(v) => next.walk_forward.periods = v,
            SettingsUpdate::WalkForwardInSampleRatio(v) => next.walk_forward.in_sample_ratio = v,
            SettingsUpdate::MonteCarloSimulations(v) => next.monte_carlo.simulations = v,
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// A single edit to `OptimizationSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingsUpdate {
    PopulationSize(usize),
    Generations(usize),
    MutationRate(f64),
    CrossoverRate(f64),
    ElitismRate(f64),
    InSamplePercentage(f64),
    EarlyStoppingGenerations(Option<usize>),
    FitnessWeight(FitnessComponent, f64),
    MinimumTrades(usize),
    MinimumWinRate(f64),
    MaximumDrawdown(f64),
    /// Insert a rule, replacing any existing rule of the same kind.
    ExitRule(ExitRule),
    RemoveExitRule(ExitRuleKind),
    TickSize(f64),
    Seed(u64),
    Threads(usize),
    Debug(bool),
    PinnedSignals(Option<PinnedSignals>),
    WalkForwardPeriods(usize),
    WalkForwardInSampleRatio(f64),
    MonteCarloSimulations(usize),
}
