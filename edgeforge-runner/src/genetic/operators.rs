//! Variation operators: random generation, crossover, mutation.
//!
//! All operators take the caller's RNG so each unit of work can run on its
//! own deterministic stream.

use rand::Rng;

use edgeforge_core::{EntryGroupId, EntryGroups, EntryMode, SignalKey, StrategyDefinition};

use crate::settings::{ExitRuleKind, OptimizationSettings, PinnedSignals, TickRange};

/// Signals drawn for a fresh random individual: 1..=MAX_RANDOM_SIGNALS.
const MAX_RANDOM_SIGNALS: usize = 3;

// ─── Exit parameters ─────────────────────────────────────────────────

/// How one exit distance is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitParam {
    /// Disabled or absent rule: always this value, never mutated.
    Fixed(u32),
    /// Sampled on the range's step grid, nudged by one step.
    Range(TickRange),
}

impl ExitParam {
    pub fn from_settings(settings: &OptimizationSettings, kind: ExitRuleKind) -> Self {
        match settings.exit_rule(kind) {
            Some(range) if range.enabled => ExitParam::Range(*range),
            _ => ExitParam::Fixed(kind.fallback_ticks()),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            ExitParam::Fixed(v) => v,
            ExitParam::Range(r) => {
                let steps = (r.max - r.min) / r.step;
                r.min + r.step * rng.gen_range(0..=steps)
            }
        }
    }

    /// Move `value` one step up or down, clamped to the range.
    pub fn nudge<R: Rng + ?Sized>(&self, value: u32, rng: &mut R) -> u32 {
        match *self {
            ExitParam::Fixed(v) => v,
            ExitParam::Range(r) => {
                let moved = if rng.gen_bool(0.5) {
                    value.saturating_add(r.step)
                } else {
                    value.saturating_sub(r.step)
                };
                moved.clamp(r.min, r.max)
            }
        }
    }
}

// ─── Breeder ─────────────────────────────────────────────────────────

/// Applies the configured variation rules to strategy definitions.
#[derive(Debug, Clone)]
pub struct Breeder {
    mutation_rate: f64,
    pinned: Option<PinnedSignals>,
    profit_target: ExitParam,
    stop_loss: ExitParam,
    trailing_stop: ExitParam,
}

impl Breeder {
    pub fn new(settings: &OptimizationSettings) -> Self {
        Self {
            mutation_rate: settings.mutation_rate,
            pinned: settings.pinned_signals.clone(),
            profit_target: ExitParam::from_settings(settings, ExitRuleKind::ProfitTarget),
            stop_loss: ExitParam::from_settings(settings, ExitRuleKind::StopLoss),
            trailing_stop: ExitParam::from_settings(settings, ExitRuleKind::TrailingStop),
        }
    }

    fn mode_is_free(&self) -> bool {
        self.pinned.as_ref().map_or(true, |p| p.randomize_mode)
    }

    fn signals_are_free(&self) -> bool {
        self.pinned.is_none()
    }

    /// A fresh individual for the initial population.
    pub fn random_strategy<R: Rng + ?Sized>(&self, rng: &mut R) -> StrategyDefinition {
        let groups = match &self.pinned {
            Some(pinned) => pinned.groups.clone(),
            None => random_groups(rng),
        };
        let mode = match &self.pinned {
            Some(pinned) if !pinned.randomize_mode => pinned.mode,
            _ => random_mode(rng),
        };
        StrategyDefinition::new(
            mode,
            groups,
            self.profit_target.sample(rng),
            self.stop_loss.sample(rng),
            self.trailing_stop.sample(rng),
        )
    }

    /// Field-wise crossover: each entry group is inherited whole, and the
    /// mode and every exit distance independently, from either parent.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        a: &StrategyDefinition,
        b: &StrategyDefinition,
        rng: &mut R,
    ) -> StrategyDefinition {
        let pick = |rng: &mut R| if rng.gen_bool(0.5) { a } else { b };
        let mut groups = EntryGroups::default();
        for id in EntryGroupId::ALL {
            groups = groups.with_group(id, pick(rng).entry_groups.get(id).to_vec());
        }
        StrategyDefinition::new(
            pick(rng).mode,
            groups,
            pick(rng).profit_target_ticks,
            pick(rng).stop_loss_ticks,
            pick(rng).trailing_stop_ticks,
        )
    }

    /// Mutated copy. Each aspect (mode, signal groups, each exit distance)
    /// changes independently with probability `mutation_rate`.
    pub fn mutate<R: Rng + ?Sized>(&self, s: &StrategyDefinition, rng: &mut R) -> StrategyDefinition {
        let rate = self.mutation_rate;
        let mut next = s.clone();

        if self.mode_is_free() && rng.gen_bool(rate) {
            next = next.with_mode(random_mode(rng));
        }

        if self.signals_are_free() && rng.gen_bool(rate) {
            let mut groups = next.entry_groups.clone();
            for id in EntryGroupId::ALL {
                let mut signals = groups.get(id).to_vec();
                if rng.gen_bool(0.5) {
                    let key = SignalKey::random(rng);
                    if !signals.contains(&key) {
                        signals.push(key);
                    }
                } else if !signals.is_empty() {
                    let victim = rng.gen_range(0..signals.len());
                    signals.remove(victim);
                }
                groups = groups.with_group(id, signals);
            }
            next = next.with_entry_groups(groups);
        }

        let mut exits = [
            (self.profit_target, next.profit_target_ticks),
            (self.stop_loss, next.stop_loss_ticks),
            (self.trailing_stop, next.trailing_stop_ticks),
        ];
        for (param, ticks) in &mut exits {
            if rng.gen_bool(rate) {
                *ticks = param.nudge(*ticks, rng);
            }
        }
        let [(_, pt), (_, sl), (_, ts)] = exits;
        next.with_exits(pt, sl, ts)
    }
}

fn random_mode<R: Rng + ?Sized>(rng: &mut R) -> EntryMode {
    EntryMode::ALL[rng.gen_range(0..EntryMode::ALL.len())]
}

/// 1..=3 random signals, each dropped into a random group.
fn random_groups<R: Rng + ?Sized>(rng: &mut R) -> EntryGroups {
    let mut groups = EntryGroups::default();
    let count = rng.gen_range(1..=MAX_RANDOM_SIGNALS);
    for _ in 0..count {
        let id = EntryGroupId::ALL[rng.gen_range(0..EntryGroupId::ALL.len())];
        let key = SignalKey::random(rng);
        let mut signals = groups.get(id).to_vec();
        if !signals.contains(&key) {
            signals.push(key);
        }
        groups = groups.with_group(id, signals);
    }
    groups
}
