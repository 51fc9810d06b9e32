//! Strategy definitions — the genome the optimizer evolves.
//!
//! A `StrategyDefinition` is a plain value. Variants are produced by building
//! a new definition (`with_*` methods); nothing mutates a scored definition.

use serde::{Deserialize, Serialize};

use crate::signals::SignalKey;

/// How the three entry groups combine into an entry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Any group fires; direction from bar momentum.
    Signals,
    /// Every non-empty group fires on the same bar.
    Confirmations,
    /// Group 1 enters long on a rising bar, group 2 enters short on a falling bar.
    Split,
}

impl EntryMode {
    pub const ALL: [EntryMode; 3] = [EntryMode::Signals, EntryMode::Confirmations, EntryMode::Split];
}

/// Identifies one of the three entry groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryGroupId {
    First,
    Second,
    Third,
}

impl EntryGroupId {
    pub const ALL: [EntryGroupId; 3] = [EntryGroupId::First, EntryGroupId::Second, EntryGroupId::Third];
}

/// Three ordered sets of signals. A group fires on a bar when any of its
/// signals is true on that bar. An empty group never fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryGroups {
    #[serde(default)]
    pub first: Vec<SignalKey>,
    #[serde(default)]
    pub second: Vec<SignalKey>,
    #[serde(default)]
    pub third: Vec<SignalKey>,
}

impl EntryGroups {
    pub fn new(first: Vec<SignalKey>, second: Vec<SignalKey>, third: Vec<SignalKey>) -> Self {
        Self { first, second, third }
    }

    pub fn get(&self, id: EntryGroupId) -> &[SignalKey] {
        match id {
            EntryGroupId::First => &self.first,
            EntryGroupId::Second => &self.second,
            EntryGroupId::Third => &self.third,
        }
    }

    pub fn first(&self) -> &[SignalKey] {
        &self.first
    }

    pub fn second(&self) -> &[SignalKey] {
        &self.second
    }

    pub fn third(&self) -> &[SignalKey] {
        &self.third
    }

    /// Returns a copy with group `id` replaced.
    pub fn with_group(&self, id: EntryGroupId, signals: Vec<SignalKey>) -> Self {
        let mut next = self.clone();
        match id {
            EntryGroupId::First => next.first = signals,
            EntryGroupId::Second => next.second = signals,
            EntryGroupId::Third => next.third = signals,
        }
        next
    }

    /// Iterate `(id, signals)` in group order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryGroupId, &[SignalKey])> {
        EntryGroupId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }

    pub fn signal_count(&self) -> usize {
        self.first.len() + self.second.len() + self.third.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal_count() == 0
    }
}

/// A complete trading-rule definition: entry groups plus tick-based exits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDefinition {
    pub mode: EntryMode,
    pub entry_groups: EntryGroups,
    pub profit_target_ticks: u32,
    pub stop_loss_ticks: u32,
    /// Zero disables the trailing exit.
    pub trailing_stop_ticks: u32,
}

impl StrategyDefinition {
    pub fn new(
        mode: EntryMode,
        entry_groups: EntryGroups,
        profit_target_ticks: u32,
        stop_loss_ticks: u32,
        trailing_stop_ticks: u32,
    ) -> Self {
        Self {
            mode,
            entry_groups,
            profit_target_ticks,
            stop_loss_ticks,
            trailing_stop_ticks,
        }
    }

    pub fn with_mode(&self, mode: EntryMode) -> Self {
        Self { mode, ..self.clone() }
    }

    pub fn with_entry_groups(&self, entry_groups: EntryGroups) -> Self {
        Self {
            entry_groups,
            ..self.clone()
        }
    }

    pub fn with_exits(&self, profit_target: u32, stop_loss: u32, trailing_stop: u32) -> Self {
        Self {
            profit_target_ticks: profit_target,
            stop_loss_ticks: stop_loss,
            trailing_stop_ticks: trailing_stop,
            ..self.clone()
        }
    }

    /// Content hash of the definition, stable across runs and platforms.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.mode as u8]);
        for (id, signals) in self.entry_groups.iter() {
            hasher.update(&[id as u8, signals.len() as u8]);
            for key in signals {
                hasher.update(key.namespace().as_str().as_bytes());
                hasher.update(b".");
                hasher.update(key.name().as_bytes());
                hasher.update(b";");
            }
        }
        hasher.update(&self.profit_target_ticks.to_le_bytes());
        hasher.update(&self.stop_loss_ticks.to_le_bytes());
        hasher.update(&self.trailing_stop_ticks.to_le_bytes());
        hasher.finalize().to_hex()[..16].to_string()
    }
}
