//! Domain types: bars, trades, and strategy definitions.

pub mod bar;
pub mod strategy;
pub mod trade;

pub use bar::Bar;
pub use strategy::{EntryGroupId, EntryGroups, EntryMode, StrategyDefinition};
pub use trade::{Direction, EntryReason, ExitReason, Trade};
