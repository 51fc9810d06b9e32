//! Genetic search over strategy definitions.

pub mod operators;
pub mod optimizer;

pub use operators::{Breeder, ExitParam};
pub use optimizer::{GeneticOptimizer, OptimizationOutcome, OptimizerError, RunContext};

use serde::{Deserialize, Serialize};

use edgeforge_core::{BacktestResult, StrategyDefinition};

/// Progress reports carry at most this many individuals.
pub const TOP_STRATEGIES: usize = 10;

/// A scored strategy. Scored once when created, never re-scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub combination: StrategyDefinition,
    pub fitness: f64,
    pub in_sample_result: BacktestResult,
    pub out_of_sample_result: BacktestResult,
}

/// Sort by fitness, best first. Ties keep their current order.
pub fn rank(population: &mut [Individual]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Best individuals with positive fitness, best first.
pub fn top_strategies(population: &[Individual], limit: usize) -> Vec<Individual> {
    let mut viable: Vec<Individual> = population
        .iter()
        .filter(|i| i.fitness > 0.0)
        .cloned()
        .collect();
    rank(&mut viable);
    viable.truncate(limit);
    viable
}

/// Highest-fitness member; the earliest one wins ties.
pub fn fittest(population: &[Individual]) -> Option<&Individual> {
    population
        .iter()
        .reduce(|best, i| if i.fitness > best.fitness { i } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeforge_core::{EntryGroups, EntryMode};

    fn individual(fitness: f64, pt: u32) -> Individual {
        Individual {
            combination: StrategyDefinition::new(EntryMode::Signals, EntryGroups::default(), pt, 10, 0),
            fitness,
            in_sample_result: BacktestResult::empty(),
            out_of_sample_result: BacktestResult::empty(),
        }
    }

    #[test]
    fn rank_is_descending_and_stable() {
        let mut pop = vec![individual(0.2, 1), individual(0.5, 2), individual(0.2, 3)];
        rank(&mut pop);
        let order: Vec<u32> = pop.iter().map(|i| i.combination.profit_target_ticks).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn top_strategies_skip_zero_fitness() {
        let pop: Vec<Individual> = (0..15).map(|i| individual(i as f64 / 20.0, i)).collect();
        let top = top_strategies(&pop, TOP_STRATEGIES);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|i| i.fitness > 0.0));
        assert_eq!(top[0].combination.profit_target_ticks, 14);
        assert!(top_strategies(&[individual(0.0, 1)], 10).is_empty());
    }

    #[test]
    fn fittest_prefers_earliest_on_ties() {
        let pop = vec![individual(0.3, 1), individual(0.3, 2)];
        assert_eq!(fittest(&pop).unwrap().combination.profit_target_ticks, 1);
        assert!(fittest(&[]).is_none());
    }
}
