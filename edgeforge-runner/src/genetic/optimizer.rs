//! Seed → evolve loop.
//!
//! Seeding scores `population_size` fresh individuals one at a time (with
//! constraint penalties suppressed). Each generation then ranks the
//! population, copies the elite unchanged, and breeds the remainder from
//! uniformly chosen parents. Offspring are independent units of work: each
//! slot draws from its own `(generation, slot)` RNG stream, so the next
//! population is identical whether it is scored on one thread or many.
//!
//! The best individual ever seen is tracked separately from the population.

use rand::Rng;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use edgeforge_core::rng::{RngHierarchy, RngStream};
use edgeforge_core::{BacktestError, Backtester, Bar, SignalBook, StrategyDefinition};

use super::operators::Breeder;
use super::{fittest, rank, top_strategies, Individual, TOP_STRATEGIES};
use crate::cancel::CancelToken;
use crate::fitness;
use crate::protocol::ProgressReport;
use crate::settings::OptimizationSettings;

/// Seeding reports progress after the first individual and every this many.
const SEED_PROGRESS_EVERY: usize = 5;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("backtest failed: {0}")]
    Backtest(#[from] BacktestError),
    #[error("failed to build scoring thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-run mutable state, owned by whoever started the run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub cancel: CancelToken,
    /// 0 while seeding, then the generation being built (1-based).
    pub generation: usize,
}

impl RunContext {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizationOutcome {
    /// Ran to the generation limit (or stopped early on stagnation).
    Finished(Individual),
    /// The cancel token was observed at a yield point.
    Stopped,
}

pub struct GeneticOptimizer<'a> {
    settings: &'a OptimizationSettings,
    in_sample: &'a [Bar],
    out_of_sample: &'a [Bar],
    in_sample_book: SignalBook,
    out_of_sample_book: SignalBook,
    engine: Backtester,
    breeder: Breeder,
    rng: RngHierarchy,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> GeneticOptimizer<'a> {
    /// Both slices must be non-empty; the caller validates input first.
    pub fn new(
        settings: &'a OptimizationSettings,
        in_sample: &'a [Bar],
        out_of_sample: &'a [Bar],
    ) -> Result<Self, OptimizerError> {
        let pool = if settings.threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(settings.threads)
                    .thread_name(|i| format!("edgeforge-score-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            settings,
            in_sample,
            out_of_sample,
            in_sample_book: SignalBook::precompute(in_sample),
            out_of_sample_book: SignalBook::precompute(out_of_sample),
            engine: Backtester::new(settings.tick_size),
            breeder: Breeder::new(settings),
            rng: RngHierarchy::new(settings.seed),
            pool,
        })
    }

    pub fn engine(&self) -> &Backtester {
        &self.engine
    }

    pub fn rng(&self) -> &RngHierarchy {
        &self.rng
    }

    /// Backtest `combination` on both splits and score the in-sample result.
    pub fn evaluate(
        &self,
        combination: StrategyDefinition,
        is_initializing: bool,
    ) -> Result<Individual, BacktestError> {
        let in_sample_result =
            self.engine
                .run_with_book(self.in_sample, &self.in_sample_book, &combination)?;
        let out_of_sample_result =
            self.engine
                .run_with_book(self.out_of_sample, &self.out_of_sample_book, &combination)?;
        let fitness = fitness::score(
            &in_sample_result,
            &self.settings.fitness_weights,
            &self.settings.constraints,
            is_initializing,
        );

        if self.settings.debug {
            debug!(
                strategy = %combination.fingerprint(),
                mode = ?combination.mode,
                signals = combination.entry_groups.signal_count(),
                trades = in_sample_result.total_trades,
                net_profit = in_sample_result.net_profit,
                fitness,
                "scored individual"
            );
        }

        Ok(Individual {
            combination,
            fitness,
            in_sample_result,
            out_of_sample_result,
        })
    }

    /// Score the initial population. `None` when cancelled part-way.
    pub fn seed(
        &self,
        ctx: &mut RunContext,
        on_progress: &mut dyn FnMut(ProgressReport),
    ) -> Result<Option<Vec<Individual>>, OptimizerError> {
        ctx.generation = 0;
        let size = self.settings.population_size;
        let mut population: Vec<Individual> = Vec::with_capacity(size);

        for slot in 0..size {
            if ctx.cancel.is_cancelled() {
                return Ok(None);
            }
            let mut rng = self.rng.rng_for(RngStream::Seeding, slot as u64, 0);
            let combination = self.breeder.random_strategy(&mut rng);
            population.push(self.evaluate(combination, true)?);

            if slot % SEED_PROGRESS_EVERY == 0 {
                let leader = fittest(&population).map_or(0.0, |i| i.fitness);
                on_progress(self.progress(0, true, leader, &population));
            }
        }
        Ok(Some(population))
    }

    /// Build generation `generation + 1` from `population`.
    ///
    /// The top `elite_count` individuals by fitness are copied unchanged;
    /// every other slot is bred and scored with constraint penalties.
    pub fn next_generation(
        &self,
        population: &[Individual],
        generation: usize,
    ) -> Result<Vec<Individual>, OptimizerError> {
        let size = self.settings.population_size;
        let mut ranked = population.to_vec();
        rank(&mut ranked);
        if ranked.is_empty() {
            return Ok(ranked);
        }

        let elite = self.settings.elite_count().min(ranked.len());
        let mut next: Vec<Individual> = ranked[..elite].to_vec();

        let breed = |slot: usize| -> Result<Individual, BacktestError> {
            let mut rng = self
                .rng
                .rng_for(RngStream::Offspring, generation as u64, slot as u64);
            let a = &ranked[rng.gen_range(0..ranked.len())];
            let b = &ranked[rng.gen_range(0..ranked.len())];
            let mut child = if rng.gen_bool(self.settings.crossover_rate) {
                self.breeder.crossover(&a.combination, &b.combination, &mut rng)
            } else {
                a.combination.clone()
            };
            if rng.gen_bool(self.settings.mutation_rate) {
                child = self.breeder.mutate(&child, &mut rng);
            }
            self.evaluate(child, false)
        };

        let offspring: Result<Vec<Individual>, BacktestError> = match &self.pool {
            Some(pool) => pool.install(|| (elite..size).into_par_iter().map(&breed).collect()),
            None => (elite..size).map(&breed).collect(),
        };
        next.extend(offspring?);
        Ok(next)
    }

    /// Seed, then evolve for `generations` generations or until stagnation.
    pub fn run(
        &self,
        ctx: &mut RunContext,
        on_progress: &mut dyn FnMut(ProgressReport),
    ) -> Result<OptimizationOutcome, OptimizerError> {
        info!(
            population = self.settings.population_size,
            generations = self.settings.generations,
            in_sample_bars = self.in_sample.len(),
            out_of_sample_bars = self.out_of_sample.len(),
            tick_size = self.engine.tick_size(),
            seed = self.rng.master_seed(),
            "optimization started"
        );

        let Some(mut population) = self.seed(ctx, on_progress)? else {
            info!("optimization stopped during seeding");
            return Ok(OptimizationOutcome::Stopped);
        };
        let Some(mut best) = fittest(&population).cloned() else {
            return Ok(OptimizationOutcome::Stopped);
        };
        let mut stagnant = 0usize;

        for generation in 0..self.settings.generations {
            if ctx.cancel.is_cancelled() {
                info!(generation, "optimization stopped");
                return Ok(OptimizationOutcome::Stopped);
            }
            ctx.generation = generation + 1;
            population = self.next_generation(&population, generation)?;

            match fittest(&population) {
                Some(leader) if leader.fitness > best.fitness => {
                    best = leader.clone();
                    stagnant = 0;
                }
                _ => stagnant += 1,
            }

            info!(
                generation = ctx.generation,
                best_fitness = best.fitness,
                best = %best.combination.fingerprint(),
                "generation complete"
            );
            on_progress(self.progress(ctx.generation, false, best.fitness, &population));

            if let Some(limit) = self.settings.early_stopping_generations {
                if stagnant >= limit {
                    info!(generation = ctx.generation, stagnant, "early stopping: no improvement");
                    break;
                }
            }
        }

        Ok(OptimizationOutcome::Finished(best))
    }

    /// `best_fitness` is the best ever seen, which may have left the population.
    fn progress(
        &self,
        generation: usize,
        is_initializing: bool,
        best_fitness: f64,
        population: &[Individual],
    ) -> ProgressReport {
        ProgressReport {
            generation,
            total_generations: self.settings.generations,
            best_fitness,
            is_initializing,
            top_strategies: top_strategies(population, TOP_STRATEGIES),
        }
    }
}
