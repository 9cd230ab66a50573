//! Evolutionary search over keyboard layouts.
//!
//! One generation is: repair locks, evaluate in parallel, record the best,
//! carry elites, select parents, recombine, mutate, repair again, then fill
//! the next population back up to size with random layouts.

pub mod crossover;
pub mod locks;
pub mod mutation;
pub mod runner;
pub mod selection;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{KeyvolveError, KvResult};
use crate::layout::Layout;
use crate::scorer::Evaluator;
use crossover::CrossoverMethod;
use locks::LockMask;
use mutation::MutationMethod;
use runner::{GenerationSnapshot, ProgressCallback};
use selection::{SelectionMethod, Selector};

/// Upper bound for every "re-roll until different" loop. On exhaustion the
/// last candidate is accepted as-is.
pub const MAX_REROLLS: usize = 1000;

#[derive(Debug, Clone)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub generations: usize,
    pub elitism: usize,
    /// Per-individual mutation probability in percent, 0 to 100.
    pub mutation_rate: f64,
    pub num_parents: usize,
    pub tournament_size: usize,
    pub rank_exponent: f64,
    pub selection: SelectionMethod,
    pub crossover: CrossoverMethod,
    pub mutation: MutationMethod,
    pub locks: Option<LockMask>,
    pub seed: u64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            elitism: 5,
            mutation_rate: 10.0,
            num_parents: 20,
            tournament_size: 3,
            rank_exponent: 1.0,
            selection: SelectionMethod::Tournament,
            crossover: CrossoverMethod::Pmx,
            mutation: MutationMethod::Swap,
            locks: None,
            seed: 0,
        }
    }
}

impl EvolutionParams {
    pub fn validate(&self) -> KvResult<()> {
        if self.population_size == 0 {
            return Err(KeyvolveError::Config("population size must be at least 1".into()));
        }
        if self.generations == 0 {
            return Err(KeyvolveError::Config("generation count must be at least 1".into()));
        }
        if self.elitism > self.population_size {
            return Err(KeyvolveError::Config(format!(
                "elitism {} exceeds population size {}",
                self.elitism, self.population_size
            )));
        }
        if !(0.0..=100.0).contains(&self.mutation_rate) {
            return Err(KeyvolveError::Config(format!(
                "mutation rate {} is outside 0-100",
                self.mutation_rate
            )));
        }
        if self.tournament_size == 0 {
            return Err(KeyvolveError::Config("tournament size must be at least 1".into()));
        }
        if self.rank_exponent <= 0.0 {
            return Err(KeyvolveError::Config(format!(
                "rank exponent {} must be positive",
                self.rank_exponent
            )));
        }
        Ok(())
    }
}

/// Result of a finished (or cancelled) search.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionOutcome {
    pub best_layout: Layout,
    pub best_effort: f64,
    /// Best effort of each completed generation, in order.
    pub effort_history: Vec<f64>,
    pub generations_run: usize,
    pub seed: u64,
}

pub struct EvolutionDriver<'a> {
    evaluator: &'a Evaluator,
    params: EvolutionParams,
    rng: fastrand::Rng,
}

impl<'a> EvolutionDriver<'a> {
    pub fn new(evaluator: &'a Evaluator, params: EvolutionParams) -> KvResult<Self> {
        params.validate()?;
        let rng = fastrand::Rng::with_seed(params.seed);
        Ok(Self {
            evaluator,
            params,
            rng,
        })
    }

    pub fn run(&mut self) -> KvResult<EvolutionOutcome> {
        let mut keep_going = |_: &GenerationSnapshot| true;
        self.run_with_callback(&mut keep_going)
    }

    pub fn run_with_callback<CB: ProgressCallback>(
        &mut self,
        callback: &mut CB,
    ) -> KvResult<EvolutionOutcome> {
        let size = self.params.population_size;
        let selector = Selector {
            method: self.params.selection,
            tournament_size: self.params.tournament_size,
            rank_exponent: self.params.rank_exponent,
        };
        info!(
            population = size,
            generations = self.params.generations,
            selection = %self.params.selection,
            crossover = %self.params.crossover,
            mutation = %self.params.mutation,
            seed = self.params.seed,
            "starting search"
        );

        let mut population: Vec<Layout> =
            (0..size).map(|_| Layout::random(&mut self.rng)).collect();
        let mut history = Vec::with_capacity(self.params.generations);

        for generation in 1..=self.params.generations {
            self.repair(&mut population);

            let mut scored = self.evaluate_all(&population);
            scored.sort_by(|a, b| a.1.total_cmp(&b.1));
            let (best_layout, best_effort) = (scored[0].0.clone(), scored[0].1);
            history.push(best_effort);
            debug!(generation, best_effort, "generation evaluated");

            let snapshot = GenerationSnapshot::new(generation, best_layout, best_effort);
            if !callback.on_generation(&snapshot) {
                break;
            }
            if generation == self.params.generations {
                break;
            }

            let mut next: Vec<Layout> = scored
                .iter()
                .take(self.params.elitism)
                .map(|(layout, _)| layout.clone())
                .collect();
            let parents = selector.select(&scored, self.params.num_parents, &mut self.rng)?;
            let offspring = crossover::apply(self.params.crossover, &parents, &mut self.rng);
            let mut offspring =
                mutation::apply(self.params.mutation, &offspring, self.params.mutation_rate, &mut self.rng);
            self.repair(&mut offspring);

            next.extend(offspring);
            next.truncate(size);
            while next.len() < size {
                next.push(Layout::random(&mut self.rng));
            }
            population = next;
        }

        self.repair(&mut population);
        let mut final_scored = self.evaluate_all(&population);
        final_scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (best_layout, best_effort) = final_scored.swap_remove(0);
        info!(
            generations_run = history.len(),
            best_effort,
            layout = %best_layout,
            "search finished"
        );
        Ok(EvolutionOutcome {
            best_layout,
            best_effort,
            generations_run: history.len(),
            effort_history: history,
            seed: self.params.seed,
        })
    }

    fn repair(&self, population: &mut [Layout]) {
        if let Some(mask) = &self.params.locks {
            for individual in population.iter_mut() {
                mask.repair(individual);
            }
        }
    }

    /// Scoring is the hot path and each evaluation is independent, so this
    /// is the one parallel section of the driver.
    fn evaluate_all(&self, population: &[Layout]) -> Vec<(Layout, f64)> {
        population
            .par_iter()
            .map(|layout| (layout.clone(), self.evaluator.evaluate(layout)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStats;

    fn evaluator() -> Evaluator {
        let stats = CorpusStats::analyze("THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG");
        Evaluator::new(&stats, Default::default()).unwrap()
    }

    #[test]
    fn invalid_params_are_rejected() {
        let ev = evaluator();
        let mut params = EvolutionParams {
            population_size: 0,
            ..Default::default()
        };
        assert!(EvolutionDriver::new(&ev, params.clone()).is_err());
        params.population_size = 10;
        params.mutation_rate = 150.0;
        assert!(EvolutionDriver::new(&ev, params.clone()).is_err());
        params.mutation_rate = 10.0;
        params.elitism = 11;
        assert!(EvolutionDriver::new(&ev, params).is_err());
    }

    #[test]
    fn history_has_one_entry_per_generation() {
        let ev = evaluator();
        let params = EvolutionParams {
            population_size: 10,
            generations: 5,
            elitism: 2,
            mutation_rate: 100.0,
            num_parents: 6,
            seed: 41,
            ..Default::default()
        };
        let outcome = EvolutionDriver::new(&ev, params).unwrap().run().unwrap();
        assert_eq!(outcome.effort_history.len(), 5);
        assert_eq!(outcome.generations_run, 5);
        assert!(outcome.best_effort <= outcome.effort_history[4]);
    }

    #[test]
    fn elitism_keeps_the_best_effort_from_rising() {
        let ev = evaluator();
        let params = EvolutionParams {
            population_size: 12,
            generations: 20,
            elitism: 2,
            seed: 42,
            ..Default::default()
        };
        let outcome = EvolutionDriver::new(&ev, params).unwrap().run().unwrap();
        for window in outcome.effort_history.windows(2) {
            assert!(window[1] <= window[0] + 1e-9);
        }
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let ev = evaluator();
        let params = EvolutionParams {
            population_size: 10,
            generations: 6,
            seed: 43,
            ..Default::default()
        };
        let a = EvolutionDriver::new(&ev, params.clone()).unwrap().run().unwrap();
        let b = EvolutionDriver::new(&ev, params).unwrap().run().unwrap();
        assert_eq!(a.best_layout, b.best_layout);
        assert_eq!(a.effort_history, b.effort_history);
    }

    #[test]
    fn locks_hold_through_a_whole_run() {
        let ev = evaluator();
        let mask = locks::LockMask::from_pairs(vec![(10, b'A'), (19, b';')]).unwrap();
        let params = EvolutionParams {
            population_size: 10,
            generations: 8,
            mutation_rate: 100.0,
            locks: Some(mask.clone()),
            seed: 44,
            ..Default::default()
        };
        let outcome = EvolutionDriver::new(&ev, params).unwrap().run().unwrap();
        assert!(mask.is_satisfied(&outcome.best_layout));
    }

    #[test]
    fn callback_returning_false_stops_after_that_generation() {
        let ev = evaluator();
        let params = EvolutionParams {
            population_size: 10,
            generations: 50,
            seed: 45,
            ..Default::default()
        };
        let mut seen = 0usize;
        let mut stop_after_three = |_: &GenerationSnapshot| {
            seen += 1;
            seen < 3
        };
        let outcome = EvolutionDriver::new(&ev, params)
            .unwrap()
            .run_with_callback(&mut stop_after_three)
            .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(outcome.generations_run, 3);
    }
}
