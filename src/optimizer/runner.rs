use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tracing::debug;

use crate::error::KvResult;
use crate::layout::Layout;
use crate::optimizer::{EvolutionDriver, EvolutionOutcome, EvolutionParams};
use crate::scorer::Evaluator;

/// Per-generation progress report emitted by the driver.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSnapshot {
    pub generation: usize,
    pub best_effort: f64,
    pub best_layout: Layout,
    pub status: String,
}

impl GenerationSnapshot {
    pub fn new(generation: usize, best_layout: Layout, best_effort: f64) -> Self {
        let status = format!("Generation {generation}: best effort {best_effort:.4}");
        Self {
            generation,
            best_effort,
            best_layout,
            status,
        }
    }
}

/// Invoked once per generation, after evaluation and before breeding.
/// Returning `false` asks the driver to stop after the current generation;
/// the driver then finalizes the population it already has.
pub trait ProgressCallback {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot) -> bool;
}

impl<F> ProgressCallback for F
where
    F: FnMut(&GenerationSnapshot) -> bool,
{
    fn on_generation(&mut self, snapshot: &GenerationSnapshot) -> bool {
        self(snapshot)
    }
}

/// Handle to a search running on a worker thread.
pub struct SearchHandle {
    pub snapshots: Receiver<GenerationSnapshot>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<KvResult<EvolutionOutcome>>,
}

impl SearchHandle {
    /// Requests a cooperative stop. The driver notices at the next
    /// generation boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Blocks until the worker finishes and returns its outcome.
    pub fn join(self) -> KvResult<EvolutionOutcome> {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(crate::error::KeyvolveError::InvalidState(
                "search worker panicked".into(),
            )),
        }
    }
}

/// Runs a search on a dedicated thread. Snapshots arrive on the returned
/// channel as generations complete; dropping the receiver does not stop
/// the search, only `cancel` does.
pub fn spawn(evaluator: Arc<Evaluator>, params: EvolutionParams) -> SearchHandle {
    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    let worker = thread::spawn(move || {
        let mut driver = EvolutionDriver::new(&evaluator, params)?;
        let mut callback = |snapshot: &GenerationSnapshot| {
            let _ = tx.send(snapshot.clone());
            if cancel_flag.load(Ordering::Relaxed) {
                debug!(generation = snapshot.generation, "cancellation requested");
                false
            } else {
                true
            }
        };
        driver.run_with_callback(&mut callback)
    });
    SearchHandle {
        snapshots: rx,
        cancel,
        worker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusStats;

    fn evaluator() -> Arc<Evaluator> {
        let stats = CorpusStats::analyze("the quick brown fox jumps over the lazy dog");
        Arc::new(Evaluator::new(&stats, Default::default()).unwrap())
    }

    #[test]
    fn spawned_search_streams_snapshots_and_finishes() {
        let params = EvolutionParams {
            population_size: 10,
            generations: 4,
            seed: 31,
            ..Default::default()
        };
        let handle = spawn(evaluator(), params);
        let snapshots: Vec<GenerationSnapshot> = handle.snapshots.iter().collect();
        let outcome = handle.join().unwrap();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(outcome.effort_history.len(), 4);
        assert!(snapshots[0].status.starts_with("Generation 1"));
    }

    #[test]
    fn cancel_stops_the_search_early() {
        let params = EvolutionParams {
            population_size: 10,
            generations: 10_000,
            seed: 32,
            ..Default::default()
        };
        let handle = spawn(evaluator(), params);
        let first = handle.snapshots.recv().unwrap();
        assert_eq!(first.generation, 1);
        handle.cancel();
        let outcome = handle.join().unwrap();
        assert!(outcome.generations_run < 10_000);
        assert!(outcome.best_effort.is_finite());
    }
}
