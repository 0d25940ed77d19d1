// Experiment driver: run the configured number of trials and collect
// every successful result.
//
// Trials only read the shared corpus, so the run can be split into
// independent batches. Each batch owns its own seeded RNG and runs on a
// blocking thread; batches are merged in worker order, so a given
// (seed, workers) pair always reproduces the same results.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::corpus::Corpus;
use crate::sampling::sampler::{Sampler, SamplerSettings};
use crate::sampling::trial::{SkipTally, TrialOutcome, TrialResult};

/// Odd 64-bit constant used to spread worker seeds apart.
const WORKER_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperimentSettings {
    pub trials: usize,
    pub seed: u64,
    pub workers: usize,
    pub sampler: SamplerSettings,
}

/// Everything a run produced. Result order carries no meaning.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExperimentOutcome {
    pub trials: usize,
    pub results: Vec<TrialResult>,
    pub skips: SkipTally,
}

impl ExperimentOutcome {
    /// Number of skipped trials.
    pub fn failures(&self) -> usize {
        self.skips.total()
    }

    /// Successful trials per genre label.
    pub fn genre_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.genre.clone()).or_insert(0) += 1;
        }
        counts
    }

    fn absorb(&mut self, batch: ExperimentOutcome) {
        self.trials += batch.trials;
        self.results.extend(batch.results);
        self.skips.merge(&batch.skips);
    }
}

/// Seed for one worker's RNG. Worker 0 uses the run seed unchanged.
pub fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64).wrapping_mul(WORKER_SEED_STRIDE)
}

/// Split `trials` across `workers`, giving the remainder to the first ones.
pub fn split_trials(trials: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = trials / workers;
    let extra = trials % workers;
    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}

/// Progress bar for `trials` trials.
pub fn progress_bar(trials: usize) -> ProgressBar {
    let pb = ProgressBar::new(trials as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Trials [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Run `trials` trials sequentially on the current thread.
///
/// Skips are tallied and never stop the batch; a data-integrity error
/// aborts it.
pub fn run_batch<R: Rng + ?Sized>(
    corpus: &Corpus,
    settings: SamplerSettings,
    trials: usize,
    rng: &mut R,
    progress: &ProgressBar,
) -> crate::error::Result<ExperimentOutcome> {
    let sampler = Sampler::new(corpus, settings);
    let mut outcome = ExperimentOutcome {
        trials,
        ..ExperimentOutcome::default()
    };

    for _ in 0..trials {
        match sampler.run_trial(rng)? {
            TrialOutcome::Success(result) => outcome.results.push(*result),
            TrialOutcome::Skipped(reason) => outcome.skips.record(reason),
        }
        progress.inc(1);
    }

    Ok(outcome)
}

/// Run the whole experiment across `settings.workers` blocking tasks.
pub async fn run(
    corpus: Arc<Corpus>,
    settings: &ExperimentSettings,
    progress: ProgressBar,
) -> Result<ExperimentOutcome> {
    let batches = split_trials(settings.trials, settings.workers);
    info!(
        trials = settings.trials,
        workers = batches.len(),
        seed = settings.seed,
        "Starting experiment"
    );

    let handles = batches.into_iter().enumerate().map(|(worker, trials)| {
        let corpus = Arc::clone(&corpus);
        let progress = progress.clone();
        let sampler = settings.sampler;
        let seed = worker_seed(settings.seed, worker);
        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            run_batch(&corpus, sampler, trials, &mut rng, &progress)
        })
    });

    let batches = futures::future::try_join_all(handles)
        .await
        .context("Trial worker panicked")?;

    let mut outcome = ExperimentOutcome::default();
    for batch in batches {
        outcome.absorb(batch.context("Trial aborted on a data-integrity error")?);
    }
    progress.finish_and_clear();

    info!(
        trials = outcome.trials,
        successes = outcome.results.len(),
        failures = outcome.failures(),
        "Experiment complete"
    );
    Ok(outcome)
}
