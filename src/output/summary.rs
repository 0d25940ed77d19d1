// JSON record of a run: enough to replay it and to judge sampling
// efficiency without re-reading the result table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::corpus::LoadReport;
use crate::pipeline::experiment::{ExperimentOutcome, ExperimentSettings};
use crate::sampling::trial::SkipTally;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub workers: usize,
    pub trials: usize,
    pub successes: usize,
    pub failures: usize,
    pub skips: SkipTally,
    pub genre_counts: BTreeMap<String, usize>,
    pub genre_window: f64,
    pub control_attempts: usize,
    pub load: LoadReport,
    pub inputs: InputPaths,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputPaths {
    pub vectors: PathBuf,
    pub removals: PathBuf,
    pub metadata: PathBuf,
}

impl RunSummary {
    pub fn new(
        settings: &ExperimentSettings,
        outcome: &ExperimentOutcome,
        load: &LoadReport,
        inputs: InputPaths,
        output: &Path,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seed: settings.seed,
            workers: settings.workers,
            trials: outcome.trials,
            successes: outcome.results.len(),
            failures: outcome.failures(),
            skips: outcome.skips.clone(),
            genre_counts: outcome.genre_counts(),
            genre_window: settings.sampler.genre_window,
            control_attempts: settings.sampler.control_attempts,
            load: load.clone(),
            inputs,
            output: output.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Fraction of trials that produced a result (0.0 for an empty run).
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run summary {}", path.display()))
    }
}

/// `results.tsv` -> `results.tsv.summary.json`.
pub fn summary_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".summary.json");
    PathBuf::from(name)
}
