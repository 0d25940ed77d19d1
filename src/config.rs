use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Every field has a
/// default matching the experiment's usual working directory; CLI flags
/// override individual fields after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub vectors_path: PathBuf,
    pub removals_path: PathBuf,
    pub metadata_path: PathBuf,
    pub output_path: PathBuf,
    pub trials: usize,
    /// Fixed RNG seed. When unset, the run draws one and records it.
    pub seed: Option<u64>,
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vectors_path: PathBuf::from("delta_matrix_loc2.tsv"),
            removals_path: PathBuf::from("taggedparts/all2remove.tsv"),
            metadata_path: PathBuf::from("filtered_meta_4loc2.tsv"),
            output_path: PathBuf::from("annotated_loc2_delta_results3.tsv"),
            trials: 40_000,
            seed: None,
            workers: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (the environment, in `load`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Ok(Self {
            vectors_path: path("GENREDIST_VECTORS", defaults.vectors_path),
            removals_path: path("GENREDIST_REMOVALS", defaults.removals_path),
            metadata_path: path("GENREDIST_METADATA", defaults.metadata_path),
            output_path: path("GENREDIST_OUTPUT", defaults.output_path),
            trials: parse_var(&lookup, "GENREDIST_TRIALS")?.unwrap_or(defaults.trials),
            seed: parse_var(&lookup, "GENREDIST_SEED")?,
            workers: parse_var(&lookup, "GENREDIST_WORKERS")?.unwrap_or(defaults.workers),
        })
    }

    /// Check that the inputs exist and the run sizes make sense.
    /// Call this before loading the corpus.
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            anyhow::bail!("Trial count must be at least 1 (GENREDIST_TRIALS or --trials).");
        }
        if self.workers == 0 {
            anyhow::bail!("Worker count must be at least 1 (GENREDIST_WORKERS or --workers).");
        }
        self.validate_inputs()
    }

    /// Check only that the three input files exist.
    pub fn validate_inputs(&self) -> Result<()> {
        for (what, path) in [
            ("Vector file", &self.vectors_path),
            ("Removal list", &self.removals_path),
            ("Metadata file", &self.metadata_path),
        ] {
            if !path.is_file() {
                anyhow::bail!(
                    "{what} not found: {}\n\
                     Set the path with a CLI flag or in your .env file.",
                    path.display()
                );
            }
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} has invalid value {raw:?}")),
        _ => Ok(None),
    }
}
