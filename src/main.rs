use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use genredist::config::Config;
use genredist::corpus::Corpus;
use genredist::output::summary::{self, InputPaths, RunSummary};
use genredist::output::{terminal, tsv};
use genredist::pipeline::experiment::{self, ExperimentSettings};
use genredist::sampling::sampler::SamplerSettings;

/// Genredist: are same-genre documents lexically closer than controls?
///
/// Repeatedly pairs a document with a genre mate of similar date and
/// compares their distance with date-matched random and other-genre
/// controls.
#[derive(Parser)]
#[command(name = "genredist", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input file overrides shared by every subcommand.
#[derive(Args)]
struct InputArgs {
    /// Vector file (docid followed by feature values)
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Removal list (docid, remove)
    #[arg(long)]
    removals: Option<PathBuf>,

    /// Genre assignment metadata
    #[arg(long)]
    metadata: Option<PathBuf>,
}

impl InputArgs {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.vectors {
            config.vectors_path = path;
        }
        if let Some(path) = self.removals {
            config.removals_path = path;
        }
        if let Some(path) = self.metadata {
            config.metadata_path = path;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sampling experiment and write the result table
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Result table path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Number of trials (default: 40000)
        #[arg(long)]
        trials: Option<usize>,

        /// RNG seed; omit to draw one (it is printed and recorded)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of parallel trial workers (default: 1)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Load the corpus and show what was kept, skipped, and indexed
    Status {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("genredist=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            inputs,
            output,
            trials,
            seed,
            workers,
        } => {
            let mut config = Config::load()?;
            inputs.apply(&mut config);
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(n) = trials {
                config.trials = n;
            }
            if let Some(n) = workers {
                config.workers = n;
            }
            config.seed = seed.or(config.seed);
            config.validate()?;

            let seed = config.seed.unwrap_or_else(rand::random);
            if config.seed.is_none() {
                info!(seed, "No seed configured, drew one");
            }

            println!("Loading corpus...");
            let corpus = Arc::new(Corpus::load(
                &config.vectors_path,
                &config.removals_path,
                &config.metadata_path,
            )?);
            terminal::display_load_report(&corpus.report);

            let settings = ExperimentSettings {
                trials: config.trials,
                seed,
                workers: config.workers,
                sampler: SamplerSettings::default(),
            };

            println!(
                "Running {} trials (seed {seed}, {} workers)...",
                settings.trials, settings.workers
            );
            let started_at = Utc::now();
            let outcome = experiment::run(
                Arc::clone(&corpus),
                &settings,
                experiment::progress_bar(settings.trials),
            )
            .await?;

            tsv::write_file(&config.output_path, &outcome.results)?;

            let run_summary = RunSummary::new(
                &settings,
                &outcome,
                &corpus.report,
                InputPaths {
                    vectors: config.vectors_path.clone(),
                    removals: config.removals_path.clone(),
                    metadata: config.metadata_path.clone(),
                },
                &config.output_path,
                started_at,
            );
            let summary_path = summary::summary_path(&config.output_path);
            run_summary.write(&summary_path)?;

            terminal::display_run_summary(&run_summary);
            println!(
                "{}",
                format!("Run summary saved to: {}", summary_path.display()).dimmed()
            );
        }

        Commands::Status { inputs } => {
            let mut config = Config::load()?;
            inputs.apply(&mut config);
            config.validate_inputs()?;

            let corpus = Corpus::load(
                &config.vectors_path,
                &config.removals_path,
                &config.metadata_path,
            )?;
            terminal::display_corpus(&corpus);
        }
    }

    Ok(())
}
