// Composition tests: load real files, run the experiment, write the table.
//
// These chain config -> corpus loading -> experiment -> TSV and summary
// output through temporary directories, the same way `genredist run` does.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use indicatif::ProgressBar;

use genredist::config::Config;
use genredist::corpus::Corpus;
use genredist::output::summary::{self, InputPaths, RunSummary};
use genredist::output::tsv;
use genredist::pipeline::experiment::{self, ExperimentSettings};
use genredist::sampling::sampler::SamplerSettings;

const VECTORS: &str = "\
docid\tf1\tf2
A\t1\t0
B\t1\t0
C\t0\t1
E\t0\t1
D\t0\t1
uc1.b7\t0\t1
gone\t1\t1
bad\t1\t1
";

const REMOVALS: &str = "\
docid\tremove
A\tn
gone\ty
";

const METADATA: &str = "\
docid\tremove\texp_genres\tdate\tauthor
A\tn\tfiction\t1900\tX
B\tn\tfiction\t1905\tY
C\tn\trandom\t1905\tZ
E\tn\trandom\t1900\tW
D\tn\tpoetry\t1905\tV
uc1.$b7\tn\tpoetry\t1900\tU
gone\tn\tfiction\t1901\tQ
bad\tno\tfiction\t1902\tR
";

/// The only row a successful trial focused on A can produce.
const ROW_FOR_A: &str = "fiction\tA\tB\t1.0\t1.0\tD\tuc1.b7\t1900.0\t1905.0\t5.0\t1902.5\t0.0\t1.0\t1.0\t1.0\t1.0\tC\tE";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::write(root.join("vectors.tsv"), VECTORS).unwrap();
        fs::write(root.join("remove.tsv"), REMOVALS).unwrap();
        fs::write(root.join("meta.tsv"), METADATA).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn config(&self) -> Config {
        let root = self.root.display().to_string();
        Config::from_lookup(|key| match key {
            "GENREDIST_VECTORS" => Some(format!("{root}/vectors.tsv")),
            "GENREDIST_REMOVALS" => Some(format!("{root}/remove.tsv")),
            "GENREDIST_METADATA" => Some(format!("{root}/meta.tsv")),
            "GENREDIST_OUTPUT" => Some(format!("{root}/out/results.tsv")),
            "GENREDIST_TRIALS" => Some("200".to_string()),
            "GENREDIST_SEED" => Some("11".to_string()),
            "GENREDIST_WORKERS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap()
    }
}

fn load(config: &Config) -> Arc<Corpus> {
    Arc::new(
        Corpus::load(
            &config.vectors_path,
            &config.removals_path,
            &config.metadata_path,
        )
        .unwrap(),
    )
}

fn settings(config: &Config) -> ExperimentSettings {
    ExperimentSettings {
        trials: config.trials,
        seed: config.seed.unwrap(),
        workers: config.workers,
        sampler: SamplerSettings::default(),
    }
}

async fn run_to(corpus: Arc<Corpus>, settings: &ExperimentSettings, output: &Path) -> String {
    let outcome = experiment::run(corpus, settings, ProgressBar::hidden())
        .await
        .unwrap();
    tsv::write_file(output, &outcome.results).unwrap();
    fs::read_to_string(output).unwrap()
}

// ============================================================
// Loading
// ============================================================

#[test]
fn config_points_at_fixture_and_validates() {
    let fx = Fixture::new();
    let config = fx.config();
    assert_eq!(config.vectors_path, fx.path("vectors.tsv"));
    assert_eq!(config.trials, 200);
    assert_eq!(config.seed, Some(11));
    config.validate().unwrap();
}

#[test]
fn loading_applies_removals_and_normalizes_docids() {
    let fx = Fixture::new();
    let corpus = load(&fx.config());

    let report = &corpus.report;
    assert_eq!(report.rows_read, 8);
    assert_eq!(report.rows_accepted, 6);
    assert_eq!(report.removed, 1);
    assert_eq!(report.invalid_remove_code, 1);
    assert_eq!(report.malformed(), 1);

    let fiction = corpus.genres.bucket("fiction").unwrap();
    assert_eq!(fiction.len(), 2);
    assert!(!fiction.contains("gone"));
    assert!(!fiction.contains("bad"));

    assert!(corpus.genres.bucket("poetry").unwrap().contains("uc1.b7"));
    assert_eq!(corpus.genres.bucket("allnonrandom").unwrap().len(), 4);
    assert_eq!(corpus.genres.bucket("random").unwrap().len(), 2);
}

// ============================================================
// Full run
// ============================================================

#[tokio::test]
async fn run_writes_expected_table() {
    let fx = Fixture::new();
    let config = fx.config();
    let corpus = load(&config);

    let text = run_to(corpus, &settings(&config), &config.output_path).await;
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), tsv::HEADER.join("\t"));

    let rows: Vec<&str> = lines.collect();
    assert!(!rows.is_empty());
    assert!(rows.contains(&ROW_FOR_A));
    for row in &rows {
        let cells: Vec<&str> = row.split('\t').collect();
        assert_eq!(cells.len(), 18);
        // Poetry trials always compare identical control vectors and skip.
        assert_eq!(cells[0], "fiction");
        assert_eq!(cells[9], "5.0");
        assert_eq!(cells[14], "1.0");
        assert_eq!(cells[15], "1.0");
    }
}

#[tokio::test]
async fn same_seed_and_workers_reproduce_the_table() {
    let fx = Fixture::new();
    let config = fx.config();
    let corpus = load(&config);
    let settings = settings(&config);

    let first = run_to(Arc::clone(&corpus), &settings, &fx.path("first.tsv")).await;
    let second = run_to(corpus, &settings, &fx.path("second.tsv")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn every_trial_is_accounted_for() {
    let fx = Fixture::new();
    let config = fx.config();
    let corpus = load(&config);
    let settings = settings(&config);

    let outcome = experiment::run(Arc::clone(&corpus), &settings, ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(outcome.trials, 200);
    assert_eq!(outcome.results.len() + outcome.failures(), 200);
    assert!(outcome.failures() > 0);
}

#[tokio::test]
async fn summary_records_seed_and_counts() {
    let fx = Fixture::new();
    let config = fx.config();
    let corpus = load(&config);
    let settings = settings(&config);

    let started_at = Utc::now();
    let outcome = experiment::run(Arc::clone(&corpus), &settings, ProgressBar::hidden())
        .await
        .unwrap();
    tsv::write_file(&config.output_path, &outcome.results).unwrap();

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
    let path = summary::summary_path(&config.output_path);
    run_summary.write(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["seed"], 11);
    assert_eq!(json["workers"], 2);
    assert_eq!(json["trials"], 200);
    assert_eq!(
        json["successes"].as_u64().unwrap() + json["failures"].as_u64().unwrap(),
        200
    );
    assert_eq!(json["load"]["removed"], 1);
    assert!(json["skips"].is_object());
    assert!(path.to_string_lossy().ends_with("results.tsv.summary.json"));
}

#[tokio::test]
async fn random_only_metadata_still_writes_a_table() {
    let fx = Fixture::new();
    fs::write(
        fx.path("meta.tsv"),
        "docid\tremove\texp_genres\tdate\tauthor\nC\tn\trandom\t1905\tZ\n",
    )
    .unwrap();
    let config = fx.config();
    let corpus = load(&config);

    let outcome = experiment::run(Arc::clone(&corpus), &settings(&config), ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(outcome.failures(), 200);

    tsv::write_file(&config.output_path, &outcome.results).unwrap();
    let text = fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(text, format!("{}\n", tsv::HEADER.join("\t")));
}
