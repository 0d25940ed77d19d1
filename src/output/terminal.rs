// Colored terminal reports for `status` and `run`.

use colored::Colorize;

use super::summary::RunSummary;
use crate::corpus::{Corpus, LoadReport};
use crate::index::genre::{is_pseudo_genre, GenreIndex};
use crate::sampling::trial::SkipReason;

/// Display what the load phase kept and skipped.
pub fn display_corpus(corpus: &Corpus) {
    println!("\n{}", "=== Corpus ===".bold());
    println!(
        "  Vectors: {} documents, {} dimensions",
        corpus.vectors.len(),
        corpus.vectors.dimension()
    );
    display_load_report(&corpus.report);
    display_genre_buckets(&corpus.genres);
}

pub fn display_load_report(report: &LoadReport) {
    println!(
        "  Metadata rows: {} read, {} accepted, {} on removal list",
        report.rows_read, report.rows_accepted, report.removed
    );

    let malformed = [
        ("invalid remove code", report.invalid_remove_code),
        ("short row", report.short_rows),
        ("invalid date", report.invalid_dates),
        ("no genres", report.no_genres),
        ("docid without vector", report.unresolved_docids),
    ];
    if report.malformed() > 0 {
        println!(
            "  {} {} malformed rows skipped:",
            "Warning:".yellow(),
            report.malformed()
        );
        for (label, count) in malformed.iter().filter(|(_, n)| *n > 0) {
            println!("    {label:<24} {count:>8}");
        }
    }
    if report.duplicate_assignments > 0 {
        println!(
            "  {}",
            format!(
                "{} duplicate (docid, genre) rows ignored",
                report.duplicate_assignments
            )
            .dimmed()
        );
    }
}

/// Bucket sizes, pseudo-genres first, then by size.
pub fn display_genre_buckets(genres: &GenreIndex) {
    let mut rows: Vec<(&str, usize)> = genres
        .genres()
        .iter()
        .map(|g| (g.as_str(), genres.bucket(g).map_or(0, |b| b.len())))
        .collect();
    rows.sort_by(|a, b| {
        is_pseudo_genre(b.0)
            .cmp(&is_pseudo_genre(a.0))
            .then(b.1.cmp(&a.1))
            .then(a.0.cmp(b.0))
    });

    println!("\n  {:<32} {:>8}", "Genre".dimmed(), "Docs".dimmed());
    println!("  {}", "-".repeat(41).dimmed());
    for (genre, size) in rows {
        let label = if is_pseudo_genre(genre) {
            genre.cyan().to_string()
        } else {
            genre.to_string()
        };
        println!("  {label:<32} {size:>8}");
    }
}

/// Display the totals of a finished run.
pub fn display_run_summary(summary: &RunSummary) {
    println!("\n{}", "=== Experiment ===".bold());
    println!("  Seed: {}  Workers: {}", summary.seed, summary.workers);
    println!(
        "  Trials: {}  Successes: {}  Failures: {}",
        summary.trials,
        summary.successes.to_string().green(),
        colorize_failures(summary)
    );

    for reason in SkipReason::ALL {
        let n = summary.skips.count(reason);
        if n > 0 {
            println!("    {:<24} {:>8}", reason.as_str(), n);
        }
    }

    if !summary.genre_counts.is_empty() {
        println!("\n  {:<32} {:>8}", "Genre".dimmed(), "Trials".dimmed());
        println!("  {}", "-".repeat(41).dimmed());
        for (genre, n) in &summary.genre_counts {
            println!("  {genre:<32} {n:>8}");
        }
    }

    println!(
        "\n{}",
        format!("Results written to: {}", summary.output.display()).bold()
    );
}

fn colorize_failures(summary: &RunSummary) -> String {
    let text = summary.failures.to_string();
    match summary.success_rate() {
        r if r >= 0.5 => text.normal().to_string(),
        r if r > 0.0 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}
