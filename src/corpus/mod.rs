// Corpus loading: vectors, removal list, and genre assignments.
//
// Loading is the only phase that touches the input files. The resulting
// `Corpus` is immutable and shared read-only by every trial.

pub mod metadata;
pub mod removals;
pub mod table;
pub mod vectors;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::index::assignments::AssignmentIndex;
use crate::index::builder::IndexBuilder;
use crate::index::genre::{GenreIndex, ALL_NON_RANDOM};
use metadata::{MetadataColumns, RowRejection};
use table::TsvTable;
use vectors::VectorStore;

/// Row counts from the metadata pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_accepted: usize,
    pub removed: usize,
    pub invalid_remove_code: usize,
    pub short_rows: usize,
    pub invalid_dates: usize,
    pub no_genres: usize,
    pub unresolved_docids: usize,
    pub duplicate_assignments: usize,
}

impl LoadReport {
    fn record(&mut self, rejection: &RowRejection) {
        let counter = match rejection {
            RowRejection::InvalidRemoveCode(_) => &mut self.invalid_remove_code,
            RowRejection::Removed => &mut self.removed,
            RowRejection::ShortRow => &mut self.short_rows,
            RowRejection::InvalidDate(_) => &mut self.invalid_dates,
            RowRejection::NoGenres => &mut self.no_genres,
            RowRejection::UnresolvedDocid => &mut self.unresolved_docids,
        };
        *counter += 1;
    }

    /// Rows skipped with a warning (removal-list hits excluded).
    pub fn malformed(&self) -> usize {
        self.invalid_remove_code
            + self.short_rows
            + self.invalid_dates
            + self.no_genres
            + self.unresolved_docids
    }
}

/// Everything a trial reads.
#[derive(Debug)]
pub struct Corpus {
    pub vectors: VectorStore,
    pub genres: GenreIndex,
    pub assignments: AssignmentIndex,
    pub report: LoadReport,
}

impl Corpus {
    /// Load all three inputs.
    pub fn load(vectors_path: &Path, removals_path: &Path, metadata_path: &Path) -> Result<Self> {
        let vectors = VectorStore::load(vectors_path)?;
        let removed = removals::load(removals_path)?;

        let table = TsvTable::open(metadata_path)?;
        let (genres, assignments, report) = read_assignments(table, &removed, &vectors)
            .with_context(|| format!("Failed to read metadata {}", metadata_path.display()))?;

        info!(
            rows = report.rows_read,
            accepted = report.rows_accepted,
            removed = report.removed,
            malformed = report.malformed(),
            genres = genres.genres().len(),
            "Loaded genre assignments"
        );
        if genres.bucket(ALL_NON_RANDOM).map_or(true, |b| b.is_empty()) {
            warn!("No document carries a non-random genre; every trial will be skipped");
        }

        Ok(Self {
            vectors,
            genres,
            assignments,
            report,
        })
    }

    /// Assemble a corpus from already-built parts.
    pub fn from_parts(vectors: VectorStore, builder: IndexBuilder) -> Self {
        let report = LoadReport {
            duplicate_assignments: builder.duplicates(),
            ..LoadReport::default()
        };
        let (genres, assignments) = builder.finish();
        Self {
            vectors,
            genres,
            assignments,
            report,
        }
    }
}

/// Stream metadata rows into the genre and assignment indexes.
pub fn read_assignments<R: Read>(
    table: TsvTable<R>,
    removed: &HashSet<String>,
    vectors: &VectorStore,
) -> Result<(GenreIndex, AssignmentIndex, LoadReport)> {
    let columns = MetadataColumns::from_table(&table)?;
    let mut builder = IndexBuilder::new();
    let mut report = LoadReport::default();

    for row in table {
        let row = row?;
        report.rows_read += 1;

        match metadata::parse_row(&row, &columns, removed, vectors) {
            Ok(assignment) => {
                builder.add_row(&assignment);
                report.rows_accepted += 1;
            }
            Err(rejection) => {
                if rejection.is_malformed() {
                    warn!(
                        line = row.line,
                        docid = row.get(columns.docid).unwrap_or(""),
                        reason = %rejection,
                        "Skipping metadata row"
                    );
                }
                report.record(&rejection);
            }
        }
    }

    report.duplicate_assignments = builder.duplicates();
    let (genres, assignments) = builder.finish();
    Ok((genres, assignments, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "docid\tremove\texp_genres\tdate\tauthor\n";

    fn vectors() -> VectorStore {
        VectorStore::from_vectors([
            ("a", vec![1.0, 0.0]),
            ("b", vec![0.0, 1.0]),
            ("uc1.b9", vec![1.0, 1.0]),
        ])
        .unwrap()
    }

    fn read(body: &str, removed: &[&str]) -> (GenreIndex, AssignmentIndex, LoadReport) {
        let text = format!("{HEADER}{body}");
        let table = TsvTable::from_reader(text.as_bytes(), Path::new("meta.tsv")).unwrap();
        let removed: HashSet<String> = removed.iter().map(|s| s.to_string()).collect();
        read_assignments(table, &removed, &vectors()).unwrap()
    }

    #[test]
    fn test_report_counts_each_rejection() {
        let (genres, _, report) = read(
            "a\tn\tfiction\t1900\tX\n\
             b\tno\tfiction\t1900\tY\n\
             b\tn\tfiction\t1900\tY\n\
             zzz\tn\tfiction\t1900\tQ\n\
             uc1.$b9\tn\tpoetry\tundated\tW\n",
            &["b"],
        );
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_accepted, 1);
        assert_eq!(report.invalid_remove_code, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(report.unresolved_docids, 1);
        assert_eq!(report.invalid_dates, 1);
        assert_eq!(report.malformed(), 3);
        assert_eq!(genres.bucket("fiction").unwrap().len(), 1);
    }

    #[test]
    fn test_normalized_docid_is_indexed() {
        let (genres, assignments, _) = read("uc1.$b9\tn\tpoetry\t1900\tW\n", &[]);
        assert!(genres.bucket("poetry").unwrap().contains("uc1.b9"));
        assert_eq!(assignments.genres_of("uc1.b9"), &["poetry"]);
        assert!(genres.bucket(ALL_NON_RANDOM).unwrap().contains("uc1.b9"));
    }

    #[test]
    fn test_quoted_author_keeps_its_comma() {
        let (genres, _, report) = read("a\tn\tfiction\t1900\t\"Smith, Jo\"\n", &[]);
        assert_eq!(report.rows_accepted, 1);
        assert_eq!(genres.entry("fiction", "a").unwrap().author, "Smith, Jo");
    }

    #[test]
    fn test_missing_required_column() {
        let table =
            TsvTable::from_reader("docid\tremove\tdate\n".as_bytes(), Path::new("m.tsv")).unwrap();
        let err = read_assignments(table, &HashSet::new(), &vectors()).unwrap_err();
        assert!(err.to_string().contains("exp_genres"));
    }
}
