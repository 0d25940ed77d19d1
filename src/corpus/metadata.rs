// Assignment rows from the metadata file.
//
// Each row assigns one docid to one or more genres (`exp_genres`, pipe
// separated) along with the date and author recorded for that row. A
// docid may appear on several rows.

use std::collections::HashSet;

use thiserror::Error;

use super::table::{TsvRow, TsvTable};
use super::vectors::VectorStore;
use crate::error::CorpusError;

/// Known inconsistency between metadata and vector docids.
const SUFFIX_VARIANT: &str = ".$b";
const SUFFIX_CANONICAL: &str = ".b";

/// A validated assignment row whose docid has a vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRow {
    pub docid: String,
    pub genres: Vec<String>,
    pub date: f64,
    pub author: String,
}

/// Why a metadata row did not become an assignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowRejection {
    #[error("remove code {0:?} is longer than one character")]
    InvalidRemoveCode(String),

    #[error("docid is on the removal list")]
    Removed,

    #[error("row has fewer fields than the header")]
    ShortRow,

    #[error("date {0:?} is not a number")]
    InvalidDate(String),

    #[error("no genre labels")]
    NoGenres,

    #[error("docid has no vector, even after suffix normalization")]
    UnresolvedDocid,
}

impl RowRejection {
    /// Removal-list hits are expected exclusions; everything else is a
    /// malformed row worth a warning.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, RowRejection::Removed)
    }
}

/// Column positions of the fields an assignment row needs.
#[derive(Debug, Clone, Copy)]
pub struct MetadataColumns {
    pub docid: usize,
    pub remove: usize,
    pub genres: usize,
    pub date: usize,
    pub author: usize,
}

impl MetadataColumns {
    pub fn from_table<R>(table: &TsvTable<R>) -> Result<Self, CorpusError>
    where
        R: std::io::Read,
    {
        Ok(Self {
            docid: table.column("docid")?,
            remove: table.column("remove")?,
            genres: table.column("exp_genres")?,
            date: table.column("date")?,
            author: table.column("author")?,
        })
    }
}

/// Map a metadata docid onto the vector store's spelling of it.
///
/// Tries the docid as given, then with `.$b` rewritten to `.b`.
pub fn resolve_docid(docid: &str, vectors: &VectorStore) -> Option<String> {
    if vectors.contains(docid) {
        return Some(docid.to_string());
    }
    let normalized = docid.replace(SUFFIX_VARIANT, SUFFIX_CANONICAL);
    vectors.contains(&normalized).then_some(normalized)
}

/// Split `exp_genres` into labels, dropping empty pieces.
pub fn split_genres(field: &str) -> Vec<String> {
    field
        .split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate one metadata row.
///
/// Checks run in a fixed order: the one-character `remove` code, the
/// removal list (on the raw docid), vector resolution, then genres and date.
pub fn parse_row(
    row: &TsvRow,
    columns: &MetadataColumns,
    removed: &HashSet<String>,
    vectors: &VectorStore,
) -> Result<AssignmentRow, RowRejection> {
    let field = |index: usize| row.get(index).ok_or(RowRejection::ShortRow);

    let remove = field(columns.remove)?;
    if remove.chars().count() > 1 {
        return Err(RowRejection::InvalidRemoveCode(remove.to_string()));
    }

    let raw_docid = field(columns.docid)?;
    if removed.contains(raw_docid) {
        return Err(RowRejection::Removed);
    }

    let docid = resolve_docid(raw_docid, vectors).ok_or(RowRejection::UnresolvedDocid)?;

    let genres = split_genres(field(columns.genres)?);
    if genres.is_empty() {
        return Err(RowRejection::NoGenres);
    }

    let raw_date = field(columns.date)?;
    let date = raw_date
        .trim()
        .parse::<f64>()
        .map_err(|_| RowRejection::InvalidDate(raw_date.to_string()))?;

    Ok(AssignmentRow {
        docid,
        genres,
        date,
        author: field(columns.author)?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: MetadataColumns = MetadataColumns {
        docid: 0,
        remove: 1,
        genres: 2,
        date: 3,
        author: 4,
    };

    fn row(fields: &[&str]) -> TsvRow {
        TsvRow {
            line: 2,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn vectors() -> VectorStore {
        VectorStore::from_vectors([
            ("mdp.001", vec![1.0, 0.0]),
            ("uc1.b123", vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_row() {
        let parsed = parse_row(
            &row(&["mdp.001", "n", "fiction|poetry", "1905", "Smith, Jo"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap();
        assert_eq!(parsed.docid, "mdp.001");
        assert_eq!(parsed.genres, vec!["fiction", "poetry"]);
        assert_eq!(parsed.date, 1905.0);
        assert_eq!(parsed.author, "Smith, Jo");
    }

    #[test]
    fn test_fractional_date() {
        let parsed = parse_row(
            &row(&["mdp.001", "", "random", "1905.5", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap();
        assert_eq!(parsed.date, 1905.5);
    }

    #[test]
    fn test_long_remove_code_is_rejected() {
        let err = parse_row(
            &row(&["mdp.001", "yes", "fiction", "1905", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::InvalidRemoveCode("yes".to_string()));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_single_char_non_n_code_is_not_rejected_here() {
        // Single-character codes are the removal list's business.
        let parsed = parse_row(
            &row(&["mdp.001", "y", "fiction", "1905", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        );
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_removal_list_checks_raw_docid() {
        let removed: HashSet<String> = ["uc1.$b123".to_string()].into_iter().collect();
        let err = parse_row(
            &row(&["uc1.$b123", "n", "fiction", "1905", "A"]),
            &COLUMNS,
            &removed,
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::Removed);
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_suffix_normalization() {
        let parsed = parse_row(
            &row(&["uc1.$b123", "n", "fiction", "1905", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap();
        assert_eq!(parsed.docid, "uc1.b123");
    }

    #[test]
    fn test_unresolved_docid() {
        let err = parse_row(
            &row(&["nope.1", "n", "fiction", "1905", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::UnresolvedDocid);
    }

    #[test]
    fn test_bad_date() {
        let err = parse_row(
            &row(&["mdp.001", "n", "fiction", "c. 1900", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::InvalidDate("c. 1900".to_string()));
    }

    #[test]
    fn test_short_row() {
        let err = parse_row(
            &row(&["mdp.001", "n", "fiction"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::ShortRow);
    }

    #[test]
    fn test_no_genres() {
        let err = parse_row(
            &row(&["mdp.001", "n", "|", "1905", "A"]),
            &COLUMNS,
            &HashSet::new(),
            &vectors(),
        )
        .unwrap_err();
        assert_eq!(err, RowRejection::NoGenres);
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("a|b||c"), vec!["a", "b", "c"]);
        assert!(split_genres("").is_empty());
    }
}
