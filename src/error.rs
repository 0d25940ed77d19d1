// Fatal data-integrity errors.
//
// These abort a run. Expected sampling failures (no candidates, exhausted
// retries) are not errors at all; they are `SkipReason` values on a trial.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    /// A docid reached distance computation without a vector.
    #[error("No vector for docid: {0}")]
    MissingVector(String),

    #[error("Vector dimension mismatch for {docid}: expected {expected}, got {actual}")]
    DimensionMismatch {
        docid: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid vector value {value:?} on line {line}")]
    InvalidVectorValue { line: usize, value: String },

    #[error("Docid {0} is in the focal population but has no genre labels")]
    UnlabeledDocument(String),

    #[error("Docid {docid} is assigned to {genre:?} but has no entry in that bucket")]
    MissingEntry { genre: String, docid: String },

    #[error("Vector file contains no vectors")]
    EmptyVectorFile,

    #[error("Required column {column:?} missing from {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}
