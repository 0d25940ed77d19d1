// Single streaming pass that turns assignment rows into both indexes.

use tracing::debug;

use super::assignments::AssignmentIndex;
use super::genre::{GenreEntry, GenreIndex, ALL_NON_RANDOM, RANDOM};
use crate::corpus::metadata::AssignmentRow;

/// Accumulates rows, then hands out the read-only indexes.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    genres: GenreIndex,
    assignments: AssignmentIndex,
    duplicates: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every genre assignment on `row`.
    ///
    /// A document enters `allnonrandom` with the date and author of its
    /// first non-random row; later rows for it only add labels.
    pub fn add_row(&mut self, row: &AssignmentRow) {
        for genre in &row.genres {
            if genre == ALL_NON_RANDOM {
                debug!(docid = %row.docid, "Ignoring reserved label {ALL_NON_RANDOM}");
                continue;
            }

            let entry = GenreEntry::new(row.docid.as_str(), row.date, row.author.as_str());
            if !self.genres.add(genre, entry.clone()) {
                self.duplicates += 1;
            }
            if genre != RANDOM {
                self.genres.add(ALL_NON_RANDOM, entry);
            }
            self.assignments.add(&row.docid, genre);
        }
    }

    /// Convenience for building from literal entries (mostly tests).
    pub fn add(&mut self, docid: &str, genres: &[&str], date: f64, author: &str) {
        self.add_row(&AssignmentRow {
            docid: docid.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            date,
            author: author.to_string(),
        });
    }

    /// Number of (docid, genre) pairs that were already present.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> (GenreIndex, AssignmentIndex) {
        (self.genres, self.assignments)
    }
}
