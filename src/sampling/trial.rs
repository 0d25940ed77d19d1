// Trial records: what one draw produced, or why it was skipped.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Result of one successful comparison. Field order matches the output
/// table's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub genre: String,
    pub first_doc: String,
    pub genre_match: String,
    /// Vector sums, kept as a diagnostic.
    pub first_length: f64,
    pub match_length: f64,
    pub other_match_a: String,
    pub other_match_b: String,
    pub first_date: f64,
    pub match_date: f64,
    pub date_diff: f64,
    pub mean_date: f64,
    pub in_genre_dist: f64,
    pub full_random_dist: f64,
    pub other_genre_dist: f64,
    pub full_random_diff: f64,
    pub other_genre_diff: f64,
    pub random_match_a: String,
    pub random_match_b: String,
}

/// Why a trial produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `allnonrandom` is empty, so there is no focal document to draw.
    NoFocalDocument,
    /// No same-genre document inside the date window.
    NoGenreMate,
    /// A random-population control could not be found.
    NoRandomControl,
    /// An other-genre control could not be found.
    NoOtherGenreControl,
    /// A distance was NaN, or a control distance was zero, so the
    /// normalized differentials are undefined.
    DegenerateDistance,
}

impl SkipReason {
    pub const ALL: [SkipReason; 5] = [
        SkipReason::NoFocalDocument,
        SkipReason::NoGenreMate,
        SkipReason::NoRandomControl,
        SkipReason::NoOtherGenreControl,
        SkipReason::DegenerateDistance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoFocalDocument => "no focal document",
            SkipReason::NoGenreMate => "no genre mate",
            SkipReason::NoRandomControl => "no random control",
            SkipReason::NoOtherGenreControl => "no other-genre control",
            SkipReason::DegenerateDistance => "degenerate distance",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Success(Box<TrialResult>),
    Skipped(SkipReason),
}

/// Skip counts by reason.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkipTally(BTreeMap<SkipReason, usize>);

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    /// Total failures across all reasons.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn merge(&mut self, other: &SkipTally) {
        for (reason, n) in &other.0 {
            *self.0.entry(*reason).or_insert(0) += n;
        }
    }
}
