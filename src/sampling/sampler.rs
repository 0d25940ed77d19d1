// The comparison procedure for a single trial.
//
// 1. Draw a focal document from `allnonrandom`, then one of its genres.
// 2. Find a genre mate: same genre, different author, date within the
//    window around the focal date.
// 3. For each side of the pair, find a random-population control and an
//    other-genre control: exact date of the *opposite* member, different
//    author, no genre shared with the member it is compared to.
// 4. Average each control pair and normalize against the in-genre distance.
//
// Any missing candidate ends the trial as a skip. Only integrity errors
// (a document without a vector) are returned as `Err`.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use super::trial::{SkipReason, TrialOutcome, TrialResult};
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::index::genre::{Exclusion, GenreEntry, ALL_NON_RANDOM, RANDOM};

/// Experiment constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// Date radius for the genre mate (default 10.0, exclusive bounds).
    pub genre_window: f64,
    /// Draws allowed per control side before giving up (default 5).
    pub control_attempts: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            genre_window: 10.0,
            control_attempts: 5,
        }
    }
}

/// Runs trials against a shared, read-only corpus.
pub struct Sampler<'a> {
    corpus: &'a Corpus,
    settings: SamplerSettings,
}

impl<'a> Sampler<'a> {
    pub fn new(corpus: &'a Corpus, settings: SamplerSettings) -> Self {
        Self { corpus, settings }
    }

    /// Run one trial with a randomly drawn focal document.
    pub fn run_trial<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TrialOutcome> {
        let Some((genre, focal)) = self.draw_focal(rng)? else {
            debug!(reason = %SkipReason::NoFocalDocument, "Trial skipped");
            return Ok(TrialOutcome::Skipped(SkipReason::NoFocalDocument));
        };
        self.compare(genre, focal, rng)
    }

    /// Run one trial for a chosen focal document and genre.
    pub fn run_trial_for<R: Rng + ?Sized>(
        &self,
        docid: &str,
        genre: &str,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        let focal = self.bucket_entry(genre, docid)?;
        self.compare(genre, focal, rng)
    }

    /// A uniformly random non-random document, and one of its labels.
    ///
    /// The label is drawn fresh every time, so a document with several
    /// genres contributes one observation per draw rather than one per
    /// genre. The returned entry carries the date and author recorded in
    /// that genre's bucket. `None` when `allnonrandom` is empty.
    pub fn draw_focal<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<(&'a str, &'a GenreEntry)>> {
        let corpus = self.corpus;
        let Some(doc) = corpus
            .genres
            .bucket(ALL_NON_RANDOM)
            .and_then(|bucket| bucket.choose(rng))
        else {
            return Ok(None);
        };

        let genre = corpus
            .assignments
            .genres_of(&doc.docid)
            .choose(rng)
            .ok_or_else(|| CorpusError::UnlabeledDocument(doc.docid.clone()))?;

        let focal = self.bucket_entry(genre, &doc.docid)?;
        Ok(Some((genre.as_str(), focal)))
    }

    fn bucket_entry(&self, genre: &str, docid: &str) -> Result<&'a GenreEntry> {
        self.corpus
            .genres
            .entry(genre, docid)
            .ok_or_else(|| CorpusError::MissingEntry {
                genre: genre.to_string(),
                docid: docid.to_string(),
            })
    }

    fn compare<R: Rng + ?Sized>(
        &self,
        genre: &str,
        focal: &GenreEntry,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        let corpus = self.corpus;
        let skip = |reason: SkipReason| -> Result<TrialOutcome> {
            debug!(genre, docid = %focal.docid, %reason, "Trial skipped");
            Ok(TrialOutcome::Skipped(reason))
        };

        let Some(mate) = corpus.genres.select_in_window(
            genre,
            exclusion_for(focal),
            focal.date,
            self.settings.genre_window,
            rng,
        ) else {
            return skip(SkipReason::NoGenreMate);
        };

        let in_genre_dist = corpus.vectors.cosine_distance(&focal.docid, &mate.docid)?;

        let focal_genres = corpus.assignments.genres_of(&focal.docid);
        let mate_genres = corpus.assignments.genres_of(&mate.docid);

        // Side A is compared with the focal document at the mate's date;
        // side B with the mate at the focal date.
        let random_a = self.control(RANDOM, focal, mate.date, focal_genres, rng);
        let random_b = self.control(RANDOM, mate, focal.date, mate_genres, rng);
        let (Some(random_a), Some(random_b)) = (random_a, random_b) else {
            return skip(SkipReason::NoRandomControl);
        };

        let other_a = self.control(ALL_NON_RANDOM, focal, mate.date, focal_genres, rng);
        let other_b = self.control(ALL_NON_RANDOM, mate, focal.date, mate_genres, rng);
        let (Some(other_a), Some(other_b)) = (other_a, other_b) else {
            return skip(SkipReason::NoOtherGenreControl);
        };

        let full_random_dist = (corpus.vectors.cosine_distance(&focal.docid, &random_a.docid)?
            + corpus.vectors.cosine_distance(&mate.docid, &random_b.docid)?)
            / 2.0;
        let other_genre_dist = (corpus.vectors.cosine_distance(&focal.docid, &other_a.docid)?
            + corpus.vectors.cosine_distance(&mate.docid, &other_b.docid)?)
            / 2.0;

        let (Some(full_random_diff), Some(other_genre_diff)) = (
            normalized_differential(full_random_dist, in_genre_dist),
            normalized_differential(other_genre_dist, in_genre_dist),
        ) else {
            return skip(SkipReason::DegenerateDistance);
        };

        Ok(TrialOutcome::Success(Box::new(TrialResult {
            genre: genre.to_string(),
            first_doc: focal.docid.clone(),
            genre_match: mate.docid.clone(),
            first_length: corpus.vectors.sum_of(&focal.docid)?,
            match_length: corpus.vectors.sum_of(&mate.docid)?,
            other_match_a: other_a.docid.clone(),
            other_match_b: other_b.docid.clone(),
            first_date: focal.date,
            match_date: mate.date,
            date_diff: (focal.date - mate.date).abs(),
            mean_date: (focal.date + mate.date) / 2.0,
            in_genre_dist,
            full_random_dist,
            other_genre_dist,
            full_random_diff,
            other_genre_diff,
            random_match_a: random_a.docid.clone(),
            random_match_b: random_b.docid.clone(),
        })))
    }

    /// Draw a control for `member` from `pool` at exactly `date`.
    ///
    /// Each attempt is a fresh draw; a draw sharing a real genre with
    /// `avoid` is discarded. Gives up after `control_attempts` draws, or
    /// at once if nothing in the pool qualifies.
    fn control<R: Rng + ?Sized>(
        &self,
        pool: &str,
        member: &GenreEntry,
        date: f64,
        avoid: &[String],
        rng: &mut R,
    ) -> Option<&'a GenreEntry> {
        let corpus = self.corpus;
        for _ in 0..self.settings.control_attempts {
            let candidate = corpus
                .genres
                .select_exact_date(pool, exclusion_for(member), date, rng)?;
            if !corpus.assignments.overlaps(&candidate.docid, avoid) {
                return Some(candidate);
            }
        }
        None
    }
}

fn exclusion_for(entry: &GenreEntry) -> Exclusion<'_> {
    Exclusion {
        author: &entry.author,
        docid: &entry.docid,
    }
}

/// `(control - in_genre) / control`.
///
/// `None` when the result would be undefined: a zero control distance, or
/// a NaN anywhere (zero-norm vectors).
pub fn normalized_differential(control: f64, in_genre: f64) -> Option<f64> {
    if control == 0.0 || control.is_nan() || in_genre.is_nan() {
        return None;
    }
    Some((control - in_genre) / control)
}
