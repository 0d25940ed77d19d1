// GenreIndex: per-genre populations of (docid, date, author) entries.
//
// Two reserved labels sit alongside the literary genres: `random`, the
// control population, and `allnonrandom`, every document holding at least
// one non-random label (each document once).

use std::collections::HashMap;

use rand::seq::IndexedRandom;
use rand::Rng;

/// Control population label.
pub const RANDOM: &str = "random";
/// Union of all documents with a non-random label.
pub const ALL_NON_RANDOM: &str = "allnonrandom";

/// Pseudo-labels never count as a genre overlap.
pub fn is_pseudo_genre(genre: &str) -> bool {
    genre == RANDOM || genre == ALL_NON_RANDOM
}

/// One document as recorded in one genre bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreEntry {
    pub docid: String,
    pub date: f64,
    pub author: String,
}

impl GenreEntry {
    pub fn new(docid: impl Into<String>, date: f64, author: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            date,
            author: author.into(),
        }
    }
}

/// The entries for one genre label, each docid at most once.
#[derive(Debug, Default)]
pub struct GenreBucket {
    entries: Vec<GenreEntry>,
    positions: HashMap<String, usize>,
}

impl GenreBucket {
    /// Add an entry unless its docid is already present. Returns whether
    /// the entry was added; the first entry for a docid wins.
    pub fn insert(&mut self, entry: GenreEntry) -> bool {
        if self.positions.contains_key(&entry.docid) {
            return false;
        }
        self.positions.insert(entry.docid.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, docid: &str) -> Option<&GenreEntry> {
        self.positions.get(docid).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, docid: &str) -> bool {
        self.positions.contains_key(docid)
    }

    pub fn entries(&self) -> &[GenreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uniformly random entry.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&GenreEntry> {
        self.entries.choose(rng)
    }

    /// Uniformly random entry among those satisfying `accept`.
    ///
    /// The qualifying set is rebuilt on every call by a full scan.
    fn choose_where<R, F>(&self, rng: &mut R, accept: F) -> Option<&GenreEntry>
    where
        R: Rng + ?Sized,
        F: Fn(&GenreEntry) -> bool,
    {
        let candidates: Vec<&GenreEntry> = self.entries.iter().filter(|&e| accept(e)).collect();
        candidates.choose(rng).copied()
    }
}

/// What a selection query must never return.
///
/// Author exclusion keeps the same work (or the same writer) out of a
/// comparison; the docid is excluded too, because inconsistent source rows
/// can record one document under different authors.
#[derive(Debug, Clone, Copy)]
pub struct Exclusion<'a> {
    pub author: &'a str,
    pub docid: &'a str,
}

impl Exclusion<'_> {
    fn admits(&self, entry: &GenreEntry) -> bool {
        entry.author != self.author && entry.docid != self.docid
    }
}

/// All genre buckets plus the order in which labels were first seen.
#[derive(Debug)]
pub struct GenreIndex {
    buckets: HashMap<String, GenreBucket>,
    genres: Vec<String>,
}

impl Default for GenreIndex {
    fn default() -> Self {
        let mut index = Self {
            buckets: HashMap::new(),
            genres: Vec::new(),
        };
        index.register(ALL_NON_RANDOM);
        index
    }
}

impl GenreIndex {
    fn register(&mut self, genre: &str) -> &mut GenreBucket {
        if !self.buckets.contains_key(genre) {
            self.genres.push(genre.to_string());
        }
        self.buckets.entry(genre.to_string()).or_default()
    }

    /// Add `entry` to `genre`, creating the bucket on first use.
    pub(crate) fn add(&mut self, genre: &str, entry: GenreEntry) -> bool {
        self.register(genre).insert(entry)
    }

    /// Every label in first-seen order, `allnonrandom` first.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn bucket(&self, genre: &str) -> Option<&GenreBucket> {
        self.buckets.get(genre)
    }

    /// The entry recorded for `docid` within `genre`.
    pub fn entry(&self, genre: &str, docid: &str) -> Option<&GenreEntry> {
        self.bucket(genre)?.get(docid)
    }

    /// Random entry of `genre` dated strictly inside
    /// `(center - radius, center + radius)` and admitted by `exclude`.
    pub fn select_in_window<R: Rng + ?Sized>(
        &self,
        genre: &str,
        exclude: Exclusion<'_>,
        center: f64,
        radius: f64,
        rng: &mut R,
    ) -> Option<&GenreEntry> {
        let low = center - radius;
        let high = center + radius;
        self.bucket(genre)?.choose_where(rng, |e| {
            e.date > low && e.date < high && exclude.admits(e)
        })
    }

    /// Random entry of `genre` with exactly `date`, admitted by `exclude`.
    pub fn select_exact_date<R: Rng + ?Sized>(
        &self,
        genre: &str,
        exclude: Exclusion<'_>,
        date: f64,
        rng: &mut R,
    ) -> Option<&GenreEntry> {
        self.bucket(genre)?
            .choose_where(rng, |e| e.date == date && exclude.admits(e))
    }
}
