// VectorStore: precomputed lexical-frequency vectors keyed by docid.
//
// The vector file is tab-separated: a header row whose first cell is the
// literal `docid`, then one row per document of `docid, v1, ..., vk`.
// Vectors are built externally; this module only loads and compares them.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::error::{CorpusError, Result};

/// First cell of the vector file's header row.
pub const HEADER_MARKER: &str = "docid";

/// Immutable docid -> vector mapping. Every vector has the same dimension.
#[derive(Debug, Default)]
pub struct VectorStore {
    vectors: HashMap<String, Vec<f64>>,
    dimension: usize,
}

impl VectorStore {
    /// Build a store from in-memory vectors, rejecting mixed dimensions.
    pub fn from_vectors<I, S>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut store = Self::default();
        for (docid, vector) in vectors {
            store.insert(docid.into(), vector)?;
        }
        Ok(store)
    }

    /// Load the vector file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open vector file {}", path.display()))?;
        let store = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read vector file {}", path.display()))?;

        info!(
            vectors = store.len(),
            dimension = store.dimension(),
            "Loaded vector store"
        );
        Ok(store)
    }

    /// Parse vector rows from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut store = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split('\t');
            let docid = match fields.next() {
                Some(HEADER_MARKER) => continue,
                Some(docid) => docid.to_string(),
                None => continue,
            };

            let vector = fields
                .map(|raw| {
                    raw.trim()
                        .parse::<f64>()
                        .map_err(|_| CorpusError::InvalidVectorValue {
                            line: line_no,
                            value: raw.to_string(),
                        })
                })
                .collect::<Result<Vec<f64>>>()?;

            store.insert(docid, vector)?;
        }

        if store.is_empty() {
            return Err(CorpusError::EmptyVectorFile.into());
        }
        Ok(store)
    }

    fn insert(&mut self, docid: String, vector: Vec<f64>) -> Result<()> {
        if self.vectors.is_empty() {
            self.dimension = vector.len();
        } else if vector.len() != self.dimension {
            return Err(CorpusError::DimensionMismatch {
                docid,
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        if self.vectors.insert(docid.clone(), vector).is_some() {
            debug!(docid = %docid, "Duplicate vector row, keeping the later one");
        }
        Ok(())
    }

    /// The vector for `docid`, or `MissingVector` if it was never loaded.
    pub fn vector_of(&self, docid: &str) -> Result<&[f64]> {
        self.vectors
            .get(docid)
            .map(Vec::as_slice)
            .ok_or_else(|| CorpusError::MissingVector(docid.to_string()))
    }

    pub fn contains(&self, docid: &str) -> bool {
        self.vectors.contains_key(docid)
    }

    /// Sum of a document's vector components (a diagnostic column).
    pub fn sum_of(&self, docid: &str) -> Result<f64> {
        Ok(self.vector_of(docid)?.iter().sum())
    }

    /// Cosine distance between two stored documents.
    pub fn cosine_distance(&self, a: &str, b: &str) -> Result<f64> {
        Ok(cosine_distance(self.vector_of(a)?, self.vector_of(b)?))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// `1 - cos(a, b)`, clamped to `[0, 2]`.
///
/// A zero-norm vector has no direction, so the distance is NaN; callers
/// decide what a NaN distance means for them.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let aa: f64 = a.iter().map(|x| x * x).sum();
    let bb: f64 = b.iter().map(|x| x * x).sum();

    // One square root of the product, not a product of two norms.
    let denom = (aa * bb).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (1.0 - dot / denom).clamp(0.0, 2.0)
}
