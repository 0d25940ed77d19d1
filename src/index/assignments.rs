// AssignmentIndex: docid -> every genre label the document carries.

use std::collections::HashMap;

use super::genre::is_pseudo_genre;

#[derive(Debug, Default)]
pub struct AssignmentIndex {
    genres: HashMap<String, Vec<String>>,
}

impl AssignmentIndex {
    /// Record that `docid` carries `genre`. Labels keep first-seen order
    /// and are stored once.
    pub(crate) fn add(&mut self, docid: &str, genre: &str) {
        let labels = self.genres.entry(docid.to_string()).or_default();
        if !labels.iter().any(|g| g == genre) {
            labels.push(genre.to_string());
        }
    }

    /// All labels of `docid`, pseudo-labels included. Empty if unknown.
    pub fn genres_of(&self, docid: &str) -> &[String] {
        self.genres.get(docid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `docid` holds any real genre found in `avoid`.
    ///
    /// `random` and `allnonrandom` on the document are ignored.
    pub fn overlaps(&self, docid: &str, avoid: &[String]) -> bool {
        self.genres_of(docid)
            .iter()
            .filter(|g| !is_pseudo_genre(g))
            .any(|g| avoid.contains(g))
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_labels_deduplicated_in_order() {
        let mut idx = AssignmentIndex::default();
        idx.add("a", "poetry");
        idx.add("a", "fiction");
        idx.add("a", "poetry");
        assert_eq!(idx.genres_of("a"), &["poetry", "fiction"]);
    }

    #[test]
    fn test_unknown_docid_has_no_genres() {
        let idx = AssignmentIndex::default();
        assert!(idx.genres_of("missing").is_empty());
    }

    #[test]
    fn test_overlap_on_real_genre() {
        let mut idx = AssignmentIndex::default();
        idx.add("a", "fiction");
        assert!(idx.overlaps("a", &labels(&["poetry", "fiction"])));
        assert!(!idx.overlaps("a", &labels(&["poetry"])));
    }

    #[test]
    fn test_pseudo_genres_never_overlap() {
        let mut idx = AssignmentIndex::default();
        idx.add("r", "random");
        assert!(!idx.overlaps("r", &labels(&["random", "allnonrandom"])));
    }
}
