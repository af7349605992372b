//! Per-feature TF-IDF spaces.
//!
//! A [`FeatureSpace`] is fitted on one feature column of the whole catalog:
//! raw term counts weighted by a smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1`, with every row scaled to unit length so that
//! cosine similarity reduces to a dot product.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::Feature;

/// Splits text into lowercase runs of word characters.
///
/// Anything that is not alphanumeric or `_` separates tokens, so
/// `"Sci-Fi"` yields `["sci", "fi"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unit-length sparse vector, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a unit vector from raw weights. All-zero input gives the zero vector.
    fn from_weights(weights: BTreeMap<usize, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }

        Self {
            entries: weights
                .into_iter()
                .map(|(index, weight)| (index, weight / norm))
                .collect(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_index, a_weight) = self.entries[i];
            let (b_index, b_weight) = other.entries[j];
            match a_index.cmp(&b_index) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// Cosine similarity in `[0, 1]`; zero whenever either side is the zero vector
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        // Both sides are unit length, rounding can push the product a hair past 1.
        self.dot(other).clamp(0.0, 1.0)
    }
}

/// Fitted TF-IDF state for one feature column
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    feature: Feature,
    /// term → column index, lexicographic order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    /// One row per fitted document, in corpus order
    matrix: Vec<SparseVector>,
}

impl FeatureSpace {
    /// Fits the vocabulary and idf weights on `documents` and vectorizes each of them.
    ///
    /// A corpus with no tokens at all yields an empty vocabulary; every row is
    /// then the zero vector.
    pub fn fit(feature: Feature, documents: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (term, df)) in doc_freq.iter().enumerate() {
            vocabulary.insert((*term).to_string(), index);
            idf.push(((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0);
        }

        let mut space = Self {
            feature,
            vocabulary,
            idf,
            matrix: Vec::new(),
        };
        let matrix: Vec<SparseVector> = tokenized
            .iter()
            .map(|tokens| space.vectorize(tokens))
            .collect();
        space.matrix = matrix;

        tracing::debug!(
            feature = %feature,
            documents = documents.len(),
            vocabulary = space.vocabulary_len(),
            "Fitted feature space"
        );

        space
    }

    /// Projects a document into this space. Terms outside the fitted vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        self.vectorize(&tokenize(document))
    }

    /// Cosine similarity of `reference` against every fitted row
    pub fn similarities(&self, reference: &SparseVector) -> Vec<f64> {
        self.matrix.iter().map(|row| row.cosine(reference)).collect()
    }

    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, weight) in counts.iter_mut() {
            *weight *= self.idf[*index];
        }

        SparseVector::from_weights(counts)
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of fitted documents
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.matrix.get(index)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&index| self.idf[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        assert_eq!(tokenize("Sci-Fi, Action"), vec!["sci", "fi", "action"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("a b_c"), vec!["a", "b_c"]);
    }

    #[test]
    fn test_smoothed_idf() {
        let space = FeatureSpace::fit(Feature::Genres, &docs(&["action drama", "action", "comedy"]));

        let action = space.idf("action").unwrap();
        let drama = space.idf("drama").unwrap();
        assert!((action - ((4.0_f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((drama - (2.0_f64.ln() + 1.0)).abs() < 1e-12);
        assert_eq!(space.idf("thriller"), None);
    }

    #[test]
    fn test_cosine_matches_reference_values() {
        let space = FeatureSpace::fit(Feature::Genres, &docs(&["action drama", "action", "comedy"]));
        let reference = space.transform("action drama");
        let sims = space.similarities(&reference);

        assert!((sims[0] - 1.0).abs() < 1e-12);
        assert!((sims[1] - 0.605_348_5).abs() < 1e-6);
        assert_eq!(sims[2], 0.0);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let space = FeatureSpace::fit(
            Feature::Overview,
            &docs(&["a thief who steals secrets", "a hacker learns the truth", ""]),
        );

        for index in 0..2 {
            let row = space.row(index).unwrap();
            assert!((row.dot(row) - 1.0).abs() < 1e-12);
        }
        assert!(space.row(2).unwrap().is_zero());
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let space = FeatureSpace::fit(Feature::Keywords, &docs(&["heist dream", "hacker"]));

        assert!(space.transform("western cowboy").is_zero());
        assert_eq!(space.transform("dream western"), space.transform("dream"));
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        let space = FeatureSpace::fit(Feature::Genres, &docs(&["Action", "action"]));
        assert_eq!(space.vocabulary_len(), 1);

        let reference = space.transform("ACTION");
        assert_eq!(space.similarities(&reference), vec![1.0, 1.0]);
    }

    #[test]
    fn test_empty_corpus_gives_zero_similarity() {
        let space = FeatureSpace::fit(Feature::Director, &docs(&["", "", ""]));

        assert_eq!(space.vocabulary_len(), 0);
        assert_eq!(space.len(), 3);
        let reference = space.transform("");
        assert_eq!(space.similarities(&reference), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_vocabulary_is_lexicographic() {
        let space = FeatureSpace::fit(Feature::Genres, &docs(&["zombie", "adventure"]));
        let adventure = space.transform("adventure");
        let zombie = space.transform("zombie");

        assert_eq!(adventure.entries.len(), 1);
        assert_eq!(adventure.entries[0].0, 0);
        assert_eq!(zombie.entries[0].0, 1);
    }
}
