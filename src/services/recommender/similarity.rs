//! Weighted fusion of per-feature cosine similarities.

use std::collections::BTreeMap;

use crate::models::{CatalogItem, Feature, ScoreBreakdown};

use super::normalize::normalize;
use super::vectorizer::FeatureSpace;

/// Fixed weights of the combined similarity score.
///
/// The five feature weights sum to 1.0. The release-year bonus is added on
/// top, so a perfect match released the same year scores 1.1.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWeights {
    pub genres: f64,
    pub keywords: f64,
    pub director: f64,
    pub cast: f64,
    pub overview: f64,
    pub release_year: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            genres: 0.40,
            keywords: 0.20,
            director: 0.15,
            cast: 0.15,
            overview: 0.10,
            release_year: 0.10,
        }
    }
}

impl FeatureWeights {
    pub fn weight(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Genres => self.genres,
            Feature::Keywords => self.keywords,
            Feature::Director => self.director,
            Feature::Cast => self.cast,
            Feature::Overview => self.overview,
        }
    }
}

/// Proximity of two release years: 1 for the same year, decaying as `1 / (1 + gap)`.
///
/// Zero when either year is unknown.
pub fn year_score(item_year: Option<i32>, reference_year: Option<i32>) -> f64 {
    match (item_year, reference_year) {
        (Some(item), Some(reference)) => 1.0 / (1.0 + (item - reference).abs() as f64),
        _ => 0.0,
    }
}

/// Scores of every catalog item against one reference item
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityScores {
    combined: Vec<f64>,
    /// Weighted per-feature contributions, one column per fitted feature
    contributions: Vec<(Feature, Vec<f64>)>,
    /// Weighted release-year bonus
    year_bonus: Vec<f64>,
}

impl SimilarityScores {
    pub fn combined(&self) -> &[f64] {
        &self.combined
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    /// How the combined score of item `index` was assembled
    pub fn breakdown(&self, index: usize) -> ScoreBreakdown {
        let features: BTreeMap<Feature, f64> = self
            .contributions
            .iter()
            .map(|(feature, column)| (*feature, column[index]))
            .collect();

        ScoreBreakdown {
            features,
            release_year: self.year_bonus[index],
        }
    }
}

/// Combines the fitted feature spaces into one score per catalog item.
///
/// `spaces` must have been fitted on `items`, in the same order. Features
/// without a fitted space contribute nothing and their weight is not handed to
/// the others.
pub fn fuse(
    spaces: &[FeatureSpace],
    items: &[CatalogItem],
    reference: &CatalogItem,
    weights: &FeatureWeights,
) -> SimilarityScores {
    let mut combined = vec![0.0; items.len()];
    let mut contributions = Vec::with_capacity(spaces.len());

    for space in spaces {
        debug_assert_eq!(space.len(), items.len());

        let feature = space.feature();
        let weight = weights.weight(feature);
        let reference_vector = space.transform(&normalize(reference.feature(feature)));

        let weighted: Vec<f64> = space
            .similarities(&reference_vector)
            .into_iter()
            .map(|similarity| similarity * weight)
            .collect();

        for (total, contribution) in combined.iter_mut().zip(&weighted) {
            *total += contribution;
        }
        contributions.push((feature, weighted));
    }

    let reference_year = reference.release_year();
    let year_bonus: Vec<f64> = items
        .iter()
        .map(|item| year_score(item.release_year(), reference_year) * weights.release_year)
        .collect();

    for (total, bonus) in combined.iter_mut().zip(&year_bonus) {
        *total += bonus;
    }

    SimilarityScores {
        combined,
        contributions,
        year_bonus,
    }
}
