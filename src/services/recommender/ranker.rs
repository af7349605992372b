//! Top-K selection over fused similarity scores.

use crate::models::{CatalogItem, RankedResult};

use super::similarity::SimilarityScores;

/// Picks the `k` best-scoring items, never including the reference item itself.
///
/// The sort is stable, so equal scores keep catalog order. Asking for more
/// items than the catalog holds returns all of them.
pub fn rank(
    scores: &SimilarityScores,
    catalog: &[CatalogItem],
    reference_index: usize,
    k: usize,
) -> Vec<RankedResult> {
    let combined = scores.combined();

    let mut order: Vec<usize> = (0..catalog.len())
        .filter(|&index| index != reference_index)
        .collect();
    order.sort_by(|&a, &b| combined[b].total_cmp(&combined[a]));

    order
        .into_iter()
        .take(k)
        .map(|index| RankedResult {
            item: catalog[index].clone(),
            similarity_score: combined[index],
            breakdown: scores.breakdown(index),
        })
        .collect()
}
