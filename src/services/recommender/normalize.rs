//! Turns raw feature values into plain text documents.
//!
//! This is the only place that looks at how an attribute is represented;
//! everything downstream works on the returned strings.

use crate::models::{CatalogItem, Feature, FeatureValue};

/// Flattens a feature value into one whitespace-joined document.
///
/// Lists are joined with single spaces, text is kept as is and missing values
/// become the empty document.
pub fn normalize(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Missing => String::new(),
        FeatureValue::Text(text) => text.clone(),
        FeatureValue::List(values) => values.join(" "),
    }
}

/// Normalized documents for one feature column, in catalog order
pub fn normalize_column(items: &[CatalogItem], feature: Feature) -> Vec<String> {
    items
        .iter()
        .map(|item| normalize(item.feature(feature)))
        .collect()
}
