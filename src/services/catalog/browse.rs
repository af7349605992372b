use std::cmp::Ordering;
use std::collections::HashSet;

use super::Catalog;
use crate::models::{CatalogItem, CatalogStats, MovieFilter, SortBy};

pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const MAX_TOP_LIMIT: usize = 50;

impl Catalog {
    /// Case-insensitive substring search over original and French titles
    pub fn search(&self, query: &str) -> Vec<&CatalogItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.items()
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&needle)
                    || item
                        .title_fr
                        .as_deref()
                        .is_some_and(|fr| fr.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Items matching every criterion set in `filter`
    pub fn filter(&self, filter: &MovieFilter) -> Vec<&CatalogItem> {
        self.items()
            .iter()
            .filter(|item| matches_filter(item, filter))
            .collect()
    }

    /// Best items by `sort_by`, items lacking the value last
    pub fn top(&self, sort_by: SortBy, limit: usize) -> Vec<&CatalogItem> {
        let limit = limit.clamp(1, MAX_TOP_LIMIT);

        let mut ranked: Vec<&CatalogItem> = self.items().iter().collect();
        ranked.sort_by(|a, b| compare_desc(sort_key(a, sort_by), sort_key(b, sort_by)));
        ranked.truncate(limit);
        ranked
    }

    pub fn stats(&self) -> CatalogStats {
        let genres: HashSet<&str> = self
            .items()
            .iter()
            .flat_map(|item| item.genres.entries())
            .collect();

        CatalogStats {
            films: self.len(),
            genres: genres.len(),
            votes: self.items().iter().map(CatalogItem::total_votes).sum(),
            catalog_version: self.version().to_string(),
        }
    }
}

fn matches_filter(item: &CatalogItem, filter: &MovieFilter) -> bool {
    if !filter.genres.is_empty() {
        let genres = item.genres.entries();
        let any_genre = filter
            .genres
            .iter()
            .any(|wanted| genres.iter().any(|genre| genre.eq_ignore_ascii_case(wanted)));
        if !any_genre {
            return false;
        }
    }

    if let Some(min_rating) = filter.min_rating.filter(|rating| *rating > 0.0) {
        match item.average_rating() {
            Some(rating) if rating >= min_rating => {}
            _ => return false,
        }
    }

    if let Some(decade) = &filter.decade {
        if item.decade.as_deref() != Some(decade.as_str()) {
            return false;
        }
    }

    if let Some(max_runtime) = filter.max_runtime {
        match item.runtime {
            Some(runtime) if runtime <= max_runtime => {}
            _ => return false,
        }
    }

    true
}

fn sort_key(item: &CatalogItem, sort_by: SortBy) -> Option<f64> {
    match sort_by {
        SortBy::Popularity => item.popularity,
        SortBy::ImdbRating => item.imdb_rating,
        SortBy::TmdbRating => item.tmdb_rating,
        SortBy::AverageRating => item.average_rating(),
        SortBy::BoxOffice => item.box_office,
        SortBy::ReleaseYear => item.release_year().map(f64::from),
    }
}

fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
