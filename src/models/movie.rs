use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a catalog item (the IMDb `tconst` in the cleaned table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub String);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        MovieId(id.to_string())
    }
}

impl From<String> for MovieId {
    fn from(id: String) -> Self {
        MovieId(id)
    }
}

/// Text-like columns that feed the content-based recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Genres,
    Keywords,
    Director,
    Cast,
    Overview,
}

impl Feature {
    /// Every feature the recommender knows about, in scoring order
    pub const ALL: [Feature; 5] = [
        Feature::Genres,
        Feature::Keywords,
        Feature::Director,
        Feature::Cast,
        Feature::Overview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Genres => "genres",
            Feature::Keywords => "keywords",
            Feature::Director => "director",
            Feature::Cast => "cast",
            Feature::Overview => "overview",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value of a feature column.
///
/// The cleaned table stores some attributes as delimited strings and others as
/// lists, and any of them may be empty. Only the recommender's normalizer looks
/// inside; everything else treats the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    #[default]
    Missing,
    Text(String),
    List(Vec<String>),
}

impl FeatureValue {
    pub fn is_missing(&self) -> bool {
        match self {
            FeatureValue::Missing => true,
            FeatureValue::Text(text) => text.is_empty(),
            FeatureValue::List(values) => values.is_empty(),
        }
    }

    /// Individual entries of a set-like value (`"Action, Drama"` or `["Action", "Drama"]`)
    pub fn entries(&self) -> Vec<&str> {
        match self {
            FeatureValue::Missing => Vec::new(),
            FeatureValue::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            FeatureValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(text: &str) -> Self {
        FeatureValue::Text(text.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(text: String) -> Self {
        FeatureValue::Text(text)
    }
}

impl From<Vec<String>> for FeatureValue {
    fn from(values: Vec<String>) -> Self {
        FeatureValue::List(values)
    }
}

impl<const N: usize> From<[&str; N]> for FeatureValue {
    fn from(values: [&str; N]) -> Self {
        FeatureValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<T: Into<FeatureValue>> From<Option<T>> for FeatureValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// One row of the cleaned movie catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub title_fr: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genres: FeatureValue,
    #[serde(default)]
    pub keywords: FeatureValue,
    #[serde(default)]
    pub director: FeatureValue,
    #[serde(default)]
    pub cast: FeatureValue,
    #[serde(default)]
    pub overview: FeatureValue,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Runtime in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub tmdb_rating: Option<f64>,
    #[serde(default)]
    pub imdb_votes: Option<u64>,
    #[serde(default)]
    pub tmdb_votes: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub box_office: Option<f64>,
    #[serde(default)]
    pub decade: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<u64>,
}

impl CatalogItem {
    /// Creates an item with only its identity set; every other attribute is missing
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            title_fr: None,
            release_date: None,
            genres: FeatureValue::Missing,
            keywords: FeatureValue::Missing,
            director: FeatureValue::Missing,
            cast: FeatureValue::Missing,
            overview: FeatureValue::Missing,
            poster_path: None,
            runtime: None,
            imdb_rating: None,
            tmdb_rating: None,
            imdb_votes: None,
            tmdb_votes: None,
            popularity: None,
            budget: None,
            box_office: None,
            decade: None,
            tmdb_id: None,
        }
    }

    pub fn with_feature(mut self, feature: Feature, value: impl Into<FeatureValue>) -> Self {
        *self.feature_mut(feature) = value.into();
        self
    }

    /// Sets the release date to January 1st of `year`
    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_date = NaiveDate::from_ymd_opt(year, 1, 1);
        self
    }

    pub fn feature(&self, feature: Feature) -> &FeatureValue {
        match feature {
            Feature::Genres => &self.genres,
            Feature::Keywords => &self.keywords,
            Feature::Director => &self.director,
            Feature::Cast => &self.cast,
            Feature::Overview => &self.overview,
        }
    }

    pub fn feature_mut(&mut self, feature: Feature) -> &mut FeatureValue {
        match feature {
            Feature::Genres => &mut self.genres,
            Feature::Keywords => &mut self.keywords,
            Feature::Director => &mut self.director,
            Feature::Cast => &mut self.cast,
            Feature::Overview => &mut self.overview,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Mean of the IMDb and TMDb ratings; `None` unless both are known
    pub fn average_rating(&self) -> Option<f64> {
        match (self.imdb_rating, self.tmdb_rating) {
            (Some(imdb), Some(tmdb)) => Some((imdb + tmdb) / 2.0),
            _ => None,
        }
    }

    /// Combined IMDb and TMDb vote count
    pub fn total_votes(&self) -> u64 {
        self.imdb_votes.unwrap_or(0) + self.tmdb_votes.unwrap_or(0)
    }
}
