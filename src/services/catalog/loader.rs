use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;

use super::Catalog;
use crate::models::{CatalogItem, Feature, FeatureValue};

/// Errors raised while loading the cleaned catalog table
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Catalog contains no movies")]
    Empty,
}

/// Columns of the cleaned table the service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Id,
    Title,
    TitleFr,
    Overview,
    ReleaseDate,
    Director,
    Cast,
    Genres,
    Keywords,
    PosterPath,
    Runtime,
    ImdbRating,
    TmdbRating,
    ImdbVotes,
    TmdbVotes,
    Popularity,
    Budget,
    BoxOffice,
    Decade,
    TmdbId,
}

impl Column {
    const ALL: [Column; 20] = [
        Column::Id,
        Column::Title,
        Column::TitleFr,
        Column::Overview,
        Column::ReleaseDate,
        Column::Director,
        Column::Cast,
        Column::Genres,
        Column::Keywords,
        Column::PosterPath,
        Column::Runtime,
        Column::ImdbRating,
        Column::TmdbRating,
        Column::ImdbVotes,
        Column::TmdbVotes,
        Column::Popularity,
        Column::Budget,
        Column::BoxOffice,
        Column::Decade,
        Column::TmdbId,
    ];

    /// Header names accepted for this column: the cleaned table's French
    /// headers first, then the renamed English ones.
    fn headers(&self) -> &'static [&'static str] {
        match self {
            Column::Id => &["ID", "id"],
            Column::Title => &["Titre Original", "title"],
            Column::TitleFr => &["Titre Français", "title_fr"],
            Column::Overview => &["Synopsis", "overview"],
            Column::ReleaseDate => &["Date de Sortie", "release_date"],
            Column::Director => &["Réalisateur(s)", "director"],
            Column::Cast => &["Acteurs", "actors", "cast"],
            Column::Genres => &["Genres", "genres"],
            Column::Keywords => &["Mots-Clés", "keywords"],
            Column::PosterPath => &["Affiche", "poster_path"],
            Column::Runtime => &["Durée", "runtime"],
            Column::ImdbRating => &["Note imdb", "imdb_rating"],
            Column::TmdbRating => &["Note tmdb", "tmdb_rating"],
            Column::ImdbVotes => &["Votes imdb", "imdb_votes"],
            Column::TmdbVotes => &["Votes tmdb", "tmdb_votes"],
            Column::Popularity => &["Popularité", "popularity"],
            Column::Budget => &["Budget", "budget"],
            Column::BoxOffice => &["Box Office", "box_office"],
            Column::Decade => &["Décennie", "decade"],
            Column::TmdbId => &["ID tmdb", "tmdb_id"],
        }
    }

    fn feature(&self) -> Option<Feature> {
        match self {
            Column::Genres => Some(Feature::Genres),
            Column::Keywords => Some(Feature::Keywords),
            Column::Director => Some(Feature::Director),
            Column::Cast => Some(Feature::Cast),
            Column::Overview => Some(Feature::Overview),
            _ => None,
        }
    }
}

/// Position of each known column in a header row
struct HeaderMap(HashMap<Column, usize>);

impl HeaderMap {
    fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for column in Column::ALL {
            let found = headers
                .iter()
                .position(|header| column.headers().contains(&header.trim()));
            if let Some(position) = found {
                positions.insert(column, position);
            }
        }
        Self(positions)
    }

    fn contains(&self, column: Column) -> bool {
        self.0.contains_key(&column)
    }

    /// Trimmed cell value; `None` for absent columns and empty cells
    fn cell<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        let position = *self.0.get(&column)?;
        record
            .get(position)
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "NaN" && *value != "nan")
    }

    fn number(&self, record: &StringRecord, column: Column) -> Option<f64> {
        self.cell(record, column)?
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Whole numbers tolerate a float rendering such as `"136.0"`
    fn count(&self, record: &StringRecord, column: Column) -> Option<u64> {
        self.number(record, column)
            .filter(|value| *value >= 0.0)
            .map(|value| value.round() as u64)
    }

    fn list(&self, record: &StringRecord, column: Column) -> FeatureValue {
        match self.cell(record, column) {
            Some(cell) => FeatureValue::List(split_list(cell)),
            None => FeatureValue::Missing,
        }
    }

    fn text(&self, record: &StringRecord, column: Column) -> FeatureValue {
        self.cell(record, column).map(str::to_string).into()
    }
}

/// Loads the cleaned catalog table from a CSV file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading catalog");
    let file = std::fs::File::open(path)?;
    read_catalog(file)
}

/// Reads the cleaned catalog table from any CSV source
pub fn read_catalog<R: io::Read>(reader: R) -> Result<Catalog, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = HeaderMap::new(csv_reader.headers()?);
    if !headers.contains(Column::Id) {
        return Err(CatalogError::MissingColumn("ID"));
    }
    if !headers.contains(Column::Title) {
        return Err(CatalogError::MissingColumn("Titre Original"));
    }

    let features: Vec<Feature> = Column::ALL
        .iter()
        .filter(|column| headers.contains(**column))
        .filter_map(Column::feature)
        .collect();

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        match parse_item(&headers, &record) {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped catalog rows without an ID or title");
    }
    if items.is_empty() {
        return Err(CatalogError::Empty);
    }

    let catalog = Catalog::with_features(items, &features);
    tracing::info!(
        movies = catalog.len(),
        features = ?catalog.features(),
        version = catalog.version(),
        "Catalog loaded"
    );

    Ok(catalog)
}

fn parse_item(headers: &HeaderMap, record: &StringRecord) -> Option<CatalogItem> {
    let id = headers.cell(record, Column::Id)?;
    let title = headers.cell(record, Column::Title)?;

    let mut item = CatalogItem::new(id, title);
    item.title_fr = headers.cell(record, Column::TitleFr).map(str::to_string);
    item.release_date = headers
        .cell(record, Column::ReleaseDate)
        .and_then(parse_release_date);

    item.genres = headers.list(record, Column::Genres);
    item.keywords = headers.list(record, Column::Keywords);
    item.director = headers.text(record, Column::Director);
    item.cast = match headers.cell(record, Column::Cast) {
        Some(cell) => FeatureValue::List(split_list(cell).iter().map(|a| actor_name(a)).collect()),
        None => FeatureValue::Missing,
    };
    item.overview = headers.text(record, Column::Overview);

    item.poster_path = headers.cell(record, Column::PosterPath).map(str::to_string);
    item.runtime = headers
        .count(record, Column::Runtime)
        .and_then(|minutes| u32::try_from(minutes).ok());
    item.imdb_rating = headers.number(record, Column::ImdbRating);
    item.tmdb_rating = headers.number(record, Column::TmdbRating);
    item.imdb_votes = headers.count(record, Column::ImdbVotes);
    item.tmdb_votes = headers.count(record, Column::TmdbVotes);
    item.popularity = headers.number(record, Column::Popularity);
    item.budget = headers.number(record, Column::Budget);
    item.box_office = headers.number(record, Column::BoxOffice);
    item.tmdb_id = headers.count(record, Column::TmdbId);
    item.decade = headers
        .cell(record, Column::Decade)
        .map(str::to_string)
        .or_else(|| item.release_date.map(|date| decade_for_year(date.year()).to_string()));

    Some(item)
}

/// Splits a `", "`-delimited cell, dropping empty entries
fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"Meg Ryan (Kate McKay)"` → `"Meg Ryan"`
fn actor_name(entry: &str) -> String {
    match entry.split_once(" (") {
        Some((name, _role)) => name.trim().to_string(),
        None => entry.to_string(),
    }
}

/// Parses `YYYY-MM-DD`, falling back to `YYYY-MM` and `YYYY` (first day of the period)
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = match parts.next() {
        Some(month) => month.trim().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Release-period bucket used by the dashboard filters
pub fn decade_for_year(year: i32) -> &'static str {
    if year < 1980 {
        "Before 1980"
    } else if year < 2000 {
        "1980s - 1990s"
    } else if year < 2020 {
        "2000s - 2010s"
    } else {
        "2020s"
    }
}
