use chrono::NaiveDate;
use log::info;
use polars::prelude::*;

use crate::error::Result;

// Expected input columns of the catalog export:
//
//     title        text NOT NULL
//     type         text NOT NULL        -- "Movie" | "TV Show"
//     director     text                 -- ", "-delimited list
//     cast         text                 -- ", "-delimited list
//     country      text
//     date_added   text                 -- "September 25, 2021"
//     release_year integer NOT NULL
//     rating       text                 -- "TV-MA", "PG-13", ...
//     duration     text                 -- "90 min" | "3 Seasons"
//     listed_in    text NOT NULL        -- ", "-delimited genre list
//     description  text

pub const TITLE: &str = "title";
pub const TYPE: &str = "type";
pub const DIRECTOR: &str = "director";
pub const CAST: &str = "cast";
pub const COUNTRY: &str = "country";
pub const DATE_ADDED: &str = "date_added";
pub const RELEASE_YEAR: &str = "release_year";
pub const RATING: &str = "rating";
pub const DURATION: &str = "duration";
pub const LISTED_IN: &str = "listed_in";
pub const DESCRIPTION: &str = "description";

// Columns derived by the cleaning pipeline.
pub const YEAR_ADDED: &str = "year_added";
pub const MONTH_ADDED: &str = "month_added";
pub const MONTH_NAME: &str = "month_name";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const QUARTER_ADDED: &str = "quarter_added";
pub const DURATION_MINUTES: &str = "duration_minutes";
pub const DURATION_SEASONS: &str = "duration_seasons";
pub const CONTENT_LAG_YEARS: &str = "content_lag_years";
pub const CONTENT_AGE: &str = "content_age";

/// List delimiter used by director, cast and listed_in.
pub const LIST_DELIMITER: &str = ", ";

// Sentinels substituted for missing fields.
pub const NOT_AVAILABLE: &str = "Not Available";
pub const UNKNOWN: &str = "Unknown";
pub const NOT_RATED: &str = "Not Rated";

pub const MOVIE: &str = "Movie";
pub const TV_SHOW: &str = "TV Show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Movie,
    TvShow,
}

impl ContentType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            MOVIE => Some(ContentType::Movie),
            TV_SHOW => Some(ContentType::TvShow),
            _ => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            ContentType::Movie => MOVIE,
            ContentType::TvShow => TV_SHOW,
        }
    }
}

/// Typed row view over the cleaned table. Materialized on demand; the
/// columnar frame stays the working representation.
#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub title: String,
    pub content_type: Option<ContentType>,
    pub directors: Vec<String>,
    pub cast: Vec<String>,
    pub country: String,
    pub genres: Vec<String>,
    pub rating: String,
    pub release_year: Option<i32>,
    pub date_added: Option<NaiveDate>,
    pub year_added: Option<i32>,
    pub month_added: Option<i32>,
    pub month_name: Option<String>,
    pub day_of_week: Option<String>,
    pub quarter_added: Option<i32>,
    pub duration_minutes: Option<f64>,
    pub duration_seasons: Option<f64>,
    pub content_lag_years: Option<i32>,
    pub content_age: Option<i32>,
}

/// Read the raw catalog CSV. The only fatal failure mode of the pipeline:
/// a missing or unreadable file surfaces here. Individual malformed fields
/// are tolerated and resolved during cleaning.
pub fn load_csv(path: &str) -> Result<DataFrame> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10_000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    // Inference yields Int64 for year columns; narrow once so every
    // downstream consumer reads i32.
    let df = df
        .lazy()
        .with_columns([col(RELEASE_YEAR).cast(DataType::Int32)])
        .collect()?;

    info!(
        "loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path
    );
    Ok(df)
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    // polars Date is days since 1970-01-01; chrono counts from 0001-01-01.
    NaiveDate::from_num_days_from_ce_opt(days + 719_163)
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(LIST_DELIMITER)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Materialize typed records from a cleaned frame. Requires every derived
/// column, so only call this after `clean::clean_frame`.
pub fn records(df: &DataFrame) -> Result<Vec<ContentRecord>> {
    let title = df.column(TITLE)?.str()?;
    let ty = df.column(TYPE)?.str()?;
    let director = df.column(DIRECTOR)?.str()?;
    let cast = df.column(CAST)?.str()?;
    let country = df.column(COUNTRY)?.str()?;
    let genres = df.column(LISTED_IN)?.str()?;
    let rating = df.column(RATING)?.str()?;
    let release_year = df.column(RELEASE_YEAR)?.i32()?;
    let date_added: Vec<Option<i32>> = df.column(DATE_ADDED)?.date()?.into_iter().collect();
    let year_added = df.column(YEAR_ADDED)?.i32()?;
    let month_added = df.column(MONTH_ADDED)?.i32()?;
    let month_name = df.column(MONTH_NAME)?.str()?;
    let day_of_week = df.column(DAY_OF_WEEK)?.str()?;
    let quarter_added = df.column(QUARTER_ADDED)?.i32()?;
    let duration_minutes = df.column(DURATION_MINUTES)?.f64()?;
    let duration_seasons = df.column(DURATION_SEASONS)?.f64()?;
    let content_lag = df.column(CONTENT_LAG_YEARS)?.i32()?;
    let content_age = df.column(CONTENT_AGE)?.i32()?;

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        out.push(ContentRecord {
            title: title.get(i).unwrap_or_default().to_string(),
            content_type: ty.get(i).and_then(ContentType::from_label),
            directors: split_list(director.get(i)),
            cast: split_list(cast.get(i)),
            country: country.get(i).unwrap_or(UNKNOWN).to_string(),
            genres: split_list(genres.get(i)),
            rating: rating.get(i).unwrap_or(NOT_RATED).to_string(),
            release_year: release_year.get(i),
            date_added: date_added[i].and_then(date_from_epoch_days),
            year_added: year_added.get(i),
            month_added: month_added.get(i),
            month_name: month_name.get(i).map(str::to_string),
            day_of_week: day_of_week.get(i).map(str::to_string),
            quarter_added: quarter_added.get(i),
            duration_minutes: duration_minutes.get(i),
            duration_seasons: duration_seasons.get(i),
            content_lag_years: content_lag.get(i),
            content_age: content_age.get(i),
        });
    }
    Ok(out)
}
