//! Cleaning and feature-derivation pipeline.
//!
//! Every step takes a frame and returns a new one; the caller's frame is
//! never mutated. Order matters only where a later derivation reads an
//! earlier one: dates must be parsed before temporal extraction, and the
//! content lag needs both the date-derived year and the release year.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::Datelike;
use log::info;
use polars::prelude::*;
use regex::Regex;
use serde::Serialize;

use crate::data::{self, *};
use crate::error::Result;

/// How `handle_missing_values` resolves gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValueStrategy {
    /// Substitute sentinel strings for missing categoricals.
    Fill,
    /// Drop rows missing title, type or release year.
    Drop,
}

/// Parse `date_added` into a Date column. Invalid or absent values become
/// null; this step never fails on bad data. A frame whose dates are already
/// parsed passes through unchanged, so re-cleaning cleaned output is safe.
pub fn convert_date_added(df: &DataFrame) -> Result<DataFrame> {
    if df.column(DATE_ADDED)?.dtype() == &DataType::Date {
        return Ok(df.clone());
    }
    let options = StrptimeOptions {
        format: Some("%B %d, %Y".into()),
        strict: false,
        ..Default::default()
    };
    let out = df
        .clone()
        .lazy()
        .with_columns([col(DATE_ADDED)
            .str()
            .strip_chars(lit(NULL))
            .str()
            .to_date(options)
            .alias(DATE_ADDED)])
        .collect()?;
    Ok(out)
}

pub fn handle_missing_values(
    df: &DataFrame,
    strategy: MissingValueStrategy,
) -> Result<DataFrame> {
    let lazy = df.clone().lazy();
    let out = match strategy {
        MissingValueStrategy::Fill => lazy.with_columns([
            col(DIRECTOR).fill_null(lit(NOT_AVAILABLE)),
            col(CAST).fill_null(lit(NOT_AVAILABLE)),
            col(COUNTRY).fill_null(lit(UNKNOWN)),
            col(RATING).fill_null(lit(NOT_RATED)),
        ]),
        MissingValueStrategy::Drop => lazy.filter(
            col(TITLE)
                .is_not_null()
                .and(col(TYPE).is_not_null())
                .and(col(RELEASE_YEAR).is_not_null()),
        ),
    }
    .collect()?;
    Ok(out)
}

fn digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// Split the compound `duration` column ("90 min" / "3 Seasons") into
/// `duration_minutes` for movies and `duration_seasons` for TV shows.
pub fn extract_duration_info(df: &DataFrame) -> Result<DataFrame> {
    let ty = df.column(TYPE)?.str()?;
    let duration = df.column(DURATION)?.str()?;

    let mut minutes: Vec<Option<f64>> = Vec::with_capacity(df.height());
    let mut seasons: Vec<Option<f64>> = Vec::with_capacity(df.height());
    for (t, d) in ty.into_iter().zip(duration) {
        let value = d
            .and_then(|s| digits().find(s))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        match t {
            Some(MOVIE) => {
                minutes.push(value);
                seasons.push(None);
            }
            Some(TV_SHOW) => {
                minutes.push(None);
                seasons.push(value);
            }
            _ => {
                minutes.push(None);
                seasons.push(None);
            }
        }
    }

    let mut out = df.clone();
    out.with_column(Series::new(DURATION_MINUTES.into(), minutes))?;
    out.with_column(Series::new(DURATION_SEASONS.into(), seasons))?;
    Ok(out)
}

/// Derive year/month/weekday/quarter columns from the parsed added-date.
pub fn extract_temporal_features(df: &DataFrame) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .with_columns([
            col(DATE_ADDED).dt().year().cast(DataType::Int32).alias(YEAR_ADDED),
            col(DATE_ADDED)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(MONTH_ADDED),
            col(DATE_ADDED).dt().to_string("%B").alias(MONTH_NAME),
            col(DATE_ADDED).dt().to_string("%A").alias(DAY_OF_WEEK),
            col(DATE_ADDED)
                .dt()
                .quarter()
                .cast(DataType::Int32)
                .alias(QUARTER_ADDED),
        ])
        .collect()?;
    Ok(out)
}

/// Years between release and platform addition. Negative differences (data
/// entry noise: added before release) are clamped to null.
pub fn calculate_content_lag(df: &DataFrame) -> Result<DataFrame> {
    let lag = col(YEAR_ADDED) - col(RELEASE_YEAR);
    let out = df
        .clone()
        .lazy()
        .with_columns([col(DATE_ADDED)
            .dt()
            .year()
            .cast(DataType::Int32)
            .alias(YEAR_ADDED)])
        .with_columns([when(lag.clone().lt(lit(0)))
            .then(lit(NULL))
            .otherwise(lag)
            .alias(CONTENT_LAG_YEARS)])
        .collect()?;
    Ok(out)
}

/// Years since release, against an injected current year so the derivation
/// stays a pure function of its inputs.
pub fn create_content_age(df: &DataFrame, current_year: i32) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .with_columns([(lit(current_year) - col(RELEASE_YEAR)).alias(CONTENT_AGE)])
        .collect()?;
    Ok(out)
}

/// The fixed cleaning sequence applied to a raw frame.
pub fn clean_frame(df: &DataFrame, current_year: i32) -> Result<DataFrame> {
    info!("converting date formats");
    let df = convert_date_added(df)?;
    info!("handling missing values");
    let df = handle_missing_values(&df, MissingValueStrategy::Fill)?;
    info!("extracting duration information");
    let df = extract_duration_info(&df)?;
    info!("extracting temporal features");
    let df = extract_temporal_features(&df)?;
    info!("calculating content lag");
    let df = calculate_content_lag(&df)?;
    info!("creating content age feature");
    let df = create_content_age(&df, current_year)?;
    info!("cleaning complete, final shape {:?}", df.shape());
    Ok(df)
}

/// Load the CSV at `path` and run the full cleaning pipeline against the
/// wall-clock year.
pub fn load_and_clean(path: &str) -> Result<DataFrame> {
    let df = data::load_csv(path)?;
    clean_frame(&df, chrono::Utc::now().year())
}

/// Dataset-level summary of a cleaned frame.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub total_records: usize,
    pub total_movies: usize,
    pub total_tv_shows: usize,
    pub unique_countries: usize,
    pub unique_directors: usize,
    pub unique_genres: usize,
    /// Earliest and latest added-dates, ISO formatted; None when no row has
    /// a parseable date.
    pub date_range: (Option<String>, Option<String>),
    pub release_year_range: (Option<i32>, Option<i32>),
    pub missing_values: BTreeMap<String, usize>,
}

pub fn summarize(df: &DataFrame) -> Result<CatalogSummary> {
    let ty = df.column(TYPE)?.str()?;
    let total_movies = ty.into_iter().filter(|t| *t == Some(MOVIE)).count();
    let total_tv_shows = ty.into_iter().filter(|t| *t == Some(TV_SHOW)).count();

    let unique_countries = df.column(COUNTRY)?.n_unique()?;
    let unique_directors = df.column(DIRECTOR)?.n_unique()?;
    let unique_genres = df.column(LISTED_IN)?.n_unique()?;

    let mut min_date: Option<i32> = None;
    let mut max_date: Option<i32> = None;
    for days in df.column(DATE_ADDED)?.date()?.into_iter().flatten() {
        min_date = Some(min_date.map_or(days, |m| m.min(days)));
        max_date = Some(max_date.map_or(days, |m| m.max(days)));
    }
    let format_days = |days: Option<i32>| {
        days.and_then(|d| chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163))
            .map(|d| d.to_string())
    };

    let mut min_year: Option<i32> = None;
    let mut max_year: Option<i32> = None;
    for year in df.column(RELEASE_YEAR)?.i32()?.into_iter().flatten() {
        min_year = Some(min_year.map_or(year, |m| m.min(year)));
        max_year = Some(max_year.map_or(year, |m| m.max(year)));
    }

    let missing_values = df
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect();

    Ok(CatalogSummary {
        total_records: df.height(),
        total_movies,
        total_tv_shows,
        unique_countries,
        unique_directors,
        unique_genres,
        date_range: (format_days(min_date), format_days(max_date)),
        release_year_range: (min_year, max_year),
        missing_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df!(
            TITLE => &[Some("Dark Waters"), Some("Crown Heights"), Some("Late Bloom")],
            TYPE => &[Some(MOVIE), Some(TV_SHOW), Some(MOVIE)],
            DIRECTOR => &[Some("Ana Reyes"), None, Some("Jun Park, Ana Reyes")],
            CAST => &[Some("M. Okafor, L. Chen"), None, Some("D. Novak")],
            COUNTRY => &[Some("India"), None, Some("France")],
            DATE_ADDED => &[Some("September 25, 2021"), Some("bad date"), Some("January 1, 1995")],
            RELEASE_YEAR => &[2019i32, 2020, 2000],
            RATING => &[Some("TV-MA"), None, Some("PG-13")],
            DURATION => &[Some("90 min"), Some("3 Seasons"), None],
            LISTED_IN => &[Some("Dramas, Thrillers"), Some("Dramas"), Some("Comedies")],
            DESCRIPTION => &[Some("A lawyer digs in."), Some("A long wait."), Some("Spring, at last.")],
        )
        .unwrap()
    }

    #[test]
    fn invalid_dates_become_null_not_errors() {
        let df = convert_date_added(&raw_frame()).unwrap();
        let dates = df.column(DATE_ADDED).unwrap();
        assert_eq!(dates.null_count(), 1);
    }

    #[test]
    fn sentinels_fill_missing_categoricals() {
        let df = handle_missing_values(&raw_frame(), MissingValueStrategy::Fill).unwrap();
        let director = df.column(DIRECTOR).unwrap().str().unwrap();
        assert_eq!(director.get(1), Some(NOT_AVAILABLE));
        let country = df.column(COUNTRY).unwrap().str().unwrap();
        assert_eq!(country.get(1), Some(UNKNOWN));
        let rating = df.column(RATING).unwrap().str().unwrap();
        assert_eq!(rating.get(1), Some(NOT_RATED));
    }

    #[test]
    fn duration_splits_by_content_type() {
        let df = extract_duration_info(&raw_frame()).unwrap();
        let minutes = df.column(DURATION_MINUTES).unwrap().f64().unwrap();
        let seasons = df.column(DURATION_SEASONS).unwrap().f64().unwrap();
        assert_eq!(minutes.get(0), Some(90.0));
        assert_eq!(seasons.get(0), None);
        assert_eq!(minutes.get(1), None);
        assert_eq!(seasons.get(1), Some(3.0));
        assert_eq!(minutes.get(2), None);
    }

    #[test]
    fn negative_lag_is_clamped_to_null() {
        // Released in 2000 but "added" in 1995: the lag would be -5.
        let df = clean_frame(&raw_frame(), 2026).unwrap();
        let lag = df.column(CONTENT_LAG_YEARS).unwrap().i32().unwrap();
        assert_eq!(lag.get(0), Some(2));
        assert_eq!(lag.get(1), None); // unparseable date
        assert_eq!(lag.get(2), None); // clamped
    }

    #[test]
    fn content_age_is_exact() {
        let df = clean_frame(&raw_frame(), 2026).unwrap();
        let age = df.column(CONTENT_AGE).unwrap().i32().unwrap();
        assert_eq!(age.get(0), Some(7));
        assert_eq!(age.get(1), Some(6));
        assert_eq!(age.get(2), Some(26));
    }

    #[test]
    fn lag_is_null_or_non_negative_for_all_rows() {
        let df = clean_frame(&raw_frame(), 2026).unwrap();
        let lag = df.column(CONTENT_LAG_YEARS).unwrap().i32().unwrap();
        assert!(lag.into_iter().flatten().all(|v| v >= 0));
    }

    #[test]
    fn cleaning_is_deterministic() {
        let raw = raw_frame();
        let once = clean_frame(&raw, 2026).unwrap();
        let twice = clean_frame(&raw, 2026).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn cleaning_its_own_output_changes_nothing() {
        let once = clean_frame(&raw_frame(), 2026).unwrap();
        let again = clean_frame(&once, 2026).unwrap();
        assert!(once.equals_missing(&again));
    }

    #[test]
    fn parsed_dates_pass_through_unchanged() {
        let parsed = convert_date_added(&raw_frame()).unwrap();
        let reparsed = convert_date_added(&parsed).unwrap();
        assert_eq!(
            reparsed.column(DATE_ADDED).unwrap().null_count(),
            parsed.column(DATE_ADDED).unwrap().null_count()
        );
        assert!(parsed.equals_missing(&reparsed));
    }

    #[test]
    fn cleaning_leaves_the_input_frame_untouched() {
        let raw = raw_frame();
        let before = raw.clone();
        let _ = clean_frame(&raw, 2026).unwrap();
        assert!(raw.equals_missing(&before));
    }

    #[test]
    fn drop_strategy_removes_incomplete_rows() {
        let df = df!(
            TITLE => &[Some("Kept"), None],
            TYPE => &[Some(MOVIE), Some(MOVIE)],
            RELEASE_YEAR => &[Some(2020i32), Some(2021)],
        )
        .unwrap();
        let out = handle_missing_values(&df, MissingValueStrategy::Drop).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn summary_counts_types_and_nulls() {
        let df = clean_frame(&raw_frame(), 2026).unwrap();
        let summary = summarize(&df).unwrap();
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_movies, 2);
        assert_eq!(summary.total_tv_shows, 1);
        assert_eq!(summary.release_year_range, (Some(2000), Some(2020)));
        assert_eq!(summary.missing_values[DATE_ADDED], 1);
    }
}
