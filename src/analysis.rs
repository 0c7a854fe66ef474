//! Descriptive aggregates and rankings over the cleaned table.
//!
//! Multi-valued fields (genres, cast, directors) are exploded by an explicit
//! flat-map on the list delimiter before counting. Rankings sort by
//! descending count with ascending lexicographic value as the tie-break, so
//! equal-count entries order the same on every run.

use std::collections::BTreeMap;

use ahash::{HashMap, HashSet};
use polars::prelude::*;
use serde::Serialize;

use crate::data::*;
use crate::error::Result;

/// Calendar month names in order, as produced by the temporal derivation.
pub const MONTH_ORDER: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday names in order.
pub const DAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// An ordered ranking of values with their counts.
pub type Ranking = Vec<(String, u32)>;

fn rank(counts: HashMap<String, u32>) -> Ranking {
    let mut out: Vec<_> = counts.into_iter().collect();
    out.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Flat-map a delimited column into one `(row, value)` entry per element.
/// Nulls contribute a single "missing" entry, so every row contributes at
/// least one value.
pub fn explode_column(df: &DataFrame, column: &str) -> Result<Vec<(usize, String)>> {
    let values = df.column(column)?.str()?;
    let mut out = Vec::with_capacity(df.height());
    for (row, value) in values.into_iter().enumerate() {
        match value {
            Some(v) => {
                for part in v.split(LIST_DELIMITER) {
                    let part = part.trim();
                    if !part.is_empty() {
                        out.push((row, part.to_string()));
                    }
                }
            }
            None => out.push((row, "missing".to_string())),
        }
    }
    Ok(out)
}

/// Count exploded values of a delimited column, optionally excluding one
/// sentinel from the tally.
pub fn count_exploded(df: &DataFrame, column: &str, exclude: Option<&str>) -> Result<Ranking> {
    let mut counts: HashMap<String, u32> = HashMap::default();
    for (_, value) in explode_column(df, column)? {
        if exclude == Some(value.as_str()) {
            continue;
        }
        *counts.entry(value).or_insert(0) += 1;
    }
    Ok(rank(counts))
}

/// Count whole (non-exploded) values of a string column, skipping nulls.
pub fn count_column(df: &DataFrame, column: &str) -> Result<Ranking> {
    let values = df.column(column)?.str()?;
    let mut counts: HashMap<String, u32> = HashMap::default();
    for value in values.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    Ok(rank(counts))
}

fn top_n(mut ranking: Ranking, n: usize) -> Ranking {
    ranking.truncate(n);
    ranking
}

pub fn top_genres(df: &DataFrame, n: usize) -> Result<Ranking> {
    Ok(top_n(count_exploded(df, LISTED_IN, None)?, n))
}

/// Countries are counted as whole strings; co-productions keep their
/// compound label, matching the country column's single-value treatment.
pub fn top_countries(df: &DataFrame, n: usize) -> Result<Ranking> {
    Ok(top_n(count_column(df, COUNTRY)?, n))
}

pub fn top_directors(df: &DataFrame, n: usize) -> Result<Ranking> {
    Ok(top_n(count_exploded(df, DIRECTOR, Some(NOT_AVAILABLE))?, n))
}

pub fn top_actors(df: &DataFrame, n: usize) -> Result<Ranking> {
    Ok(top_n(count_exploded(df, CAST, Some(NOT_AVAILABLE))?, n))
}

fn filter_type(df: &DataFrame, label: &str) -> Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .filter(col(TYPE).eq(lit(label)))
        .collect()?)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    // Empty input divides by zero on purpose: NaN, host float semantics.
    sum / count as f64
}

fn mean_i32_column(df: &DataFrame, column: &str) -> Result<f64> {
    let values = df.column(column)?.i32()?;
    Ok(mean(values.into_iter().flatten().map(f64::from)))
}

/// Movie/TV split for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub movies: u32,
    pub tv_shows: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyAnalysis {
    pub releases_by_year: BTreeMap<i32, u32>,
    pub additions_by_year: BTreeMap<i32, u32>,
    pub avg_content_lag: BTreeMap<i32, f64>,
    pub content_type_by_year: BTreeMap<i32, TypeCounts>,
}

/// Yearly release/addition trends and per-year mean content lag.
pub fn content_by_year(df: &DataFrame) -> Result<YearlyAnalysis> {
    let release_year = df.column(RELEASE_YEAR)?.i32()?;
    let year_added = df.column(YEAR_ADDED)?.i32()?;
    let ty = df.column(TYPE)?.str()?;
    let lag = df.column(CONTENT_LAG_YEARS)?.i32()?;

    let mut releases_by_year: BTreeMap<i32, u32> = BTreeMap::new();
    for year in release_year.into_iter().flatten() {
        *releases_by_year.entry(year).or_insert(0) += 1;
    }

    let mut additions_by_year: BTreeMap<i32, u32> = BTreeMap::new();
    let mut lag_sums: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    let mut content_type_by_year: BTreeMap<i32, TypeCounts> = BTreeMap::new();
    for i in 0..df.height() {
        let Some(year) = year_added.get(i) else {
            continue;
        };
        *additions_by_year.entry(year).or_insert(0) += 1;
        if let Some(l) = lag.get(i) {
            let entry = lag_sums.entry(year).or_insert((0.0, 0));
            entry.0 += f64::from(l);
            entry.1 += 1;
        }
        let split = content_type_by_year.entry(year).or_default();
        match ty.get(i) {
            Some(MOVIE) => split.movies += 1,
            Some(TV_SHOW) => split.tv_shows += 1,
            _ => {}
        }
    }

    let avg_content_lag = lag_sums
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / f64::from(count)))
        .collect();

    Ok(YearlyAnalysis {
        releases_by_year,
        additions_by_year,
        avg_content_lag,
        content_type_by_year,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryAnalysis {
    pub total_content: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub top_genres: Ranking,
    pub top_directors: Ranking,
    pub avg_release_year: f64,
    pub rating_distribution: Ranking,
}

/// Per-country slice of the catalog, matched on the whole country string.
pub fn content_by_country(df: &DataFrame, country: &str) -> Result<CountryAnalysis> {
    let subset = df
        .clone()
        .lazy()
        .filter(col(COUNTRY).eq(lit(country)))
        .collect()?;

    let movies = filter_type(&subset, MOVIE)?.height();
    let tv_shows = filter_type(&subset, TV_SHOW)?.height();

    Ok(CountryAnalysis {
        total_content: subset.height(),
        movies,
        tv_shows,
        top_genres: top_genres(&subset, 5)?,
        top_directors: top_directors(&subset, 5)?,
        avg_release_year: mean_i32_column(&subset, RELEASE_YEAR)?,
        rating_distribution: count_column(&subset, RATING)?,
    })
}

/// Year-by-genre cross-tab restricted to the all-time top-10 genres.
/// Outer key: added-year; inner: genre → count.
pub fn genre_trends(df: &DataFrame) -> Result<BTreeMap<i32, BTreeMap<String, u32>>> {
    let top: HashSet<String> = top_genres(df, 10)?.into_iter().map(|(g, _)| g).collect();
    let year_added = df.column(YEAR_ADDED)?.i32()?;

    let mut trends: BTreeMap<i32, BTreeMap<String, u32>> = BTreeMap::new();
    for (row, genre) in explode_column(df, LISTED_IN)? {
        if !top.contains(&genre) {
            continue;
        }
        if let Some(year) = year_added.get(row) {
            *trends.entry(year).or_default().entry(genre).or_insert(0) += 1;
        }
    }
    Ok(trends)
}

#[derive(Debug, Clone, Serialize)]
pub struct DiversityMetrics {
    pub unique_countries: usize,
    pub unique_directors: usize,
    pub unique_actors: usize,
    pub unique_genres: usize,
    pub unique_ratings: usize,
    /// Movies per TV show. Unguarded: a catalog with no TV shows yields
    /// infinity.
    pub movie_tv_ratio: f64,
}

pub fn diversity_metrics(df: &DataFrame) -> Result<DiversityMetrics> {
    let unique_exploded = |column: &str| -> Result<usize> {
        let mut seen: HashSet<String> = HashSet::default();
        for (_, value) in explode_column(df, column)? {
            seen.insert(value);
        }
        Ok(seen.len())
    };

    let movies = filter_type(df, MOVIE)?.height();
    let tv_shows = filter_type(df, TV_SHOW)?.height();

    Ok(DiversityMetrics {
        unique_countries: df.column(COUNTRY)?.n_unique()?,
        unique_directors: unique_exploded(DIRECTOR)?,
        unique_actors: unique_exploded(CAST)?,
        unique_genres: unique_exploded(LISTED_IN)?,
        unique_ratings: df.column(RATING)?.n_unique()?,
        movie_tv_ratio: movies as f64 / tv_shows as f64,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchTiming {
    pub best_month: Option<String>,
    pub best_day: Option<String>,
    pub best_quarter: Option<i32>,
    /// Calendar-ordered month distribution, months with no additions
    /// included as zero.
    pub month_distribution: Vec<(String, u32)>,
    pub day_distribution: Vec<(String, u32)>,
    pub quarter_distribution: BTreeMap<i32, u32>,
}

fn ordered_distribution(counts: &HashMap<String, u32>, order: &[&str]) -> Vec<(String, u32)> {
    order
        .iter()
        .map(|name| (name.to_string(), counts.get(*name).copied().unwrap_or(0)))
        .collect()
}

// Ties on the peak resolve to the earliest calendar slot.
fn peak(distribution: &[(String, u32)]) -> Option<String> {
    let max = distribution.iter().map(|(_, c)| *c).max()?;
    if max == 0 {
        return None;
    }
    distribution
        .iter()
        .find(|(_, c)| *c == max)
        .map(|(name, _)| name.clone())
}

/// When does the platform add content? Peaks by month, weekday and quarter.
pub fn launch_timing(df: &DataFrame) -> Result<LaunchTiming> {
    let mut month_counts: HashMap<String, u32> = HashMap::default();
    for value in df.column(MONTH_NAME)?.str()?.into_iter().flatten() {
        *month_counts.entry(value.to_string()).or_insert(0) += 1;
    }
    let mut day_counts: HashMap<String, u32> = HashMap::default();
    for value in df.column(DAY_OF_WEEK)?.str()?.into_iter().flatten() {
        *day_counts.entry(value.to_string()).or_insert(0) += 1;
    }
    let mut quarter_distribution: BTreeMap<i32, u32> = BTreeMap::new();
    for value in df.column(QUARTER_ADDED)?.i32()?.into_iter().flatten() {
        *quarter_distribution.entry(value).or_insert(0) += 1;
    }

    let month_distribution = ordered_distribution(&month_counts, &MONTH_ORDER);
    let day_distribution = ordered_distribution(&day_counts, &DAY_ORDER);
    let best_quarter = quarter_distribution
        .iter()
        .max_by_key(|&(&quarter, &count)| (count, std::cmp::Reverse(quarter)))
        .map(|(quarter, _)| *quarter);

    Ok(LaunchTiming {
        best_month: peak(&month_distribution),
        best_day: peak(&day_distribution),
        best_quarter,
        month_distribution,
        day_distribution,
        quarter_distribution,
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TypeMeans {
    pub movies: f64,
    pub tv_shows: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeComparison {
    pub count: TypeCounts,
    pub avg_release_year: TypeMeans,
    pub avg_content_lag: TypeMeans,
    pub top_countries: TypeRankings,
    pub top_ratings: TypeRankings,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeRankings {
    pub movies: Ranking,
    pub tv_shows: Ranking,
}

/// Side-by-side characteristics of movies and TV shows.
pub fn compare_movies_vs_tv_shows(df: &DataFrame) -> Result<TypeComparison> {
    let movies = filter_type(df, MOVIE)?;
    let tv_shows = filter_type(df, TV_SHOW)?;

    Ok(TypeComparison {
        count: TypeCounts {
            movies: movies.height() as u32,
            tv_shows: tv_shows.height() as u32,
        },
        avg_release_year: TypeMeans {
            movies: mean_i32_column(&movies, RELEASE_YEAR)?,
            tv_shows: mean_i32_column(&tv_shows, RELEASE_YEAR)?,
        },
        avg_content_lag: TypeMeans {
            movies: mean_i32_column(&movies, CONTENT_LAG_YEARS)?,
            tv_shows: mean_i32_column(&tv_shows, CONTENT_LAG_YEARS)?,
        },
        top_countries: TypeRankings {
            movies: top_countries(&movies, 5)?,
            tv_shows: top_countries(&tv_shows, 5)?,
        },
        top_ratings: TypeRankings {
            movies: top_n(count_column(&movies, RATING)?, 5),
            tv_shows: top_n(count_column(&tv_shows, RATING)?, 5),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean;

    fn cleaned(raw: DataFrame) -> DataFrame {
        clean::clean_frame(&raw, 2026).unwrap()
    }

    fn two_country_frame() -> DataFrame {
        df!(
            TITLE => &["A", "B"],
            TYPE => &[MOVIE, TV_SHOW],
            DIRECTOR => &[Some("Ana Reyes"), None],
            CAST => &[Some("M. Okafor"), None],
            COUNTRY => &[Some("India"), Some("India")],
            DATE_ADDED => &[Some("March 4, 2021"), Some("June 11, 2020")],
            RELEASE_YEAR => &[2019i32, 2018],
            RATING => &[Some("TV-MA"), Some("TV-14")],
            DURATION => &[Some("101 min"), Some("2 Seasons")],
            LISTED_IN => &[Some("Dramas, Comedies"), Some("Dramas")],
            DESCRIPTION => &[Some("one"), Some("two")],
        )
        .unwrap()
    }

    #[test]
    fn top_countries_counts_whole_values() {
        let df = cleaned(two_country_frame());
        assert_eq!(top_countries(&df, 10).unwrap(), vec![("India".into(), 2)]);
    }

    #[test]
    fn comparison_counts_each_type_once() {
        let df = cleaned(two_country_frame());
        let cmp = compare_movies_vs_tv_shows(&df).unwrap();
        assert_eq!(cmp.count, TypeCounts { movies: 1, tv_shows: 1 });
    }

    #[test]
    fn genres_explode_into_independent_tallies() {
        let df = cleaned(two_country_frame());
        let genres = top_genres(&df, 10).unwrap();
        assert_eq!(
            genres,
            vec![("Dramas".into(), 2), ("Comedies".into(), 1)]
        );
    }

    #[test]
    fn exploded_count_covers_every_row() {
        let df = cleaned(two_country_frame());
        let total: u32 = count_exploded(&df, LISTED_IN, None)
            .unwrap()
            .iter()
            .map(|(_, c)| c)
            .sum();
        assert!(total as usize >= df.height());
    }

    #[test]
    fn director_ranking_excludes_sentinel() {
        let df = cleaned(two_country_frame());
        let directors = top_directors(&df, 10).unwrap();
        assert_eq!(directors, vec![("Ana Reyes".into(), 1)]);
    }

    #[test]
    fn equal_counts_break_ties_lexicographically() {
        let counts: HashMap<String, u32> = [("Zebra", 2), ("Alpha", 2), ("Mid", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let ranked = rank(counts);
        assert_eq!(
            ranked,
            vec![
                ("Mid".into(), 3),
                ("Alpha".into(), 2),
                ("Zebra".into(), 2)
            ]
        );
    }

    #[test]
    fn yearly_analysis_groups_by_added_year() {
        let df = cleaned(two_country_frame());
        let yearly = content_by_year(&df).unwrap();
        assert_eq!(yearly.additions_by_year[&2021], 1);
        assert_eq!(yearly.additions_by_year[&2020], 1);
        assert_eq!(yearly.avg_content_lag[&2021], 2.0);
        assert_eq!(
            yearly.content_type_by_year[&2020],
            TypeCounts { movies: 0, tv_shows: 1 }
        );
    }

    #[test]
    fn launch_timing_finds_peaks_and_keeps_calendar_order() {
        let df = cleaned(two_country_frame());
        let timing = launch_timing(&df).unwrap();
        assert_eq!(timing.month_distribution.len(), 12);
        assert_eq!(timing.month_distribution[0].0, "January");
        // One addition each in March and June; earliest calendar slot wins.
        assert_eq!(timing.best_month.as_deref(), Some("March"));
        assert_eq!(timing.best_quarter, Some(1));
    }

    #[test]
    fn country_analysis_slices_on_whole_country() {
        let df = cleaned(two_country_frame());
        let india = content_by_country(&df, "India").unwrap();
        assert_eq!(india.total_content, 2);
        assert_eq!(india.movies, 1);
        assert_eq!(india.tv_shows, 1);
        assert_eq!(india.avg_release_year, 2018.5);

        let nowhere = content_by_country(&df, "Atlantis").unwrap();
        assert_eq!(nowhere.total_content, 0);
        assert!(nowhere.avg_release_year.is_nan());
    }

    #[test]
    fn diversity_counts_exploded_fields() {
        let df = cleaned(two_country_frame());
        let metrics = diversity_metrics(&df).unwrap();
        assert_eq!(metrics.unique_countries, 1);
        assert_eq!(metrics.unique_genres, 2);
        assert_eq!(metrics.movie_tv_ratio, 1.0);
    }

    #[test]
    fn genre_trends_only_track_top_genres() {
        let df = cleaned(two_country_frame());
        let trends = genre_trends(&df).unwrap();
        assert_eq!(trends[&2021]["Dramas"], 1);
        assert_eq!(trends[&2021]["Comedies"], 1);
        assert_eq!(trends[&2020]["Dramas"], 1);
    }
}
