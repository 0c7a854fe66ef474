//! Gap analysis, the recommendation rule battery and the executive summary.
//!
//! Recommendations are a fixed set of independent threshold rules; each one
//! that fires appends a static finding/action/priority triple. There is no
//! weighting and no conflict resolution between rules.

use ahash::HashSet;
use polars::prelude::*;
use serde::Serialize;

use crate::analysis::{self, Ranking};
use crate::data::*;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct ContentGaps {
    /// Genres at or below the 25th-percentile count.
    pub underrepresented_genres: Ranking,
    /// Top-10 genres within the most recent three added-years.
    pub emerging_genres: Ranking,
    /// All-time top-10 genres absent from the recent top-10.
    pub declining_genres: Vec<String>,
}

// Linear interpolation between the two nearest order statistics.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => f64::NAN,
        [only] => *only,
        _ => {
            let pos = q * (sorted.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn recent_years_frame(df: &DataFrame, span: i32) -> Result<DataFrame> {
    let mut max_year: Option<i32> = None;
    for year in df.column(YEAR_ADDED)?.i32()?.into_iter().flatten() {
        max_year = Some(max_year.map_or(year, |m| m.max(year)));
    }
    let Some(max_year) = max_year else {
        // No parseable added-dates at all; recent slice is empty.
        return Ok(df.head(Some(0)));
    };
    Ok(df
        .clone()
        .lazy()
        .filter(col(YEAR_ADDED).gt_eq(lit(max_year - (span - 1))))
        .collect()?)
}

/// Underrepresented, emerging and declining genres.
pub fn content_gaps(df: &DataFrame) -> Result<ContentGaps> {
    let all_genres = analysis::count_exploded(df, LISTED_IN, None)?;

    let mut counts: Vec<f64> = all_genres.iter().map(|(_, c)| f64::from(*c)).collect();
    counts.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = percentile(&counts, 0.25);
    let underrepresented_genres: Ranking = all_genres
        .iter()
        .filter(|(_, c)| f64::from(*c) <= threshold)
        .cloned()
        .collect();

    let recent = recent_years_frame(df, 3)?;
    let emerging_genres = analysis::top_genres(&recent, 10)?;

    let recent_set: HashSet<&str> = emerging_genres.iter().map(|(g, _)| g.as_str()).collect();
    let declining_genres = all_genres
        .iter()
        .take(10)
        .filter(|(g, _)| !recent_set.contains(g.as_str()))
        .map(|(g, _)| g.clone())
        .collect();

    Ok(ContentGaps {
        underrepresented_genres,
        emerging_genres,
        declining_genres,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub category: String,
    pub finding: String,
    pub recommendation: String,
    pub priority: Priority,
}

/// Ratings considered mature-audience for the diversification rule.
const MATURE_RATINGS: [&str; 3] = ["TV-MA", "R", "TV-14"];

/// Run the fixed rule battery against the cleaned catalog.
pub fn business_recommendations(df: &DataFrame) -> Result<Vec<Recommendation>> {
    let mut recommendations = Vec::new();
    let total = df.height();

    let ty = df.column(TYPE)?.str()?;
    let movie_count = ty.into_iter().filter(|t| *t == Some(MOVIE)).count();
    let movie_ratio = movie_count as f64 / total as f64;
    if movie_ratio > 0.7 {
        recommendations.push(Recommendation {
            category: "Content Balance".to_string(),
            finding: format!("Movies comprise {:.1}% of catalog", movie_ratio * 100.0),
            recommendation: "Increase TV show production to improve subscriber retention"
                .to_string(),
            priority: Priority::High,
        });
    }

    let top_countries = analysis::top_countries(df, 3)?;
    if top_countries
        .iter()
        .any(|(c, _)| c == "India" || c == "South Korea")
    {
        recommendations.push(Recommendation {
            category: "Geographic Expansion".to_string(),
            finding: "Strong presence in high-growth Asian markets".to_string(),
            recommendation: "Triple investment in Indian and Korean content".to_string(),
            priority: Priority::VeryHigh,
        });
    }

    let timing = analysis::launch_timing(df)?;
    if let (Some(month), Some(day)) = (&timing.best_month, &timing.best_day) {
        recommendations.push(Recommendation {
            category: "Launch Strategy".to_string(),
            finding: format!("Peak additions in {month} on {day}"),
            recommendation: format!("Schedule major releases for {day}s in {month}"),
            priority: Priority::Medium,
        });
    }

    let lag = df.column(CONTENT_LAG_YEARS)?.i32()?;
    let mut lag_sum = 0.0;
    let mut lag_count = 0u32;
    for v in lag.into_iter().flatten() {
        lag_sum += f64::from(v);
        lag_count += 1;
    }
    let avg_lag = lag_sum / f64::from(lag_count);
    if avg_lag > 3.0 {
        recommendations.push(Recommendation {
            category: "Content Freshness".to_string(),
            finding: format!("Average content lag is {avg_lag:.1} years"),
            recommendation:
                "Increase original content production to reduce dependency on catalog acquisitions"
                    .to_string(),
            priority: Priority::High,
        });
    }

    let rating = df.column(RATING)?.str()?;
    let mature = rating
        .into_iter()
        .flatten()
        .filter(|r| MATURE_RATINGS.contains(r))
        .count();
    let mature_fraction = mature as f64 / total as f64;
    if mature_fraction > 0.75 {
        recommendations.push(Recommendation {
            category: "Audience Diversification".to_string(),
            finding: format!(
                "{:.1}% of content targets mature audiences",
                mature_fraction * 100.0
            ),
            recommendation: "Expand family-friendly content to capture broader demographic"
                .to_string(),
            priority: Priority::Medium,
        });
    }

    Ok(recommendations)
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentSplit {
    pub movies: String,
    pub tv_shows: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeographicReach {
    pub countries: usize,
    pub top_market: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentRecency {
    pub avg_release_year: i32,
    pub avg_content_age: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub total_titles: usize,
    pub content_split: ContentSplit,
    pub geographic_reach: GeographicReach,
    pub content_recency: ContentRecency,
    pub top_genre: Option<String>,
    pub primary_rating: Option<String>,
    pub key_insight: String,
}

fn mean_i32(df: &DataFrame, column: &str) -> Result<f64> {
    let values = df.column(column)?.i32()?;
    let mut sum = 0.0;
    let mut count = 0u32;
    for v in values.into_iter().flatten() {
        sum += f64::from(v);
        count += 1;
    }
    Ok(sum / f64::from(count))
}

/// TV share over the last four added-years, against a 0.4 threshold.
pub fn key_insight(df: &DataFrame) -> Result<String> {
    let recent = recent_years_frame(df, 4)?;
    let ty = recent.column(TYPE)?.str()?;
    let tv = ty.into_iter().filter(|t| *t == Some(TV_SHOW)).count();
    let tv_share = tv as f64 / recent.height() as f64;

    Ok(if tv_share > 0.4 {
        "Platform shifting focus toward TV shows with 40%+ of recent additions being series content"
            .to_string()
    } else {
        "Platform maintaining traditional movie-focused strategy with selective TV show additions"
            .to_string()
    })
}

/// Headline metrics for the whole catalog.
pub fn executive_summary(df: &DataFrame) -> Result<ExecutiveSummary> {
    let total = df.height();
    let ty = df.column(TYPE)?.str()?;
    let movies = ty.into_iter().filter(|t| *t == Some(MOVIE)).count();
    let tv_shows = ty.into_iter().filter(|t| *t == Some(TV_SHOW)).count();

    Ok(ExecutiveSummary {
        total_titles: total,
        content_split: ContentSplit {
            movies: format!("{:.1}%", movies as f64 / total as f64 * 100.0),
            tv_shows: format!("{:.1}%", tv_shows as f64 / total as f64 * 100.0),
        },
        geographic_reach: GeographicReach {
            countries: df.column(COUNTRY)?.n_unique()?,
            top_market: analysis::top_countries(df, 1)?.pop().map(|(c, _)| c),
        },
        content_recency: ContentRecency {
            avg_release_year: mean_i32(df, RELEASE_YEAR)? as i32,
            avg_content_age: format!("{:.1} years", mean_i32(df, CONTENT_AGE)?),
        },
        top_genre: analysis::top_genres(df, 1)?.pop().map(|(g, _)| g),
        primary_rating: analysis::count_column(df, RATING)?.first().map(|(r, _)| r.clone()),
        key_insight: key_insight(df)?,
    })
}
