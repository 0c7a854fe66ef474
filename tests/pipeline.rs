//! End-to-end pipeline test: a catalog CSV written to disk, loaded, cleaned
//! and reduced to aggregates and artifacts.

use std::io::Write;

use streamlens::data::*;
use streamlens::{analysis, clean, geo, insights};

const SAMPLE_CSV: &str = "\
title,type,director,cast,country,date_added,release_year,rating,duration,listed_in,description
Dark Waters,Movie,Ana Reyes,\"M. Okafor, L. Chen\",India,\"September 25, 2021\",2019,TV-MA,98 min,\"Dramas, Thrillers\",A lawyer takes on a chemical giant.
Crown Heights,TV Show,,\"D. Novak, M. Okafor\",India,\"June 11, 2020\",2018,TV-14,2 Seasons,Dramas,A neighborhood remembers.
Late Bloom,Movie,\"Jun Park, Ana Reyes\",,France,\"January 1, 1995\",2000,PG-13,104 min,Comedies,Spring arrives late for everyone.
Paper Lanterns,Movie,,,,,2012,,88 min,\"Documentaries, International Movies\",Festival lights over the river.
Night Grid,TV Show,Sofia Brandt,L. Chen,South Korea,\"March 4, 2021\",2021,TV-MA,1 Season,\"Crime TV Shows, Dramas\",A detective rewires the city.
";

fn write_sample(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("catalog.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn load_and_clean_derives_all_columns() {
    let dir = tempfile::tempdir().unwrap();
    let df = clean::load_and_clean(&write_sample(&dir)).unwrap();

    assert_eq!(df.height(), 5);
    for column in [
        YEAR_ADDED,
        MONTH_ADDED,
        MONTH_NAME,
        DAY_OF_WEEK,
        QUARTER_ADDED,
        DURATION_MINUTES,
        DURATION_SEASONS,
        CONTENT_LAG_YEARS,
        CONTENT_AGE,
    ] {
        assert!(
            df.get_column_names().iter().any(|c| c.as_str() == column),
            "missing derived column {column}"
        );
    }

    // Sentinels landed where the CSV had gaps.
    let country = df.column(COUNTRY).unwrap().str().unwrap();
    assert_eq!(country.get(3), Some(UNKNOWN));
    let rating = df.column(RATING).unwrap().str().unwrap();
    assert_eq!(rating.get(3), Some(NOT_RATED));

    // Lag is null or non-negative everywhere; Late Bloom (added 1995,
    // released 2000) is the clamped case.
    let lag = df.column(CONTENT_LAG_YEARS).unwrap().i32().unwrap();
    assert!(lag.into_iter().flatten().all(|v| v >= 0));
    assert_eq!(lag.get(2), None);
}

#[test]
fn cleaning_twice_gives_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);
    let once = clean::load_and_clean(&path).unwrap();
    let twice = clean::load_and_clean(&path).unwrap();
    assert!(once.equals_missing(&twice));
}

#[test]
fn aggregates_match_the_sample() {
    let dir = tempfile::tempdir().unwrap();
    let df = clean::load_and_clean(&write_sample(&dir)).unwrap();

    let countries = analysis::top_countries(&df, 3).unwrap();
    assert_eq!(countries[0], ("India".to_string(), 2));

    let comparison = analysis::compare_movies_vs_tv_shows(&df).unwrap();
    assert_eq!(comparison.count.movies, 3);
    assert_eq!(comparison.count.tv_shows, 2);

    // Exploded genre counts cover every row at least once.
    let genre_total: u32 = analysis::count_exploded(&df, LISTED_IN, None)
        .unwrap()
        .iter()
        .map(|(_, c)| c)
        .sum();
    assert!(genre_total as usize >= df.height());

    // "Not Available" never appears in people rankings.
    let directors = analysis::top_directors(&df, 10).unwrap();
    assert!(directors.iter().all(|(d, _)| d != NOT_AVAILABLE));
    assert_eq!(
        directors.iter().find(|(d, _)| d == "Ana Reyes").map(|(_, c)| *c),
        Some(2)
    );
}

#[test]
fn insights_run_on_the_sample() {
    let dir = tempfile::tempdir().unwrap();
    let df = clean::load_and_clean(&write_sample(&dir)).unwrap();

    let summary = insights::executive_summary(&df).unwrap();
    assert_eq!(summary.total_titles, 5);
    assert_eq!(summary.top_genre.as_deref(), Some("Dramas"));

    // India and South Korea both sit in the top-3 markets.
    let recs = insights::business_recommendations(&df).unwrap();
    assert!(recs.iter().any(|r| r.category == "Geographic Expansion"));

    let gaps = insights::content_gaps(&df).unwrap();
    let emerging: Vec<&str> = gaps
        .emerging_genres
        .iter()
        .map(|(g, _)| g.as_str())
        .collect();
    assert!(emerging.contains(&"Dramas"));
}

#[test]
fn typed_records_materialize_from_the_cleaned_frame() {
    let dir = tempfile::tempdir().unwrap();
    let df = clean::load_and_clean(&write_sample(&dir)).unwrap();
    let records = records(&df).unwrap();

    assert_eq!(records.len(), 5);
    let dark_waters = &records[0];
    assert_eq!(dark_waters.title, "Dark Waters");
    assert_eq!(dark_waters.content_type, Some(ContentType::Movie));
    assert_eq!(dark_waters.genres, vec!["Dramas", "Thrillers"]);
    assert_eq!(dark_waters.duration_minutes, Some(98.0));
    assert_eq!(dark_waters.year_added, Some(2021));
    assert_eq!(dark_waters.month_name.as_deref(), Some("September"));
    assert_eq!(dark_waters.day_of_week.as_deref(), Some("Saturday"));
    assert_eq!(dark_waters.content_lag_years, Some(2));

    let night_grid = &records[4];
    assert_eq!(night_grid.content_type, Some(ContentType::TvShow));
    assert_eq!(night_grid.duration_seasons, Some(1.0));
    assert_eq!(night_grid.duration_minutes, None);
}

#[test]
fn geographic_artifact_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let df = clean::load_and_clean(&write_sample(&dir)).unwrap();

    let out = dir.path().join("geo.html");
    geo::render_geographic_html(&df, &out).unwrap();
    assert!(out.exists());
}
