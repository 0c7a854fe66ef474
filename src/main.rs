use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use streamlens::data::ContentType;
use streamlens::style::ChartStyle;
use streamlens::{analysis, clean, geo, insights, viz};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .context("usage: streamlens <catalog.csv> [out_dir]")?;
    let out_dir = env::args().nth(2).unwrap_or_else(|| "charts".to_string());
    let out = Path::new(&out_dir);
    fs::create_dir_all(out)?;

    let df = clean::load_and_clean(&path)?;

    println!("== Data summary ==");
    println!("{}", serde_json::to_string_pretty(&clean::summarize(&df)?)?);

    println!("\n== Executive summary ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&insights::executive_summary(&df)?)?
    );

    println!("\n== Diversity metrics ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&analysis::diversity_metrics(&df)?)?
    );

    println!("\n== Content gaps ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&insights::content_gaps(&df)?)?
    );

    println!("\n== Recommendations ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&insights::business_recommendations(&df)?)?
    );

    let style = ChartStyle::default();
    viz::render_content_distribution(&df, &style, &out.join("content_distribution.png"))?;
    viz::render_top_countries(&df, 10, &style, &out.join("top_countries.png"))?;
    viz::render_genre_distribution(&df, 15, &style, &out.join("genre_distribution.png"))?;
    viz::render_release_year_trend(&df, &style, &out.join("release_year_trend.png"))?;
    viz::render_additions_by_month(&df, &style, &out.join("additions_by_month.png"))?;
    viz::render_additions_by_day(&df, &style, &out.join("additions_by_day.png"))?;
    viz::render_rating_distribution(&df, &style, &out.join("rating_distribution.png"))?;
    viz::render_duration_distribution(
        &df,
        ContentType::Movie,
        &style,
        &out.join("movie_durations.png"),
    )?;
    viz::render_duration_distribution(
        &df,
        ContentType::TvShow,
        &style,
        &out.join("tv_seasons.png"),
    )?;
    viz::render_content_lag(&df, &style, &out.join("content_lag.png"))?;
    viz::render_wordcloud(
        &df,
        streamlens::data::DESCRIPTION,
        &style,
        &out.join("description_wordcloud.png"),
    )?;
    geo::render_geographic_html(&df, &out.join("geographic_distribution.html"))?;

    println!("\ncharts written to {}", out.display());
    Ok(())
}
