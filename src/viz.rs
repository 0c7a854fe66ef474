//! Static chart rendering with plotters.
//!
//! Every renderer takes the cleaned table, an explicit [`ChartStyle`] and an
//! output path, and writes one image file. Single in-memory render per call;
//! nothing is cached between invocations.

use std::path::Path;

use ahash::HashMap;
use chrono::Datelike;
use plotters::prelude::*;
use polars::prelude::DataFrame;

use crate::analysis;
use crate::data::*;
use crate::error::Result;
use crate::style::ChartStyle;

fn counts_for(df: &DataFrame, column: &str) -> Result<Vec<(String, u32)>> {
    analysis::count_column(df, column)
}

/// Vertical bar chart of Movies vs TV Shows with value labels on the bars.
pub fn render_content_distribution(
    df: &DataFrame,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let counts = counts_for(df, TYPE)?;
    let labels: Vec<String> = counts.iter().map(|(l, _)| l.clone()).collect();
    let values: Vec<u32> = counts.iter().map(|(_, v)| *v).collect();
    let max = values.iter().copied().max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Content Types", (style.font, style.caption_size))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0i32..labels.len() as i32, 0u32..max + max / 8 + 1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Content Type")
        .y_desc("Count")
        .axis_desc_style((style.font, style.label_size))
        .x_labels(labels.len())
        .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
        .draw()?;

    let palette = [style.primary, style.dark];
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let color = palette[i % palette.len()];
        Rectangle::new([(i as i32, 0u32), (i as i32 + 1, *v)], color.filled())
    }))?;
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        Text::new(
            v.to_string(),
            (i as i32, v + max / 50 + 1),
            (style.font, style.label_size).into_font(),
        )
    }))?;

    root.present()?;
    Ok(())
}

// Shared horizontal-bar renderer; the ranking arrives largest-first and is
// drawn with the largest bar on top.
fn draw_horizontal_bars(
    ranking: &[(String, u32)],
    caption: &str,
    y_desc: &str,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let n = ranking.len() as i32;
    let max = ranking.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (style.font, style.caption_size))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(220)
        .build_cartesian_2d(0u32..max + max / 8 + 1, 0i32..n.max(1))?;

    let labels: Vec<&str> = ranking.iter().map(|(l, _)| l.as_str()).collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Number of Titles")
        .y_desc(y_desc)
        .axis_desc_style((style.font, style.label_size))
        .y_labels(ranking.len())
        .y_label_formatter(&|y| {
            let i = n - 1 - *y;
            labels.get(i as usize).map(|l| l.to_string()).unwrap_or_default()
        })
        .draw()?;

    let color = style.primary;
    chart.draw_series(ranking.iter().enumerate().map(|(i, (_, v))| {
        let row = n - 1 - i as i32;
        Rectangle::new([(0u32, row), (*v, row + 1)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Horizontal bar chart of the top content-producing countries.
pub fn render_top_countries(
    df: &DataFrame,
    n: usize,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let ranking = analysis::top_countries(df, n)?;
    draw_horizontal_bars(
        &ranking,
        &format!("Top {n} Content Producing Countries"),
        "Country",
        &style.tall(),
        path,
    )
}

/// Horizontal bar chart of the top exploded genres.
pub fn render_genre_distribution(
    df: &DataFrame,
    n: usize,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let ranking = analysis::top_genres(df, n)?;
    draw_horizontal_bars(
        &ranking,
        &format!("Top {n} Genres"),
        "Genre",
        &style.tall(),
        path,
    )
}

/// Line chart of releases per year over the last 30 years, one series per
/// content type.
pub fn render_release_year_trend(df: &DataFrame, style: &ChartStyle, path: &Path) -> Result<()> {
    let current_year = chrono::Utc::now().year();
    let cutoff = current_year - 30;

    let years = df.column(RELEASE_YEAR)?.i32()?;
    let types = df.column(TYPE)?.str()?;
    let mut movies: HashMap<i32, u32> = HashMap::default();
    let mut tv_shows: HashMap<i32, u32> = HashMap::default();
    for (year, ty) in years.into_iter().zip(types) {
        let Some(year) = year else { continue };
        if year < cutoff {
            continue;
        }
        match ty {
            Some(MOVIE) => *movies.entry(year).or_insert(0) += 1,
            Some(TV_SHOW) => *tv_shows.entry(year).or_insert(0) += 1,
            _ => {}
        }
    }

    let mut movie_points: Vec<(i32, u32)> = movies.into_iter().collect();
    movie_points.sort_unstable();
    let mut tv_points: Vec<(i32, u32)> = tv_shows.into_iter().collect();
    tv_points.sort_unstable();

    let max = movie_points
        .iter()
        .chain(&tv_points)
        .map(|(_, v)| *v)
        .max()
        .unwrap_or(0)
        .max(1);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Content Release Trends (Last 30 Years)",
            (style.font, style.caption_size),
        )
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(cutoff..current_year + 1, 0u32..max + max / 8 + 1)?;
    chart
        .configure_mesh()
        .x_desc("Release Year")
        .y_desc("Number of Titles")
        .axis_desc_style((style.font, style.label_size))
        .draw()?;

    let primary = style.primary;
    let dark = style.dark;
    chart
        .draw_series(LineSeries::new(movie_points, primary.stroke_width(2)))?
        .label("Movies")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], primary.stroke_width(2)));
    chart
        .draw_series(LineSeries::new(tv_points, dark.stroke_width(2)))?
        .label("TV Shows")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], dark.stroke_width(2)));
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .label_font((style.font, style.label_size))
        .draw()?;

    root.present()?;
    Ok(())
}

// Bar chart over a fixed calendar ordering; the peak bar gets the primary
// color, the rest the accent.
fn draw_calendar_bars(
    distribution: &[(String, u32)],
    caption: &str,
    x_desc: &str,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let values: Vec<u32> = distribution.iter().map(|(_, v)| *v).collect();
    let labels: Vec<&str> = distribution.iter().map(|(l, _)| l.as_str()).collect();
    let max = values.iter().copied().max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (style.font, style.caption_size))
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0i32..labels.len() as i32, 0u32..max + max / 8 + 1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Number of Additions")
        .axis_desc_style((style.font, style.label_size))
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            labels.get(*x as usize).map(|l| l.to_string()).unwrap_or_default()
        })
        .draw()?;

    let primary = style.primary;
    let accent = style.accent;
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let color = if *v == max { primary } else { accent };
        Rectangle::new([(i as i32, 0u32), (i as i32 + 1, *v)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Content additions per calendar month, peak month highlighted.
pub fn render_additions_by_month(df: &DataFrame, style: &ChartStyle, path: &Path) -> Result<()> {
    let timing = analysis::launch_timing(df)?;
    draw_calendar_bars(
        &timing.month_distribution,
        "Content Additions by Month",
        "Month",
        style,
        path,
    )
}

/// Content additions per weekday, peak day highlighted.
pub fn render_additions_by_day(df: &DataFrame, style: &ChartStyle, path: &Path) -> Result<()> {
    let timing = analysis::launch_timing(df)?;
    draw_calendar_bars(
        &timing.day_distribution,
        "Content Additions by Day of Week",
        "Day of Week",
        style,
        path,
    )
}

/// Pie chart of the ten most common ratings.
pub fn render_rating_distribution(df: &DataFrame, style: &ChartStyle, path: &Path) -> Result<()> {
    let mut ranking = counts_for(df, RATING)?;
    ranking.truncate(10);

    let sizes: Vec<f64> = ranking.iter().map(|(_, v)| f64::from(*v)).collect();
    let labels: Vec<&str> = ranking.iter().map(|(l, _)| l.as_str()).collect();
    // Red shades fading toward the dark brand color.
    let colors: Vec<RGBColor> = (0..ranking.len())
        .map(|i| {
            let t = i as f64 / ranking.len().max(1) as f64;
            let blend = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t) as u8;
            RGBColor(
                blend(style.primary.0, style.dark.0),
                blend(style.primary.1, style.dark.1),
                blend(style.primary.2, style.dark.2),
            )
        })
        .collect();

    let root = BitMapBackend::new(path, (style.height, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "Distribution of Content Ratings",
        (style.font, style.caption_size),
    )?;

    let center = (style.height as i32 / 2, style.height as i32 / 2);
    let radius = f64::from(style.height) / 2.0 - 80.0;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style((style.font, style.label_size).into_font());
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

// Fixed-bin histogram over f64 samples.
fn draw_histogram(
    values: &[f64],
    bins: usize,
    caption: &str,
    x_desc: &str,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if values.is_empty() || lo >= hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0u32; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let max = counts.iter().copied().max().unwrap_or(0).max(1);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (style.font, style.caption_size))
        .margin(12)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, 0u32..max + max / 8 + 1)?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .axis_desc_style((style.font, style.label_size))
        .draw()?;

    let color = style.primary.mix(0.7);
    chart.draw_series(counts.iter().enumerate().map(|(i, c)| {
        let x0 = lo + width * i as f64;
        Rectangle::new([(x0, 0u32), (x0 + width, *c)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Histogram of movie runtimes (30 bins) or TV show season counts (unit
/// bins), selected by content type.
pub fn render_duration_distribution(
    df: &DataFrame,
    content_type: ContentType,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    match content_type {
        ContentType::Movie => {
            let values: Vec<f64> = df
                .column(DURATION_MINUTES)?
                .f64()?
                .into_iter()
                .flatten()
                .collect();
            draw_histogram(
                &values,
                30,
                "Distribution of Movie Durations",
                "Duration (Minutes)",
                style,
                path,
            )
        }
        ContentType::TvShow => {
            let values: Vec<f64> = df
                .column(DURATION_SEASONS)?
                .f64()?
                .into_iter()
                .flatten()
                .collect();
            let bins = values.iter().copied().fold(0.0_f64, f64::max).max(1.0) as usize;
            draw_histogram(
                &values,
                bins,
                "Distribution of TV Show Seasons",
                "Number of Seasons",
                style,
                path,
            )
        }
    }
}

/// Histogram of years between release and platform addition. Lags above 50
/// years are dropped as outliers.
pub fn render_content_lag(df: &DataFrame, style: &ChartStyle, path: &Path) -> Result<()> {
    let values: Vec<f64> = df
        .column(CONTENT_LAG_YEARS)?
        .i32()?
        .into_iter()
        .flatten()
        .map(f64::from)
        .filter(|v| *v <= 50.0)
        .collect();
    draw_histogram(
        &values,
        30,
        "Content Lag Distribution",
        "Years Between Release and Addition",
        style,
        path,
    )
}

const STOPWORDS: [&str; 32] = [
    "a", "an", "and", "as", "at", "by", "for", "from", "he", "her", "his", "in", "is", "it",
    "its", "of", "on", "she", "that", "the", "their", "this", "to", "when", "who", "with",
    "after", "but", "are", "they", "into", "them",
];

// Title-case a column name for chart captions ("description" -> "Description").
fn column_caption(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut at_word_start = true;
    for c in column.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Frequency-scaled word layout from a free-text column.
pub fn render_wordcloud(
    df: &DataFrame,
    column: &str,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let text = df.column(column)?.str()?;
    let mut counts: HashMap<String, u32> = HashMap::default();
    for value in text.into_iter().flatten() {
        for word in value
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let word = word.to_lowercase();
            if STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    let mut words: Vec<(String, u32)> = counts.into_iter().collect();
    words.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(60);

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Word Cloud - {}", column_caption(column)),
        (style.font, style.caption_size),
    )?;

    let max = words.first().map(|(_, c)| *c).unwrap_or(1).max(1);
    let palette = [style.primary, style.accent, style.dark];
    let (mut x, mut y) = (20i32, 20i32);
    let line_height = 64i32;
    for (i, (word, count)) in words.iter().enumerate() {
        let size = 14 + (f64::from(*count) / f64::from(max) * 44.0) as i32;
        let advance = (word.len() as i32) * size * 3 / 5 + 24;
        if x + advance > style.width as i32 - 20 {
            x = 20;
            y += line_height;
        }
        if y > style.height as i32 - line_height {
            break;
        }
        let color = palette[i % palette.len()];
        root.draw(&Text::new(
            word.clone(),
            (x, y),
            (style.font, size as u32).into_font().color(&color),
        ))?;
        x += advance;
    }

    root.present()?;
    Ok(())
}
