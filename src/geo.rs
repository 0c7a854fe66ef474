//! Interactive geographic distribution.
//!
//! There is no native choropleth backend in the chart stack, so the
//! interactive view is emitted as a self-contained HTML artifact: country
//! counts are embedded as JSON and rendered client-side by plotly.js.

use std::path::Path;

use polars::prelude::DataFrame;
use serde_json::json;

use crate::analysis;
use crate::data::COUNTRY;
use crate::error::Result;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Write the choropleth HTML for the catalog's country counts.
pub fn render_geographic_html(df: &DataFrame, path: &Path) -> Result<()> {
    let counts = analysis::count_column(df, COUNTRY)?;
    let countries: Vec<&str> = counts.iter().map(|(c, _)| c.as_str()).collect();
    let values: Vec<u32> = counts.iter().map(|(_, v)| *v).collect();

    let trace = json!([{
        "type": "choropleth",
        "locations": countries,
        "locationmode": "country names",
        "z": values,
        "colorscale": "Reds",
        "colorbar": { "title": "Titles" }
    }]);
    let layout = json!({
        "title": "Geographic Distribution of Content",
        "height": 600,
        "geo": { "showframe": false, "projection": { "type": "natural earth" } }
    });

    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Geographic Distribution of Content</title>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n\
         <div id=\"map\"></div>\n<script>\n\
         Plotly.newPlot(\"map\", {trace}, {layout});\n\
         </script>\n</body>\n</html>\n"
    );
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn html_artifact_embeds_country_counts() {
        let df = df!(
            COUNTRY => &["India", "India", "France"],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geo.html");
        render_geographic_html(&df, &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("choropleth"));
        assert!(html.contains("\"India\""));
        assert!(html.contains("France"));
    }
}
