// Static page generation: fill the catalog into an HTML template and write
// it to the configured output path.

use crate::config::AppConfig;
use crate::stats::sorted_by_title;
use crate::store::{Catalog, MovieInfo};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

pub const TITLE_PLACEHOLDER: &str = "__TEMPLATE_TITLE__";
pub const GRID_PLACEHOLDER: &str = "__TEMPLATE_MOVIE_GRID__";
pub const PAGE_TITLE: &str = "My Movie App";

const DEFAULT_TEMPLATE: &str = include_str!("../static/index_template.html");

/// Render the catalog and write the page. Returns where it was written.
pub fn generate_website<'a>(config: &'a AppConfig, catalog: &Catalog) -> Result<&'a Path> {
    let template = match &config.template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    let page = render_page(&template, catalog);

    let output = config.output.as_path();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, page).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("wrote {} movies to {}", catalog.len(), output.display());
    Ok(output)
}

/// Substitute the page title and one card per movie (by title) into
/// `template`.
pub fn render_page(template: &str, catalog: &Catalog) -> String {
    let grid: String = sorted_by_title(catalog)
        .into_iter()
        .map(|(title, info)| movie_card(title, info))
        .collect();
    template
        .replace(TITLE_PLACEHOLDER, &escape_html(PAGE_TITLE))
        .replace(GRID_PLACEHOLDER, &grid)
}

fn movie_card(title: &str, info: &MovieInfo) -> String {
    let title = escape_html(title);
    let poster = match &info.poster {
        Some(url) => format!(
            r#"<img class="movie-poster" src="{}" alt="Poster of {}"/>"#,
            escape_html(url),
            title
        ),
        None => r#"<div class="movie-poster missing">No poster</div>"#.to_string(),
    };
    format!(
        r#"    <li class="movie-card">
        {poster}
        <h2 class="movie-title">{title}</h2>
        <p class="movie-year">{year}</p>
    </li>
"#,
        year = info.year
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
