//! HTML perf page generator

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use perf_console_core::chart::NO_DATA;
use perf_console_core::query::Embed;
use perf_console_core::{PlotKey, Rendered};
use std::path::Path;

/// HTML template for a rendered perf plot
const PLOT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title|e }}</title>
    <style>
        :root {
            --bg-primary: #ffffff;
            --bg-secondary: #f6f8fa;
            --text-primary: #24292f;
            --text-muted: #6e7781;
            --border-color: #d0d7de;
        }

        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.5;
        }

        .container {
            max-width: {{ width }}px;
            margin: 0 auto;
            padding: 1.5rem;
        }

        header {
            margin-bottom: 1rem;
        }

        h1 {
            font-size: 1.5rem;
            font-weight: 600;
        }

        .generated {
            color: var(--text-muted);
            font-size: 0.85rem;
        }

        .plot {
            border: 1px solid var(--border-color);
            border-radius: 6px;
            padding: 0.5rem;
        }

        .no-data {
            padding: 4rem;
            text-align: center;
            color: var(--text-muted);
        }

        .key {
            display: flex;
            flex-wrap: wrap;
            gap: 0.5rem 1rem;
            margin-top: 1rem;
            font-size: 0.85rem;
        }

        .key-entry {
            display: flex;
            align-items: center;
            gap: 0.4rem;
        }

        .key-entry.inactive {
            opacity: 0.4;
        }

        .swatch {
            width: 12px;
            height: 12px;
            border-radius: 2px;
        }
    </style>
</head>
<body>
    <div class="container">
        {% if header %}
        <header>
            <h1>{{ title|e }}</h1>
            <div class="generated">{{ generated }}</div>
        </header>
        {% endif %}

        <div class="plot">
            {% if svg %}
            {{ svg }}
            {% else %}
            <div class="no-data">{{ no_data }}</div>
            {% endif %}
        </div>

        {% if show_key and entries %}
        <div class="key">
            {% for entry in entries %}
            <div class="key-entry{% if not entry.active %} inactive{% endif %}">
                <span class="swatch" style="background: {{ entry.color }};"></span>
                {% if expanded %}<span>{{ entry.label|e }}</span>{% endif %}
            </div>
            {% endfor %}
        </div>
        {% endif %}
    </div>
</body>
</html>
"#;

/// Page configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub title: String,
    pub width: f64,
    pub embed: Embed,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Perf Plot".to_string(),
            width: 1000.0,
            embed: Embed::default(),
        }
    }
}

/// Key entry data for template
#[derive(Debug, Clone, serde::Serialize)]
struct EntryData {
    color: &'static str,
    label: String,
    active: bool,
}

/// Generate the HTML page around a rendered plot
pub fn generate_page(
    rendered: &Rendered,
    key: &PlotKey,
    config: &PageConfig,
    generated: DateTime<Utc>,
) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("plot", PLOT_TEMPLATE)?;

    let template = env.get_template("plot")?;

    let svg = match rendered {
        Rendered::Svg(svg) => Some(svg.as_str()),
        Rendered::NoData => None,
    };

    let entries: Vec<EntryData> = key
        .entries
        .iter()
        .map(|entry| EntryData {
            color: entry.color,
            label: entry.label(),
            active: entry.active,
        })
        .collect();

    let html = template.render(context! {
        title => &config.title,
        width => config.width,
        header => config.embed.header,
        generated => generated.format("%a, %b %d, %Y, %H:%M:%S UTC").to_string(),
        svg => svg,
        no_data => NO_DATA,
        show_key => config.embed.key,
        expanded => key.expanded,
        entries => entries,
    })?;

    Ok(html)
}

/// Standalone SVG document, or a minimal one carrying the no-data message
pub fn svg_document(rendered: &Rendered, width: f64, height: f64) -> String {
    match rendered {
        Rendered::Svg(svg) => svg.clone(),
        Rendered::NoData => format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="14">{NO_DATA}</text></svg>"#,
            x = width / 2.0,
            y = height / 2.0,
        ),
    }
}

/// Write output to `path`, creating its parent directory
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|source| Error::FileWriteError {
        path: path.display().to_string(),
        source,
    })
}
