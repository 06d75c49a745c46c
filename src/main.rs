//! perf-console CLI - Perf plots for a continuous benchmarking console
//!
//! Sanitizes perf page URLs, lists dimensions, and renders perf plots
//! to SVG or HTML.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use perf_console::{
    html::{self, PageConfig},
    http::{HttpTransport, DEFAULT_API_URL},
    store::UrlStore,
    validation::{self, OutputFormat},
};
use perf_console_core::{
    query::{
        list_value, Dimension, PanelState, Toggle, XAxis, CLEAR_PARAM, END_TIME_PARAM, REPORT_PARAM,
        START_TIME_PARAM, X_AXIS_PARAM,
    },
    store::{ParamChange, ParamStore},
    ChartOptions, DimensionBrowser, FetchContext, LinkContext, PerfFetcher, PerfPipeline,
    PerfQuery, PerfTab, QueryState, TabRows,
};

const DEFAULT_CONSOLE_URL: &str = "https://bencher.dev";

/// perf-console: Perf plots for continuous benchmarking
#[derive(Parser, Debug)]
#[command(name = "perf-console")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Perf API base URL
    #[arg(long, global = true, env = "PERF_CONSOLE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Console base URL used for click-through links
    #[arg(long, global = true, env = "PERF_CONSOLE_URL")]
    console_url: Option<String>,

    /// API token
    #[arg(long, global = true, env = "PERF_CONSOLE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and render a perf plot
    Plot(PlotArgs),

    /// Print the healed form of a perf page URL
    Sanitize(SanitizeArgs),

    /// List one page of a dimension tab
    Browse(BrowseArgs),
}

/// A perf page URL, or a project and discrete query values
#[derive(Args, Debug)]
struct QueryArgs {
    /// Console perf page URL
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Project slug
    #[arg(short, long, conflicts_with = "url")]
    project: Option<String>,

    /// Branch UUIDs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    branches: Vec<String>,

    /// Testbed UUIDs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    testbeds: Vec<String>,

    /// Benchmark UUIDs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    benchmarks: Vec<String>,

    /// Measure UUIDs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    measures: Vec<String>,

    /// Window start in epoch milliseconds
    #[arg(long)]
    start_time: Option<i64>,

    /// Window end in epoch milliseconds
    #[arg(long)]
    end_time: Option<i64>,

    /// X axis (date_time, version)
    #[arg(long)]
    x_axis: Option<XAxis>,

    /// Show lower value bounds
    #[arg(long)]
    lower_value: bool,

    /// Show upper value bounds
    #[arg(long)]
    upper_value: bool,

    /// Show lower boundary limits
    #[arg(long)]
    lower_boundary: bool,

    /// Show upper boundary limits
    #[arg(long)]
    upper_boundary: bool,
}

#[derive(Parser, Debug)]
struct PlotArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Output file (.svg or .html)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Chart width in pixels
    #[arg(long, default_value = "1000")]
    width: f64,

    /// Chart height in pixels
    #[arg(long, default_value = "400")]
    height: f64,

    /// Page title (defaults to the embed title or project name)
    #[arg(long)]
    title: Option<String>,

    /// Result positions to hide from the plot (comma-separated)
    #[arg(long, value_delimiter = ',')]
    hide: Vec<usize>,
}

#[derive(Parser, Debug)]
struct SanitizeArgs {
    /// Console perf page URL
    url: String,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Parser, Debug)]
struct BrowseArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Tab to list (reports, branches, testbeds, benchmarks, measures)
    #[arg(long)]
    tab: Option<PerfTab>,

    /// Page number
    #[arg(long)]
    page: Option<u32>,

    /// Search text
    #[arg(long)]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match &cli.command {
        Commands::Plot(args) => plot_command(&cli, args).await,
        Commands::Sanitize(args) => sanitize_command(args),
        Commands::Browse(args) => browse_command(&cli, args).await,
    }
}

impl QueryArgs {
    fn changes(&self) -> Vec<ParamChange> {
        let lists = [&self.branches, &self.testbeds, &self.benchmarks, &self.measures];
        let mut changes: Vec<ParamChange> = Dimension::ALL
            .iter()
            .zip(lists)
            .map(|(dimension, ids)| (dimension.param().to_string(), list_value(ids)))
            .collect();
        changes.push((START_TIME_PARAM.to_string(), self.start_time.map(|t| t.to_string())));
        changes.push((END_TIME_PARAM.to_string(), self.end_time.map(|t| t.to_string())));
        changes.push((X_AXIS_PARAM.to_string(), self.x_axis.map(|x| x.to_string())));
        for (toggle, on) in [
            (Toggle::LowerValue, self.lower_value),
            (Toggle::UpperValue, self.upper_value),
            (Toggle::LowerBoundary, self.lower_boundary),
            (Toggle::UpperBoundary, self.upper_boundary),
        ] {
            changes.push((toggle.param().to_string(), on.then(|| true.to_string())));
        }
        // An explicit selection must not be replaced by the newest report
        if lists.iter().any(|ids| !ids.is_empty()) {
            changes.push((CLEAR_PARAM.to_string(), Some(true.to_string())));
        }
        changes
    }

    fn validate(&self) -> Result<()> {
        validation::validate_uuids(&self.branches, "Branches")?;
        validation::validate_uuids(&self.testbeds, "Testbeds")?;
        validation::validate_uuids(&self.benchmarks, "Benchmarks")?;
        validation::validate_uuids(&self.measures, "Measures")?;
        validation::validate_time_window(self.start_time, self.end_time)?;
        Ok(())
    }

    /// The perf page this query addresses
    fn store(&self, console_url: &str) -> Result<UrlStore> {
        self.validate()?;
        match (&self.url, &self.project) {
            (Some(url), _) => {
                UrlStore::parse(url).with_context(|| format!("Invalid perf page URL: {url}"))
            }
            (None, Some(project)) => {
                validation::validate_project_slug(project)?;
                Ok(UrlStore::perf_page(console_url, project, &self.changes())?)
            }
            (None, None) => anyhow::bail!("Either a perf page URL or --project is required"),
        }
    }
}

/// Everything a command needs to talk to the API
struct Session {
    state: QueryState<UrlStore>,
    context: FetchContext,
    fetcher: PerfFetcher<HttpTransport>,
    console_url: String,
}

impl Session {
    fn new(cli: &Cli, query: &QueryArgs) -> Result<Self> {
        let console_url = cli
            .console_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CONSOLE_URL.to_string());
        validation::validate_base_url(&console_url, "Console URL")?;
        validation::validate_base_url(&cli.api_url, "API URL")?;
        validation::validate_timeout(cli.timeout_secs)?;
        if let Some(token) = &cli.token {
            validation::validate_token(token)?;
        }

        let store = query.store(&console_url)?;
        let slug = store.project_slug()?;
        validation::validate_project_slug(&slug)?;
        let console = store.is_console();

        let transport = HttpTransport::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))
            .context("Failed to create HTTP client")?;

        Ok(Self {
            state: QueryState::new(store)?,
            context: FetchContext::new(slug)
                .with_token(cli.token.clone())
                .console(console),
            fetcher: PerfFetcher::new(transport),
            console_url,
        })
    }

    /// Links rooted at the console, carrying the plot location back
    fn links(&self) -> LinkContext {
        let slug = self.context.project_slug.clone();
        let mut links = if self.context.console {
            LinkContext::console(slug)
        } else {
            LinkContext::public(slug)
        };
        links.root = format!("{}{}", self.console_url.trim_end_matches('/'), links.root);
        links.with_back(Some(self.state.store().location()))
    }

    /// Select the newest report when the page has no selection yet
    async fn auto_select(&mut self) -> PerfQuery {
        let sanitized = self.state.read();
        if !sanitized.awaits_first_report() {
            return sanitized.query;
        }

        let rows = DimensionBrowser::new(&self.fetcher, &self.context)
            .tab(PerfTab::Reports, &sanitized.panel, &sanitized.query)
            .await;
        let TabRows::Reports(reports) = rows else {
            return sanitized.query;
        };
        let reports: Vec<_> = reports.into_iter().map(|row| row.resource).collect();
        match self.state.auto_select_first_report(&reports) {
            Some(query) => {
                info!(
                    report = ?self.state.store().get(REPORT_PARAM),
                    "Selected the most recent report"
                );
                query
            }
            None => sanitized.query,
        }
    }
}

/// Fetch and render a perf plot
async fn plot_command(cli: &Cli, args: &PlotArgs) -> Result<()> {
    let format = validation::validate_output_path(&args.output)?;
    validation::validate_width(args.width)?;
    validation::validate_height(args.height)?;

    let mut session = Session::new(cli, &args.query)?;
    let query = session.auto_select().await;
    let panel = session.state.read().panel;

    if query.is_init() {
        warn!("Query is missing a branch, testbed, benchmark or measure");
    }

    info!(project = %session.context.project_slug, "Fetching perf data");
    let options = ChartOptions {
        width: args.width,
        height: args.height,
        x_axis: query.x_axis,
    };
    let mut pipeline = PerfPipeline::new(session.links(), options);
    pipeline
        .load(&session.fetcher, &mut session.context, &query)
        .await;
    info!("Fetched {} results", pipeline.data().results.len());

    for index in &args.hide {
        if *index < pipeline.mask().len() {
            pipeline.toggle(*index);
        } else {
            warn!("No result at position {}", index);
        }
    }

    let rendered = pipeline.render(query.toggles, query.x_axis);
    debug!(relayouts = pipeline.renderer().tracker().relayouts(), "Rendered plot");

    let content = match format {
        OutputFormat::Svg => html::svg_document(&rendered, args.width, args.height),
        OutputFormat::Html => {
            let title = page_title(args, &panel, &pipeline, &session.context.project_slug);
            let config = PageConfig {
                title,
                width: args.width,
                embed: panel.embed.clone(),
            };
            html::generate_page(&rendered, &pipeline.plot_key(panel.key), &config, Utc::now())?
        }
    };

    html::write_output(&args.output, &content)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    info!("Plot written to {:?}", args.output);
    println!("{}", session.state.store().url());

    Ok(())
}

fn page_title(args: &PlotArgs, panel: &PanelState, pipeline: &PerfPipeline, slug: &str) -> String {
    args.title
        .clone()
        .or_else(|| panel.embed.title.clone())
        .or_else(|| pipeline.data().project.as_ref().map(|p| p.name.clone()))
        .unwrap_or_else(|| slug.to_string())
}

/// Print the healed form of a perf page URL
fn sanitize_command(args: &SanitizeArgs) -> Result<()> {
    let store = UrlStore::parse(&args.url).with_context(|| format!("Invalid perf page URL: {}", args.url))?;
    let mut state = QueryState::new(store)?;
    let sanitized = state.read();
    let store = state.into_store();

    match args.format.as_str() {
        "json" => {
            let corrections: Vec<_> = sanitized
                .corrections
                .iter()
                .map(|(key, value)| serde_json::json!({ "key": key, "value": value }))
                .collect();
            let output = serde_json::json!({
                "url": store.url().as_str(),
                "init": sanitized.query.is_init(),
                "corrections": corrections,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "text" | _ => {
            println!("{}", store.url());
            if sanitized.corrections.is_empty() {
                println!("No corrections");
            }
            for (key, value) in &sanitized.corrections {
                match value {
                    Some(value) => println!("  {} = {}", key, value),
                    None => println!("  {} (removed)", key),
                }
            }
        }
    }

    Ok(())
}

/// List one page of a dimension tab
async fn browse_command(cli: &Cli, args: &BrowseArgs) -> Result<()> {
    let mut session = Session::new(cli, &args.query)?;
    let mut panel = session.state.read().panel;
    let tab = args.tab.unwrap_or(panel.tab);
    if let Some(page) = args.page {
        panel = session.state.set_page(tab, page);
    }
    if let Some(search) = &args.search {
        panel = session.state.set_search(tab, search);
    }
    let query = session.state.query();

    let rows = DimensionBrowser::new(&session.fetcher, &session.context)
        .tab(tab, &panel, &query)
        .await;

    let pagination = panel.pagination(tab);
    println!("## {} (page {}, {} per page)\n", tab, pagination.page, pagination.per_page);
    if rows.is_empty() {
        println!("No {} found", tab);
    }
    for (uuid, name, checked) in rows.summary() {
        let marker = if checked { "x" } else { " " };
        println!("  [{}] {} ({})", marker, name, uuid);
    }

    Ok(())
}
