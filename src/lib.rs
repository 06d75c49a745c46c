//! perf-console - Perf plots for a continuous benchmarking console
//!
//! This library wires the `perf-console-core` pipeline to native I/O:
//! an HTTP transport for the perf API, a URL-backed query store, and
//! SVG/HTML output.
//!
//! # Features
//!
//! - Sanitize and heal perf page URLs
//! - Fetch perf data and dimension listings with bearer authentication
//! - Render unit-scaled, boundary and alert annotated plots to SVG or HTML
//!
//! # Example
//!
//! ```no_run
//! use perf_console::{http::HttpTransport, store::UrlStore};
//! use perf_console_core::{ChartOptions, FetchContext, LinkContext, PerfFetcher, PerfPipeline, QueryState};
//! use std::time::Duration;
//!
//! # async fn plot() -> perf_console::Result<()> {
//! let store = UrlStore::parse("https://bencher.dev/perf/my-project?branches=...")?;
//! let slug = store.project_slug()?;
//! let mut state = QueryState::new(store)?;
//! let query = state.query();
//!
//! let fetcher = PerfFetcher::new(HttpTransport::new("https://api.bencher.dev", Duration::from_secs(30))?);
//! let mut context = FetchContext::new(slug.as_str());
//! let mut pipeline = PerfPipeline::new(LinkContext::public(slug), ChartOptions::default());
//! pipeline.load(&fetcher, &mut context, &query).await;
//! let rendered = pipeline.render(query.toggles, query.x_axis);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod html;
pub mod http;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
