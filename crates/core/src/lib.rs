//! perf-console-core - Perf query pipeline for perf-console
//!
//! This crate contains WASM-compatible code that can be shared between
//! the CLI and the dashboard.
//!
//! # Features
//!
//! - URL-synced, self-healing query state
//! - Perf and dimension listing fetches over an injectable transport
//! - Unit scaling, series marks and SVG chart layout
//! - Plot key with per-series visibility

pub mod browser;
pub mod chart;
pub mod data;
pub mod error;
pub mod fetch;
pub mod key;
pub mod marks;
pub mod pipeline;
pub mod query;
pub mod scale;
pub mod series;
pub mod store;

pub use browser::{Checkable, DimensionBrowser, TabRows};
pub use chart::{ChartLayout, ChartOptions, ChartRenderer, Rendered, TooltipState};
pub use data::{JsonMeasure, JsonPerf, JsonProject, JsonReport, Visibility};
pub use error::{Error, Result};
pub use fetch::{FetchContext, FetchKey, PerfFetcher, PerfResource, Transport};
pub use key::{ActiveMask, PlotKey};
pub use marks::{build_marks, LinkContext, Mark, MarkConfig};
pub use pipeline::PerfPipeline;
pub use query::{
    PanelState, PerfQuery, PerfTab, QuerySanitizer, QueryState, Sanitized, Toggle, Toggles, XAxis,
};
pub use scale::{scale_results, Scale, ScaledPlot};
pub use series::{PerfData, PerfPoint, PerfResult};
pub use store::{MemoryStore, Navigation, ParamStore};
