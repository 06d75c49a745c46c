//! Perf query state synchronized with URL parameters
//!
//! Every read sanitizes the raw parameters: malformed values fall back to
//! their defaults and the store is healed in a single replace write.
//! Mutators compute a batch of parameter changes and push it to the store.

use crate::data::JsonReport;
use crate::error::{Error, Result};
use crate::store::{Navigation, ParamChange, ParamStore};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const REPORT_PARAM: &str = "report";
pub const START_TIME_PARAM: &str = "start_time";
pub const END_TIME_PARAM: &str = "end_time";
pub const X_AXIS_PARAM: &str = "x_axis";
pub const TAB_PARAM: &str = "tab";
pub const KEY_PARAM: &str = "key";
pub const CLEAR_PARAM: &str = "clear";
pub const REPORTS_START_TIME_PARAM: &str = "reports_start_time";
pub const REPORTS_END_TIME_PARAM: &str = "reports_end_time";
pub const EMBED_TITLE_PARAM: &str = "embed_title";
pub const EMBED_HEADER_PARAM: &str = "embed_header";
pub const EMBED_KEY_PARAM: &str = "embed_key";

pub const DEFAULT_PER_PAGE: u8 = 8;
pub const REPORTS_PER_PAGE: u8 = 4;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_KEY: bool = true;
pub const DEFAULT_EMBED_HEADER: bool = true;
pub const DEFAULT_EMBED_KEY: bool = true;
/// How far back the plot reaches before a selected report
pub const DEFAULT_REPORT_HISTORY_DAYS: i64 = 30;

const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// The four query dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Branches,
    Testbeds,
    Benchmarks,
    Measures,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Branches,
        Dimension::Testbeds,
        Dimension::Benchmarks,
        Dimension::Measures,
    ];

    pub fn param(self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Testbeds => "testbeds",
            Self::Benchmarks => "benchmarks",
            Self::Measures => "measures",
        }
    }
}

/// X axis mode of the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum XAxis {
    #[default]
    DateTime,
    Version,
}

impl XAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateTime => "date_time",
            Self::Version => "version",
        }
    }
}

impl FromStr for XAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date_time" => Ok(Self::DateTime),
            "version" => Ok(Self::Version),
            _ => Err(Error::InvalidParam {
                key: X_AXIS_PARAM.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for XAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser tabs of the perf panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PerfTab {
    #[default]
    Reports,
    Branches,
    Testbeds,
    Benchmarks,
    Measures,
}

impl PerfTab {
    pub const ALL: [PerfTab; 5] = [
        PerfTab::Reports,
        PerfTab::Branches,
        PerfTab::Testbeds,
        PerfTab::Benchmarks,
        PerfTab::Measures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reports => "reports",
            Self::Branches => "branches",
            Self::Testbeds => "testbeds",
            Self::Benchmarks => "benchmarks",
            Self::Measures => "measures",
        }
    }

    /// The query dimension a tab selects into, if any
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            Self::Reports => None,
            Self::Branches => Some(Dimension::Branches),
            Self::Testbeds => Some(Dimension::Testbeds),
            Self::Benchmarks => Some(Dimension::Benchmarks),
            Self::Measures => Some(Dimension::Measures),
        }
    }

    pub fn default_per_page(self) -> u8 {
        match self {
            Self::Reports => REPORTS_PER_PAGE,
            _ => DEFAULT_PER_PAGE,
        }
    }

    pub fn per_page_param(self) -> String {
        format!("{}_per_page", self.as_str())
    }

    pub fn page_param(self) -> String {
        format!("{}_page", self.as_str())
    }

    pub fn search_param(self) -> String {
        format!("{}_search", self.as_str())
    }
}

impl FromStr for PerfTab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PerfTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| Error::InvalidParam {
                key: TAB_PARAM.to_string(),
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PerfTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overlay toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    LowerValue,
    UpperValue,
    LowerBoundary,
    UpperBoundary,
}

impl Toggle {
    pub const ALL: [Toggle; 4] = [
        Toggle::LowerValue,
        Toggle::UpperValue,
        Toggle::LowerBoundary,
        Toggle::UpperBoundary,
    ];

    pub fn param(self) -> &'static str {
        match self {
            Self::LowerValue => "lower_value",
            Self::UpperValue => "upper_value",
            Self::LowerBoundary => "lower_boundary",
            Self::UpperBoundary => "upper_boundary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Toggles {
    pub lower_value: bool,
    pub upper_value: bool,
    pub lower_boundary: bool,
    pub upper_boundary: bool,
}

impl Toggles {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::LowerValue => self.lower_value,
            Toggle::UpperValue => self.upper_value,
            Toggle::LowerBoundary => self.lower_boundary,
            Toggle::UpperBoundary => self.upper_boundary,
        }
    }

    pub fn set(&mut self, toggle: Toggle, on: bool) {
        match toggle {
            Toggle::LowerValue => self.lower_value = on,
            Toggle::UpperValue => self.upper_value = on,
            Toggle::LowerBoundary => self.lower_boundary = on,
            Toggle::UpperBoundary => self.upper_boundary = on,
        }
    }
}

/// The canonical perf query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerfQuery {
    pub branches: Vec<String>,
    pub testbeds: Vec<String>,
    pub benchmarks: Vec<String>,
    pub measures: Vec<String>,
    /// Inclusive window bounds in epoch milliseconds
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub x_axis: XAxis,
    pub toggles: Toggles,
    /// Set once the user has made an explicit selection
    pub clear: bool,
}

impl PerfQuery {
    pub fn dimension(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Branches => &self.branches,
            Dimension::Testbeds => &self.testbeds,
            Dimension::Benchmarks => &self.benchmarks,
            Dimension::Measures => &self.measures,
        }
    }

    /// A query with any empty dimension must not be sent as a metrics request
    pub fn is_init(&self) -> bool {
        Dimension::ALL
            .iter()
            .any(|d| self.dimension(*d).is_empty())
    }

    /// True when nothing at all is selected
    pub fn is_empty(&self) -> bool {
        Dimension::ALL
            .iter()
            .all(|d| self.dimension(*d).is_empty())
    }

    /// Everything the metrics request depends on
    pub fn fetch_key(&self) -> QueryKey {
        QueryKey {
            branches: self.branches.clone(),
            testbeds: self.testbeds.clone(),
            benchmarks: self.benchmarks.clone(),
            measures: self.measures.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Structural memo key of a metrics request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKey {
    pub branches: Vec<String>,
    pub testbeds: Vec<String>,
    pub benchmarks: Vec<String>,
    pub measures: Vec<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl QueryKey {
    pub fn is_init(&self) -> bool {
        self.branches.is_empty()
            || self.testbeds.is_empty()
            || self.benchmarks.is_empty()
            || self.measures.is_empty()
    }
}

/// Pagination and search of one browser tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: u8,
    pub page: u32,
    pub search: Option<String>,
}

impl Pagination {
    pub fn for_tab(tab: PerfTab) -> Self {
        Self {
            per_page: tab.default_per_page(),
            page: DEFAULT_PAGE,
            search: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub header: bool,
    pub key: bool,
}

impl Default for Embed {
    fn default() -> Self {
        Self {
            title: None,
            header: DEFAULT_EMBED_HEADER,
            key: DEFAULT_EMBED_KEY,
        }
    }
}

/// Panel UI state carried in the same URL as the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub report: Option<String>,
    pub tab: PerfTab,
    /// Legend expanded
    pub key: bool,
    pub pages: BTreeMap<PerfTab, Pagination>,
    pub reports_start_time: Option<i64>,
    pub reports_end_time: Option<i64>,
    pub embed: Embed,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            report: None,
            tab: PerfTab::default(),
            key: DEFAULT_KEY,
            pages: PerfTab::ALL
                .into_iter()
                .map(|tab| (tab, Pagination::for_tab(tab)))
                .collect(),
            reports_start_time: None,
            reports_end_time: None,
            embed: Embed::default(),
        }
    }
}

impl PanelState {
    pub fn pagination(&self, tab: PerfTab) -> Pagination {
        self.pages
            .get(&tab)
            .cloned()
            .unwrap_or_else(|| Pagination::for_tab(tab))
    }
}

/// Result of sanitizing a raw parameter map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sanitized {
    pub query: PerfQuery,
    pub panel: PanelState,
    /// Writes that turn the raw parameters into their sanitized form
    pub corrections: Vec<ParamChange>,
}

impl Sanitized {
    /// True while the page shows the reports tab with nothing selected and
    /// no explicit clear
    pub fn awaits_first_report(&self) -> bool {
        !self.query.clear && self.query.is_empty() && self.panel.tab == PerfTab::Reports
    }
}

/// Validates raw URL parameters
#[derive(Debug, Clone)]
pub struct QuerySanitizer {
    uuid_regex: Regex,
}

impl QuerySanitizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            uuid_regex: Regex::new(UUID_PATTERN)?,
        })
    }

    pub fn is_uuid(&self, value: &str) -> bool {
        self.uuid_regex.is_match(value)
    }

    /// Sanitize every recognized parameter, never failing.
    ///
    /// Sanitizing the corrected parameters again yields no corrections.
    pub fn sanitize(&self, params: &BTreeMap<String, String>) -> Sanitized {
        let mut pass = Pass {
            sanitizer: self,
            params,
            corrections: Vec::new(),
        };

        let query = PerfQuery {
            branches: pass.list(Dimension::Branches.param()),
            testbeds: pass.list(Dimension::Testbeds.param()),
            benchmarks: pass.list(Dimension::Benchmarks.param()),
            measures: pass.list(Dimension::Measures.param()),
            start_time: pass.time(START_TIME_PARAM),
            end_time: pass.time(END_TIME_PARAM),
            x_axis: pass.parsed(X_AXIS_PARAM).unwrap_or_default(),
            toggles: Toggles {
                lower_value: pass.flag(Toggle::LowerValue.param(), false),
                upper_value: pass.flag(Toggle::UpperValue.param(), false),
                lower_boundary: pass.flag(Toggle::LowerBoundary.param(), false),
                upper_boundary: pass.flag(Toggle::UpperBoundary.param(), false),
            },
            clear: pass.flag(CLEAR_PARAM, false),
        };

        let pages = PerfTab::ALL
            .into_iter()
            .map(|tab| {
                let pagination = Pagination {
                    per_page: pass.per_page(&tab.per_page_param(), tab.default_per_page()),
                    page: pass.page(&tab.page_param()),
                    search: pass.text(&tab.search_param()),
                };
                (tab, pagination)
            })
            .collect();

        let panel = PanelState {
            report: pass.uuid(REPORT_PARAM),
            tab: pass.parsed(TAB_PARAM).unwrap_or_default(),
            key: pass.required_flag(KEY_PARAM, DEFAULT_KEY),
            pages,
            reports_start_time: pass.time(REPORTS_START_TIME_PARAM),
            reports_end_time: pass.time(REPORTS_END_TIME_PARAM),
            embed: Embed {
                title: pass.text(EMBED_TITLE_PARAM),
                header: pass.optional_flag(EMBED_HEADER_PARAM, DEFAULT_EMBED_HEADER),
                key: pass.optional_flag(EMBED_KEY_PARAM, DEFAULT_EMBED_KEY),
            },
        };

        Sanitized {
            query,
            panel,
            corrections: pass.corrections,
        }
    }
}

/// One sanitization pass over a parameter map, collecting corrections
struct Pass<'a> {
    sanitizer: &'a QuerySanitizer,
    params: &'a BTreeMap<String, String>,
    corrections: Vec<ParamChange>,
}

impl<'a> Pass<'a> {
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.params.get(key).map(String::as_str)
    }

    fn correct(&mut self, key: &str, value: Option<String>) {
        self.corrections.push((key.to_string(), value));
    }

    /// Comma joined UUIDs. Any malformed entry drops the whole list.
    fn list(&mut self, key: &str) -> Vec<String> {
        let Some(raw) = self.raw(key) else {
            return Vec::new();
        };

        let mut values: Vec<String> = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if !self.sanitizer.is_uuid(entry) {
                self.correct(key, None);
                return Vec::new();
            }
            if !values.iter().any(|v| v == entry) {
                values.push(entry.to_string());
            }
        }

        let normalized = list_value(&values);
        if normalized.as_deref() != Some(raw) {
            self.correct(key, normalized);
        }
        values
    }

    fn uuid(&mut self, key: &str) -> Option<String> {
        let raw = self.raw(key)?;
        if self.sanitizer.is_uuid(raw) {
            Some(raw.to_string())
        } else {
            self.correct(key, None);
            None
        }
    }

    /// Epoch milliseconds that map onto a representable date-time
    fn time(&mut self, key: &str) -> Option<i64> {
        let raw = self.raw(key)?;
        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|millis| DateTime::<Utc>::from_timestamp_millis(*millis).is_some());
        match parsed {
            Some(millis) => {
                let normalized = millis.to_string();
                if normalized != raw {
                    self.correct(key, Some(normalized));
                }
                Some(millis)
            }
            None => {
                self.correct(key, None);
                None
            }
        }
    }

    fn parsed<T: FromStr>(&mut self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.correct(key, None);
                None
            }
        }
    }

    /// Only `"true"` and `"false"` are valid. Anything else is rewritten to the default.
    fn flag(&mut self, key: &str, default: bool) -> bool {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match parse_bool(raw) {
            Some(value) => value,
            None => {
                self.correct(key, Some(default.to_string()));
                default
            }
        }
    }

    /// Like `flag`, but an absent value is written out as well
    fn required_flag(&mut self, key: &str, default: bool) -> bool {
        if self.raw(key).is_none() {
            self.correct(key, Some(default.to_string()));
            return default;
        }
        self.flag(key, default)
    }

    /// Like `flag`, but an invalid value is removed instead of rewritten
    fn optional_flag(&mut self, key: &str, default: bool) -> bool {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match parse_bool(raw) {
            Some(value) => value,
            None => {
                self.correct(key, None);
                default
            }
        }
    }

    fn per_page(&mut self, key: &str, default: u8) -> u8 {
        match self.raw(key).map(str::parse::<u8>) {
            Some(Ok(per_page)) if per_page > 0 => per_page,
            _ => {
                self.correct(key, Some(default.to_string()));
                default
            }
        }
    }

    fn page(&mut self, key: &str) -> u32 {
        match self.raw(key).map(str::parse::<u32>) {
            Some(Ok(page)) if page > 0 => page,
            _ => {
                self.correct(key, Some(DEFAULT_PAGE.to_string()));
                DEFAULT_PAGE
            }
        }
    }

    fn text(&mut self, key: &str) -> Option<String> {
        let raw = self.raw(key)?;
        if raw.is_empty() {
            self.correct(key, None);
            return None;
        }
        Some(raw.to_string())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Comma join a list, `None` when empty
pub fn list_value(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

fn change(key: impl Into<String>, value: Option<String>) -> ParamChange {
    (key.into(), value)
}

/// The perf query bound to a parameter store
pub struct QueryState<S: ParamStore> {
    store: S,
    sanitizer: QuerySanitizer,
}

impl<S: ParamStore> QueryState<S> {
    pub fn new(store: S) -> Result<Self> {
        Ok(Self {
            store,
            sanitizer: QuerySanitizer::new()?,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn sanitizer(&self) -> &QuerySanitizer {
        &self.sanitizer
    }

    /// Sanitize the current parameters, healing the store if needed
    pub fn read(&mut self) -> Sanitized {
        let sanitized = self.sanitizer.sanitize(&self.store.params());
        if !sanitized.corrections.is_empty() {
            for (key, value) in &sanitized.corrections {
                tracing::warn!(key = %key, value = ?value, "Correcting query parameter");
            }
            self.store.set(&sanitized.corrections, Navigation::Replace);
        }
        sanitized
    }

    pub fn query(&mut self) -> PerfQuery {
        self.read().query
    }

    fn write(&mut self, changes: &[ParamChange], navigation: Navigation) -> PerfQuery {
        self.store.set(changes, navigation);
        self.query()
    }

    /// Add or remove one identifier of a dimension
    pub fn set_dimension(&mut self, dimension: Dimension, id: &str, selected: bool) -> PerfQuery {
        let mut values = self.query().dimension(dimension).to_vec();
        if selected {
            if !values.iter().any(|v| v == id) {
                values.push(id.to_string());
            }
        } else {
            values.retain(|v| v != id);
        }
        self.write(
            &[
                change(dimension.param(), list_value(&values)),
                change(REPORT_PARAM, None),
                change(CLEAR_PARAM, Some(true.to_string())),
            ],
            Navigation::Push,
        )
    }

    /// Replace the measure selection with a single measure
    pub fn set_measure(&mut self, measure: &str) -> PerfQuery {
        self.write(
            &[
                change(Dimension::Measures.param(), Some(measure.to_string())),
                change(REPORT_PARAM, None),
                change(CLEAR_PARAM, Some(true.to_string())),
            ],
            Navigation::Push,
        )
    }

    /// Select everything a report covers for one of its measures
    pub fn select_report(&mut self, report: &JsonReport, measure: &str) -> PerfQuery {
        self.select_report_with(report, measure, Navigation::Push)
    }

    fn select_report_with(
        &mut self,
        report: &JsonReport,
        measure: &str,
        navigation: Navigation,
    ) -> PerfQuery {
        let benchmarks = report.benchmarks_for_measure(measure);
        let start_time = report
            .start_time
            .checked_sub_signed(Duration::days(DEFAULT_REPORT_HISTORY_DAYS))
            .map(|start| start.timestamp_millis());

        let mut changes = vec![
            change(REPORT_PARAM, Some(report.uuid.clone())),
            change(Dimension::Branches.param(), Some(report.branch.uuid.clone())),
            change(Dimension::Testbeds.param(), Some(report.testbed.uuid.clone())),
            change(Dimension::Benchmarks.param(), list_value(&benchmarks)),
            change(Dimension::Measures.param(), Some(measure.to_string())),
            change(START_TIME_PARAM, start_time.map(|t| t.to_string())),
            change(END_TIME_PARAM, Some(report.end_time.timestamp_millis().to_string())),
            change(CLEAR_PARAM, Some(true.to_string())),
        ];
        changes.extend(Toggle::ALL.iter().map(|t| change(t.param(), None)));

        self.write(&changes, navigation)
    }

    /// Select the first listed report when nothing has been selected yet
    pub fn auto_select_first_report(&mut self, reports: &[JsonReport]) -> Option<PerfQuery> {
        if !self.read().awaits_first_report() {
            return None;
        }
        let report = reports.first()?;
        let measure = report.first_measure()?.to_string();
        tracing::debug!(report = %report.uuid, measure = %measure, "Auto-selecting first report");
        Some(self.select_report_with(report, &measure, Navigation::Replace))
    }

    /// Reset every selection. The value toggles are kept.
    pub fn clear_all(&mut self) -> PerfQuery {
        let mut changes = vec![
            change(REPORT_PARAM, None),
            change(START_TIME_PARAM, None),
            change(END_TIME_PARAM, None),
            change(Toggle::LowerBoundary.param(), None),
            change(Toggle::UpperBoundary.param(), None),
            change(TAB_PARAM, Some(PerfTab::default().to_string())),
            change(REPORTS_START_TIME_PARAM, None),
            change(REPORTS_END_TIME_PARAM, None),
            change(EMBED_TITLE_PARAM, None),
            change(EMBED_HEADER_PARAM, None),
            change(EMBED_KEY_PARAM, None),
            change(CLEAR_PARAM, Some(true.to_string())),
        ];
        changes.extend(Dimension::ALL.iter().map(|d| change(d.param(), None)));
        for tab in PerfTab::ALL {
            changes.push(change(tab.per_page_param(), Some(tab.default_per_page().to_string())));
            changes.push(change(tab.page_param(), Some(DEFAULT_PAGE.to_string())));
            changes.push(change(tab.search_param(), None));
        }
        self.write(&changes, Navigation::Push)
    }

    pub fn set_time_window(&mut self, start: Option<i64>, end: Option<i64>) -> PerfQuery {
        self.write(
            &[
                change(START_TIME_PARAM, start.map(|t| t.to_string())),
                change(END_TIME_PARAM, end.map(|t| t.to_string())),
            ],
            Navigation::Push,
        )
    }

    pub fn set_x_axis(&mut self, x_axis: XAxis) -> PerfQuery {
        self.write(
            &[change(X_AXIS_PARAM, Some(x_axis.to_string()))],
            Navigation::Push,
        )
    }

    pub fn set_toggle(&mut self, toggle: Toggle, on: bool) -> PerfQuery {
        self.write(
            &[change(toggle.param(), Some(on.to_string()))],
            Navigation::Push,
        )
    }

    pub fn set_key(&mut self, key: bool) -> PanelState {
        self.store
            .set(&[change(KEY_PARAM, Some(key.to_string()))], Navigation::Push);
        self.read().panel
    }

    pub fn set_tab(&mut self, tab: PerfTab) -> PanelState {
        self.store
            .set(&[change(TAB_PARAM, Some(tab.to_string()))], Navigation::Push);
        self.read().panel
    }

    pub fn set_page(&mut self, tab: PerfTab, page: u32) -> PanelState {
        self.store.set(
            &[change(tab.page_param(), Some(page.max(DEFAULT_PAGE).to_string()))],
            Navigation::Push,
        );
        self.read().panel
    }

    /// Set the search text of a tab, returning to its first page
    pub fn set_search(&mut self, tab: PerfTab, search: &str) -> PanelState {
        let search = Some(search.trim().to_string()).filter(|s| !s.is_empty());
        self.store.set(
            &[
                change(tab.search_param(), search),
                change(tab.page_param(), Some(DEFAULT_PAGE.to_string())),
            ],
            Navigation::Push,
        );
        self.read().panel
    }

    /// Set the reports listing window, returning to the first reports page
    pub fn set_reports_window(&mut self, start: Option<i64>, end: Option<i64>) -> PanelState {
        self.store.set(
            &[
                change(REPORTS_START_TIME_PARAM, start.map(|t| t.to_string())),
                change(REPORTS_END_TIME_PARAM, end.map(|t| t.to_string())),
                change(PerfTab::Reports.page_param(), Some(DEFAULT_PAGE.to_string())),
            ],
            Navigation::Push,
        );
        self.read().panel
    }
}
