//! Dimension browser
//!
//! Paginated, searchable listings of the candidate reports, branches,
//! testbeds, benchmarks and measures, marked against the current selection.

use crate::data::{JsonDimension, JsonMeasure, JsonReport};
use crate::fetch::{FetchContext, PerfFetcher, Transport};
use crate::query::{PanelState, Pagination, PerfQuery, PerfTab};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

/// A listed resource with a stable identifier
pub trait Resource {
    fn uuid(&self) -> &str;
    fn display_name(&self) -> String;
}

impl Resource for JsonDimension {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl Resource for JsonMeasure {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display_name(&self) -> String {
        match &self.units {
            Some(units) => format!("{} ({units})", self.name),
            None => self.name.clone(),
        }
    }
}

impl Resource for JsonReport {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display_name(&self) -> String {
        format!(
            "{} {} @ {}",
            self.start_time.format("%Y-%m-%d %H:%M:%S"),
            self.branch.name,
            self.testbed.name
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkable<T> {
    pub resource: T,
    pub checked: bool,
}

/// Rows of one browser tab
#[derive(Debug, Clone, PartialEq)]
pub enum TabRows {
    Reports(Vec<Checkable<JsonReport>>),
    Dimensions(Vec<Checkable<JsonDimension>>),
    Measures(Vec<Checkable<JsonMeasure>>),
}

impl TabRows {
    pub fn empty(tab: PerfTab) -> Self {
        match tab {
            PerfTab::Reports => Self::Reports(Vec::new()),
            PerfTab::Measures => Self::Measures(Vec::new()),
            _ => Self::Dimensions(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Reports(rows) => rows.len(),
            Self::Dimensions(rows) => rows.len(),
            Self::Measures(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(uuid, name, checked)` per row
    pub fn summary(&self) -> Vec<(String, String, bool)> {
        fn rows<T: Resource>(rows: &[Checkable<T>]) -> Vec<(String, String, bool)> {
            rows.iter()
                .map(|row| {
                    (
                        row.resource.uuid().to_string(),
                        row.resource.display_name(),
                        row.checked,
                    )
                })
                .collect()
        }
        match self {
            Self::Reports(r) => rows(r),
            Self::Dimensions(r) => rows(r),
            Self::Measures(r) => rows(r),
        }
    }
}

/// Mark every resource whose uuid is selected
pub fn to_checkable<T: Resource>(resources: Vec<T>, selected: &[String]) -> Vec<Checkable<T>> {
    resources
        .into_iter()
        .map(|resource| {
            let checked = selected.iter().any(|s| s == resource.uuid());
            Checkable { resource, checked }
        })
        .collect()
}

/// Listing path of a tab
pub fn tab_path(project_slug: &str, tab: PerfTab, panel: &PanelState) -> String {
    let pagination = panel.pagination(tab);
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("per_page", &pagination.per_page.to_string())
        .append_pair("page", &pagination.page.to_string());
    if tab == PerfTab::Reports {
        if let Some(start_time) = panel.reports_start_time {
            serializer.append_pair("start_time", &start_time.to_string());
        }
        if let Some(end_time) = panel.reports_end_time {
            serializer.append_pair("end_time", &end_time.to_string());
        }
    }
    if let Some(search) = &pagination.search {
        serializer.append_pair("search", search);
    }
    format!(
        "/v0/projects/{project_slug}/{}?{}",
        tab.as_str(),
        serializer.finish()
    )
}

fn valid_pagination(pagination: &Pagination) -> bool {
    pagination.per_page > 0 && pagination.page > 0
}

/// Lists browser tabs through a [`PerfFetcher`]
pub struct DimensionBrowser<'a, T: Transport> {
    fetcher: &'a PerfFetcher<T>,
    context: &'a FetchContext,
    embed: bool,
}

impl<'a, T: Transport> DimensionBrowser<'a, T> {
    pub fn new(fetcher: &'a PerfFetcher<T>, context: &'a FetchContext) -> Self {
        Self {
            fetcher,
            context,
            embed: false,
        }
    }

    /// Embedded plots never list anything
    pub fn embed(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }

    async fn list<R: DeserializeOwned>(&self, tab: PerfTab, panel: &PanelState) -> Vec<R> {
        if self.embed
            || !self.context.can_request()
            || !valid_pagination(&panel.pagination(tab))
        {
            return Vec::new();
        }
        let path = tab_path(&self.context.project_slug, tab, panel);
        match self
            .fetcher
            .get_json::<Vec<R>>(&path, self.context.token.as_deref())
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to list {tab}");
                Vec::new()
            }
        }
    }

    /// Fetch one tab page, marking rows selected by the query
    pub async fn tab(&self, tab: PerfTab, panel: &PanelState, query: &PerfQuery) -> TabRows {
        match tab {
            PerfTab::Reports => {
                let reports: Vec<JsonReport> = self.list(tab, panel).await;
                let selected: Vec<String> = panel.report.iter().cloned().collect();
                TabRows::Reports(to_checkable(reports, &selected))
            }
            PerfTab::Measures => {
                let measures: Vec<JsonMeasure> = self.list(tab, panel).await;
                TabRows::Measures(to_checkable(measures, &query.measures))
            }
            PerfTab::Branches | PerfTab::Testbeds | PerfTab::Benchmarks => {
                let rows: Vec<JsonDimension> = self.list(tab, panel).await;
                let selected = tab
                    .dimension()
                    .map(|dimension| query.dimension(dimension))
                    .unwrap_or_default();
                TabRows::Dimensions(to_checkable(rows, selected))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::MockTransport;
    use pretty_assertions::assert_eq;

    const BRANCHES_JSON: &str = r#"[
        {"uuid": "b1", "name": "main", "slug": "main"},
        {"uuid": "b2", "name": "feature", "slug": "feature"}
    ]"#;

    #[test]
    fn test_tab_path() {
        let mut panel = PanelState::default();
        panel.reports_start_time = Some(10);
        if let Some(pagination) = panel.pages.get_mut(&PerfTab::Branches) {
            pagination.search = Some("main branch".to_string());
            pagination.page = 2;
        }

        assert_eq!(
            tab_path("project", PerfTab::Reports, &panel),
            "/v0/projects/project/reports?per_page=4&page=1&start_time=10"
        );
        assert_eq!(
            tab_path("project", PerfTab::Branches, &panel),
            "/v0/projects/project/branches?per_page=8&page=2&search=main+branch"
        );
    }

    #[tokio::test]
    async fn test_branches_checked() {
        let fetcher = PerfFetcher::new(
            MockTransport::default().with("/v0/projects/project/branches", BRANCHES_JSON),
        );
        let context = FetchContext::new("project");
        let query = PerfQuery {
            branches: vec!["b2".to_string()],
            ..PerfQuery::default()
        };

        let rows = DimensionBrowser::new(&fetcher, &context)
            .tab(PerfTab::Branches, &PanelState::default(), &query)
            .await;

        assert_eq!(
            rows.summary(),
            vec![
                ("b1".to_string(), "main".to_string(), false),
                ("b2".to_string(), "feature".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_embed_and_failures_are_empty() {
        let fetcher = PerfFetcher::new(
            MockTransport::default().with("/v0/projects/project/branches", BRANCHES_JSON),
        );
        let context = FetchContext::new("project");
        let query = PerfQuery::default();
        let panel = PanelState::default();

        let embedded = DimensionBrowser::new(&fetcher, &context)
            .embed(true)
            .tab(PerfTab::Branches, &panel, &query)
            .await;
        assert!(embedded.is_empty());

        // No canned testbeds response
        let failed = DimensionBrowser::new(&fetcher, &context)
            .tab(PerfTab::Testbeds, &panel, &query)
            .await;
        assert_eq!(failed, TabRows::empty(PerfTab::Testbeds));

        let console = FetchContext::new("project").console(true);
        let unauthenticated = DimensionBrowser::new(&fetcher, &console)
            .tab(PerfTab::Branches, &panel, &query)
            .await;
        assert!(unauthenticated.is_empty());
        assert_eq!(fetcher.transport().requests.borrow().len(), 1);
    }
}
