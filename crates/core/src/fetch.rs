//! Perf fetcher
//!
//! Translates a sanitized query into a single read against the perf API and
//! normalizes the response. Failures never propagate: they are logged and
//! resolve to an empty result set.

use crate::data::{JsonPerf, JsonProject, Visibility};
use crate::error::Result;
use crate::query::{PerfQuery, QueryKey};
use crate::series::PerfData;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

/// Asynchronous GET capability returning the response body
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<String>;
}

/// Who is asking, and for which project
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchContext {
    pub project_slug: String,
    pub token: Option<String>,
    /// The private console, as opposed to the public perf page
    pub console: bool,
    /// Visibility of the project, once known
    pub visibility: Option<Visibility>,
}

impl FetchContext {
    pub fn new(project_slug: impl Into<String>) -> Self {
        Self {
            project_slug: project_slug.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Requests that would be rejected are never sent
    pub fn can_request(&self) -> bool {
        if self.token.is_some() {
            return true;
        }
        !self.console && self.visibility != Some(Visibility::Private)
    }

    /// Remember the visibility of any project the data carries
    pub fn observe(&mut self, data: &PerfData) {
        if let Some(project) = &data.project {
            if self.visibility != Some(project.visibility) {
                tracing::debug!(project = %self.project_slug, visibility = ?project.visibility, "Project visibility");
            }
            self.visibility = Some(project.visibility);
        }
    }

    pub fn fetch_key(&self, query: &PerfQuery) -> FetchKey {
        FetchKey {
            project_slug: self.project_slug.clone(),
            authenticated: self.token.is_some(),
            query: query.fetch_key(),
        }
    }
}

/// Identity of a perf request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub project_slug: String,
    pub authenticated: bool,
    pub query: QueryKey,
}

pub fn project_path(project_slug: &str) -> String {
    format!("/v0/projects/{project_slug}")
}

/// Path of the metrics request for a non-init query
pub fn perf_path(project_slug: &str, key: &QueryKey) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("branches", &key.branches.join(","))
        .append_pair("testbeds", &key.testbeds.join(","))
        .append_pair("benchmarks", &key.benchmarks.join(","))
        .append_pair("measures", &key.measures.join(","));
    if let Some(start_time) = key.start_time {
        serializer.append_pair("start_time", &start_time.to_string());
    }
    if let Some(end_time) = key.end_time {
        serializer.append_pair("end_time", &end_time.to_string());
    }
    format!("/v0/projects/{project_slug}/perf?{}", serializer.finish())
}

/// Reads perf data through a [`Transport`]
pub struct PerfFetcher<T: Transport> {
    transport: T,
}

impl<T: Transport> PerfFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET and decode a JSON body
    pub async fn get_json<D: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<D> {
        tracing::debug!(path = %path, "GET");
        let body = self.transport.get(path, token).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the data for a query.
    ///
    /// Init queries only fetch the project metadata.
    pub async fn fetch(&self, context: &FetchContext, query: &PerfQuery) -> PerfData {
        if !context.can_request() {
            tracing::debug!(project = %context.project_slug, "Skipping unauthenticated request");
            return PerfData::empty();
        }

        let token = context.token.as_deref();
        let key = query.fetch_key();
        if key.is_init() {
            let path = project_path(&context.project_slug);
            return match self.get_json::<JsonProject>(&path, token).await {
                Ok(project) => PerfData::project_only(project),
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to fetch project");
                    PerfData::empty()
                }
            };
        }

        let path = perf_path(&context.project_slug, &key);
        match self.get_json::<JsonPerf>(&path, token).await {
            Ok(perf) => PerfData::from(perf),
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to fetch perf data");
                PerfData::empty()
            }
        }
    }
}

/// Holds the latest resolved perf data.
///
/// Only data resolved for the current key is accepted. The previous data
/// stays visible while a newer request is in flight.
#[derive(Debug, Clone, Default)]
pub struct PerfResource {
    key: Option<FetchKey>,
    data: PerfData,
    loading: bool,
    generation: u64,
}

impl PerfResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `key`. Returns false when it is already current.
    pub fn request(&mut self, key: FetchKey) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.key = Some(key);
        self.loading = true;
        true
    }

    /// Offer data resolved for `key`. Stale keys are discarded.
    pub fn resolve(&mut self, key: &FetchKey, data: PerfData) -> bool {
        if self.key.as_ref() != Some(key) {
            tracing::debug!(project = %key.project_slug, "Discarding stale perf data");
            return false;
        }
        self.data = data;
        self.loading = false;
        self.generation += 1;
        true
    }

    pub fn key(&self) -> Option<&FetchKey> {
        self.key.as_ref()
    }

    pub fn data(&self) -> &PerfData {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bumped on every accepted resolution
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned responses keyed by path prefix, recording every request
    #[derive(Default)]
    pub(crate) struct MockTransport {
        pub responses: HashMap<String, String>,
        pub requests: RefCell<Vec<String>>,
    }

    impl MockTransport {
        pub fn with(mut self, prefix: &str, body: &str) -> Self {
            self.responses.insert(prefix.to_string(), body.to_string());
            self
        }
    }

    impl Transport for MockTransport {
        async fn get(&self, path: &str, _token: Option<&str>) -> Result<String> {
            self.requests.borrow_mut().push(path.to_string());
            let path_only = path.split('?').next().unwrap_or(path);
            self.responses
                .get(path_only)
                .cloned()
                .ok_or_else(|| Error::StatusError {
                    status: 404,
                    path: path.to_string(),
                })
        }
    }

    pub(crate) const PROJECT_JSON: &str =
        r#"{"uuid": "p1", "name": "Project", "slug": "project", "visibility": "public"}"#;

    pub(crate) const PERF_JSON: &str = r#"{
        "project": {"uuid": "p1", "name": "Project", "slug": "project", "visibility": "public"},
        "results": [{
            "branch": {"uuid": "b1", "name": "main"},
            "testbed": {"uuid": "t1", "name": "localhost"},
            "benchmark": {"uuid": "bm1", "name": "bench"},
            "measure": {"uuid": "m1", "name": "Latency", "units": "nanoseconds (ns)"},
            "metrics": [{
                "report": "r1", "iteration": 0,
                "start_time": "2024-01-02T03:04:05Z", "end_time": "2024-01-02T03:04:06Z",
                "version": {"number": 1},
                "metric": {"uuid": "x1", "value": 2500000.0}
            }]
        }]
    }"#;

    fn full_query() -> PerfQuery {
        PerfQuery {
            branches: vec!["b1".to_string()],
            testbeds: vec!["t1".to_string()],
            benchmarks: vec!["bm1".to_string(), "bm2".to_string()],
            measures: vec!["m1".to_string()],
            start_time: Some(1000),
            ..PerfQuery::default()
        }
    }

    #[test]
    fn test_perf_path() {
        let path = perf_path("project", &full_query().fetch_key());
        assert_eq!(
            path,
            "/v0/projects/project/perf?branches=b1&testbeds=t1&benchmarks=bm1%2Cbm2&measures=m1&start_time=1000"
        );
    }

    #[tokio::test]
    async fn test_init_query_fetches_project_only() {
        let transport = MockTransport::default().with("/v0/projects/project", PROJECT_JSON);
        let fetcher = PerfFetcher::new(transport);
        let query = PerfQuery {
            measures: Vec::new(),
            ..full_query()
        };

        let data = fetcher.fetch(&FetchContext::new("project"), &query).await;

        assert!(data.results.is_empty());
        assert_eq!(data.project.map(|p| p.slug).as_deref(), Some("project"));
        assert_eq!(
            fetcher.transport().requests.borrow().as_slice(),
            &["/v0/projects/project".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_perf() {
        let transport = MockTransport::default().with("/v0/projects/project/perf", PERF_JSON);
        let fetcher = PerfFetcher::new(transport);

        let data = fetcher.fetch(&FetchContext::new("project"), &full_query()).await;

        assert_eq!(data.results.len(), 1);
        assert_eq!(data.results[0].points[0].value, 2_500_000.0);
        assert_eq!(fetcher.transport().requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_console_without_token_makes_no_request() {
        let fetcher = PerfFetcher::new(MockTransport::default());
        let context = FetchContext::new("project").console(true);

        let data = fetcher.fetch(&context, &full_query()).await;

        assert_eq!(data, PerfData::empty());
        assert!(fetcher.transport().requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_private_project_blocks_unauthenticated_fetch() {
        let private = PROJECT_JSON.replace("public", "private");
        let fetcher = PerfFetcher::new(
            MockTransport::default()
                .with("/v0/projects/project", &private)
                .with("/v0/projects/project/perf", PERF_JSON),
        );
        let mut context = FetchContext::new("project");
        let init = PerfQuery {
            measures: Vec::new(),
            ..full_query()
        };

        let data = fetcher.fetch(&context, &init).await;
        context.observe(&data);
        assert_eq!(context.visibility, Some(Visibility::Private));
        assert!(!context.can_request());

        let data = fetcher.fetch(&context, &full_query()).await;
        assert_eq!(data, PerfData::empty());
        assert_eq!(
            fetcher.transport().requests.borrow().as_slice(),
            &["/v0/projects/project".to_string()]
        );

        let authenticated = context.clone().with_token(Some("token".to_string()));
        assert!(authenticated.can_request());
    }

    #[test]
    fn test_observe_keeps_visibility_without_project() {
        let mut context = FetchContext::new("project");
        context.visibility = Some(Visibility::Private);
        context.observe(&PerfData::empty());
        assert_eq!(context.visibility, Some(Visibility::Private));
    }

    #[tokio::test]
    async fn test_transport_failure_is_empty() {
        let fetcher = PerfFetcher::new(MockTransport::default());
        let data = fetcher.fetch(&FetchContext::new("project"), &full_query()).await;
        assert_eq!(data, PerfData::empty());
    }

    #[test]
    fn test_resource_discards_stale_results() {
        let context = FetchContext::new("project");
        let first = context.fetch_key(&full_query());
        let second = context.fetch_key(&PerfQuery {
            end_time: Some(2000),
            ..full_query()
        });

        let mut resource = PerfResource::new();
        assert!(resource.request(first.clone()));
        assert!(!resource.request(first.clone()));
        assert!(resource.resolve(&first, PerfData::empty()));

        let stale = PerfData {
            project: None,
            results: Vec::new(),
        };
        assert!(resource.request(second.clone()));
        assert!(resource.is_loading());
        assert!(!resource.resolve(&first, stale));
        assert!(resource.is_loading());
        assert!(resource.resolve(&second, PerfData::empty()));
        assert_eq!(resource.generation(), 2);
    }
}
