//! URL-backed parameter store

use crate::error::{Error, Result};
use perf_console_core::{Navigation, ParamStore};
use perf_console_core::store::ParamChange;
use std::collections::BTreeMap;
use url::Url;

const CONSOLE_PREFIX: [&str; 2] = ["console", "projects"];
const PUBLIC_PREFIX: &str = "perf";

/// A console perf page URL whose query string holds the parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlStore {
    url: Url,
    /// Locations left behind by pushed navigations
    history: Vec<Url>,
}

impl UrlStore {
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(input)?))
    }

    pub fn new(url: Url) -> Self {
        Self {
            url,
            history: Vec::new(),
        }
    }

    /// Public perf page of a project on `console_url`, seeded with `changes`
    pub fn perf_page(console_url: &str, project_slug: &str, changes: &[ParamChange]) -> Result<Self> {
        let mut url = Url::parse(console_url)?;
        url.set_path(&format!("/{PUBLIC_PREFIX}/{project_slug}"));
        url.set_query(None);
        let mut store = Self::new(url);
        store.set(changes, Navigation::Replace);
        Ok(store)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn history(&self) -> &[Url] {
        &self.history
    }

    /// Path and query of the current location
    pub fn location(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_string(),
        }
    }

    fn segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// True for `/console/projects/{slug}/perf`
    pub fn is_console(&self) -> bool {
        self.segments().starts_with(&CONSOLE_PREFIX)
    }

    /// Project slug from `/console/projects/{slug}/perf` or `/perf/{slug}`
    pub fn project_slug(&self) -> Result<String> {
        let segments = self.segments();
        let slug = match segments.as_slice() {
            ["console", "projects", slug, "perf", ..] => Some(*slug),
            [prefix, slug, ..] if *prefix == PUBLIC_PREFIX => Some(*slug),
            _ => None,
        };
        slug.map(str::to_string)
            .ok_or_else(|| Error::Validation(format!("Not a perf page URL: {}", self.url)))
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

impl ParamStore for UrlStore {
    fn get(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn set(&mut self, changes: &[ParamChange], navigation: Navigation) {
        let mut pairs = self.pairs();
        for (key, value) in changes {
            match value {
                Some(value) => match pairs.iter_mut().find(|(k, _)| k == key) {
                    Some(pair) => pair.1 = value.clone(),
                    None => pairs.push((key.clone(), value.clone())),
                },
                None => pairs.retain(|(k, _)| k != key),
            }
        }

        let mut next = self.url.clone();
        if pairs.is_empty() {
            next.set_query(None);
        } else {
            next.query_pairs_mut().clear().extend_pairs(pairs);
        }
        if next == self.url {
            return;
        }

        tracing::debug!(navigation = ?navigation, url = %next, "Updating location");
        let previous = std::mem::replace(&mut self.url, next);
        if navigation == Navigation::Push {
            self.history.push(previous);
        }
    }

    fn params(&self) -> BTreeMap<String, String> {
        self.pairs().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_console_core::QueryState;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_project_slug() {
        let console = UrlStore::parse("https://bencher.dev/console/projects/my-project/perf").unwrap();
        assert!(console.is_console());
        assert_eq!(console.project_slug().unwrap(), "my-project");

        let public = UrlStore::parse("https://bencher.dev/perf/my-project?key=true").unwrap();
        assert!(!public.is_console());
        assert_eq!(public.project_slug().unwrap(), "my-project");

        let other = UrlStore::parse("https://bencher.dev/docs").unwrap();
        assert!(other.project_slug().is_err());
    }

    #[test]
    fn test_perf_page() {
        let store = UrlStore::perf_page(
            "https://bencher.dev/console",
            "my-project",
            &[
                ("branches".to_string(), Some("a,b".to_string())),
                ("x_axis".to_string(), None),
            ],
        )
        .unwrap();
        assert_eq!(store.location(), "/perf/my-project?branches=a%2Cb");
        assert_eq!(store.get("branches").as_deref(), Some("a,b"));
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_set_keeps_order_and_history() {
        let mut store = UrlStore::parse("https://bencher.dev/perf/p?b=2&a=1").unwrap();

        store.set(
            &[("a".to_string(), Some("3".to_string())), ("c".to_string(), None)],
            Navigation::Replace,
        );
        assert_eq!(store.location(), "/perf/p?b=2&a=3");
        assert!(store.history().is_empty());

        store.set(&[("b".to_string(), None), ("a".to_string(), None)], Navigation::Push);
        assert_eq!(store.location(), "/perf/p");
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_query_state_heals_url() {
        let store = UrlStore::parse("https://bencher.dev/perf/p?lower_boundary=maybe").unwrap();
        let mut state = QueryState::new(store).unwrap();
        let query = state.query();

        assert!(!query.toggles.lower_boundary);
        let store = state.into_store();
        assert_eq!(store.get("lower_boundary").as_deref(), Some("false"));
        assert!(store.history().is_empty());
    }
}
