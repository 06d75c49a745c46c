//! Browser location as the parameter store

use perf_console_core::store::ParamChange;
use perf_console_core::{Navigation, ParamStore};
use std::collections::BTreeMap;
use url::Url;
use wasm_bindgen::JsValue;

/// Where the panel is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub project_slug: String,
    /// `/console/projects/{slug}/perf`, as opposed to `/perf/{slug}`
    pub console: bool,
    /// `/perf/{slug}/embed`
    pub embed: bool,
}

impl PageLocation {
    pub fn from_url(url: &Url) -> Option<Self> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let (slug, console) = match segments.as_slice() {
            ["console", "projects", slug, "perf", ..] => (*slug, true),
            ["perf", slug, ..] => (*slug, false),
            _ => return None,
        };
        Some(Self {
            project_slug: slug.to_string(),
            console,
            embed: segments.last() == Some(&"embed"),
        })
    }
}

fn current_url() -> Option<Url> {
    let href = web_sys::window()?.location().href().ok()?;
    Url::parse(&href).ok()
}

/// Keeps the query string of the browser location in sync
#[derive(Debug, Clone)]
pub struct HistoryStore {
    url: Url,
}

impl HistoryStore {
    pub fn from_window() -> Option<Self> {
        current_url().map(|url| Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn location(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_string(),
        }
    }

    fn pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn navigate(&self, navigation: Navigation) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            tracing::error!("Browser history unavailable");
            return;
        };
        let location = self.location();
        let result = match navigation {
            Navigation::Push => history.push_state_with_url(&JsValue::NULL, "", Some(&location)),
            Navigation::Replace => {
                history.replace_state_with_url(&JsValue::NULL, "", Some(&location))
            }
        };
        if let Err(e) = result {
            tracing::error!(error = ?e, location = %location, "Failed to update history");
        }
    }
}

impl ParamStore for HistoryStore {
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
        self.url = next;
        self.navigate(navigation);
    }

    fn params(&self) -> BTreeMap<String, String> {
        self.pairs().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(input: &str) -> Option<PageLocation> {
        PageLocation::from_url(&Url::parse(input).unwrap())
    }

    #[test]
    fn test_page_location() {
        let console = location("https://bencher.dev/console/projects/demo/perf?tab=branches").unwrap();
        assert_eq!(console.project_slug, "demo");
        assert!(console.console);
        assert!(!console.embed);

        let embed = location("https://bencher.dev/perf/demo/embed").unwrap();
        assert_eq!(embed.project_slug, "demo");
        assert!(!embed.console);
        assert!(embed.embed);

        assert_eq!(location("https://bencher.dev/docs"), None);
    }
}
