//! Key/value parameter stores backing the query state

use std::collections::BTreeMap;

/// A single parameter write. `None` removes the key.
pub type ParamChange = (String, Option<String>);

/// How a batch of writes lands in the navigation history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A user action, recorded as a new history entry
    Push,
    /// A correction or automatic selection, overwriting the current entry
    Replace,
}

/// A string key/value store with URL query semantics
pub trait ParamStore {
    /// Read the raw value for `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Write a batch of changes at once
    fn set(&mut self, changes: &[ParamChange], navigation: Navigation);

    /// Snapshot every parameter currently held
    fn params(&self) -> BTreeMap<String, String>;
}

/// In-memory store, used by tests and as a scratch store by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    params: BTreeMap<String, String>,
    history: Vec<Navigation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigation of every `set` call that changed at least one key
    pub fn history(&self) -> &[Navigation] {
        &self.history
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            history: Vec::new(),
        }
    }
}

impl ParamStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    fn set(&mut self, changes: &[ParamChange], navigation: Navigation) {
        let mut changed = false;
        for (key, value) in changes {
            let previous = match value {
                Some(value) => self.params.insert(key.clone(), value.clone()),
                None => self.params.remove(key),
            };
            changed |= previous.as_ref() != value.as_ref();
        }
        if changed {
            self.history.push(navigation);
        }
    }

    fn params(&self) -> BTreeMap<String, String> {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove() {
        let mut store: MemoryStore = [("tab", "branches")].into_iter().collect();
        store.set(
            &[
                ("key".to_string(), Some("false".to_string())),
                ("tab".to_string(), None),
            ],
            Navigation::Push,
        );

        assert_eq!(store.get("key").as_deref(), Some("false"));
        assert_eq!(store.get("tab"), None);
        assert_eq!(store.history(), &[Navigation::Push]);
    }

    #[test]
    fn test_noop_set_is_not_recorded() {
        let mut store: MemoryStore = [("key", "true")].into_iter().collect();
        store.set(
            &[("key".to_string(), Some("true".to_string()))],
            Navigation::Push,
        );
        store.set(&[("missing".to_string(), None)], Navigation::Replace);
        assert!(store.history().is_empty());
    }
}
