//! Plot key and active mask

use crate::marks::series_color;
use crate::series::PerfResult;

/// One flag per fetched result, in result order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveMask {
    active: Vec<bool>,
}

impl ActiveMask {
    pub fn new(len: usize) -> Self {
        Self {
            active: vec![true; len],
        }
    }

    /// Re-initialize to all active for a new result set
    pub fn reset(&mut self, len: usize) {
        self.active.clear();
        self.active.resize(len, true);
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(active) = self.active.get_mut(index) {
            *active = !*active;
        }
    }

    /// All on if any is off, otherwise all off
    pub fn toggle_all(&mut self) {
        let all_on = self.active.iter().all(|a| *a);
        self.active.iter_mut().for_each(|a| *a = !all_on);
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub index: usize,
    pub color: &'static str,
    pub branch: String,
    pub testbed: String,
    pub benchmark: String,
    pub measure: String,
    pub active: bool,
}

impl KeyEntry {
    pub fn label(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.branch, self.testbed, self.benchmark, self.measure
        )
    }
}

/// Legend view of a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotKey {
    /// Names shown when expanded, swatches only when minimized
    pub expanded: bool,
    pub entries: Vec<KeyEntry>,
}

impl PlotKey {
    pub fn new(results: &[PerfResult], mask: &ActiveMask, expanded: bool) -> Self {
        let entries = results
            .iter()
            .enumerate()
            .map(|(index, result)| KeyEntry {
                index,
                color: series_color(index),
                branch: result.branch.name.clone(),
                testbed: result.testbed.name.clone(),
                benchmark: result.benchmark.name.clone(),
                measure: result.measure.name.clone(),
                active: mask.is_active(index),
            })
            .collect();
        Self { expanded, entries }
    }

    pub fn all_active(&self) -> bool {
        self.entries.iter().all(|entry| entry.active)
    }
}
