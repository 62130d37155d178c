//! Multi-select set of document ids used for bulk deletion.

use std::collections::HashSet;

/// Set of selected document ids. Iteration order is unspecified; render rows in
/// collection order and ask [`SelectionSet::contains`] per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    /// Add `id`; no-op when already present. Returns whether the set changed.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Remove `id`; no-op when absent. Returns whether the set changed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Checkbox handler: select when `should_select`, otherwise deselect.
    pub fn toggle(&mut self, id: &str, should_select: bool) -> bool {
        if should_select {
            self.add(id)
        } else {
            self.remove(id)
        }
    }

    /// Keep only ids accepted by `known`. Returns how many stale ids were dropped.
    pub fn retain_known(&mut self, known: impl Fn(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| known(id.as_str()));
        before - self.ids.len()
    }

    /// Select every id on the page, or deselect them all when the whole page is
    /// already selected.
    pub fn select_all_or_clear<'a>(&mut self, page_ids: impl IntoIterator<Item = &'a str>) {
        let page_ids: Vec<&str> = page_ids.into_iter().collect();
        if !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(*id)) {
            for id in page_ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(page_ids.into_iter().map(str::to_string));
        }
    }

    /// Selected ids, sorted for deterministic request payloads.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
