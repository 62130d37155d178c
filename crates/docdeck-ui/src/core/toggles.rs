//! Registry of named boolean switches shown in the query control panel.
//!
//! # Design
//! - Registration is idempotent: the first call for an id wins.
//! - Updates to ids that were never registered are rejected, not auto-created.
//! - Registration order is kept so the panel renders switches predictably.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Id of the vector search switch.
pub const VECTOR_SEARCH: &str = "vector_search";
/// Id of the hybrid search switch.
pub const HYBRID_SEARCH: &str = "hybrid_search";

/// A single switch plus its display metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToggleDescriptor {
    /// Unique key.
    pub id: String,
    /// Current value.
    pub checked: bool,
    /// Short label rendered next to the switch.
    pub label: String,
    /// Longer explanation rendered in a tooltip.
    pub tooltip: String,
}

/// Errors raised by [`ToggleRegistry::update`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ToggleError {
    /// The id was never registered.
    #[error("unknown toggle '{id}'")]
    Unknown {
        /// Id supplied by the caller.
        id: String,
    },
}

/// Mapping from toggle id to descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleRegistry {
    order: Vec<String>,
    entries: HashMap<String, ToggleDescriptor>,
}

impl ToggleRegistry {
    /// Register a switch. Returns `false` when `id` already exists, in which case
    /// the existing descriptor is left untouched.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        initial_checked: bool,
        label: impl Into<String>,
        tooltip: impl Into<String>,
    ) -> bool {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return false;
        }
        self.order.push(id.clone());
        self.entries.insert(
            id.clone(),
            ToggleDescriptor {
                id,
                checked: initial_checked,
                label: label.into(),
                tooltip: tooltip.into(),
            },
        );
        true
    }

    /// Overwrite the `checked` flag of a registered switch.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::Unknown`] when `id` was never registered.
    pub fn update(&mut self, id: &str, checked: bool) -> Result<ToggleDescriptor, ToggleError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| ToggleError::Unknown { id: id.to_string() })?;
        entry.checked = checked;
        Ok(entry.clone())
    }

    /// Look up a descriptor.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ToggleDescriptor> {
        self.entries.get(id)
    }

    /// Current value of a switch; unknown ids read as off.
    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.checked)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToggleDescriptor> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Copy of every descriptor keyed by id.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, ToggleDescriptor> {
        self.entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    /// Number of registered switches.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been registered yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Register the search strategy switches shown on the query screen.
pub fn register_search_toggles(registry: &mut ToggleRegistry) {
    registry.register(
        VECTOR_SEARCH,
        true,
        "Vector Search",
        "Vector search is a search method that uses vectors to represent documents and queries. \
         It is used to find similar documents to a given query.",
    );
    registry.register(
        HYBRID_SEARCH,
        false,
        "Hybrid Search",
        "Hybrid search is a search method that combines multiple search methods to provide \
         more accurate and relevant search results.",
    );
}
