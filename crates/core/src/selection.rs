//! Tag/category selection sets kept beside the form draft and copied into it
//! right before submit.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Insertion-ordered set of identifiers without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(IndexSet<EntityId>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` when absent, remove it when present.
    ///
    /// Returns `true` when `id` is selected afterwards. Empty ids are
    /// ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if id.is_empty() {
            false
        } else if self.0.shift_remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    /// Idempotent add.
    pub fn insert(&mut self, id: &str) {
        if !id.is_empty() {
            self.0.insert(id.to_string());
        }
    }

    /// Idempotent remove.
    pub fn remove(&mut self, id: &str) {
        self.0.shift_remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy the selection verbatim into a form field.
    pub fn sync_into(&self, field: &mut Vec<EntityId>) {
        field.clear();
        field.extend(self.0.iter().cloned());
    }

    pub fn to_vec(&self) -> Vec<EntityId> {
        self.0.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            set.insert(id.as_ref());
        }
        set
    }
}

/// Selections owned by an editor, separate from the form library's arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    /// Tags of a post.
    pub tags: SelectionSet,
    /// Target categories of a banner.
    pub categories: SelectionSet,
}

impl Selections {
    pub fn with_tags<S: AsRef<str>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_categories<S: AsRef<str>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            categories: ids.into_iter().collect(),
            ..Default::default()
        }
    }
}
