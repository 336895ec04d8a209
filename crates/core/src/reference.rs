//! Foreign-key shaped fields.
//!
//! The backend returns relations either as a bare identifier (`"cat1"`) or,
//! when the relation is populated, as an expanded object
//! (`{ "_id": "cat1", "name": "News" }`). Drafts only ever store the
//! identifier; [`Reference::id`] is the single normalization point.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// A relation as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// The relation was not populated.
    Id(EntityId),
    /// The relation was populated with (a subset of) the related record.
    Expanded(ExpandedRef),
}

/// Minimal view of a populated relation.
///
/// Document stores send `_id`, some serializers add a virtual `id` as well;
/// either is accepted and `_id` wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedRef {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// The flat identifier, whichever shape was received.
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id.as_str(),
            Reference::Expanded(expanded) => expanded
                .object_id
                .as_deref()
                .or(expanded.id.as_deref())
                .unwrap_or_default(),
        }
    }}

impl From<&str> for Reference {
    fn from(id: &str) -> Self {
        Reference::Id(id.to_string())
    }
}

/// Normalize an optional relation to its identifier (empty when absent).
pub fn normalize(reference: Option<&Reference>) -> EntityId {
    reference.map(|r| r.id().to_string()).unwrap_or_default()
}

/// Normalize a list of relations to identifiers, dropping duplicates while
/// keeping first-seen order.
pub fn normalize_all(references: &[Reference]) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = Vec::with_capacity(references.len());
    for reference in references {
        let id = reference.id();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
