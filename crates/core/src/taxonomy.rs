//! Categories and tags.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::reference::{self, Reference};
use crate::types::{EntityId, Timestamp};
use crate::validation::{not_blank, optional_slug};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<Reference>,
    #[serde(default)]
    pub post_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct CategoryDraft {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "optional_slug"))]
    pub slug: String,
    pub description: String,
    pub parent_id: EntityId,
}

impl CategoryDraft {
    pub fn hydrate(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            parent_id: reference::normalize(category.parent.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct TagDraft {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "optional_slug"))]
    pub slug: String,
}

impl TagDraft {
    pub fn hydrate(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parent_is_flattened() {
        let category: Category = serde_json::from_str(
            r#"{"_id":"c2","name":"Rust","slug":"rust","parent":{"_id":"c1","name":"Programming"}}"#,
        )
        .unwrap();
        let draft = CategoryDraft::hydrate(&category);
        assert_eq!(draft.parent_id, "c1");
        assert_eq!(draft.slug, "rust");
    }

    #[test]
    fn tag_slug_must_be_kebab_case() {
        let draft = TagDraft {
            name: "Rust Lang".into(),
            slug: "Rust Lang".into(),
        };
        assert!(draft.validate().is_err());

        let draft = TagDraft {
            name: "Rust Lang".into(),
            slug: String::new(),
        };
        assert!(draft.validate().is_ok());
    }
}
