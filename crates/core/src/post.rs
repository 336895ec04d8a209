//! Post entity, its editable draft, and hydration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::media::ImageRecord;
use crate::reference::{self, Reference};
use crate::types::{EntityId, Timestamp};
use crate::validation::{not_blank, optional_url};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// An external item promoted alongside a post (product, affiliate link).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "optional_url"))]
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: String,
}

/// A post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub category: Option<Reference>,
    #[serde(default)]
    pub tags: Vec<Reference>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub related_items: Vec<RelatedItem>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub author: Option<Reference>,
    /// Kept as the raw wire string so an untouched value round-trips exactly.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Client-local, possibly invalid copy of a post under edit.
#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct PostDraft {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub status: PostStatus,
    #[validate(custom(function = "not_blank"))]
    pub category_id: EntityId,
    pub tag_ids: Vec<EntityId>,
    pub keywords: Vec<String>,
    #[validate(nested)]
    pub related_items: Vec<RelatedItem>,
    pub images: Vec<ImageRecord>,
    pub published_at: Option<String>,
}

impl PostDraft {
    /// Populate a draft from a fetched post.
    ///
    /// Relations are flattened to identifiers. The result depends only on
    /// `post`, so hydrating twice yields equal drafts.
    pub fn hydrate(post: &Post) -> Self {
        let mut images = post.images.clone();
        images.sort_by_key(|image| image.order);
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            slug: post.slug.clone().unwrap_or_default(),
            status: post.status,
            category_id: reference::normalize(post.category.as_ref()),
            tag_ids: reference::normalize_all(&post.tags),
            keywords: post.keywords.clone(),
            related_items: post.related_items.clone(),
            images,
            published_at: post.published_at.clone().filter(|ts| !ts.is_empty()),
        }
    }}
