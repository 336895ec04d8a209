//! Reconciliation: the pure transformation from a draft plus its selection
//! sets into the exact payload sent to the backend.
//!
//! Rules shared by every payload:
//!
//! 1. A field whose value is an empty (or whitespace-only) string is unset
//!    and omitted.
//! 2. An empty array field is omitted, so "no selection" never reads as
//!    "clear all".
//! 3. Images whose upload has not completed are never sent.
//!
//! Posts additionally stamp `publishedAt` on first publication and backfill
//! the currency of related items. Nothing here reads a clock: the caller
//! passes `now`.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::banner::{BannerDraft, BannerStatus};
use crate::media::ImageRecord;
use crate::post::{PostDraft, PostStatus, RelatedItem};
use crate::selection::Selections;
use crate::slug::slugify;
use crate::taxonomy::{CategoryDraft, TagDraft};
use crate::types::{EntityId, Timestamp};
use crate::user::{UserDraft, UserRole};

/// Currency assumed for related items that do not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn non_empty_items(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(String::as_str)
        .filter_map(non_empty)
        .collect()
}

/// Wire format of `publishedAt` stamps (`2024-03-01T10:00:00.000Z`).
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub order: u32,
}

/// Confirmed images only, re-numbered in list order.
pub fn prepare_images(images: &[ImageRecord]) -> Vec<ImagePayload> {
    images
        .iter()
        .filter(|image| !image.is_uploading() && !image.url.trim().is_empty())
        .enumerate()
        .map(|(index, image)| ImagePayload {
            url: image.url.clone(),
            filename: non_empty(&image.filename),
            width: image.width,
            height: image.height,
            size: image.size,
            order: index as u32,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItemPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl RelatedItemPayload {
    fn from_item(item: &RelatedItem) -> Option<Self> {
        let title = non_empty(&item.title)?;
        Some(Self {
            title,
            url: non_empty(&item.url),
            price: item.price,
            currency: item
                .currency
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            image_url: non_empty(&item.image_url),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_items: Vec<RelatedItemPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// Build the create/update payload for a post.
///
/// Tags come from `selections.tags`, which the editor keeps authoritative.
pub fn prepare_post(draft: &PostDraft, selections: &Selections, now: Timestamp) -> PostPayload {
    let published_at = match draft.status {
        PostStatus::Published => Some(
            draft
                .published_at
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| format_timestamp(now)),
        ),
        PostStatus::Draft | PostStatus::Archived => None,
    };

    PostPayload {
        title: non_empty(&draft.title),
        content: non_empty(&draft.content),
        excerpt: non_empty(&draft.excerpt),
        slug: non_empty(&draft.slug),
        status: draft.status,
        category_id: non_empty(&draft.category_id),
        tag_ids: non_empty_items(&selections.tags.to_vec()),
        keywords: non_empty_items(&draft.keywords),
        related_items: draft
            .related_items
            .iter()
            .filter_map(RelatedItemPayload::from_item)
            .collect(),
        images: prepare_images(&draft.images),
        published_at,
    }
}

// ---------------------------------------------------------------------------
// Banners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub status: BannerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<EntityId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImagePayload>,
}

pub fn prepare_banner(draft: &BannerDraft, selections: &Selections) -> BannerPayload {
    BannerPayload {
        title: non_empty(&draft.title),
        description: non_empty(&draft.description),
        link_url: non_empty(&draft.link_url),
        status: draft.status,
        start_date: non_empty(&draft.start_date),
        end_date: non_empty(&draft.end_date),
        position: draft.position,
        category_ids: non_empty_items(&selections.categories.to_vec()),
        images: prepare_images(&draft.images),
    }
}

// ---------------------------------------------------------------------------
// Categories, tags, users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
}

/// A blank slug is derived from the name.
pub fn prepare_category(draft: &CategoryDraft) -> CategoryPayload {
    CategoryPayload {
        name: non_empty(&draft.name),
        slug: non_empty(&draft.slug).or_else(|| non_empty(&slugify(&draft.name))),
        description: non_empty(&draft.description),
        parent_id: non_empty(&draft.parent_id),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

pub fn prepare_tag(draft: &TagDraft) -> TagPayload {
    TagPayload {
        name: non_empty(&draft.name),
        slug: non_empty(&draft.slug).or_else(|| non_empty(&slugify(&draft.name))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: UserRole,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

pub fn prepare_user(draft: &UserDraft) -> UserPayload {
    UserPayload {
        name: non_empty(&draft.name),
        email: non_empty(draft.email.trim()),
        role: draft.role,
        active: draft.active,
        password: non_empty(&draft.password),
    }
}
