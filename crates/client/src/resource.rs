//! Typed descriptions of the backend collections and their list queries.

use std::collections::BTreeMap;
use std::fmt;

use quill_core::banner::Banner;
use quill_core::post::Post;
use quill_core::resource::Resource;
use quill_core::taxonomy::{Category, Tag};
use quill_core::user::User;
use serde::de::DeserializeOwned;

/// A backend collection with its entity shape.
pub trait ApiResource: Send + Sync + 'static {
    const RESOURCE: Resource;
    type Entity: DeserializeOwned + fmt::Debug + Clone + Send + Sync + 'static;
}

pub struct Posts;
pub struct Categories;
pub struct Tags;
pub struct Banners;
pub struct Users;

impl ApiResource for Posts {
    const RESOURCE: Resource = Resource::Posts;
    type Entity = Post;
}

impl ApiResource for Categories {
    const RESOURCE: Resource = Resource::Categories;
    type Entity = Category;
}

impl ApiResource for Tags {
    const RESOURCE: Resource = Resource::Tags;
    type Entity = Tag;
}

impl ApiResource for Banners {
    const RESOURCE: Resource = Resource::Banners;
    type Entity = Banner;
}

impl ApiResource for Users {
    const RESOURCE: Resource = Resource::Users;
    type Entity = User;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Pagination, sort and filter parameters of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub search: Option<String>,
    pub status: Option<String>,
    /// Resource-specific filters (`category`, `role`, ...).
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn sorted(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(field.into());
        self.order = Some(order);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query-string pairs in a stable order; blank values are skipped.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                pairs.push((key.to_string(), value));
            }
        };
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        push("sort", self.sort.clone());
        push("order", self.order.map(|o| o.as_str().to_string()));
        push("search", self.search.clone());
        push("status", self.status.clone());
        for (key, value) in &self.filters {
            push(key.as_str(), Some(value.clone()));
        }
        pairs
    }
}
