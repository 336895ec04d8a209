use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Backend resource collections.
///
/// Doubles as the dependency tag of cached queries: a mutation of a
/// resource invalidates every cache entry tagged with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Posts,
    Categories,
    Tags,
    Banners,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Posts,
        Resource::Categories,
        Resource::Tags,
        Resource::Banners,
        Resource::Users,
    ];

    /// Collection path segment, e.g. `posts` in `/posts/{id}`.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Categories => "categories",
            Resource::Tags => "tags",
            Resource::Banners => "banners",
            Resource::Users => "users",
        }
    }

    /// Singular label used in notifications ("Post saved").
    pub fn label(self) -> &'static str {
        match self {
            Resource::Posts => "Post",
            Resource::Categories => "Category",
            Resource::Tags => "Tag",
            Resource::Banners => "Banner",
            Resource::Users => "User",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.path() == s)
            .ok_or_else(|| CoreError::UnknownResource(s.to_string()))
    }
}
