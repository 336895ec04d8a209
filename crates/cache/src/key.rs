use std::fmt;

use quill_core::resource::Resource;

/// Identity of one cached query: the collection plus a scope string such as
/// `list?page=1&limit=20` or `id:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub resource: Resource,
    pub scope: String,
}

impl QueryKey {
    pub fn new(resource: Resource, scope: impl Into<String>) -> Self {
        Self {
            resource,
            scope: scope.into(),
        }
    }

    /// Key of a single entity read.
    pub fn item(resource: Resource, id: &str) -> Self {
        Self::new(resource, format!("id:{id}"))
    }

    /// Key of the unfiltered list of a collection.
    pub fn all(resource: Resource) -> Self {
        Self::new(resource, "list")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource, self.scope)
    }
}
