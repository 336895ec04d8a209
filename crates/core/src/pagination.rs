//! List envelope returned by every collection endpoint.

use serde::{Deserialize, Serialize};

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// `{ "data": [...], "pagination": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    /// Total number of records on the server, falling back to the page
    /// length when the backend omits pagination.
    pub fn total(&self) -> u64 {
        if self.pagination.total == 0 {
            self.data.len() as u64
        } else {
            self.pagination.total
        }
    }
}
