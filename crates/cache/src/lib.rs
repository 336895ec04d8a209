//! Query cache for remote reads.
//!
//! Entries are keyed by [`QueryKey`] and tagged with the [`Resource`]s they
//! depend on. A mutation of a resource invalidates every entry tagged with
//! it, either immediately ([`QueryCache::invalidate_now`]) or on the next
//! cache access ([`QueryCache::enqueue_invalidation`]).
//!
//! [`Resource`]: quill_core::resource::Resource

pub mod cache;
pub mod config;
pub mod key;
pub mod retry;

pub use cache::QueryCache;
pub use config::CacheConfig;
pub use key::QueryKey;
pub use retry::RetryPolicy;
