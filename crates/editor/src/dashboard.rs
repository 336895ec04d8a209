//! Dashboard: per-resource totals.

use async_trait::async_trait;
use quill_cache::{QueryCache, QueryKey};
use quill_client::ApiError;
use quill_core::post::PostStatus;
use quill_core::resource::Resource;
use serde::Serialize;

/// Cache scope of the dashboard summary.
const DASHBOARD_SCOPE: &str = "dashboard";

/// Record counts for the backend collections.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Number of records of `resource`, optionally filtered by status.
    async fn count(&self, resource: Resource, status: Option<&str>) -> Result<u64, ApiError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub posts: u64,
    pub published_posts: u64,
    pub banners: u64,
    pub categories: u64,
    pub tags: u64,
    pub users: u64,
}

/// Load the summary through the cache.
///
/// The entry is tagged with every resource, so any successful mutation
/// makes the next load refetch.
pub async fn load_dashboard(
    cache: &QueryCache,
    source: &dyn StatsSource,
) -> Result<DashboardSummary, ApiError> {
    cache
        .get_or_fetch(
            QueryKey::new(Resource::Posts, DASHBOARD_SCOPE),
            &Resource::ALL,
            move || fetch_summary(source),
        )
        .await
}

async fn fetch_summary(source: &dyn StatsSource) -> Result<DashboardSummary, ApiError> {
    let (posts, published_posts, banners, categories, tags, users) = tokio::try_join!(
        source.count(Resource::Posts, None),
        source.count(Resource::Posts, Some(PostStatus::Published.as_str())),
        source.count(Resource::Banners, None),
        source.count(Resource::Categories, None),
        source.count(Resource::Tags, None),
        source.count(Resource::Users, None),
    )?;
    tracing::debug!(posts, published_posts, banners, categories, tags, users, "Dashboard loaded");
    Ok(DashboardSummary {
        posts,
        published_posts,
        banners,
        categories,
        tags,
        users,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use quill_cache::CacheConfig;

    use super::*;

    #[derive(Default)]
    struct FixedStats {
        calls: AtomicU32,
    }

    #[async_trait]
    impl StatsSource for FixedStats {
        async fn count(&self, resource: Resource, status: Option<&str>) -> Result<u64, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match (resource, status) {
                (Resource::Posts, Some(_)) => 4,
                (Resource::Posts, None) => 10,
                (Resource::Banners, _) => 2,
                (Resource::Categories, _) => 5,
                (Resource::Tags, _) => 12,
                (Resource::Users, _) => 3,
            })
        }
    }

    #[tokio::test]
    async fn summary_is_cached_until_any_resource_changes() {
        let cache = QueryCache::new(CacheConfig::default());
        let stats = FixedStats::default();

        let summary = load_dashboard(&cache, &stats).await.unwrap();
        assert_eq!(summary.posts, 10);
        assert_eq!(summary.published_posts, 4);
        assert_eq!(summary.tags, 12);
        assert_eq!(stats.calls.load(Ordering::SeqCst), 6);

        load_dashboard(&cache, &stats).await.unwrap();
        assert_eq!(stats.calls.load(Ordering::SeqCst), 6);

        cache.enqueue_invalidation(Resource::Users);
        load_dashboard(&cache, &stats).await.unwrap();
        assert_eq!(stats.calls.load(Ordering::SeqCst), 12);
    }
}
