use std::collections::HashMap;
use std::time::Duration;

use quill_core::resource::Resource;

use crate::retry::RetryPolicy;

/// Default staleness window of cached reads.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Staleness windows and retry behaviour of a [`QueryCache`].
///
/// [`QueryCache`]: crate::QueryCache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry is served without refetching.
    pub stale_after: Duration,
    /// Per-resource windows that replace `stale_after`.
    pub overrides: HashMap<Resource, Duration>,
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            overrides: HashMap::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn new(stale_after: Duration, max_retries: u32) -> Self {
        Self {
            stale_after,
            retry: RetryPolicy::default().with_max_retries(max_retries),
            ..Default::default()
        }
    }

    pub fn with_override(mut self, resource: Resource, stale_after: Duration) -> Self {
        self.overrides.insert(resource, stale_after);
        self
    }

    /// Staleness window for entries of `resource`.
    pub fn stale_after_for(&self, resource: Resource) -> Duration {
        self.overrides
            .get(&resource)
            .copied()
            .unwrap_or(self.stale_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_default_window() {
        let config = CacheConfig::new(Duration::from_secs(60), 2)
            .with_override(Resource::Users, Duration::from_secs(5));
        assert_eq!(config.stale_after_for(Resource::Users), Duration::from_secs(5));
        assert_eq!(config.stale_after_for(Resource::Posts), Duration::from_secs(60));
        assert_eq!(config.retry.max_retries, 2);
    }
}
