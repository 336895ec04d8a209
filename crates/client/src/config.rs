use std::time::Duration;

use quill_core::resource::Resource;

/// Default backend base URL for local development.
const DEFAULT_API_URL: &str = "http://localhost:4000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_STALE_SECS: u64 = 300;
const DEFAULT_QUERY_RETRY_COUNT: u32 = 3;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Staleness window of cached reads.
    pub cache_stale_after: Duration,
    /// Retries of a failed read (5xx / network) before giving up.
    pub query_retry_count: u32,
    /// Per-resource staleness windows replacing `cache_stale_after`.
    pub cache_stale_overrides: Vec<(Resource, Duration)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cache_stale_after: Duration::from_secs(DEFAULT_CACHE_STALE_SECS),
            query_retry_count: DEFAULT_QUERY_RETRY_COUNT,
            cache_stale_overrides: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `QUILL_API_URL`        | `http://localhost:4000/api`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                         |
    /// | `CACHE_STALE_SECS`     | `300`                        |
    /// | `QUERY_RETRY_COUNT`    | `3`                          |
    /// | `CACHE_STALE_OVERRIDES`| none, e.g. `users=30,tags=3600` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = get("QUILL_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "QUILL_API_URL",
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let request_timeout_secs = parse_or(
            &get,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
            "a whole number of seconds",
        )?;
        let cache_stale_secs = parse_or(
            &get,
            "CACHE_STALE_SECS",
            DEFAULT_CACHE_STALE_SECS,
            "a whole number of seconds",
        )?;
        let query_retry_count = parse_or(
            &get,
            "QUERY_RETRY_COUNT",
            DEFAULT_QUERY_RETRY_COUNT,
            "a non-negative integer",
        )?;

        let cache_stale_overrides = match get("CACHE_STALE_OVERRIDES") {
            Some(raw) => parse_overrides(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            cache_stale_after: Duration::from_secs(cache_stale_secs),
            query_retry_count,
            cache_stale_overrides,
        })
    }
}

fn parse_or<F, T>(
    get: &F,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value: raw,
        }),
    }
}

/// Parse `resource=secs` pairs separated by commas.
fn parse_overrides(raw: &str) -> Result<Vec<(Resource, Duration)>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "CACHE_STALE_OVERRIDES",
        expected: "comma separated resource=seconds pairs",
        value: raw.to_string(),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (resource, secs) = pair.split_once('=').ok_or_else(invalid)?;
            let resource: Resource = resource.trim().parse().map_err(|e| {
                tracing::warn!(error = %e, "Bad cache override");
                invalid()
            })?;
            let secs: u64 = secs.trim().parse().map_err(|_| invalid())?;
            Ok::<_, ConfigError>((resource, Duration::from_secs(secs)))
        })
        .collect()
}
