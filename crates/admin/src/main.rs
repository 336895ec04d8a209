use std::process::ExitCode;
use std::sync::Arc;

use quill_cache::{CacheConfig, QueryCache};
use quill_client::{ApiClient, AuthContext, ClientConfig, ConfigError};
use quill_editor::{load_dashboard, EditorError, Notifier, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] quill_client::ApiError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

fn required_env(key: &'static str) -> Result<String, AdminError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(AdminError::MissingEnv(key))
}

async fn run() -> Result<(), AdminError> {
    let config = ClientConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, "Loaded configuration");

    let auth = Arc::new(AuthContext::new());
    let client = ApiClient::new(&config, auth)?;
    let cache_config = config.cache_stale_overrides.iter().fold(
        CacheConfig::new(config.cache_stale_after, config.query_retry_count),
        |cache_config, (resource, stale_after)| cache_config.with_override(*resource, *stale_after),
    );
    let cache = Arc::new(QueryCache::new(cache_config));
    let notifier = Arc::new(Notifier::default());

    let mut notices = notifier.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            tracing::info!(level = ?notice.level, "{}", notice.message);
        }
    });

    let session = Session::new(client.clone(), cache.clone(), notifier.clone());
    let email = required_env("QUILL_ADMIN_EMAIL")?;
    let password = required_env("QUILL_ADMIN_PASSWORD")?;
    session.login(&email, &password).await?;

    let summary = load_dashboard(&cache, &client).await;
    session.logout().await;
    let summary = summary?;

    tracing::info!(
        posts = summary.posts,
        published_posts = summary.published_posts,
        banners = summary.banners,
        categories = summary.categories,
        tags = summary.tags,
        users = summary.users,
        "Dashboard",
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_admin=info,quill_client=info,quill_editor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "quill-admin failed");
            ExitCode::FAILURE
        }
    }
}
