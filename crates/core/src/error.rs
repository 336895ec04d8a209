#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown resource '{0}'. Must be one of: posts, categories, tags, banners, users")]
    UnknownResource(String),
}

/// Classifies an error as transient (network failure, 5xx) or permanent.
///
/// The query cache retries reads only when this returns `true`.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}
