//! Remote data client for the Quill content backend.
//!
//! - [`ApiClient`] -- reqwest-based client with one [`ResourceClient`] per
//!   collection (posts, categories, tags, banners, users), the image upload
//!   endpoint and the login/logout calls.
//! - [`AuthContext`] -- the injected credential holder shared by every call
//!   site; a 401 clears it and publishes a redirect to the login screen.
//! - [`ClientConfig`] -- environment-driven configuration.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod resource;

pub use auth::{AuthContext, AuthState, Credentials, LOGIN_PATH};
pub use client::{ApiClient, LoginResponse, ResourceClient, UploadedImage};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use resource::{ApiResource, Banners, Categories, ListParams, Posts, SortOrder, Tags, Users};
