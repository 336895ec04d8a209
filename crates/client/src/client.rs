//! REST client for the content backend.
//!
//! Every authenticated call goes through one private `send` helper, which attaches
//! the bearer token from the injected [`AuthContext`] and applies the 401
//! policy. Responses use the `{ "data": ... }` envelope.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use quill_core::media::LocalFile;
use quill_core::pagination::Paginated;
use quill_core::user::User;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, Credentials};
use crate::config::ClientConfig;
use crate::error::{extract_message, ApiError};
use crate::resource::{ApiResource, Banners, Categories, ListParams, Posts, Tags, Users};

/// Multipart field name expected by the upload endpoint.
const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Server confirmation of an image upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Responsive renditions keyed by size name.
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// HTTP client for one backend.
///
/// Cheap to clone; clones share the connection pool and the auth context.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig, auth: Arc<AuthContext>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(http, config.api_url.clone(), auth))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: String, auth: Arc<AuthContext>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn posts(&self) -> ResourceClient<'_, Posts> {
        ResourceClient::new(self)
    }

    pub fn categories(&self) -> ResourceClient<'_, Categories> {
        ResourceClient::new(self)
    }

    pub fn tags(&self) -> ResourceClient<'_, Tags> {
        ResourceClient::new(self)
    }

    pub fn banners(&self) -> ResourceClient<'_, Banners> {
        ResourceClient::new(self)
    }

    pub fn users(&self) -> ResourceClient<'_, Users> {
        ResourceClient::new(self)
    }

    /// Generic accessor for code that is itself generic over the resource.
    pub fn resource<R: ApiResource>(&self) -> ResourceClient<'_, R> {
        ResourceClient::new(self)
    }

    // ---- auth screens ----

    /// Exchange email/password for credentials and initialize the auth
    /// context. A 401 here means bad credentials, not an expired session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .http
            .post(self.url("auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let login: LoginResponse = Self::decode_data(response).await?;

        self.auth
            .sign_in(Credentials {
                access_token: login.access_token.clone(),
                refresh_token: login.refresh_token.clone(),
                user: login.user.clone(),
            })
            .await;
        Ok(login)
    }

    /// Tell the backend the session ends, then tear down the auth context
    /// whatever the backend answered.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "auth/logout").await;
        let result = self.send(builder).await.map(|_| ());
        self.auth.sign_out().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Logout request failed; local session cleared anyway");
        }
        result
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User, ApiError> {
        let builder = self.request(Method::GET, "auth/me").await;
        self.fetch_data(builder).await
    }

    /// Upload one image file; returns its server URL and renditions.
    pub async fn upload_image(&self, file: &LocalFile) -> Result<UploadedImage, ApiError> {
        let mime = file
            .mime_type()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&mime)?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(filename = %file.name, size = file.size(), "Uploading image");
        let builder = self
            .request(Method::POST, "upload/image")
            .await
            .multipart(form);
        self.fetch_data(builder).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the bearer credential attached (the
    /// interceptor).
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.auth.bearer().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send an authenticated request: 401 clears the session, other
    /// non-2xx statuses become [`ApiError::Api`].
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.auth.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }
        Self::ensure_success(response).await
    }

    async fn fetch_data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        Self::decode_data(response).await
    }

    /// Ensure the response has a success status code, turning the body of a
    /// failure into a user-facing message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = extract_message(&body);
            tracing::debug!(status = status.as_u16(), %message, "Backend rejected request");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Decode `{ "data": T }`.
    async fn decode_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        let envelope: DataEnvelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.data)
    }

    /// Decode a whole body (list envelopes carry `pagination` beside `data`).
    async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// CRUD calls of one collection.
pub struct ResourceClient<'a, R: ApiResource> {
    api: &'a ApiClient,
    _resource: PhantomData<R>,
}

impl<'a, R: ApiResource> ResourceClient<'a, R> {
    fn new(api: &'a ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::RESOURCE.path(), id)
    }

    /// `GET /{resource}?page=&limit=&sort=&order=&...`
    pub async fn list(&self, params: &ListParams) -> Result<Paginated<R::Entity>, ApiError> {
        let builder = self
            .api
            .request(Method::GET, R::RESOURCE.path())
            .await
            .query(&params.to_query());
        let response = self.api.send(builder).await?;
        ApiClient::decode_body(response).await
    }

    /// `GET /{resource}/{id}`
    pub async fn get(&self, id: &str) -> Result<R::Entity, ApiError> {
        let builder = self.api.request(Method::GET, &Self::item_path(id)).await;
        self.api.fetch_data(builder).await
    }

    /// `POST /{resource}`
    pub async fn create<P>(&self, payload: &P) -> Result<R::Entity, ApiError>
    where
        P: Serialize + ?Sized,
    {
        tracing::info!(resource = %R::RESOURCE, "Creating entity");
        let builder = self
            .api
            .request(Method::POST, R::RESOURCE.path())
            .await
            .json(payload);
        self.api.fetch_data(builder).await
    }

    /// `PATCH /{resource}/{id}` with a partial payload.
    pub async fn update<P>(&self, id: &str, payload: &P) -> Result<R::Entity, ApiError>
    where
        P: Serialize + ?Sized,
    {
        tracing::info!(resource = %R::RESOURCE, id, "Updating entity");
        let builder = self
            .api
            .request(Method::PATCH, &Self::item_path(id))
            .await
            .json(payload);
        self.api.fetch_data(builder).await
    }

    /// `DELETE /{resource}/{id}`
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        tracing::info!(resource = %R::RESOURCE, id, "Deleting entity");
        let builder = self
            .api
            .request(Method::DELETE, &Self::item_path(id))
            .await;
        self.api.send(builder).await?;
        Ok(())
    }
}
