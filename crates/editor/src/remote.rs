//! Async seams between the editors and the backend, and their
//! implementation on [`ApiClient`].

use async_trait::async_trait;
use quill_client::{ApiClient, ApiError, Categories, ListParams, SortOrder, Tags, UploadedImage};
use quill_core::media::LocalFile;
use quill_core::resource::Resource;
use quill_core::taxonomy::{Category, Tag};

use crate::dashboard::StatsSource;
use crate::schema::{EditorSchema, EntityOf};
use crate::upload::{MediaUploader, UploadProgress};

/// Page size used to load the category and tag pickers in one request.
const REFERENCE_PAGE_LIMIT: u32 = 500;

/// Reads and writes entities of one editor schema.
#[async_trait]
pub trait EntityStore<S: EditorSchema>: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<EntityOf<S>, ApiError>;

    async fn create(&self, payload: &S::Payload) -> Result<EntityOf<S>, ApiError>;

    async fn update(&self, id: &str, payload: &S::Payload) -> Result<EntityOf<S>, ApiError>;
}

/// Reference data shown in pickers.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn tags(&self) -> Result<Vec<Tag>, ApiError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[async_trait]
impl<S: EditorSchema> EntityStore<S> for ApiClient {
    async fn fetch(&self, id: &str) -> Result<EntityOf<S>, ApiError> {
        self.resource::<S::Api>().get(id).await
    }

    async fn create(&self, payload: &S::Payload) -> Result<EntityOf<S>, ApiError> {
        self.resource::<S::Api>().create(payload).await
    }

    async fn update(&self, id: &str, payload: &S::Payload) -> Result<EntityOf<S>, ApiError> {
        self.resource::<S::Api>().update(id, payload).await
    }
}

#[async_trait]
impl ReferenceSource for ApiClient {
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let params = ListParams::page(1, REFERENCE_PAGE_LIMIT).sorted("name", SortOrder::Asc);
        Ok(self.resource::<Categories>().list(&params).await?.data)
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        let params = ListParams::page(1, REFERENCE_PAGE_LIMIT).sorted("name", SortOrder::Asc);
        Ok(self.resource::<Tags>().list(&params).await?.data)
    }
}

#[async_trait]
impl MediaUploader for ApiClient {
    /// The multipart request reports no intermediate progress; the entry
    /// stays at 0% until the server confirms it.
    async fn upload(
        &self,
        file: &LocalFile,
        _progress: &UploadProgress,
    ) -> Result<UploadedImage, ApiError> {
        self.upload_image(file).await
    }
}

#[async_trait]
impl StatsSource for ApiClient {
    async fn count(&self, resource: Resource, status: Option<&str>) -> Result<u64, ApiError> {
        let mut params = ListParams::page(1, 1);
        if let Some(status) = status {
            params = params.with_status(status);
        }
        let total = match resource {
            Resource::Posts => self.posts().list(&params).await?.total(),
            Resource::Categories => self.resource::<Categories>().list(&params).await?.total(),
            Resource::Tags => self.resource::<Tags>().list(&params).await?.total(),
            Resource::Banners => self.banners().list(&params).await?.total(),
            Resource::Users => self.users().list(&params).await?.total(),
        };
        Ok(total)
    }
}
