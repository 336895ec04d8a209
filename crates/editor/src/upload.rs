//! Image upload state machine.
//!
//! [`ImageUploads`] owns an editor's image list. Each accepted file gets a
//! placeholder entry with a stable `local_id` and its own upload task; the
//! task later replaces or removes exactly that entry, whatever happened to
//! the other entries meanwhile.
//!
//! ```text
//! (no entry) --add_image--> PendingLocal --task start--> Uploading
//!     Uploading --ok--> Uploaded (server url, progress 100)
//!     Uploading --err--> Failed (entry removed)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use quill_client::{ApiError, UploadedImage};
use quill_core::media::{self, ImageRecord, LocalFile, UploadStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::EditorError;
use crate::notify::Notifier;

/// Remote end of an image upload.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(
        &self,
        file: &LocalFile,
        progress: &UploadProgress,
    ) -> Result<UploadedImage, ApiError>;
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Handle an uploader uses to report progress of one entry.
pub struct UploadProgress {
    local_id: Uuid,
    images: Arc<Mutex<Vec<ImageRecord>>>,
    mounted: CancellationToken,
}

impl UploadProgress {
    pub fn local_id(&self) -> Uuid {
        self.local_id
    }

    /// Record `percent` (clamped to 99; 100 means confirmed).
    pub async fn report(&self, percent: u8) {
        if self.mounted.is_cancelled() {
            return;
        }
        let mut images = self.images.lock().await;
        if let Some(entry) = images.iter_mut().find(|i| i.local_id == self.local_id) {
            entry.status = UploadStatus::Uploading {
                progress: percent.min(99),
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Pending upload
// ---------------------------------------------------------------------------

/// An accepted file whose upload task is running.
#[derive(Debug)]
pub struct PendingUpload {
    pub local_id: Uuid,
    handle: JoinHandle<()>,
}

impl PendingUpload {
    /// Wait until the task has applied its outcome to the list.
    pub async fn finished(self) {
        if let Err(e) = self.handle.await {
            tracing::error!(local_id = %self.local_id, error = %e, "Upload task panicked");
        }
    }
}

// ---------------------------------------------------------------------------
// ImageUploads
// ---------------------------------------------------------------------------

/// Shared image list of one editor plus its in-flight uploads.
#[derive(Clone)]
pub struct ImageUploads {
    images: Arc<Mutex<Vec<ImageRecord>>>,
    uploader: Arc<dyn MediaUploader>,
    notifier: Arc<Notifier>,
    mounted: CancellationToken,
}

impl ImageUploads {
    pub fn new(uploader: Arc<dyn MediaUploader>, notifier: Arc<Notifier>) -> Self {
        Self {
            images: Arc::new(Mutex::new(Vec::new())),
            uploader,
            notifier,
            mounted: CancellationToken::new(),
        }
    }

    /// Check `file`, append its placeholder and start the upload.
    ///
    /// A rejected file produces one error notice and leaves the list
    /// untouched. The placeholder is in the list when this returns.
    pub async fn add_image(&self, file: LocalFile) -> Result<PendingUpload, EditorError> {
        if self.mounted.is_cancelled() {
            return Err(EditorError::Unmounted);
        }
        if let Err(rejection) = media::check_file(&file) {
            tracing::info!(filename = %file.name, reason = %rejection, "Image rejected");
            self.notifier.error(rejection.to_string());
            return Err(rejection.into());
        }

        let local_id = {
            let mut images = self.images.lock().await;
            let placeholder = ImageRecord::placeholder(&file, images.len() as u32);
            let local_id = placeholder.local_id;
            images.push(placeholder);
            local_id
        };
        tracing::debug!(%local_id, filename = %file.name, "Image queued for upload");

        let task = UploadTask {
            local_id,
            file,
            images: Arc::clone(&self.images),
            uploader: Arc::clone(&self.uploader),
            notifier: Arc::clone(&self.notifier),
            mounted: self.mounted.clone(),
        };
        let handle = tokio::spawn(task.run());
        Ok(PendingUpload { local_id, handle })
    }

    /// Snapshot of the list in display order.
    pub async fn images(&self) -> Vec<ImageRecord> {
        self.images.lock().await.clone()
    }

    /// Number of entries whose upload has not completed.
    pub async fn pending_count(&self) -> usize {
        self.images
            .lock()
            .await
            .iter()
            .filter(|i| i.is_uploading())
            .count()
    }

    /// Remove an entry. An in-flight upload of it completes without
    /// re-adding it.
    pub async fn remove(&self, local_id: Uuid) -> bool {
        let mut images = self.images.lock().await;
        let before = images.len();
        images.retain(|i| i.local_id != local_id);
        media::renumber(&mut images);
        images.len() != before
    }

    /// Move the entry at `from` to position `to`.
    pub async fn reorder(&self, from: usize, to: usize) -> bool {
        let mut images = self.images.lock().await;
        if from >= images.len() || to >= images.len() {
            return false;
        }
        let entry = images.remove(from);
        images.insert(to, entry);
        media::renumber(&mut images);
        true
    }

    /// Replace the confirmed entries with `confirmed` (hydration), keeping
    /// uploads still in flight at the end of the list.
    pub async fn rehydrate(&self, confirmed: Vec<ImageRecord>) {
        let mut images = self.images.lock().await;
        let pending: Vec<ImageRecord> = images.drain(..).filter(|i| i.is_uploading()).collect();
        images.extend(confirmed);
        images.extend(pending);
        media::renumber(&mut images);
    }

    /// Unmount: in-flight tasks keep running but no longer touch the list
    /// or notify.
    pub fn detach(&self) {
        self.mounted.cancel();
    }}

struct UploadTask {
    local_id: Uuid,
    file: LocalFile,
    images: Arc<Mutex<Vec<ImageRecord>>>,
    uploader: Arc<dyn MediaUploader>,
    notifier: Arc<Notifier>,
    mounted: CancellationToken,
}

impl UploadTask {
    async fn run(self) {
        let progress = UploadProgress {
            local_id: self.local_id,
            images: Arc::clone(&self.images),
            mounted: self.mounted.clone(),
        };
        progress.report(0).await;

        let result = self.uploader.upload(&self.file, &progress).await;

        let mut images = self.images.lock().await;
        if self.mounted.is_cancelled() {
            tracing::debug!(local_id = %self.local_id, "Editor unmounted, dropping upload outcome");
            return;
        }
        let position = images.iter().position(|i| i.local_id == self.local_id);

        match (result, position) {
            (Ok(uploaded), Some(index)) => {
                let entry = &mut images[index];
                entry.url = uploaded.url;
                if !uploaded.filename.is_empty() {
                    entry.filename = uploaded.filename;
                }
                entry.width = uploaded.width.or(entry.width);
                entry.height = uploaded.height.or(entry.height);
                entry.size = uploaded.size.or(entry.size);
                entry.variants = uploaded.variants;
                entry.status = UploadStatus::Uploaded;
                tracing::info!(local_id = %self.local_id, url = %entry.url, "Image uploaded");
                drop(images);
                self.notifier.success(format!("{} uploaded", self.file.name));
            }
            (Ok(_), None) => {
                tracing::debug!(local_id = %self.local_id, "Image removed before its upload finished");
            }
            (Err(e), position) => {
                if let Some(index) = position {
                    images[index].status = UploadStatus::Failed;
                    images.remove(index);
                    media::renumber(&mut images);
                }
                drop(images);
                tracing::warn!(local_id = %self.local_id, error = %e, "Image upload failed");
                self.notifier.error(format!(
                    "Failed to upload {}: {}",
                    self.file.name,
                    e.user_message()
                ));
            }
        }
    }
}
