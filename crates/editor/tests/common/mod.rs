//! In-memory fakes for the editor seams.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill_cache::QueryCache;
use quill_client::{ApiError, UploadedImage};
use quill_core::media::LocalFile;
use quill_core::post::Post;
use quill_core::taxonomy::{Category, Tag};
use quill_editor::{
    EditorContext, EntityOf, EntityStore, MediaUploader, Notice, Notifier, PostSchema,
    ReferenceSource, UploadProgress,
};
use serde_json::{json, Value};
use tokio::sync::{broadcast, oneshot, Notify};

/// Smallest valid 1x1 PNG.
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub fn png(name: &str) -> LocalFile {
    LocalFile::new(name, Some("image/png"), PNG_1X1.to_vec())
}

pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        out.push(notice);
    }
    out
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Post store keeping records as wire JSON.
#[derive(Default)]
pub struct FakePostStore {
    records: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Value)>>,
    failure: Mutex<Option<(u16, String)>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    /// Signalled when a create/update call has started.
    pub entered: Notify,
    next_id: AtomicU32,
}

impl FakePostStore {
    pub fn with_post(self, record: Value) -> Self {
        let id = record["_id"].as_str().expect("record id").to_string();
        self.records.lock().unwrap().insert(id, record);
        self
    }

    /// Make the next mutation fail with `status`.
    pub fn fail_next(&self, status: u16, message: &str) {
        *self.failure.lock().unwrap() = Some((status, message.to_string()));
    }

    /// Hold the next mutation until the returned sender fires.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    /// `(operation, payload)` of every mutation, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> Value {
        self.calls().last().expect("a mutation").1.clone()
    }

    async fn mutate(&self, op: String, id: String, payload: Value) -> Result<Post, ApiError> {
        self.calls.lock().unwrap().push((op, payload.clone()));
        self.entered.notify_one();

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let failure = self.failure.lock().unwrap().take();
        if let Some((status, message)) = failure {
            return Err(ApiError::Api { status, message });
        }

        let mut records = self.records.lock().unwrap();
        let record = records.entry(id.clone()).or_insert_with(|| json!({ "_id": id }));
        let fields = record.as_object_mut().expect("object record");
        for (key, value) in payload.as_object().expect("object payload") {
            let key = match key.as_str() {
                "categoryId" => "category",
                "tagIds" => "tags",
                other => other,
            };
            fields.insert(key.to_string(), value.clone());
        }
        Ok(serde_json::from_value(record.clone()).expect("post record"))
    }
}

#[async_trait]
impl EntityStore<PostSchema> for FakePostStore {
    async fn fetch(&self, id: &str) -> Result<EntityOf<PostSchema>, ApiError> {
        let record = self.records.lock().unwrap().get(id).cloned();
        match record {
            Some(record) => Ok(serde_json::from_value(record).expect("post record")),
            None => Err(ApiError::Api {
                status: 404,
                message: "Post not found".into(),
            }),
        }
    }

    async fn create(
        &self,
        payload: &<PostSchema as quill_editor::EditorSchema>::Payload,
    ) -> Result<EntityOf<PostSchema>, ApiError> {
        let id = format!("new{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let payload = serde_json::to_value(payload).expect("payload json");
        self.mutate("create".into(), id, payload).await
    }

    async fn update(
        &self,
        id: &str,
        payload: &<PostSchema as quill_editor::EditorSchema>::Payload,
    ) -> Result<EntityOf<PostSchema>, ApiError> {
        let payload = serde_json::to_value(payload).expect("payload json");
        self.mutate(format!("update:{id}"), id.to_string(), payload).await
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeReferences {
    pub calls: AtomicU32,
}

#[async_trait]
impl ReferenceSource for FakeReferences {
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![serde_json::from_value(json!({"_id": "cat1", "name": "News", "slug": "news"}))
            .expect("category")])
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            serde_json::from_value(json!({"_id": "t1", "name": "rust"})).expect("tag"),
            serde_json::from_value(json!({"_id": "t2", "name": "async"})).expect("tag"),
        ])
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Uploader whose outcome per file name is decided by the test.
#[derive(Default)]
pub struct FakeUploader {
    gates: Mutex<HashMap<String, oneshot::Receiver<bool>>>,
    /// Signalled after a held upload has reported progress.
    pub started: Notify,
}

impl FakeUploader {
    /// Hold the upload of `name`: send `true` to succeed, `false` to fail.
    pub fn hold(&self, name: &str) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(name.to_string(), rx);
        tx
    }
}

#[async_trait]
impl MediaUploader for FakeUploader {
    async fn upload(
        &self,
        file: &LocalFile,
        progress: &UploadProgress,
    ) -> Result<UploadedImage, ApiError> {
        let gate = self.gates.lock().unwrap().remove(&file.name);
        let succeed = match gate {
            Some(gate) => {
                progress.report(40).await;
                self.started.notify_one();
                gate.await.unwrap_or(false)
            }
            None => true,
        };
        if !succeed {
            return Err(ApiError::Api {
                status: 500,
                message: "storage unavailable".into(),
            });
        }
        Ok(UploadedImage {
            url: format!("https://cdn.test/{}", file.name),
            filename: file.name.clone(),
            width: Some(800),
            height: Some(600),
            size: Some(file.size()),
            variants: BTreeMap::from([(
                "thumbnail".to_string(),
                format!("https://cdn.test/thumb/{}", file.name),
            )]),
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub ctx: EditorContext,
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<Notifier>,
    pub references: Arc<FakeReferences>,
    pub uploader: Arc<FakeUploader>,
}

impl Harness {
    pub fn new() -> Self {
        let cache = Arc::new(QueryCache::default());
        let notifier = Arc::new(Notifier::default());
        let references = Arc::new(FakeReferences::default());
        let uploader = Arc::new(FakeUploader::default());
        let ctx = EditorContext::new(
            cache.clone(),
            notifier.clone(),
            references.clone(),
            uploader.clone(),
        );
        Self {
            ctx,
            cache,
            notifier,
            references,
            uploader,
        }
    }
}

/// A published post as the backend returns it.
pub fn published_post() -> Value {
    json!({
        "_id": "p1",
        "title": "Launch notes",
        "content": "<p>We shipped.</p>",
        "status": "published",
        "category": {"_id": "cat1", "name": "News"},
        "tags": [{"_id": "t1", "name": "rust"}],
        "images": [
            {"url": "https://cdn.test/b.png", "filename": "b.png", "order": 1},
            {"url": "https://cdn.test/a.png", "filename": "a.png", "order": 0}
        ],
        "publishedAt": "2023-05-04T08:09:10.123Z"
    })
}
