//! Editor composition: one create/edit screen of an entity type.
//!
//! An [`Editor`] ties together the form controller, the selection sets, the
//! image list and the shared services in [`EditorContext`]. All state sits
//! behind one `tokio::sync::Mutex`, which is never held across a remote
//! call; the form's submitting flag is the only guard against a second
//! submit.

use std::fmt;
use std::sync::Arc;

use quill_cache::{QueryCache, QueryKey};
use quill_client::{ApiClient, ApiError};
use quill_core::media::{ImageRecord, LocalFile};
use quill_core::resource::Resource;
use quill_core::selection::Selections;
use quill_core::taxonomy::{Category, Tag};
use quill_core::types::EntityId;
use quill_core::validation::FieldErrors;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::EditorError;
use crate::form::FormController;
use crate::notify::Notifier;
use crate::remote::{EntityStore, ReferenceSource};
use crate::schema::{EditorSchema, EntityOf};
use crate::upload::{ImageUploads, MediaUploader, PendingUpload};

/// Cache scope of the picker lists.
const OPTIONS_SCOPE: &str = "options";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(EntityId),
}

/// Services shared by every editor of the application.
#[derive(Clone)]
pub struct EditorContext {
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<Notifier>,
    pub references: Arc<dyn ReferenceSource>,
    pub uploader: Arc<dyn MediaUploader>,
}

impl EditorContext {
    pub fn new(
        cache: Arc<QueryCache>,
        notifier: Arc<Notifier>,
        references: Arc<dyn ReferenceSource>,
        uploader: Arc<dyn MediaUploader>,
    ) -> Self {
        Self {
            cache,
            notifier,
            references,
            uploader,
        }
    }

    /// Context whose remote seams are all served by `client`.
    pub fn from_client(client: &ApiClient, cache: Arc<QueryCache>, notifier: Arc<Notifier>) -> Self {
        let api = Arc::new(client.clone());
        Self::new(cache, notifier, api.clone(), api)
    }
}

/// Result of a successful submit.
pub struct SubmitOutcome<S: EditorSchema> {
    pub id: EntityId,
    /// `true` when the entity was created by this submit.
    pub created: bool,
    /// The server-confirmed entity the editor rehydrated from.
    pub entity: EntityOf<S>,
}

impl<S: EditorSchema> fmt::Debug for SubmitOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitOutcome")
            .field("id", &self.id)
            .field("created", &self.created)
            .field("entity", &self.entity)
            .finish()
    }
}

impl<S: EditorSchema> Clone for SubmitOutcome<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            created: self.created,
            entity: self.entity.clone(),
        }
    }
}

struct EditorState<S: EditorSchema> {
    mode: EditorMode,
    form: FormController<S::Draft>,
    selections: Selections,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    mounted: bool,
}

pub struct Editor<S: EditorSchema> {
    state: Mutex<EditorState<S>>,
    store: Arc<dyn EntityStore<S>>,
    uploads: ImageUploads,
    ctx: EditorContext,
}

impl<S: EditorSchema> Editor<S> {
    pub fn new(mode: EditorMode, store: Arc<dyn EntityStore<S>>, ctx: EditorContext) -> Self {
        let uploads = ImageUploads::new(Arc::clone(&ctx.uploader), Arc::clone(&ctx.notifier));
        Self {
            state: Mutex::new(EditorState {
                mode,
                form: FormController::new(),
                selections: Selections::default(),
                categories: Vec::new(),
                tags: Vec::new(),
                mounted: true,
            }),
            store,
            uploads,
            ctx,
        }
    }

    /// Load the picker lists and, in edit mode, hydrate from the entity.
    pub async fn mount(&self) -> Result<(), EditorError> {
        let mode = self.mode().await;
        tracing::debug!(resource = %S::resource(), mode = ?mode, "Mounting editor");

        let loaded = async {
            let (categories, tags) = self.load_references().await?;
            let entity = match &mode {
                EditorMode::Create => None,
                EditorMode::Edit(id) => Some(self.load_entity(id).await?),
            };
            Ok::<_, ApiError>((categories, tags, entity))
        }
        .await;

        let (categories, tags, entity) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(resource = %S::resource(), error = %e, "Editor failed to load");
                self.ctx.notifier.error(e.user_message());
                return Err(e.into());
            }
        };

        let mut state = self.state.lock().await;
        state.categories = categories;
        state.tags = tags;
        if let Some(entity) = entity {
            self.hydrate(&mut state, &entity).await;
        }
        Ok(())
    }

    // ---- read accessors ----

    pub async fn mode(&self) -> EditorMode {
        self.state.lock().await.mode.clone()
    }

    pub async fn draft(&self) -> S::Draft {
        self.state.lock().await.form.draft().clone()
    }

    pub async fn errors(&self) -> FieldErrors {
        self.state.lock().await.form.errors().clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.state.lock().await.form.is_dirty()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.form.is_submitting()
    }

    pub async fn selections(&self) -> Selections {
        self.state.lock().await.selections.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.lock().await.categories.clone()
    }

    pub async fn tags(&self) -> Vec<Tag> {
        self.state.lock().await.tags.clone()
    }

    pub async fn images(&self) -> Vec<ImageRecord> {
        self.uploads.images().await
    }

    // ---- edits ----

    /// Apply a user edit to the draft; no validation runs here.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut S::Draft) -> R) -> R {
        self.state.lock().await.form.edit(f)
    }

    pub async fn clear_error(&self, field: &str) {
        self.state.lock().await.form.clear_error(field);
    }

    /// Toggle a tag; returns whether it is now selected.
    pub async fn toggle_tag(&self, id: &str) -> bool {
        self.state.lock().await.selections.tags.toggle(id)
    }

    /// Toggle a category; returns whether it is now selected.
    pub async fn toggle_category(&self, id: &str) -> bool {
        self.state.lock().await.selections.categories.toggle(id)
    }

    pub async fn add_image(&self, file: LocalFile) -> Result<PendingUpload, EditorError> {
        self.uploads.add_image(file).await
    }

    pub async fn remove_image(&self, local_id: Uuid) -> bool {
        self.uploads.remove(local_id).await
    }

    pub async fn move_image(&self, from: usize, to: usize) -> bool {
        self.uploads.reorder(from, to).await
    }

    /// Discard unsaved edits.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.form.reset();
        let draft = state.form.draft().clone();
        state.selections = S::selections(&draft);
        drop(state);
        self.uploads.rehydrate(S::images(&draft).to_vec()).await;
    }

    // ---- submit ----

    /// Validate, reconcile and send the draft.
    ///
    /// Local validation failures update the field errors and send nothing.
    /// Remote failures notify the user and leave the draft and field errors
    /// as they were.
    pub async fn submit(&self) -> Result<SubmitOutcome<S>, EditorError> {
        let images = self.uploads.images().await;
        let (mode, payload) = {
            let mut state = self.state.lock().await;
            if !state.mounted {
                return Err(EditorError::Unmounted);
            }
            if let Err(e) = state.form.begin_submit() {
                tracing::debug!(resource = %S::resource(), "Submit ignored, one is in flight");
                return Err(e);
            }

            let selections = state.selections.clone();
            state.form.sync(|draft| {
                S::sync_selections(draft, &selections);
                S::set_images(draft, images);
            });

            if let Err(errors) = state.form.validate() {
                state.form.finish_submit();
                tracing::debug!(resource = %S::resource(), fields = errors.len(), "Draft failed validation");
                return Err(EditorError::Invalid(errors));
            }

            let payload = S::prepare(state.form.draft(), &selections, chrono::Utc::now());
            (state.mode.clone(), payload)
        };

        let result = match &mode {
            EditorMode::Create => self.store.create(&payload).await,
            EditorMode::Edit(id) => self.store.update(id, &payload).await,
        };

        let mut state = self.state.lock().await;
        state.form.finish_submit();
        let resource = S::resource();

        let entity = match result {
            Ok(entity) => entity,
            Err(e) => {
                tracing::warn!(resource = %resource, error = %e, "Submit rejected");
                self.ctx.notifier.error(e.user_message());
                return Err(e.into());
            }
        };

        self.ctx.cache.enqueue_invalidation(resource);
        let created = mode == EditorMode::Create;
        let id = S::entity_id(&entity).to_string();
        tracing::info!(resource = %resource, id = %id, created, "Entity saved");
        self.ctx.notifier.success(format!(
            "{} {}",
            resource.label(),
            if created { "created" } else { "updated" }
        ));

        if state.mounted {
            state.mode = EditorMode::Edit(id.clone());
            self.hydrate(&mut state, &entity).await;
        }
        Ok(SubmitOutcome {
            id,
            created,
            entity,
        })
    }

    /// Leave the screen. Pending uploads finish without touching the
    /// editor or notifying.
    pub async fn unmount(&self) {
        self.uploads.detach();
        self.state.lock().await.mounted = false;
        tracing::debug!(resource = %S::resource(), "Editor unmounted");
    }

    // ---- private helpers ----

    async fn hydrate(&self, state: &mut EditorState<S>, entity: &EntityOf<S>) {
        let draft = S::hydrate(entity);
        state.selections = S::selections(&draft);
        self.uploads.rehydrate(S::images(&draft).to_vec()).await;
        state.form.hydrate(draft);
    }

    async fn load_references(&self) -> Result<(Vec<Category>, Vec<Tag>), ApiError> {
        let cache = &self.ctx.cache;
        let source = self.ctx.references.as_ref();
        let mut categories = Vec::new();
        let mut tags = Vec::new();

        if S::REFERENCES.contains(&Resource::Categories) {
            categories = cache
                .get_or_fetch(
                    QueryKey::new(Resource::Categories, OPTIONS_SCOPE),
                    &[],
                    move || source.categories(),
                )
                .await?;
        }
        if S::REFERENCES.contains(&Resource::Tags) {
            tags = cache
                .get_or_fetch(
                    QueryKey::new(Resource::Tags, OPTIONS_SCOPE),
                    &[],
                    move || source.tags(),
                )
                .await?;
        }
        Ok((categories, tags))
    }

    async fn load_entity(&self, id: &str) -> Result<EntityOf<S>, ApiError> {
        let store = self.store.as_ref();
        self.ctx
            .cache
            .get_or_fetch(QueryKey::item(S::resource(), id), &[], move || store.fetch(id))
            .await
    }
}
