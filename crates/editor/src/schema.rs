//! Per-entity editor wiring: how a draft is hydrated, which selections and
//! images it carries, and how it reconciles into a payload.

use quill_client::{ApiResource, Banners, Categories, Posts, Tags, Users};
use quill_core::banner::BannerDraft;
use quill_core::media::ImageRecord;
use quill_core::post::PostDraft;
use quill_core::reconcile::{self, BannerPayload, CategoryPayload, PostPayload, TagPayload, UserPayload};
use quill_core::resource::Resource;
use quill_core::selection::Selections;
use quill_core::taxonomy::{CategoryDraft, TagDraft};
use quill_core::types::Timestamp;
use quill_core::user::UserDraft;
use serde::Serialize;
use validator::Validate;

/// Entity type edited by schema `S`.
pub type EntityOf<S> = <<S as EditorSchema>::Api as ApiResource>::Entity;

pub trait EditorSchema: Send + Sync + 'static {
    type Api: ApiResource;
    type Draft: Validate + Clone + Default + PartialEq + Send + Sync + 'static;
    type Payload: Serialize + Send + Sync + 'static;

    /// Reference lists the editor loads on mount.
    const REFERENCES: &'static [Resource] = &[];

    fn resource() -> Resource {
        <Self::Api as ApiResource>::RESOURCE
    }

    fn entity_id(entity: &EntityOf<Self>) -> &str;

    fn hydrate(entity: &EntityOf<Self>) -> Self::Draft;

    /// Selection sets seeded from a hydrated draft.
    fn selections(_draft: &Self::Draft) -> Selections {
        Selections::default()
    }

    /// Copy the selection sets into the draft's fields.
    fn sync_selections(_draft: &mut Self::Draft, _selections: &Selections) {}

    fn images(_draft: &Self::Draft) -> &[ImageRecord] {
        &[]
    }

    fn set_images(_draft: &mut Self::Draft, _images: Vec<ImageRecord>) {}

    fn prepare(draft: &Self::Draft, selections: &Selections, now: Timestamp) -> Self::Payload;
}

pub struct PostSchema;
pub struct BannerSchema;
pub struct CategorySchema;
pub struct TagSchema;
pub struct UserSchema;

impl EditorSchema for PostSchema {
    type Api = Posts;
    type Draft = PostDraft;
    type Payload = PostPayload;

    const REFERENCES: &'static [Resource] = &[Resource::Categories, Resource::Tags];

    fn entity_id(entity: &EntityOf<Self>) -> &str {
        &entity.id
    }

    fn hydrate(entity: &EntityOf<Self>) -> PostDraft {
        PostDraft::hydrate(entity)
    }

    fn selections(draft: &PostDraft) -> Selections {
        Selections::with_tags(&draft.tag_ids)
    }

    fn sync_selections(draft: &mut PostDraft, selections: &Selections) {
        selections.tags.sync_into(&mut draft.tag_ids);
    }

    fn images(draft: &PostDraft) -> &[ImageRecord] {
        &draft.images
    }

    fn set_images(draft: &mut PostDraft, images: Vec<ImageRecord>) {
        draft.images = images;
    }

    fn prepare(draft: &PostDraft, selections: &Selections, now: Timestamp) -> PostPayload {
        reconcile::prepare_post(draft, selections, now)
    }
}

impl EditorSchema for BannerSchema {
    type Api = Banners;
    type Draft = BannerDraft;
    type Payload = BannerPayload;

    const REFERENCES: &'static [Resource] = &[Resource::Categories];

    fn entity_id(entity: &EntityOf<Self>) -> &str {
        &entity.id
    }

    fn hydrate(entity: &EntityOf<Self>) -> BannerDraft {
        BannerDraft::hydrate(entity)
    }

    fn selections(draft: &BannerDraft) -> Selections {
        Selections::with_categories(&draft.category_ids)
    }

    fn sync_selections(draft: &mut BannerDraft, selections: &Selections) {
        selections.categories.sync_into(&mut draft.category_ids);
    }

    fn images(draft: &BannerDraft) -> &[ImageRecord] {
        &draft.images
    }

    fn set_images(draft: &mut BannerDraft, images: Vec<ImageRecord>) {
        draft.images = images;
    }

    fn prepare(draft: &BannerDraft, selections: &Selections, _now: Timestamp) -> BannerPayload {
        reconcile::prepare_banner(draft, selections)
    }
}

impl EditorSchema for CategorySchema {
    type Api = Categories;
    type Draft = CategoryDraft;
    type Payload = CategoryPayload;

    /// Parent picker.
    const REFERENCES: &'static [Resource] = &[Resource::Categories];

    fn entity_id(entity: &EntityOf<Self>) -> &str {
        &entity.id
    }

    fn hydrate(entity: &EntityOf<Self>) -> CategoryDraft {
        CategoryDraft::hydrate(entity)
    }

    fn prepare(draft: &CategoryDraft, _selections: &Selections, _now: Timestamp) -> CategoryPayload {
        reconcile::prepare_category(draft)
    }
}

impl EditorSchema for TagSchema {
    type Api = Tags;
    type Draft = TagDraft;
    type Payload = TagPayload;

    fn entity_id(entity: &EntityOf<Self>) -> &str {
        &entity.id
    }

    fn hydrate(entity: &EntityOf<Self>) -> TagDraft {
        TagDraft::hydrate(entity)
    }

    fn prepare(draft: &TagDraft, _selections: &Selections, _now: Timestamp) -> TagPayload {
        reconcile::prepare_tag(draft)
    }
}

impl EditorSchema for UserSchema {
    type Api = Users;
    type Draft = UserDraft;
    type Payload = UserPayload;

    fn entity_id(entity: &EntityOf<Self>) -> &str {
        &entity.id
    }

    fn hydrate(entity: &EntityOf<Self>) -> UserDraft {
        UserDraft::hydrate(entity)
    }

    fn prepare(draft: &UserDraft, _selections: &Selections, _now: Timestamp) -> UserPayload {
        reconcile::prepare_user(draft)
    }
}
