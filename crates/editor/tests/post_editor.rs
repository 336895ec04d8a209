mod common;

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use assert_matches::assert_matches;
use common::{drain, png, published_post, FakePostStore, Harness};
use quill_client::{ApiError, GENERIC_FAILURE_MESSAGE};
use quill_core::post::PostStatus;
use quill_editor::{Editor, EditorError, EditorMode, NoticeLevel, PostSchema};
use serde_json::{json, Value};

fn editor(h: &Harness, store: &Arc<FakePostStore>, mode: EditorMode) -> Editor<PostSchema> {
    Editor::new(mode, store.clone(), h.ctx.clone())
}

async fn fill_minimal(editor: &Editor<PostSchema>) {
    editor
        .edit(|d| {
            d.title = "Hello".into();
            d.content = "<p>Hi</p>".into();
            d.category_id = "cat1".into();
        })
        .await;
}

fn keys(payload: &Value) -> BTreeSet<String> {
    payload
        .as_object()
        .expect("object payload")
        .keys()
        .cloned()
        .collect()
}

#[tokio::test]
async fn new_post_sends_exactly_the_filled_fields() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    let mut rx = h.notifier.subscribe();

    editor.mount().await.unwrap();
    assert_eq!(editor.categories().await.len(), 1);
    assert_eq!(editor.tags().await.len(), 2);

    fill_minimal(&editor).await;
    let outcome = editor.submit().await.unwrap();

    let payload = store.last_payload();
    assert_eq!(
        payload,
        json!({
            "title": "Hello",
            "content": "<p>Hi</p>",
            "categoryId": "cat1",
            "status": "draft"
        })
    );
    assert!(outcome.created);
    assert_eq!(outcome.id, "new1");
    assert_eq!(editor.mode().await, EditorMode::Edit("new1".into()));
    assert!(!editor.is_dirty().await);

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Post created");
}

#[tokio::test]
async fn editing_published_post_preserves_timestamp_verbatim() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default().with_post(published_post()));
    let editor = editor(&h, &store, EditorMode::Edit("p1".into()));

    editor.mount().await.unwrap();
    let draft = editor.draft().await;
    assert_eq!(draft.category_id, "cat1");
    assert_eq!(draft.status, PostStatus::Published);
    assert_eq!(editor.selections().await.tags.to_vec(), vec!["t1"]);
    let images = editor.images().await;
    assert_eq!(images[0].filename, "a.png");

    editor.edit(|d| d.title = "Launch notes (updated)".into()).await;
    let outcome = editor.submit().await.unwrap();

    assert!(!outcome.created);
    let (op, payload) = store.calls().pop().unwrap();
    assert_eq!(op, "update:p1");
    assert_eq!(payload["publishedAt"], "2023-05-04T08:09:10.123Z");
    assert_eq!(payload["title"], "Launch notes (updated)");
    assert_eq!(payload["tagIds"], json!(["t1"]));
    assert_eq!(payload["images"][0]["url"], "https://cdn.test/a.png");
    assert_eq!(payload["images"][1]["order"], 1);
}

#[tokio::test]
async fn first_publication_stamps_timestamp() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    editor.mount().await.unwrap();

    fill_minimal(&editor).await;
    editor.edit(|d| d.status = PostStatus::Published).await;
    editor.submit().await.unwrap();

    let payload = store.last_payload();
    let stamp = payload["publishedAt"].as_str().expect("stamp");
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[tokio::test]
async fn toggled_tags_are_authoritative() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    editor.mount().await.unwrap();
    fill_minimal(&editor).await;

    assert!(editor.toggle_tag("t1").await);
    assert!(editor.toggle_tag("t2").await);
    assert!(!editor.toggle_tag("t1").await);
    editor.submit().await.unwrap();
    assert_eq!(store.last_payload()["tagIds"], json!(["t2"]));
}

#[tokio::test]
async fn tag_toggled_twice_is_omitted() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    editor.mount().await.unwrap();
    fill_minimal(&editor).await;

    editor.toggle_tag("t1").await;
    editor.toggle_tag("t1").await;
    editor.submit().await.unwrap();

    assert!(!keys(&store.last_payload()).contains("tagIds"));
}

#[tokio::test]
async fn invalid_draft_sets_field_errors_and_sends_nothing() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    let mut rx = h.notifier.subscribe();
    editor.mount().await.unwrap();

    editor.edit(|d| d.title = "Only a title".into()).await;
    let err = editor.submit().await.unwrap_err();

    let errors = err.field_errors().expect("validation failure");
    assert!(errors.contains("content"));
    assert!(errors.contains("categoryId"));
    assert!(!errors.contains("title"));
    assert_eq!(&editor.errors().await, errors);
    assert!(store.calls().is_empty());
    assert!(drain(&mut rx).is_empty());
    assert!(!editor.is_submitting().await);
}

#[tokio::test]
async fn invalid_related_item_url_is_reported_by_path() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    fill_minimal(&editor).await;
    editor
        .edit(|d| {
            d.related_items.push(quill_core::post::RelatedItem {
                title: "Keyboard".into(),
                url: "not a url".into(),
                ..Default::default()
            })
        })
        .await;

    let err = editor.submit().await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("relatedItems[0].url"));
}

#[tokio::test]
async fn remote_rejection_notifies_and_keeps_draft() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    let mut rx = h.notifier.subscribe();
    editor.mount().await.unwrap();
    fill_minimal(&editor).await;

    store.fail_next(409, "Slug already exists");
    let err = editor.submit().await.unwrap_err();

    assert_matches!(err, EditorError::Remote(ApiError::Api { status: 409, .. }));
    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Slug already exists");
    assert_eq!(editor.draft().await.title, "Hello");
    assert!(editor.errors().await.is_empty());
    assert!(editor.is_dirty().await);
    assert_eq!(editor.mode().await, EditorMode::Create);

    // The user can retry once the conflict is fixed.
    editor.submit().await.unwrap();
    assert_eq!(store.calls().len(), 2);
}

#[tokio::test]
async fn server_failure_gets_generic_message() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    let mut rx = h.notifier.subscribe();
    fill_minimal(&editor).await;

    store.fail_next(502, "upstream timeout at 10.0.0.7");
    editor.submit().await.unwrap_err();

    assert_eq!(drain(&mut rx)[0].message, GENERIC_FAILURE_MESSAGE);
    // Mutations are never retried.
    assert_eq!(store.calls().len(), 1);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = Arc::new(editor(&h, &store, EditorMode::Create));
    fill_minimal(&editor).await;

    let release = store.hold_next();
    let first = tokio::spawn({
        let editor = editor.clone();
        async move { editor.submit().await }
    });
    store.entered.notified().await;

    assert!(editor.is_submitting().await);
    assert_matches!(editor.submit().await, Err(EditorError::SubmitInFlight));

    release.send(()).unwrap();
    first.await.unwrap().unwrap();
    assert_eq!(store.calls().len(), 1);
    assert!(!editor.is_submitting().await);
}

#[tokio::test]
async fn pending_images_are_not_submitted() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    fill_minimal(&editor).await;

    editor.add_image(png("done.png")).await.unwrap().finished().await;
    let _release = h.uploader.hold("slow.png");
    editor.add_image(png("slow.png")).await.unwrap();

    editor.submit().await.unwrap();

    let payload = store.last_payload();
    let images = payload["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["url"], "https://cdn.test/done.png");
    // The in-flight entry survives rehydration.
    assert_eq!(editor.images().await.len(), 2);
}

#[tokio::test]
async fn reference_lists_are_served_from_cache() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());

    editor(&h, &store, EditorMode::Create).mount().await.unwrap();
    editor(&h, &store, EditorMode::Create).mount().await.unwrap();

    // One categories call and one tags call in total.
    assert_eq!(h.references.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mutation_invalidates_cached_entity() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default().with_post(published_post()));

    let first = editor(&h, &store, EditorMode::Edit("p1".into()));
    first.mount().await.unwrap();
    first.edit(|d| d.title = "Renamed".into()).await;
    first.submit().await.unwrap();

    let second = editor(&h, &store, EditorMode::Edit("p1".into()));
    second.mount().await.unwrap();
    assert_eq!(second.draft().await.title, "Renamed");
}

#[tokio::test]
async fn missing_entity_fails_mount_with_notice() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Edit("ghost".into()));
    let mut rx = h.notifier.subscribe();

    let err = editor.mount().await.unwrap_err();

    assert_matches!(err, EditorError::Remote(ApiError::Api { status: 404, .. }));
    assert_eq!(drain(&mut rx)[0].message, "Post not found");
}

#[tokio::test]
async fn unmount_silences_upload_handlers() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default());
    let editor = editor(&h, &store, EditorMode::Create);
    let release = h.uploader.hold("late.png");
    let pending = editor.add_image(png("late.png")).await.unwrap();
    h.uploader.started.notified().await;
    let mut rx = h.notifier.subscribe();

    editor.unmount().await;
    release.send(true).unwrap();
    pending.finished().await;

    assert!(drain(&mut rx).is_empty());
    assert!(editor.images().await[0].is_uploading());
    assert_matches!(editor.submit().await, Err(EditorError::Unmounted));
}

#[tokio::test]
async fn reset_discards_edits() {
    let h = Harness::new();
    let store = Arc::new(FakePostStore::default().with_post(published_post()));
    let editor = editor(&h, &store, EditorMode::Edit("p1".into()));
    editor.mount().await.unwrap();

    editor.edit(|d| d.title = "Scratch".into()).await;
    editor.toggle_tag("t2").await;
    editor.reset().await;

    assert_eq!(editor.draft().await.title, "Launch notes");
    assert_eq!(editor.selections().await.tags.to_vec(), vec!["t1"]);
    assert!(!editor.is_dirty().await);
}
