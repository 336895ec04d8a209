//! Headless editor core of the Quill admin client.
//!
//! Each admin screen is a state object a UI layer binds to:
//!
//! - [`Editor`] -- create/edit screen of one entity type, composed of a
//!   [`FormController`], the tag/category [`Selections`], an
//!   [`ImageUploads`] list and the [`Notifier`].
//! - [`load_dashboard`] -- per-resource totals served through the query cache.
//! - [`Session`] -- the login screen workflow.
//!
//! Remote access goes through the [`EntityStore`], [`ReferenceSource`],
//! [`MediaUploader`] and [`StatsSource`] seams; [`ApiClient`] implements all
//! of them.
//!
//! [`Selections`]: quill_core::selection::Selections
//! [`ApiClient`]: quill_client::ApiClient

pub mod dashboard;
pub mod editor;
pub mod error;
pub mod form;
pub mod notify;
pub mod remote;
pub mod schema;
pub mod session;
pub mod upload;

pub use dashboard::{load_dashboard, DashboardSummary, StatsSource};
pub use editor::{Editor, EditorContext, EditorMode, SubmitOutcome};
pub use error::EditorError;
pub use form::FormController;
pub use notify::{Notice, NoticeLevel, Notifier};
pub use remote::{EntityStore, ReferenceSource};
pub use schema::{BannerSchema, CategorySchema, EditorSchema, EntityOf, PostSchema, TagSchema, UserSchema};
pub use session::Session;
pub use upload::{ImageUploads, MediaUploader, PendingUpload, UploadProgress};
