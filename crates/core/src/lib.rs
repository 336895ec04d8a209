//! Domain model of the Quill admin client.
//!
//! This crate has **zero I/O**: entity shapes as received from the backend,
//! the editable drafts built from them, selection sets, validation and the
//! pure reconciliation of drafts into request payloads.

pub mod banner;
pub mod error;
pub mod media;
pub mod pagination;
pub mod post;
pub mod reconcile;
pub mod reference;
pub mod resource;
pub mod selection;
pub mod slug;
pub mod taxonomy;
pub mod types;
pub mod user;
pub mod validation;
