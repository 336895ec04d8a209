//! Image records attached to posts and banners, plus the client-side checks
//! applied to a file before an upload is attempted.

use std::collections::BTreeMap;
use std::io::Cursor;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Size ceiling for a single image upload (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Scheme used for placeholder URLs while an upload is pending.
pub const PLACEHOLDER_SCHEME: &str = "pending-upload://";

/// Lifecycle of one image entry in an editor's image list.
///
/// A slot with no file chosen has no entry at all; entries are created in
/// `PendingLocal` and end either `Uploaded` or removed after `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    /// File accepted locally, placeholder shown, request not started.
    PendingLocal,
    /// Remote call in flight.
    Uploading { progress: u8 },
    /// URL is server-confirmed.
    #[default]
    Uploaded,
    /// Remote call failed; the entry is about to be removed.
    Failed,
}

/// One media asset attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Client-assigned identity, stable for the lifetime of the entry.
    #[serde(skip, default = "Uuid::new_v4")]
    pub local_id: Uuid,
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub order: u32,
    /// Responsive renditions keyed by size name (`thumbnail`, `medium`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, String>,
    #[serde(skip)]
    pub status: UploadStatus,
}

impl ImageRecord {
    /// Build the placeholder entry shown while `file` is being uploaded.
    pub fn placeholder(file: &LocalFile, order: u32) -> Self {
        let local_id = Uuid::new_v4();
        let (width, height) = match local_dimensions(&file.bytes) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        Self {
            local_id,
            url: format!("{PLACEHOLDER_SCHEME}{local_id}"),
            filename: file.name.clone(),
            width,
            height,
            size: Some(file.size()),
            order,
            variants: BTreeMap::new(),
            status: UploadStatus::PendingLocal,
        }
    }

    /// `true` while the URL is still a placeholder.
    pub fn is_uploading(&self) -> bool {
        matches!(
            self.status,
            UploadStatus::PendingLocal | UploadStatus::Uploading { .. }
        ) || self.url.starts_with(PLACEHOLDER_SCHEME)
    }

    /// Upload progress in percent (100 once uploaded).
    pub fn progress(&self) -> u8 {
        match self.status {
            UploadStatus::PendingLocal | UploadStatus::Failed => 0,
            UploadStatus::Uploading { progress } => progress.min(100),
            UploadStatus::Uploaded => 100,
        }
    }
}

/// A file chosen by the user, not yet sent anywhere.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    /// MIME type as reported by the picker, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared MIME type, or one derived from the file extension.
    pub fn mime_type(&self) -> Option<String> {
        match &self.content_type {
            Some(declared) if !declared.trim().is_empty() => Some(declared.trim().to_lowercase()),
            _ => image::ImageFormat::from_path(&self.name)
                .ok()
                .map(|format| format.to_mime_type().to_string()),
        }
    }
}

/// Why a file was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("{name} is not an image")]
    NotAnImage { name: String },

    #[error("{name} is {size} bytes; images must be at most {limit} bytes")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// Accept only image files no larger than [`MAX_IMAGE_BYTES`].
pub fn check_file(file: &LocalFile) -> Result<(), UploadRejection> {
    let is_image = file
        .mime_type()
        .is_some_and(|mime| mime.starts_with("image/"));
    if !is_image {
        return Err(UploadRejection::NotAnImage {
            name: file.name.clone(),
        });
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(UploadRejection::TooLarge {
            name: file.name.clone(),
            size: file.size(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Read pixel dimensions from the file header without decoding the image.
pub fn local_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Renumber `order` so it matches list position.
pub fn renumber(images: &mut [ImageRecord]) {
    for (index, image) in images.iter_mut().enumerate() {
        image.order = index as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid 1x1 PNG.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn accepts_declared_image() {
        let file = LocalFile::new("a.bin", Some("image/png"), vec![0; 10]);
        assert!(check_file(&file).is_ok());
    }

    #[test]
    fn falls_back_to_extension() {
        let file = LocalFile::new("photo.JPG", None, vec![0; 10]);
        assert!(check_file(&file).is_ok());
    }

    #[test]
    fn rejects_non_image() {
        let file = LocalFile::new("notes.pdf", Some("application/pdf"), vec![0; 10]);
        assert_eq!(
            check_file(&file),
            Err(UploadRejection::NotAnImage {
                name: "notes.pdf".into()
            })
        );
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let at_limit = LocalFile::new("a.png", Some("image/png"), vec![0; MAX_IMAGE_BYTES as usize]);
        assert!(check_file(&at_limit).is_ok());

        let over = LocalFile::new(
            "b.png",
            Some("image/png"),
            vec![0; MAX_IMAGE_BYTES as usize + 1],
        );
        assert!(matches!(
            check_file(&over),
            Err(UploadRejection::TooLarge { size: 10_485_761, .. })
        ));
    }

    #[test]
    fn placeholder_reads_header_dimensions() {
        let file = LocalFile::new("dot.png", Some("image/png"), PNG_1X1.to_vec());
        let entry = ImageRecord::placeholder(&file, 3);
        assert_eq!(entry.width, Some(1));
        assert_eq!(entry.height, Some(1));
        assert_eq!(entry.order, 3);
        assert!(entry.is_uploading());
        assert!(entry.url.starts_with(PLACEHOLDER_SCHEME));
        assert_eq!(entry.progress(), 0);
    }

    #[test]
    fn placeholder_tolerates_garbage_bytes() {
        let file = LocalFile::new("x.png", Some("image/png"), vec![1, 2, 3]);
        let entry = ImageRecord::placeholder(&file, 0);
        assert_eq!(entry.width, None);
        assert_eq!(entry.size, Some(3));
    }

    #[test]
    fn server_images_deserialize_as_uploaded() {
        let entry: ImageRecord = serde_json::from_str(
            r#"{"url":"https://cdn/x.png","filename":"x.png","width":10,"height":5,"size":99,"order":1}"#,
        )
        .unwrap();
        assert_eq!(entry.status, UploadStatus::Uploaded);
        assert!(!entry.is_uploading());
        assert_eq!(entry.progress(), 100);
    }
}
