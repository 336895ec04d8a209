use quill_client::ApiError;
use quill_core::media::UploadRejection;
use quill_core::validation::FieldErrors;

/// Why an editor operation did not go through.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The draft failed local validation; no request was sent.
    #[error("Validation failed on {} field(s)", .0.len())]
    Invalid(FieldErrors),

    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// Another submit of the same editor has not finished yet.
    #[error("A submit is already in flight")]
    SubmitInFlight,

    /// The file was refused before any upload was attempted.
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    /// The editor was unmounted.
    #[error("Editor is no longer mounted")]
    Unmounted,
}

impl EditorError {
    /// Field errors of a local validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            EditorError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
