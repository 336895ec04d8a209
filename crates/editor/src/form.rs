//! Form state controller: a draft, its per-field errors and the dirty and
//! submitting flags.
//!
//! Validation runs over the whole draft when [`FormController::validate`] is
//! called (on submit), never on individual edits.

use quill_core::validation::FieldErrors;
use validator::Validate;

use crate::error::EditorError;

#[derive(Debug, Clone)]
pub struct FormController<D> {
    draft: D,
    /// Last hydrated state; `reset` returns here.
    pristine: D,
    errors: FieldErrors,
    dirty: bool,
    submitting: bool,
}

impl<D> Default for FormController<D>
where
    D: Validate + Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> FormController<D>
where
    D: Validate + Clone + Default,
{
    /// An empty form (create mode).
    pub fn new() -> Self {
        Self {
            draft: D::default(),
            pristine: D::default(),
            errors: FieldErrors::default(),
            dirty: false,
            submitting: false,
        }
    }

    /// Replace the draft with one hydrated from an entity. Clears errors and
    /// the dirty flag; hydrating twice with the same draft is a no-op.
    pub fn hydrate(&mut self, draft: D) {
        self.pristine = draft.clone();
        self.draft = draft;
        self.errors = FieldErrors::default();
        self.dirty = false;
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Apply a user edit. Marks the form dirty; does not validate.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut D) -> R) -> R {
        self.dirty = true;
        f(&mut self.draft)
    }

    /// Change the draft without counting as a user edit (selection sync,
    /// image list sync before submit).
    pub fn sync<R>(&mut self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.draft)
    }

    /// Validate the whole draft, replacing the stored field errors.
    pub fn validate(&mut self) -> Result<(), FieldErrors> {
        match self.draft.validate() {
            Ok(()) => {
                self.errors = FieldErrors::default();
                Ok(())
            }
            Err(e) => {
                self.errors = FieldErrors::from(&e);
                Err(self.errors.clone())
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Drop the messages of one field once the user starts correcting it.
    pub fn clear_error(&mut self, field: &str) {
        self.errors.clear_field(field);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Raise the in-flight flag; fails while a submit is pending.
    pub fn begin_submit(&mut self) -> Result<(), EditorError> {
        if self.submitting {
            return Err(EditorError::SubmitInFlight);
        }
        self.submitting = true;
        Ok(())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    /// Discard edits and errors, back to the last hydrated draft.
    pub fn reset(&mut self) {
        self.draft = self.pristine.clone();
        self.errors = FieldErrors::default();
        self.dirty = false;
    }
}
