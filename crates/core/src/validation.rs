//! Field validators shared by the drafts, and flattening of
//! [`validator::ValidationErrors`] into per-field messages keyed by wire
//! (camelCase) field names.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use validator::{ValidateUrl, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Minimum length of a password set from the user editor.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Key under which struct-level (schema) errors are reported.
pub const FORM_LEVEL_KEY: &str = "__all__";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Required text: at least one non-whitespace character.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("required", "This field is required"))
    } else {
        Ok(())
    }
}

/// Empty means "unset"; anything else must be an absolute URL.
pub fn optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(error("url", "Enter a valid URL"))
    }
}

/// Empty means "derive from the name"; otherwise lowercase kebab-case.
pub fn optional_slug(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || SLUG_RE.is_match(value) {
        Ok(())
    } else {
        Err(error(
            "slug",
            "Use lowercase letters, digits and single hyphens",
        ))
    }
}

/// Empty means "unchanged".
pub fn optional_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(())
    } else {
        Err(error(
            "password",
            "Password must be at least 8 characters long",
        ))
    }
}

/// Per-field error messages, keyed by wire field path
/// (`title`, `categoryId`, `relatedItems[0].url`, `__all__`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Drop the messages of one field (the user is correcting it).
    pub fn clear_field(&mut self, field: &str) {
        self.0.remove(field);
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        collect(errors, "", &mut out);
        out
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        FieldErrors::from(&errors)
    }
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = if &**field == FORM_LEVEL_KEY {
            FORM_LEVEL_KEY.to_string()
        } else {
            camel_case(field)
        };
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.insert(path.clone(), message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// `category_id` -> `categoryId`.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
