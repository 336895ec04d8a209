//! Back-office user accounts.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{EntityId, Timestamp};
use crate::validation::{not_blank, optional_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    #[default]
    Author,
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct UserDraft {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    /// Only sent when set; an empty value keeps the current password.
    #[validate(custom(function = "optional_password"))]
    pub password: String,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: UserRole::default(),
            active: true,
            password: String::new(),
        }
    }
}

impl UserDraft {
    /// The password is never returned by the backend and starts empty.
    pub fn hydrate(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            active: user.active,
            password: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_active_defaults_to_true() {
        let user: User =
            serde_json::from_str(r#"{"_id":"u1","name":"Ada","email":"ada@example.com","role":"admin"}"#)
                .unwrap();
        assert!(user.active);
        assert_eq!(UserDraft::hydrate(&user).role, UserRole::Admin);
    }

    #[test]
    fn short_password_is_rejected_but_empty_is_allowed() {
        let mut draft = UserDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.password = "short".into();
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let draft = UserDraft {
            name: "Ada".into(),
            email: "nope".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }
}
