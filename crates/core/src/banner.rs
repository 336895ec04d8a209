//! Promotional banners.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::media::ImageRecord;
use crate::reference::{self, Reference};
use crate::types::{EntityId, Timestamp};
use crate::validation::{not_blank, optional_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerStatus {
    Active,
    #[default]
    Inactive,
    Scheduled,
    Expired,
}

/// A banner as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub status: BannerStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub categories: Vec<Reference>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Editable copy of a banner.
#[derive(Debug, Clone, PartialEq, Default, Validate)]
#[validate(schema(function = "validate_schedule"))]
pub struct BannerDraft {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: String,
    #[validate(custom(function = "optional_url"))]
    pub link_url: String,
    pub status: BannerStatus,
    /// `YYYY-MM-DD`, empty when open-ended.
    pub start_date: String,
    pub end_date: String,
    pub position: Option<i32>,
    pub category_ids: Vec<EntityId>,
    pub images: Vec<ImageRecord>,
}

impl BannerDraft {
    pub fn hydrate(banner: &Banner) -> Self {
        let mut images = banner.images.clone();
        images.sort_by_key(|image| image.order);
        Self {
            title: banner.title.clone(),
            description: banner.description.clone().unwrap_or_default(),
            link_url: banner.link_url.clone().unwrap_or_default(),
            status: banner.status,
            start_date: date_part(banner.start_date.as_deref()),
            end_date: date_part(banner.end_date.as_deref()),
            position: banner.position,
            category_ids: reference::normalize_all(&banner.categories),
            images,
        }
    }
}

/// Backend dates may carry a time component; the form edits the date only.
fn date_part(raw: Option<&str>) -> String {
    raw.map(|s| s.split('T').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            let mut err = ValidationError::new("date");
            err.add_param("field".into(), &field);
            err.with_message(format!("{field} must be a date (YYYY-MM-DD)").into())
        })
}

fn validate_schedule(draft: &BannerDraft) -> Result<(), ValidationError> {
    let start = parse_date("startDate", &draft.start_date)?;
    let end = parse_date("endDate", &draft.end_date)?;
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::new("schedule")
                .with_message("End date must not be before the start date".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrate_strips_time_and_normalizes_categories() {
        let banner: Banner = serde_json::from_str(
            r#"{
                "id": "b1",
                "title": "Sale",
                "status": "scheduled",
                "startDate": "2024-05-01T00:00:00.000Z",
                "endDate": "2024-05-31",
                "categories": ["c1", {"_id": "c2", "name": "Deals"}]
            }"#,
        )
        .unwrap();
        let draft = BannerDraft::hydrate(&banner);
        assert_eq!(draft.start_date, "2024-05-01");
        assert_eq!(draft.end_date, "2024-05-31");
        assert_eq!(draft.category_ids, vec!["c1", "c2"]);
        assert_eq!(draft.status, BannerStatus::Scheduled);
        assert_eq!(draft, BannerDraft::hydrate(&banner));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let draft = BannerDraft {
            title: "Sale".into(),
            start_date: "2024-05-10".into(),
            end_date: "2024-05-01".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn open_ended_schedule_is_fine() {
        let draft = BannerDraft {
            title: "Sale".into(),
            start_date: "2024-05-10".into(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn bad_link_is_rejected() {
        let draft = BannerDraft {
            title: "Sale".into(),
            link_url: "not a url".into(),
            ..Default::default()
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("link_url"));
    }
}
