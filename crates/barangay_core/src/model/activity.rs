//! Community activity record (meetings, clean-up drives, health programs).

use super::household::normalize_optional_text;
use super::validation::{check_len, choice_key, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ActivityId = Uuid;

const MAX_TITLE_CHARS: usize = 200;
const MAX_TYPE_CHARS: usize = 50;
const MAX_PLACE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "scheduled" => Some(Self::Scheduled),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    /// Free label such as `Community Service` or `Health Program`.
    pub activity_type: String,
    pub activity_date: NaiveDate,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub participants_count: Option<u32>,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Activity {
    pub fn new(
        title: impl Into<String>,
        activity_type: impl Into<String>,
        activity_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            activity_type: activity_type.into(),
            activity_date,
            location: None,
            organizer: None,
            participants_count: None,
            description: None,
            status: ActivityStatus::Scheduled,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.title = require_text("title", &self.title, MAX_TITLE_CHARS)?;
        self.activity_type = require_text("activity type", &self.activity_type, MAX_TYPE_CHARS)?;
        self.location = normalize_optional_text(self.location.as_deref());
        self.organizer = normalize_optional_text(self.organizer.as_deref());
        self.description = normalize_optional_text(self.description.as_deref());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_CHARS)?;
        require_text("activity type", &self.activity_type, MAX_TYPE_CHARS)?;
        check_len("location", self.location.as_deref(), MAX_PLACE_CHARS)?;
        check_len("organizer", self.organizer.as_deref(), MAX_PLACE_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, ActivityStatus};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn parse_accepts_both_cancelled_spellings() {
        assert_eq!(ActivityStatus::parse("Canceled"), Some(ActivityStatus::Cancelled));
        assert_eq!(ActivityStatus::parse(" cancelled "), Some(ActivityStatus::Cancelled));
        assert_eq!(ActivityStatus::parse("postponed"), None);
    }

    #[test]
    fn blank_activity_type_is_required() {
        let day = NaiveDate::from_ymd_opt(2024, 9, 21).unwrap();
        let mut activity = Activity::new("Clean-up", "  ", day);
        assert_eq!(
            activity.normalize().unwrap_err(),
            ValidationError::Required("activity type")
        );
    }
}
