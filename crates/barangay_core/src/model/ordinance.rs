//! Enacted ordinance record.

use super::household::normalize_optional_text;
use super::validation::{check_len, choice_key, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OrdinanceId = Uuid;

const MAX_NUMBER_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinanceStatus {
    Active,
    Repealed,
    Amended,
}

impl OrdinanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Repealed => "repealed",
            Self::Amended => "amended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "active" => Some(Self::Active),
            "repealed" => Some(Self::Repealed),
            "amended" => Some(Self::Amended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordinance {
    pub id: OrdinanceId,
    /// Council-assigned number such as `2024-003`; unique across the registry.
    pub ordinance_number: String,
    pub title: String,
    pub description: Option<String>,
    /// Full text. Unbounded.
    pub content: Option<String>,
    pub date_enacted: NaiveDate,
    pub status: OrdinanceStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Ordinance {
    pub fn new(
        ordinance_number: impl Into<String>,
        title: impl Into<String>,
        date_enacted: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ordinance_number: ordinance_number.into(),
            title: title.into(),
            description: None,
            content: None,
            date_enacted,
            status: OrdinanceStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    /// Trims text fields in place, then validates.
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.ordinance_number =
            require_text("ordinance number", &self.ordinance_number, MAX_NUMBER_CHARS)?;
        self.title = require_text("title", &self.title, MAX_TITLE_CHARS)?;
        self.description = normalize_optional_text(self.description.as_deref());
        self.content = normalize_optional_text(self.content.as_deref());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("ordinance number", &self.ordinance_number, MAX_NUMBER_CHARS)?;
        require_text("title", &self.title, MAX_TITLE_CHARS)?;
        check_len("description", self.description.as_deref(), MAX_DESCRIPTION_CHARS)
    }

    /// Whether the ordinance is still in force (active or amended).
    pub fn in_force(&self) -> bool {
        self.status != OrdinanceStatus::Repealed
    }
}

#[cfg(test)]
mod tests {
    use super::{Ordinance, OrdinanceStatus};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn normalize_trims_number_and_drops_blank_text() {
        let enacted = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let mut ordinance = Ordinance::new(" 2024-003 ", "Curfew for Minors", enacted);
        ordinance.description = Some("   ".to_string());
        ordinance.normalize().unwrap();

        assert_eq!(ordinance.ordinance_number, "2024-003");
        assert_eq!(ordinance.description, None);

        ordinance.ordinance_number = " ".to_string();
        assert_eq!(
            ordinance.normalize().unwrap_err(),
            ValidationError::Required("ordinance number")
        );
    }

    #[test]
    fn repealed_ordinance_is_not_in_force() {
        let enacted = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let mut ordinance = Ordinance::new("2020-001", "Anti-Littering", enacted);
        ordinance.status = OrdinanceStatus::Amended;
        assert!(ordinance.in_force());
        ordinance.status = OrdinanceStatus::Repealed;
        assert!(!ordinance.in_force());
    }
}
