//! Resident record.
//!
//! # Responsibility
//! - Define the person record that may belong to one household.
//! - Validate registration input and derive age for statistics.
//!
//! # Invariants
//! - `household_id` and `house_number` are set together or cleared together.
//! - `house_number` mirrors the owning household's number; only the store's
//!   membership writes change either field after registration.

use super::household::HouseholdId;
use super::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a resident row.
pub type ResidentId = Uuid;

const NAME_MAX_CHARS: usize = 100;
const PHONE_MAX_CHARS: usize = 20;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parses stored or user-entered values, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentStatus {
    Active,
    Inactive,
}

impl ResidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Resident row as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// Owning household, `None` when unassigned.
    pub household_id: Option<HouseholdId>,
    /// Denormalized copy of the owning household's number.
    pub house_number: Option<String>,
    pub purok: Option<String>,
    pub street_address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub is_senior_citizen: bool,
    pub is_pwd: bool,
    pub is_indigenous: bool,
    pub status: ResidentStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Resident {
    /// Creates an unassigned active resident with a generated id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: Gender,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            date_of_birth,
            gender,
            household_id: None,
            house_number: None,
            purok: None,
            street_address: None,
            phone_number: None,
            email: None,
            is_senior_citizen: false,
            is_pwd: false,
            is_indigenous: false,
            status: ResidentStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    /// Validates persisted-shape invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        if let Some(middle_name) = self.middle_name.as_deref() {
            check_length("middle_name", middle_name, NAME_MAX_CHARS)?;
        }
        if let Some(phone_number) = self.phone_number.as_deref() {
            check_length("phone_number", phone_number, PHONE_MAX_CHARS)?;
        }
        if let Some(email) = self.email.as_deref() {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        if self.household_id.is_some() != self.house_number.is_some() {
            return Err(ValidationError::HouseholdLinkMismatch);
        }
        Ok(())
    }

    /// Full display name, middle name included when present.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Age in completed years on `today`. Zero when born after `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let Some(mut years) = today.year().checked_sub(self.date_of_birth.year()) else {
            return 0;
        };
        if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day())
        {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankName(field));
    }
    check_length(field, value, NAME_MAX_CHARS)
}

fn check_length(field: &'static str, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Gender, Resident};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years_only() {
        let resident = Resident::new("Juan", "Cruz", date(1980, 6, 15), Gender::Male);
        assert_eq!(resident.age_on(date(2024, 6, 14)), 43);
        assert_eq!(resident.age_on(date(2024, 6, 15)), 44);
        assert_eq!(resident.age_on(date(1979, 1, 1)), 0);
    }

    #[test]
    fn house_number_without_household_is_rejected() {
        let mut resident = Resident::new("Ana", "Garcia", date(1996, 1, 2), Gender::Female);
        resident.house_number = Some("101".to_string());
        assert_eq!(
            resident.validate().unwrap_err(),
            ValidationError::HouseholdLinkMismatch
        );

        resident.household_id = Some(Uuid::new_v4());
        assert!(resident.validate().is_ok());
    }

    #[test]
    fn blank_names_and_bad_email_are_rejected() {
        let mut resident = Resident::new(" ", "Reyes", date(1989, 3, 3), Gender::Male);
        assert_eq!(
            resident.validate().unwrap_err(),
            ValidationError::BlankName("first_name")
        );

        resident.first_name = "Pedro".to_string();
        resident.email = Some("pedro-at-example".to_string());
        assert!(matches!(
            resident.validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn gender_parse_accepts_form_labels() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" FEMALE "), Some(Gender::Female));
        assert_eq!(Gender::parse("other"), None);
    }
}
