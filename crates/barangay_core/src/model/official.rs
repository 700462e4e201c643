//! Barangay official record.
//!
//! # Invariants
//! - An official always points at a registered resident.
//! - `term_end`, when set, is not before `term_start`.

use super::resident::ResidentId;
use super::validation::{choice_key, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OfficialId = Uuid;

const MAX_POSITION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficialStatus {
    Active,
    Inactive,
}

impl OfficialStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Seat held by a resident, e.g. `Punong Barangay` or `Kagawad`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Official {
    pub id: OfficialId,
    pub resident_id: ResidentId,
    pub position: String,
    pub term_start: NaiveDate,
    pub term_end: Option<NaiveDate>,
    pub status: OfficialStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Official {
    pub fn new(
        resident_id: ResidentId,
        position: impl Into<String>,
        term_start: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            resident_id,
            position: position.into(),
            term_start,
            term_end: None,
            status: OfficialStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("position", &self.position, MAX_POSITION_CHARS)?;
        if self.term_end.is_some_and(|end| end < self.term_start) {
            return Err(ValidationError::EndsBeforeStart {
                start: "term start",
                end: "term end",
            });
        }
        Ok(())
    }

    /// Whether the seat is held on `day`: active status and `day` inside the term.
    pub fn serves_on(&self, day: NaiveDate) -> bool {
        self.status == OfficialStatus::Active
            && day >= self.term_start
            && self.term_end.map_or(true, |end| day <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::{Official, OfficialStatus};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn term_end_before_start_is_rejected() {
        let mut official = Official::new(Uuid::new_v4(), "Kagawad", date(2023, 11, 30));
        official.term_end = Some(date(2023, 1, 1));
        assert!(matches!(
            official.validate(),
            Err(ValidationError::EndsBeforeStart { .. })
        ));
    }

    #[test]
    fn serves_on_respects_term_and_status() {
        let mut official = Official::new(Uuid::new_v4(), "Punong Barangay", date(2023, 11, 30));
        official.term_end = Some(date(2026, 11, 30));
        assert!(official.serves_on(date(2026, 11, 30)));
        assert!(!official.serves_on(date(2026, 12, 1)));

        official.status = OfficialStatus::Inactive;
        assert!(!official.serves_on(date(2024, 1, 1)));
    }
}
