//! Household record.
//!
//! # Responsibility
//! - Define the dwelling-unit record residents are assigned to.
//! - Normalize and validate form-entered household fields.
//!
//! # Invariants
//! - `house_number` is non-empty after trimming for every persisted row.
//! - `location`, when set, is a finite in-range latitude/longitude pair.
//! - `head_of_household_id`, when set, names a current member.

use super::resident::ResidentId;
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a household row.
pub type HouseholdId = Uuid;

/// Geographic point picked on the household map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks both coordinates are finite and inside WGS84 bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Household row as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub house_number: String,
    pub purok: Option<String>,
    pub street_address: Option<String>,
    pub has_electricity: bool,
    pub has_water: bool,
    /// `None` only for rows created before coordinates were collected.
    pub location: Option<GeoPoint>,
    /// Member resident acting as household head.
    pub head_of_household_id: Option<ResidentId>,
    /// Epoch milliseconds, assigned by the store.
    pub created_at: Option<i64>,
    /// Epoch milliseconds, bumped by the store on every update.
    pub updated_at: Option<i64>,
}

impl Household {
    /// Creates a household with a generated id and no utilities.
    pub fn new(house_number: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), house_number)
    }

    /// Creates a household with a caller-provided id.
    pub fn with_id(id: HouseholdId, house_number: impl Into<String>) -> Self {
        Self {
            id,
            house_number: house_number.into(),
            purok: None,
            street_address: None,
            has_electricity: false,
            has_water: false,
            location: None,
            head_of_household_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Validates persisted-shape invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.house_number.trim().is_empty() {
            return Err(ValidationError::BlankHouseNumber);
        }
        if let Some(location) = self.location {
            location.validate()?;
        }
        Ok(())
    }

    /// Returns whether the household has neither electricity nor water.
    pub fn lacks_utilities(&self) -> bool {
        !self.has_electricity && !self.has_water
    }
}

/// Trims a form value and maps blank input to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Trims a house number and rejects blank input.
pub fn normalize_house_number(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankHouseNumber);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_house_number, normalize_optional_text, GeoPoint, Household};
    use crate::model::validation::ValidationError;

    #[test]
    fn blank_house_number_is_rejected() {
        let household = Household::new("   ");
        assert_eq!(
            household.validate().unwrap_err(),
            ValidationError::BlankHouseNumber
        );
        assert!(normalize_house_number("\t").is_err());
        assert_eq!(normalize_house_number(" 101A ").unwrap(), "101A");
    }

    #[test]
    fn out_of_range_location_is_rejected() {
        let mut household = Household::new("12");
        household.location = Some(GeoPoint::new(91.0, 120.0));
        assert!(matches!(
            household.validate(),
            Err(ValidationError::LatitudeOutOfRange(_))
        ));

        household.location = Some(GeoPoint::new(17.65, f64::NAN));
        assert!(matches!(
            household.validate(),
            Err(ValidationError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn optional_text_blank_becomes_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" Purok 1 ")).as_deref(),
            Some("Purok 1")
        );
    }
}
