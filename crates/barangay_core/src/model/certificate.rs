//! Certificate issued to a resident (clearance, residency, indigency, ...).
//!
//! # Responsibility
//! - Record issuance metadata. Printing the paper copy is out of scope.
//!
//! # Invariants
//! - `certificate_number` follows `CERT-YYYY-NNNN` and is unique.
//! - `valid_until`, when set, is not before `issued_date`.
//! - A revoked certificate stays revoked; expiry never overrides it.

use super::household::normalize_optional_text;
use super::resident::ResidentId;
use super::validation::{check_len, choice_key, require_text, ValidationError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CertificateId = Uuid;

const MAX_PURPOSE_CHARS: usize = 500;
const MAX_ISSUER_CHARS: usize = 100;
const NUMBER_PREFIX: &str = "CERT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    BarangayClearance,
    CertificateOfResidency,
    CertificateOfIndigency,
    BusinessPermit,
    GoodMoral,
    FirstTimeJobSeeker,
}

impl CertificateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BarangayClearance => "barangay_clearance",
            Self::CertificateOfResidency => "certificate_of_residency",
            Self::CertificateOfIndigency => "certificate_of_indigency",
            Self::BusinessPermit => "business_permit",
            Self::GoodMoral => "good_moral",
            Self::FirstTimeJobSeeker => "first_time_job_seeker",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "barangay_clearance" | "clearance" => Some(Self::BarangayClearance),
            "certificate_of_residency" | "residency" => Some(Self::CertificateOfResidency),
            "certificate_of_indigency" | "indigency" => Some(Self::CertificateOfIndigency),
            "business_permit" => Some(Self::BusinessPermit),
            "good_moral" => Some(Self::GoodMoral),
            "first_time_job_seeker" => Some(Self::FirstTimeJobSeeker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Active,
    Expired,
    Revoked,
}

impl CertificateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    /// Assigned by the store on issue; empty until then.
    pub certificate_number: String,
    pub certificate_type: CertificateType,
    pub resident_id: ResidentId,
    pub purpose: String,
    pub issued_by: String,
    pub issued_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: CertificateStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Certificate {
    pub fn new(
        certificate_type: CertificateType,
        resident_id: ResidentId,
        purpose: impl Into<String>,
        issued_by: impl Into<String>,
        issued_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            certificate_number: String::new(),
            certificate_type,
            resident_id,
            purpose: purpose.into(),
            issued_by: issued_by.into(),
            issued_date,
            valid_until: None,
            notes: None,
            status: CertificateStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.purpose = require_text("purpose", &self.purpose, MAX_PURPOSE_CHARS)?;
        self.issued_by = require_text("issued by", &self.issued_by, MAX_ISSUER_CHARS)?;
        self.notes = normalize_optional_text(self.notes.as_deref());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("purpose", &self.purpose, MAX_PURPOSE_CHARS)?;
        require_text("issued by", &self.issued_by, MAX_ISSUER_CHARS)?;
        check_len("notes", self.notes.as_deref(), MAX_PURPOSE_CHARS)?;
        if self.valid_until.is_some_and(|until| until < self.issued_date) {
            return Err(ValidationError::EndsBeforeStart {
                start: "issued date",
                end: "valid until",
            });
        }
        Ok(())
    }

    /// Status as of `today`: an active certificate past `valid_until` reads
    /// as expired.
    pub fn effective_status(&self, today: NaiveDate) -> CertificateStatus {
        match (self.status, self.valid_until) {
            (CertificateStatus::Active, Some(until)) if until < today => {
                CertificateStatus::Expired
            }
            (status, _) => status,
        }
    }
}

/// Formats the `sequence`-th certificate of `issued_date`'s year.
pub fn certificate_number(issued_date: NaiveDate, sequence: u32) -> String {
    format!("{NUMBER_PREFIX}-{}-{sequence:04}", issued_date.year())
}

/// Prefix shared by every number issued in `year`, e.g. `CERT-2024-`.
pub fn certificate_number_prefix(year: i32) -> String {
    format!("{NUMBER_PREFIX}-{year}-")
}

#[cfg(test)]
mod tests {
    use super::{certificate_number, Certificate, CertificateStatus, CertificateType};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn number_is_zero_padded_per_year() {
        assert_eq!(certificate_number(date(2024, 3, 9), 7), "CERT-2024-0007");
        assert_eq!(certificate_number(date(2025, 1, 1), 12345), "CERT-2025-12345");
    }

    #[test]
    fn expiry_is_derived_but_revocation_wins() {
        let mut cert = Certificate::new(
            CertificateType::BarangayClearance,
            Uuid::new_v4(),
            "Employment",
            "Punong Barangay",
            date(2024, 1, 10),
        );
        cert.valid_until = Some(date(2024, 7, 10));
        assert_eq!(cert.effective_status(date(2024, 7, 10)), CertificateStatus::Active);
        assert_eq!(cert.effective_status(date(2024, 7, 11)), CertificateStatus::Expired);

        cert.status = CertificateStatus::Revoked;
        assert_eq!(cert.effective_status(date(2024, 7, 11)), CertificateStatus::Revoked);
    }

    #[test]
    fn blank_purpose_and_backwards_validity_are_rejected() {
        let mut cert = Certificate::new(
            CertificateType::GoodMoral,
            Uuid::new_v4(),
            "  ",
            "Secretary",
            date(2024, 5, 1),
        );
        assert_eq!(cert.normalize().unwrap_err(), ValidationError::Required("purpose"));

        cert.purpose = "Scholarship".to_string();
        cert.valid_until = Some(date(2024, 4, 30));
        assert!(matches!(
            cert.normalize(),
            Err(ValidationError::EndsBeforeStart { .. })
        ));
    }

    #[test]
    fn type_accepts_short_labels() {
        assert_eq!(
            CertificateType::parse("Indigency"),
            Some(CertificateType::CertificateOfIndigency)
        );
        assert_eq!(
            CertificateType::parse("First Time Job Seeker"),
            Some(CertificateType::FirstTimeJobSeeker)
        );
        assert_eq!(CertificateType::parse("passport"), None);
    }
}
