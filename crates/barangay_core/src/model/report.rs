//! Incident, complaint, and request reports filed with the barangay.
//!
//! # Invariants
//! - New reports start `Pending`.
//! - `Closed` is terminal: a closed report never changes status again.

use super::household::normalize_optional_text;
use super::validation::{check_len, choice_key, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReportId = Uuid;

const MAX_TITLE_CHARS: usize = 200;
const MAX_TYPE_CHARS: usize = 50;
const MAX_PLACE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Pending and in-progress reports still need action.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    /// Free label such as `Incident` or `Complaint`.
    pub report_type: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: ReportPriority,
    pub reported_by: Option<String>,
    pub reported_date: NaiveDate,
    pub status: ReportStatus,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Report {
    pub fn new(
        title: impl Into<String>,
        report_type: impl Into<String>,
        reported_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            report_type: report_type.into(),
            description: None,
            location: None,
            priority: ReportPriority::Medium,
            reported_by: None,
            reported_date,
            status: ReportStatus::Pending,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.title = require_text("title", &self.title, MAX_TITLE_CHARS)?;
        self.report_type = require_text("report type", &self.report_type, MAX_TYPE_CHARS)?;
        self.description = normalize_optional_text(self.description.as_deref());
        self.location = normalize_optional_text(self.location.as_deref());
        self.reported_by = normalize_optional_text(self.reported_by.as_deref());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_CHARS)?;
        require_text("report type", &self.report_type, MAX_TYPE_CHARS)?;
        check_len("location", self.location.as_deref(), MAX_PLACE_CHARS)?;
        check_len("reported by", self.reported_by.as_deref(), MAX_PLACE_CHARS)
    }
}
