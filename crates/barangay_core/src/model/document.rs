//! Filed document metadata (resolutions, memoranda, financial reports).
//!
//! # Responsibility
//! - Describe a filed document and its version chain.
//! - Normalize free-form tags.
//!
//! # Invariants
//! - File bytes live outside the registry; only name, path, type and size
//!   are recorded.
//! - `version` starts at 1; a revision points at its predecessor through
//!   `parent_document_id` and carries the next version number.
//! - Tags are lowercase, trimmed, deduplicated and sorted.

use super::household::normalize_optional_text;
use super::validation::{check_len, choice_key, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type DocumentId = Uuid;

const MAX_TITLE_CHARS: usize = 200;
const MAX_NUMBER_CHARS: usize = 50;
const MAX_TAG_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Resolution,
    Memorandum,
    Ordinance,
    Report,
    Financial,
    Legal,
    Correspondence,
    Other,
}

impl DocumentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Memorandum => "memorandum",
            Self::Ordinance => "ordinance",
            Self::Report => "report",
            Self::Financial => "financial",
            Self::Legal => "legal",
            Self::Correspondence => "correspondence",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match choice_key(value).as_str() {
            "resolution" => Some(Self::Resolution),
            "memorandum" | "memo" => Some(Self::Memorandum),
            "ordinance" => Some(Self::Ordinance),
            "report" => Some(Self::Report),
            "financial" => Some(Self::Financial),
            "legal" => Some(Self::Legal),
            "correspondence" => Some(Self::Correspondence),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Reference to the stored file. Bytes are not kept in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub document_number: Option<String>,
    pub category: DocumentCategory,
    pub description: Option<String>,
    pub file: Option<FileRef>,
    pub tags: Vec<String>,
    pub uploaded_by: Option<String>,
    pub version: u32,
    pub parent_document_id: Option<DocumentId>,
    pub is_archived: bool,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Document {
    pub fn new(title: impl Into<String>, category: DocumentCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            document_number: None,
            category,
            description: None,
            file: None,
            tags: Vec::new(),
            uploaded_by: None,
            version: 1,
            parent_document_id: None,
            is_archived: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Starts the next version of `self`, keeping title, number and category.
    pub fn revision(&self) -> Self {
        let mut next = Self::new(self.title.clone(), self.category);
        next.document_number = self.document_number.clone();
        next.description = self.description.clone();
        next.tags = self.tags.clone();
        next.version = self.version + 1;
        next.parent_document_id = Some(self.id);
        next
    }

    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.title = require_text("title", &self.title, MAX_TITLE_CHARS)?;
        self.document_number = normalize_optional_text(self.document_number.as_deref());
        self.description = normalize_optional_text(self.description.as_deref());
        self.uploaded_by = normalize_optional_text(self.uploaded_by.as_deref());
        self.tags = normalize_tags(&self.tags);
        if let Some(file) = self.file.as_mut() {
            file.file_name = require_text("file name", &file.file_name, MAX_TITLE_CHARS)?;
            file.file_path = require_text("file path", &file.file_path, 1_000)?;
            file.file_type = normalize_optional_text(file.file_type.as_deref());
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, MAX_TITLE_CHARS)?;
        check_len("document number", self.document_number.as_deref(), MAX_NUMBER_CHARS)?;
        for tag in &self.tags {
            check_len("tag", Some(tag), MAX_TAG_CHARS)?;
        }
        if self.version == 0 {
            return Err(ValidationError::UnknownValue {
                field: "version",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Trims and lowercases one tag; blank input yields `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, Document, DocumentCategory};

    #[test]
    fn tags_are_folded_and_deduplicated() {
        let tags = vec![
            " Budget ".to_string(),
            "budget".to_string(),
            "".to_string(),
            "2024".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["2024", "budget"]);
    }

    #[test]
    fn revision_links_to_parent_and_bumps_version() {
        let mut original = Document::new("Annual Budget", DocumentCategory::Financial);
        original.document_number = Some("FIN-2024-01".to_string());
        let next = original.revision();

        assert_eq!(next.version, 2);
        assert_eq!(next.parent_document_id, Some(original.id));
        assert_eq!(next.document_number.as_deref(), Some("FIN-2024-01"));
        assert_ne!(next.id, original.id);
    }
}
