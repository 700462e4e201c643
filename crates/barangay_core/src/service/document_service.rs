//! Document filing service.
//!
//! # Responsibility
//! - File document metadata and new versions of existing documents.
//! - Archive and restore documents.
//!
//! # Invariants
//! - A revision is filed as a new row linked to its predecessor; the
//!   predecessor is archived in the same call.

use super::{RecordResult, RecordServiceError};
use crate::model::document::{Document, DocumentId, FileRef};
use crate::repo::document_repo::{DocumentListQuery, DocumentRepository};
use log::info;

pub struct DocumentService<D: DocumentRepository> {
    repo: D,
}

impl<D: DocumentRepository> DocumentService<D> {
    pub fn new(repo: D) -> Self {
        Self { repo }
    }

    pub fn file_document(&self, document: &Document) -> RecordResult<Document> {
        let mut document = document.clone();
        document.normalize()?;
        let id = self.repo.create_document(&document)?;
        info!(
            "event=document_file module=service status=ok document_id={id} category={} version={}",
            document.category.as_str(),
            document.version
        );
        self.fetch(id)
    }

    pub fn update_document(&self, document: &Document) -> RecordResult<Document> {
        let mut document = document.clone();
        document.normalize()?;
        self.repo.update_document(&document)?;
        self.fetch(document.id)
    }

    /// Files the next version of `parent_id` pointing at `file`, then
    /// archives the parent.
    pub fn revise_document(
        &self,
        parent_id: DocumentId,
        file: FileRef,
        uploaded_by: Option<String>,
    ) -> RecordResult<Document> {
        let parent = self.fetch(parent_id)?;
        let mut next = parent.revision();
        next.file = Some(file);
        next.uploaded_by = uploaded_by;
        let revised = self.file_document(&next)?;
        self.repo.set_archived(parent_id, true)?;
        Ok(revised)
    }

    pub fn set_archived(&self, id: DocumentId, archived: bool) -> RecordResult<Document> {
        self.repo.set_archived(id, archived)?;
        self.fetch(id)
    }

    pub fn get_document(&self, id: DocumentId) -> RecordResult<Option<Document>> {
        Ok(self.repo.get_document(id)?)
    }

    pub fn list_documents(&self, query: &DocumentListQuery) -> RecordResult<Vec<Document>> {
        Ok(self.repo.list_documents(query)?)
    }

    pub fn list_tags(&self) -> RecordResult<Vec<String>> {
        Ok(self.repo.list_tags()?)
    }

    pub fn delete_document(&self, id: DocumentId) -> RecordResult<()> {
        self.repo.delete_document(id)?;
        Ok(())
    }

    fn fetch(&self, id: DocumentId) -> RecordResult<Document> {
        self.repo
            .get_document(id)?
            .ok_or(RecordServiceError::NotFound {
                table: "documents",
                id,
            })
    }
}
