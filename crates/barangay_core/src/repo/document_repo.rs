//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist document metadata and its tag links.
//! - Own tag-link replacement with atomic semantics.
//!
//! # Invariants
//! - Create and update replace the whole tag set in the row's transaction.
//! - Archived documents are hidden from listings unless asked for.
//! - A document with revisions pointing at it cannot be deleted.

use super::{
    bool_to_int, delete_error, ensure_can_write, insert_error, parse_choice, parse_flag,
    parse_uuid, RepoError, RepoResult,
};
use crate::model::document::{Document, DocumentCategory, DocumentId, FileRef};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};

const DOCUMENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    document_number,
    category,
    description,
    file_name,
    file_path,
    file_type,
    file_size,
    uploaded_by,
    version,
    parent_document_id,
    is_archived,
    created_at,
    updated_at
FROM documents";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListQuery {
    pub category: Option<DocumentCategory>,
    /// Single-tag exact match, case-insensitive.
    pub tag: Option<String>,
    pub include_archived: bool,
}

pub trait DocumentRepository {
    fn create_document(&self, document: &Document) -> RepoResult<DocumentId>;
    /// Replaces all metadata fields and the tag set.
    fn update_document(&self, document: &Document) -> RepoResult<()>;
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;
    /// Lists documents, most recently updated first.
    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>>;
    fn set_archived(&self, id: DocumentId, archived: bool) -> RepoResult<()>;
    fn delete_document(&self, id: DocumentId) -> RepoResult<()>;
    /// Every tag in use, sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
}

pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn create_document(&self, document: &Document) -> RepoResult<DocumentId> {
        ensure_can_write(&self.session, "file documents")?;
        document.validate()?;

        let id_text = document.id.to_string();
        let file = document.file.as_ref();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO documents (
                id,
                title,
                document_number,
                category,
                description,
                file_name,
                file_path,
                file_type,
                file_size,
                uploaded_by,
                version,
                parent_document_id,
                is_archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                id_text.as_str(),
                document.title.trim(),
                document.document_number.as_deref(),
                document.category.as_str(),
                document.description.as_deref(),
                file.map(|file| file.file_name.as_str()),
                file.map(|file| file.file_path.as_str()),
                file.and_then(|file| file.file_type.as_deref()),
                file.and_then(|file| file.file_size).map(file_size_to_sql),
                document.uploaded_by.as_deref(),
                document.version,
                document.parent_document_id.map(|id| id.to_string()),
                bool_to_int(document.is_archived),
            ],
        )
        .map_err(|err| insert_error("documents", err))?;
        replace_tags_in_tx(&tx, &id_text, &document.tags)?;
        tx.commit()?;

        Ok(document.id)
    }

    fn update_document(&self, document: &Document) -> RepoResult<()> {
        ensure_can_write(&self.session, "update documents")?;
        document.validate()?;

        let id_text = document.id.to_string();
        let file = document.file.as_ref();
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx
            .execute(
                "UPDATE documents
                 SET
                    title = ?2,
                    document_number = ?3,
                    category = ?4,
                    description = ?5,
                    file_name = ?6,
                    file_path = ?7,
                    file_type = ?8,
                    file_size = ?9,
                    uploaded_by = ?10,
                    is_archived = ?11,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    id_text.as_str(),
                    document.title.trim(),
                    document.document_number.as_deref(),
                    document.category.as_str(),
                    document.description.as_deref(),
                    file.map(|file| file.file_name.as_str()),
                    file.map(|file| file.file_path.as_str()),
                    file.and_then(|file| file.file_type.as_deref()),
                    file.and_then(|file| file.file_size).map(file_size_to_sql),
                    document.uploaded_by.as_deref(),
                    bool_to_int(document.is_archived),
                ],
            )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "documents",
                id: document.id,
            });
        }
        replace_tags_in_tx(&tx, &id_text, &document.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>> {
        let mut sql = format!("{DOCUMENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND is_archived = 0");
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(tag) = query.tag.as_deref().map(str::trim).filter(|tag| !tag.is_empty()) {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM document_tag_links dl
                    INNER JOIN document_tags t ON t.id = dl.tag_id
                    WHERE dl.document_id = documents.id
                      AND t.name = ? COLLATE NOCASE
                )",
            );
            bind_values.push(Value::Text(tag.to_string()));
        }
        sql.push_str(" ORDER BY updated_at DESC, title COLLATE NOCASE ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(self.conn, row)?);
        }
        Ok(documents)
    }

    fn set_archived(&self, id: DocumentId, archived: bool) -> RepoResult<()> {
        ensure_can_write(&self.session, "archive documents")?;
        let changed = self.conn.execute(
            "UPDATE documents
             SET is_archived = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(archived)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "documents",
                id,
            });
        }
        Ok(())
    }

    fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete documents")?;
        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1;", [id.to_string()])
            .map_err(|err| delete_error("documents", id, err))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "documents",
                id,
            });
        }
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT t.name
             FROM document_tags t
             INNER JOIN document_tag_links dl ON dl.tag_id = t.id
             ORDER BY t.name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            tags.push(name.to_lowercase());
        }
        Ok(tags)
    }
}

fn file_size_to_sql(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

fn replace_tags_in_tx(tx: &Transaction<'_>, document_id: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute(
        "DELETE FROM document_tag_links WHERE document_id = ?1;",
        [document_id],
    )?;
    for tag in tags {
        tx.execute(
            "INSERT OR IGNORE INTO document_tags (name) VALUES (?1);",
            [tag.as_str()],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO document_tag_links (document_id, tag_id)
             SELECT ?1, id
             FROM document_tags
             WHERE name = ?2 COLLATE NOCASE;",
            params![document_id, tag.as_str()],
        )?;
    }
    Ok(())
}

fn load_tags(conn: &Connection, document_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM document_tag_links dl
         INNER JOIN document_tags t ON t.id = dl.tag_id
         WHERE dl.document_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([document_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        tags.push(name.to_lowercase());
    }
    Ok(tags)
}

fn parse_document_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Document> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "documents.id")?;
    let category_text: String = row.get("category")?;

    let file_name: Option<String> = row.get("file_name")?;
    let file_path: Option<String> = row.get("file_path")?;
    let file = match (file_name, file_path) {
        (Some(file_name), Some(file_path)) => {
            let file_size = match row.get::<_, Option<i64>>("file_size")? {
                Some(size) => Some(u64::try_from(size).map_err(|_| {
                    RepoError::InvalidData(format!("invalid size `{size}` in documents.file_size"))
                })?),
                None => None,
            };
            Some(FileRef {
                file_name,
                file_path,
                file_type: row.get("file_type")?,
                file_size,
            })
        }
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "document {id} has a file name without a path or the reverse"
            )));
        }
    };

    let version: i64 = row.get("version")?;
    let parent_document_id = match row.get::<_, Option<String>>("parent_document_id")? {
        Some(value) => Some(parse_uuid(&value, "documents.parent_document_id")?),
        None => None,
    };

    let document = Document {
        id,
        title: row.get("title")?,
        document_number: row.get("document_number")?,
        category: parse_choice(&category_text, "documents.category", DocumentCategory::parse)?,
        description: row.get("description")?,
        file,
        tags: load_tags(conn, &id_text)?,
        uploaded_by: row.get("uploaded_by")?,
        version: u32::try_from(version).map_err(|_| {
            RepoError::InvalidData(format!("invalid version `{version}` in documents.version"))
        })?,
        parent_document_id,
        is_archived: parse_flag(row.get("is_archived")?, "documents.is_archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    document
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("document {id}: {err}")))?;
    Ok(document)
}
