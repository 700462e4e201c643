//! Official repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every official row references an existing resident.
//! - Listing returns the holder's display name alongside the seat.

use super::{
    delete_error, ensure_can_write, format_date, insert_error, parse_choice, parse_date,
    parse_optional_date, parse_uuid, RepoError, RepoResult,
};
use crate::model::official::{Official, OfficialId, OfficialStatus};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const OFFICIAL_SELECT_SQL: &str = "SELECT
    o.id,
    o.resident_id,
    o.position,
    o.term_start,
    o.term_end,
    o.status,
    o.created_at,
    o.updated_at,
    r.first_name || ' ' || r.last_name AS resident_name
FROM officials o
INNER JOIN residents r ON r.id = o.resident_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfficialListQuery {
    pub status: Option<OfficialStatus>,
}

/// Official row plus the holder's `first last` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficialSummary {
    pub official: Official,
    pub resident_name: String,
}

pub trait OfficialRepository {
    fn create_official(&self, official: &Official) -> RepoResult<OfficialId>;
    fn update_official(&self, official: &Official) -> RepoResult<()>;
    fn get_official(&self, id: OfficialId) -> RepoResult<Option<Official>>;
    /// Lists seats, active first, then by term start.
    fn list_officials(&self, query: &OfficialListQuery) -> RepoResult<Vec<OfficialSummary>>;
    fn delete_official(&self, id: OfficialId) -> RepoResult<()>;
}

pub struct SqliteOfficialRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteOfficialRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }
}

impl OfficialRepository for SqliteOfficialRepository<'_> {
    fn create_official(&self, official: &Official) -> RepoResult<OfficialId> {
        ensure_can_write(&self.session, "appoint officials")?;
        official.validate()?;

        self.conn
            .execute(
                "INSERT INTO officials (
                    id,
                    resident_id,
                    position,
                    term_start,
                    term_end,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    official.id.to_string(),
                    official.resident_id.to_string(),
                    official.position.trim(),
                    format_date(official.term_start),
                    official.term_end.map(format_date),
                    official.status.as_str(),
                ],
            )
            .map_err(|err| insert_error("officials", err))?;
        Ok(official.id)
    }

    fn update_official(&self, official: &Official) -> RepoResult<()> {
        ensure_can_write(&self.session, "update officials")?;
        official.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE officials
                 SET
                    resident_id = ?2,
                    position = ?3,
                    term_start = ?4,
                    term_end = ?5,
                    status = ?6,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    official.id.to_string(),
                    official.resident_id.to_string(),
                    official.position.trim(),
                    format_date(official.term_start),
                    official.term_end.map(format_date),
                    official.status.as_str(),
                ],
            )
            .map_err(|err| insert_error("officials", err))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "officials",
                id: official.id,
            });
        }
        Ok(())
    }

    fn get_official(&self, id: OfficialId) -> RepoResult<Option<Official>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OFFICIAL_SELECT_SQL} WHERE o.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_official_row(row)?));
        }
        Ok(None)
    }

    fn list_officials(&self, query: &OfficialListQuery) -> RepoResult<Vec<OfficialSummary>> {
        let mut sql = format!("{OFFICIAL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = query.status {
            sql.push_str(" AND o.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY o.status = 'inactive' ASC, o.term_start DESC, o.position ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut officials = Vec::new();
        while let Some(row) = rows.next()? {
            officials.push(OfficialSummary {
                official: parse_official_row(row)?,
                resident_name: row.get("resident_name")?,
            });
        }
        Ok(officials)
    }

    fn delete_official(&self, id: OfficialId) -> RepoResult<()> {
        ensure_can_write(&self.session, "delete officials")?;
        let changed = self
            .conn
            .execute("DELETE FROM officials WHERE id = ?1;", [id.to_string()])
            .map_err(|err| delete_error("officials", id, err))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "officials",
                id,
            });
        }
        Ok(())
    }
}

fn parse_official_row(row: &Row<'_>) -> RepoResult<Official> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "officials.id")?;
    let resident_text: String = row.get("resident_id")?;
    let status_text: String = row.get("status")?;
    let term_start_text: String = row.get("term_start")?;

    let official = Official {
        id,
        resident_id: parse_uuid(&resident_text, "officials.resident_id")?,
        position: row.get("position")?,
        term_start: parse_date(&term_start_text, "officials.term_start")?,
        term_end: parse_optional_date(row.get("term_end")?, "officials.term_end")?,
        status: parse_choice(&status_text, "officials.status", OfficialStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    official
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("official {id}: {err}")))?;
    Ok(official)
}
