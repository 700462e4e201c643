//! Certificate repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist issued certificates and hand out their numbers.
//!
//! # Invariants
//! - Numbers are `CERT-YYYY-NNNN`, sequential within the issue year, and
//!   allocated in the same transaction as the insert.
//! - Only `status` changes after issue; the rest of the row is immutable.

use super::{
    ensure_can_write, format_date, insert_error, parse_choice, parse_date, parse_optional_date,
    parse_uuid, RepoError, RepoResult,
};
use crate::model::certificate::{
    certificate_number, certificate_number_prefix, Certificate, CertificateId, CertificateStatus,
    CertificateType,
};
use crate::model::resident::ResidentId;
use crate::model::session::Session;
use chrono::Datelike;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CERTIFICATE_SELECT_SQL: &str = "SELECT
    c.id,
    c.certificate_number,
    c.certificate_type,
    c.resident_id,
    c.purpose,
    c.issued_by,
    c.issued_date,
    c.valid_until,
    c.notes,
    c.status,
    c.created_at,
    c.updated_at,
    r.first_name || ' ' || r.last_name AS resident_name
FROM certificates c
INNER JOIN residents r ON r.id = c.resident_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateListQuery {
    pub resident_id: Option<ResidentId>,
    pub certificate_type: Option<CertificateType>,
    /// Matches the stored status; expiry by date is not applied here.
    pub status: Option<CertificateStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub certificate: Certificate,
    pub resident_name: String,
}

pub trait CertificateRepository {
    /// Allocates the next number for the issue year, inserts the row, and
    /// returns the stored certificate.
    fn issue_certificate(&self, certificate: &Certificate) -> RepoResult<Certificate>;
    fn get_certificate(&self, id: CertificateId) -> RepoResult<Option<Certificate>>;
    /// Lists certificates, most recently issued first.
    fn list_certificates(
        &self,
        query: &CertificateListQuery,
    ) -> RepoResult<Vec<CertificateSummary>>;
    fn set_certificate_status(
        &self,
        id: CertificateId,
        status: CertificateStatus,
    ) -> RepoResult<()>;
}

pub struct SqliteCertificateRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteCertificateRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }
}

impl CertificateRepository for SqliteCertificateRepository<'_> {
    fn issue_certificate(&self, certificate: &Certificate) -> RepoResult<Certificate> {
        ensure_can_write(&self.session, "issue certificates")?;
        certificate.validate()?;

        let prefix = certificate_number_prefix(certificate.issued_date.year());
        let tx = self.conn.unchecked_transaction()?;
        let last: Option<u32> = tx.query_row(
            "SELECT MAX(CAST(substr(certificate_number, ?1) AS INTEGER))
             FROM certificates
             WHERE certificate_number LIKE ?2;",
            params![(prefix.len() + 1) as i64, format!("{prefix}%")],
            |row| row.get(0),
        )?;
        let mut issued = certificate.clone();
        issued.certificate_number =
            certificate_number(certificate.issued_date, last.unwrap_or(0) + 1);

        tx.execute(
            "INSERT INTO certificates (
                id,
                certificate_number,
                certificate_type,
                resident_id,
                purpose,
                issued_by,
                issued_date,
                valid_until,
                notes,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                issued.id.to_string(),
                issued.certificate_number,
                issued.certificate_type.as_str(),
                issued.resident_id.to_string(),
                issued.purpose.trim(),
                issued.issued_by.trim(),
                format_date(issued.issued_date),
                issued.valid_until.map(format_date),
                issued.notes.as_deref(),
                issued.status.as_str(),
            ],
        )
        .map_err(|err| insert_error("certificates", err))?;
        tx.commit()?;

        Ok(issued)
    }

    fn get_certificate(&self, id: CertificateId) -> RepoResult<Option<Certificate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CERTIFICATE_SELECT_SQL} WHERE c.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_certificate_row(row)?));
        }
        Ok(None)
    }

    fn list_certificates(
        &self,
        query: &CertificateListQuery,
    ) -> RepoResult<Vec<CertificateSummary>> {
        let mut sql = format!("{CERTIFICATE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(resident_id) = query.resident_id {
            sql.push_str(" AND c.resident_id = ?");
            bind_values.push(Value::Text(resident_id.to_string()));
        }
        if let Some(kind) = query.certificate_type {
            sql.push_str(" AND c.certificate_type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND c.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY c.issued_date DESC, c.certificate_number DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut certificates = Vec::new();
        while let Some(row) = rows.next()? {
            certificates.push(CertificateSummary {
                certificate: parse_certificate_row(row)?,
                resident_name: row.get("resident_name")?,
            });
        }
        Ok(certificates)
    }

    fn set_certificate_status(
        &self,
        id: CertificateId,
        status: CertificateStatus,
    ) -> RepoResult<()> {
        ensure_can_write(&self.session, "change certificate status")?;
        let changed = self.conn.execute(
            "UPDATE certificates
             SET status = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "certificates",
                id,
            });
        }
        Ok(())
    }
}

fn parse_certificate_row(row: &Row<'_>) -> RepoResult<Certificate> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "certificates.id")?;
    let resident_text: String = row.get("resident_id")?;
    let type_text: String = row.get("certificate_type")?;
    let status_text: String = row.get("status")?;
    let issued_text: String = row.get("issued_date")?;

    let certificate = Certificate {
        id,
        certificate_number: row.get("certificate_number")?,
        certificate_type: parse_choice(
            &type_text,
            "certificates.certificate_type",
            CertificateType::parse,
        )?,
        resident_id: parse_uuid(&resident_text, "certificates.resident_id")?,
        purpose: row.get("purpose")?,
        issued_by: row.get("issued_by")?,
        issued_date: parse_date(&issued_text, "certificates.issued_date")?,
        valid_until: parse_optional_date(row.get("valid_until")?, "certificates.valid_until")?,
        notes: row.get("notes")?,
        status: parse_choice(&status_text, "certificates.status", CertificateStatus::parse)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    certificate
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("certificate {id}: {err}")))?;
    Ok(certificate)
}
