//! Resident repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `residents` table.
//! - Expose the membership select and the two bulk membership writes the
//!   reconciler is built on.
//!
//! # Invariants
//! - `update_resident` never changes `household_id` or `house_number`;
//!   only `assign_household` and `clear_household` do.
//! - Bulk writes are filtered by an in-set predicate over exactly the given
//!   ids and run in one transaction.
//! - A resident who leaves a household stops being its head in the same
//!   transaction.

use super::{
    bool_to_int, ensure_can_write, format_date, parse_date, parse_flag, parse_uuid, placeholders,
    uuid_values, RepoError, RepoResult, IN_SET_CHUNK,
};
use crate::model::household::HouseholdId;
use crate::model::resident::{Gender, Resident, ResidentId, ResidentStatus};
use crate::model::session::Session;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

const RESIDENT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    middle_name,
    last_name,
    date_of_birth,
    gender,
    household_id,
    house_number,
    purok,
    street_address,
    phone_number,
    email,
    is_senior_citizen,
    is_pwd,
    is_indigenous,
    status,
    created_at,
    updated_at
FROM residents";

/// List filter for resident pickers and tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentListQuery {
    /// Only members of this household.
    pub household_id: Option<HouseholdId>,
    /// Only residents without a household. Ignored when `household_id` is set.
    pub unassigned_only: bool,
    /// Case-insensitive substring over first and last name.
    pub search: Option<String>,
}

/// Repository interface for resident records and membership writes.
pub trait ResidentRepository {
    fn create_resident(&self, resident: &Resident) -> RepoResult<ResidentId>;
    /// Updates personal fields; membership columns are left as stored.
    fn update_resident(&self, resident: &Resident) -> RepoResult<()>;
    fn get_resident(&self, id: ResidentId) -> RepoResult<Option<Resident>>;
    /// Lists residents ordered by first name, last name.
    fn list_residents(&self, query: &ResidentListQuery) -> RepoResult<Vec<Resident>>;
    /// Ids of residents whose `household_id` equals `household_id`.
    fn member_ids(&self, household_id: HouseholdId) -> RepoResult<BTreeSet<ResidentId>>;
    /// Sets `household_id` and `house_number` on exactly `ids`.
    fn assign_household(
        &self,
        ids: &BTreeSet<ResidentId>,
        household_id: HouseholdId,
        house_number: &str,
    ) -> RepoResult<usize>;
    /// Clears `household_id` and `house_number` on exactly `ids`.
    fn clear_household(&self, ids: &BTreeSet<ResidentId>) -> RepoResult<usize>;
}

impl<R: ResidentRepository + ?Sized> ResidentRepository for &R {
    fn create_resident(&self, resident: &Resident) -> RepoResult<ResidentId> {
        (**self).create_resident(resident)
    }

    fn update_resident(&self, resident: &Resident) -> RepoResult<()> {
        (**self).update_resident(resident)
    }

    fn get_resident(&self, id: ResidentId) -> RepoResult<Option<Resident>> {
        (**self).get_resident(id)
    }

    fn list_residents(&self, query: &ResidentListQuery) -> RepoResult<Vec<Resident>> {
        (**self).list_residents(query)
    }

    fn member_ids(&self, household_id: HouseholdId) -> RepoResult<BTreeSet<ResidentId>> {
        (**self).member_ids(household_id)
    }

    fn assign_household(
        &self,
        ids: &BTreeSet<ResidentId>,
        household_id: HouseholdId,
        house_number: &str,
    ) -> RepoResult<usize> {
        (**self).assign_household(ids, household_id, house_number)
    }

    fn clear_household(&self, ids: &BTreeSet<ResidentId>) -> RepoResult<usize> {
        (**self).clear_household(ids)
    }
}

/// SQLite-backed resident repository scoped to one session.
pub struct SqliteResidentRepository<'conn> {
    conn: &'conn Connection,
    session: Session,
}

impl<'conn> SqliteResidentRepository<'conn> {
    pub fn new(conn: &'conn Connection, session: Session) -> Self {
        Self { conn, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs `UPDATE residents SET <assignments> WHERE id IN (...)` in chunks
    /// inside one transaction. `leading` values bind before the ids.
    ///
    /// Households headed by a moved resident lose their head, except
    /// `kept_household`.
    fn bulk_update(
        &self,
        assignments: &str,
        leading: &[Value],
        ids: &BTreeSet<ResidentId>,
        kept_household: Option<HouseholdId>,
    ) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<&ResidentId> = ids.iter().collect();
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        for chunk in ids.chunks(IN_SET_CHUNK) {
            let sql = format!(
                "UPDATE residents
                 SET {assignments}, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id IN ({});",
                placeholders(chunk.len())
            );
            let mut bind_values = leading.to_vec();
            bind_values.extend(uuid_values(chunk.iter().copied()));
            changed += tx.execute(&sql, params_from_iter(bind_values))?;

            let head_sql = format!(
                "UPDATE households
                 SET head_of_household_id = NULL, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id IS NOT ? AND head_of_household_id IN ({});",
                placeholders(chunk.len())
            );
            let mut head_values = vec![kept_household
                .map_or(Value::Null, |id| Value::Text(id.to_string()))];
            head_values.extend(uuid_values(chunk.iter().copied()));
            tx.execute(&head_sql, params_from_iter(head_values))?;
        }
        tx.commit()?;

        Ok(changed)
    }
}

impl ResidentRepository for SqliteResidentRepository<'_> {
    fn create_resident(&self, resident: &Resident) -> RepoResult<ResidentId> {
        ensure_can_write(&self.session, "create residents")?;
        resident.validate()?;

        self.conn.execute(
            "INSERT INTO residents (
                id,
                first_name,
                middle_name,
                last_name,
                date_of_birth,
                gender,
                household_id,
                house_number,
                purok,
                street_address,
                phone_number,
                email,
                is_senior_citizen,
                is_pwd,
                is_indigenous,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
            params![
                resident.id.to_string(),
                resident.first_name.trim(),
                resident.middle_name.as_deref(),
                resident.last_name.trim(),
                format_date(resident.date_of_birth),
                resident.gender.as_str(),
                resident.household_id.map(|id| id.to_string()),
                resident.house_number.as_deref(),
                resident.purok.as_deref(),
                resident.street_address.as_deref(),
                resident.phone_number.as_deref(),
                resident.email.as_deref(),
                bool_to_int(resident.is_senior_citizen),
                bool_to_int(resident.is_pwd),
                bool_to_int(resident.is_indigenous),
                resident.status.as_str(),
            ],
        )?;

        Ok(resident.id)
    }

    fn update_resident(&self, resident: &Resident) -> RepoResult<()> {
        ensure_can_write(&self.session, "update residents")?;
        resident.validate()?;

        let changed = self.conn.execute(
            "UPDATE residents
             SET
                first_name = ?2,
                middle_name = ?3,
                last_name = ?4,
                date_of_birth = ?5,
                gender = ?6,
                purok = ?7,
                street_address = ?8,
                phone_number = ?9,
                email = ?10,
                is_senior_citizen = ?11,
                is_pwd = ?12,
                is_indigenous = ?13,
                status = ?14,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                resident.id.to_string(),
                resident.first_name.trim(),
                resident.middle_name.as_deref(),
                resident.last_name.trim(),
                format_date(resident.date_of_birth),
                resident.gender.as_str(),
                resident.purok.as_deref(),
                resident.street_address.as_deref(),
                resident.phone_number.as_deref(),
                resident.email.as_deref(),
                bool_to_int(resident.is_senior_citizen),
                bool_to_int(resident.is_pwd),
                bool_to_int(resident.is_indigenous),
                resident.status.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "residents",
                id: resident.id,
            });
        }
        Ok(())
    }

    fn get_resident(&self, id: ResidentId) -> RepoResult<Option<Resident>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESIDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resident_row(row)?));
        }
        Ok(None)
    }

    fn list_residents(&self, query: &ResidentListQuery) -> RepoResult<Vec<Resident>> {
        let mut sql = format!("{RESIDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(household_id) = query.household_id {
            sql.push_str(" AND household_id = ?");
            bind_values.push(Value::Text(household_id.to_string()));
        } else if query.unassigned_only {
            sql.push_str(" AND household_id IS NULL");
        }

        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(
                " AND (instr(lower(first_name), lower(?)) > 0
                   OR instr(lower(last_name), lower(?)) > 0)",
            );
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }

        sql.push_str(
            " ORDER BY first_name COLLATE NOCASE ASC, last_name COLLATE NOCASE ASC, id ASC",
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut residents = Vec::new();
        while let Some(row) = rows.next()? {
            residents.push(parse_resident_row(row)?);
        }
        Ok(residents)
    }

    fn member_ids(&self, household_id: HouseholdId) -> RepoResult<BTreeSet<ResidentId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM residents WHERE household_id = ?1;")?;
        let mut rows = stmt.query([household_id.to_string()])?;
        let mut ids = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            ids.insert(parse_uuid(&id_text, "residents.id")?);
        }
        Ok(ids)
    }

    fn assign_household(
        &self,
        ids: &BTreeSet<ResidentId>,
        household_id: HouseholdId,
        house_number: &str,
    ) -> RepoResult<usize> {
        ensure_can_write(&self.session, "assign residents")?;
        self.bulk_update(
            "household_id = ?, house_number = ?",
            &[
                Value::Text(household_id.to_string()),
                Value::Text(house_number.to_string()),
            ],
            ids,
            Some(household_id),
        )
    }

    fn clear_household(&self, ids: &BTreeSet<ResidentId>) -> RepoResult<usize> {
        ensure_can_write(&self.session, "unassign residents")?;
        self.bulk_update("household_id = NULL, house_number = NULL", &[], ids, None)
    }
}

fn parse_resident_row(row: &Row<'_>) -> RepoResult<Resident> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "residents.id")?;

    let birth_text: String = row.get("date_of_birth")?;
    let date_of_birth = parse_date(&birth_text, "residents.date_of_birth")?;

    let gender_text: String = row.get("gender")?;
    let gender = Gender::parse(&gender_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid gender `{gender_text}` in residents.gender"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ResidentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in residents.status"))
    })?;

    let household_id = match row.get::<_, Option<String>>("household_id")? {
        Some(value) => Some(parse_uuid(&value, "residents.household_id")?),
        None => None,
    };

    let resident = Resident {
        id,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        date_of_birth,
        gender,
        household_id,
        house_number: row.get("house_number")?,
        purok: row.get("purok")?,
        street_address: row.get("street_address")?,
        phone_number: row.get("phone_number")?,
        email: row.get("email")?,
        is_senior_citizen: parse_flag(
            row.get("is_senior_citizen")?,
            "residents.is_senior_citizen",
        )?,
        is_pwd: parse_flag(row.get("is_pwd")?, "residents.is_pwd")?,
        is_indigenous: parse_flag(row.get("is_indigenous")?, "residents.is_indigenous")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    resident
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("resident {id}: {err}")))?;
    Ok(resident)
}
