pub mod activity;
pub mod certificate;
pub mod document;
pub mod household;
pub mod official;
pub mod ordinance;
pub mod report;
pub mod resident;
pub mod stats;

use std::path::PathBuf;

use anyhow::{Context, Result};
use barangay_core::db::open_db;
use barangay_core::{
    init_logging_from_config, ActivityService, CertificateService, CoreConfig, DocumentService,
    HouseholdService, OfficialService, OrdinanceService, ReportService, ResidentService, Role,
    Session, SqliteActivityRepository, SqliteCertificateRepository, SqliteDocumentRepository,
    SqliteHouseholdRepository, SqliteOfficialRepository, SqliteOrdinanceRepository,
    SqliteReportRepository, SqliteResidentRepository,
};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

/// Open database plus the session every command acts under.
pub struct AppContext {
    pub config: CoreConfig,
    conn: Connection,
    session: Session,
}

impl AppContext {
    pub fn open(db_override: Option<PathBuf>, role: Role) -> Result<Self> {
        let mut config = CoreConfig::from_env().context("failed to read configuration")?;
        if let Some(path) = db_override {
            config.db_path = path;
        }
        init_logging_from_config(&config).context("failed to start logging")?;
        config.log_resolved();

        let conn = open_db(&config.db_path)
            .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
        let session = Session::new(Uuid::nil(), role);
        info!(
            "event=cli_start module=cli status=ok role={}",
            session.role().as_str()
        );

        Ok(Self {
            config,
            conn,
            session,
        })
    }

    pub fn households(
        &self,
    ) -> HouseholdService<SqliteHouseholdRepository<'_>, SqliteResidentRepository<'_>> {
        HouseholdService::new(
            SqliteHouseholdRepository::new(&self.conn, self.session.clone()),
            SqliteResidentRepository::new(&self.conn, self.session.clone()),
            self.config.default_location,
        )
    }

    pub fn residents(&self) -> ResidentService<SqliteResidentRepository<'_>> {
        ResidentService::new(SqliteResidentRepository::new(&self.conn, self.session.clone()))
    }

    pub fn household_repo(&self) -> SqliteHouseholdRepository<'_> {
        SqliteHouseholdRepository::new(&self.conn, self.session.clone())
    }

    pub fn resident_repo(&self) -> SqliteResidentRepository<'_> {
        SqliteResidentRepository::new(&self.conn, self.session.clone())
    }

    pub fn activity_repo(&self) -> SqliteActivityRepository<'_> {
        SqliteActivityRepository::new(&self.conn, self.session.clone())
    }

    pub fn report_repo(&self) -> SqliteReportRepository<'_> {
        SqliteReportRepository::new(&self.conn, self.session.clone())
    }

    pub fn officials(
        &self,
    ) -> OfficialService<SqliteOfficialRepository<'_>, SqliteResidentRepository<'_>> {
        OfficialService::new(
            SqliteOfficialRepository::new(&self.conn, self.session.clone()),
            self.resident_repo(),
        )
    }

    pub fn ordinances(&self) -> OrdinanceService<SqliteOrdinanceRepository<'_>> {
        OrdinanceService::new(SqliteOrdinanceRepository::new(&self.conn, self.session.clone()))
    }

    pub fn activities(&self) -> ActivityService<SqliteActivityRepository<'_>> {
        ActivityService::new(self.activity_repo())
    }

    pub fn reports(&self) -> ReportService<SqliteReportRepository<'_>> {
        ReportService::new(self.report_repo())
    }

    pub fn certificates(
        &self,
    ) -> CertificateService<SqliteCertificateRepository<'_>, SqliteResidentRepository<'_>> {
        CertificateService::new(
            SqliteCertificateRepository::new(&self.conn, self.session.clone()),
            self.resident_repo(),
        )
    }

    pub fn documents(&self) -> DocumentService<SqliteDocumentRepository<'_>> {
        DocumentService::new(SqliteDocumentRepository::new(&self.conn, self.session.clone()))
    }

    /// Name recorded as issuer or uploader on new records.
    pub fn actor(&self) -> &'static str {
        self.session.role().as_str()
    }
}

/// Builds a clap value parser from a record enum's `parse`.
pub fn choice<T>(
    parse: fn(&str) -> Option<T>,
    expected: &'static str,
) -> impl Fn(&str) -> std::result::Result<T, String> + Clone + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
{
    move |value: &str| {
        parse(value).ok_or_else(|| format!("unknown value '{value}'; expected: {expected}"))
    }
}

/// Renders an optional text column for table output.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Renders an optional date column for table output.
pub fn format_day(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".to_string(), |day| day.format("%Y-%m-%d").to_string())
}
