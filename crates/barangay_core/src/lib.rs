//! Core records logic for the barangay registry.
//! This crate owns household/resident invariants and membership reconciliation,
//! plus the civic records kept beside them.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, FALLBACK_LOCATION};
pub use db::{ConstraintViolation, DbError};
pub use form::{FormMode, HouseholdForm, HouseholdFormMessage, SubmitOutcome};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::activity::{Activity, ActivityId, ActivityStatus};
pub use model::certificate::{Certificate, CertificateId, CertificateStatus, CertificateType};
pub use model::document::{Document, DocumentCategory, DocumentId, FileRef};
pub use model::household::{GeoPoint, Household, HouseholdId};
pub use model::official::{Official, OfficialId, OfficialStatus};
pub use model::ordinance::{Ordinance, OrdinanceId, OrdinanceStatus};
pub use model::report::{Report, ReportId, ReportPriority, ReportStatus};
pub use model::resident::{Gender, Resident, ResidentId, ResidentStatus};
pub use model::session::{Role, Session};
pub use model::validation::ValidationError;
pub use repo::activity_repo::{ActivityListQuery, ActivityRepository, SqliteActivityRepository};
pub use repo::certificate_repo::{
    CertificateListQuery, CertificateRepository, CertificateSummary, SqliteCertificateRepository,
};
pub use repo::document_repo::{DocumentListQuery, DocumentRepository, SqliteDocumentRepository};
pub use repo::household_repo::{
    HouseholdListQuery, HouseholdRepository, HouseholdSummary, SqliteHouseholdRepository,
};
pub use repo::official_repo::{
    OfficialListQuery, OfficialRepository, OfficialSummary, SqliteOfficialRepository,
};
pub use repo::ordinance_repo::{OrdinanceListQuery, OrdinanceRepository, SqliteOrdinanceRepository};
pub use repo::report_repo::{ReportListQuery, ReportRepository, SqliteReportRepository};
pub use repo::resident_repo::{ResidentListQuery, ResidentRepository, SqliteResidentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::activity_service::ActivityService;
pub use service::certificate_service::CertificateService;
pub use service::dashboard_service::{
    population_distribution, DashboardService, DashboardSnapshot, PopulationBucket,
};
pub use service::document_service::DocumentService;
pub use service::household_service::{
    HouseholdDraft, HouseholdSaved, HouseholdService, HouseholdServiceError,
};
pub use service::membership::{
    MembershipPlan, MembershipReconciler, ReconcileError, ReconcilePhase,
};
pub use service::official_service::{Appointment, OfficialService};
pub use service::ordinance_service::OrdinanceService;
pub use service::report_service::ReportService;
pub use service::resident_service::{ResidentDraft, ResidentService, ResidentServiceError};
pub use service::{RecordResult, RecordServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
