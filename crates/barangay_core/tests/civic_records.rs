use barangay_core::db::open_db_in_memory;
use barangay_core::{
    Activity, ActivityService, ActivityStatus, Appointment, DashboardService, Gender,
    OfficialService, OfficialStatus, Ordinance, OrdinanceListQuery, OrdinanceService,
    OrdinanceStatus, RecordServiceError, RepoError, Report, ReportListQuery, ReportPriority,
    ReportService, ReportStatus, Resident, ResidentId, ResidentRepository, Role, Session,
    SqliteActivityRepository, SqliteHouseholdRepository, SqliteOfficialRepository,
    SqliteOrdinanceRepository, SqliteReportRepository, SqliteResidentRepository, ValidationError,
};
use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed_resident(conn: &Connection, first_name: &str) -> ResidentId {
    SqliteResidentRepository::new(conn, Session::local_admin())
        .create_resident(&Resident::new(
            first_name,
            "Bautista",
            date(1975, 8, 21),
            Gender::Male,
        ))
        .unwrap()
}

fn officials(
    conn: &Connection,
    session: Session,
) -> OfficialService<SqliteOfficialRepository<'_>, SqliteResidentRepository<'_>> {
    OfficialService::new(
        SqliteOfficialRepository::new(conn, session.clone()),
        SqliteResidentRepository::new(conn, session),
    )
}

fn ordinances(conn: &Connection) -> OrdinanceService<SqliteOrdinanceRepository<'_>> {
    OrdinanceService::new(SqliteOrdinanceRepository::new(conn, Session::local_admin()))
}

fn activities(conn: &Connection) -> ActivityService<SqliteActivityRepository<'_>> {
    ActivityService::new(SqliteActivityRepository::new(conn, Session::local_admin()))
}

fn reports(conn: &Connection) -> ReportService<SqliteReportRepository<'_>> {
    ReportService::new(SqliteReportRepository::new(conn, Session::local_admin()))
}

fn appointment(resident_id: ResidentId, position: &str, start: NaiveDate) -> Appointment {
    Appointment {
        resident_id,
        position: position.to_string(),
        term_start: start,
        term_end: None,
    }
}

#[test]
fn appointing_unknown_resident_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let service = officials(&conn, Session::local_admin());

    let err = service
        .appoint_official(&appointment(Uuid::new_v4(), "Kagawad", date(2023, 11, 30)))
        .unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::NotFound {
            table: "residents",
            ..
        }
    ));
    assert!(service.list_officials(None).unwrap().is_empty());
}

#[test]
fn current_officials_respect_term_and_status() {
    let conn = open_db_in_memory().unwrap();
    let captain = seed_resident(&conn, "Ramon");
    let former = seed_resident(&conn, "Lito");
    let resigned = seed_resident(&conn, "Nilo");
    let service = officials(&conn, Session::local_admin());

    service
        .appoint_official(&appointment(captain, " Punong Barangay ", date(2023, 11, 30)))
        .unwrap();
    let mut past = appointment(former, "Kagawad", date(2018, 6, 30));
    past.term_end = Some(date(2023, 11, 29));
    service.appoint_official(&past).unwrap();
    let leaving = service
        .appoint_official(&appointment(resigned, "SK Chairperson", date(2023, 11, 30)))
        .unwrap();
    service
        .set_status(leaving.id, OfficialStatus::Inactive)
        .unwrap();

    let current = service.current_officials(date(2024, 5, 1)).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].official.position, "Punong Barangay");
    assert_eq!(current[0].resident_name, "Ramon Bautista");
    assert_eq!(service.list_officials(None).unwrap().len(), 3);
    assert_eq!(
        service
            .list_officials(Some(OfficialStatus::Inactive))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn term_ending_before_it_starts_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let resident_id = seed_resident(&conn, "Ramon");
    let service = officials(&conn, Session::local_admin());

    let mut backwards = appointment(resident_id, "Kagawad", date(2023, 11, 30));
    backwards.term_end = Some(date(2022, 1, 1));
    let err = service.appoint_official(&backwards).unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::Validation(ValidationError::EndsBeforeStart { .. })
    ));
}

#[test]
fn viewer_cannot_appoint_officials() {
    let conn = open_db_in_memory().unwrap();
    let resident_id = seed_resident(&conn, "Ramon");
    let service = officials(&conn, Session::new(Uuid::new_v4(), Role::Viewer));

    let err = service
        .appoint_official(&appointment(resident_id, "Kagawad", date(2023, 11, 30)))
        .unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::Repo(RepoError::PermissionDenied { .. })
    ));
}

#[test]
fn duplicate_ordinance_number_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = ordinances(&conn);
    service
        .enact_ordinance(&Ordinance::new("2024-003", "Curfew for Minors", date(2024, 2, 14)))
        .unwrap();

    let err = service
        .enact_ordinance(&Ordinance::new(" 2024-003 ", "Anti-Smoking", date(2024, 3, 1)))
        .unwrap_err();

    match err {
        RecordServiceError::Repo(RepoError::Duplicate { table, value }) => {
            assert_eq!(table, "ordinances");
            assert_eq!(value, "2024-003");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn repealed_ordinance_stays_repealed() {
    let conn = open_db_in_memory().unwrap();
    let service = ordinances(&conn);
    let mut draft = Ordinance::new("2020-001", "Anti-Littering", date(2020, 6, 1));
    draft.status = OrdinanceStatus::Repealed;
    let enacted = service.enact_ordinance(&draft).unwrap();
    assert_eq!(enacted.status, OrdinanceStatus::Active);

    service
        .set_status(enacted.id, OrdinanceStatus::Amended)
        .unwrap();
    service
        .set_status(enacted.id, OrdinanceStatus::Repealed)
        .unwrap();
    let err = service
        .set_status(enacted.id, OrdinanceStatus::Active)
        .unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::InvalidTransition {
            table: "ordinances",
            from: "repealed",
            to: "active",
        }
    ));
}

#[test]
fn ordinance_search_matches_number_or_title() {
    let conn = open_db_in_memory().unwrap();
    let service = ordinances(&conn);
    service
        .enact_ordinance(&Ordinance::new("2023-010", "Anti-Littering", date(2023, 4, 2)))
        .unwrap();
    service
        .enact_ordinance(&Ordinance::new("2024-003", "Curfew for Minors", date(2024, 2, 14)))
        .unwrap();

    let by_title = service
        .list_ordinances(&OrdinanceListQuery {
            search: Some("curfew".to_string()),
            ..OrdinanceListQuery::default()
        })
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].ordinance_number, "2024-003");

    let all: Vec<String> = service
        .list_ordinances(&OrdinanceListQuery::default())
        .unwrap()
        .into_iter()
        .map(|ordinance| ordinance.ordinance_number)
        .collect();
    assert_eq!(all, vec!["2024-003", "2023-010"]);
}

#[test]
fn activity_status_change_records_attendance() {
    let conn = open_db_in_memory().unwrap();
    let service = activities(&conn);
    let mut draft = Activity::new(" Coastal clean-up ", "clean-up drive", date(2024, 9, 21));
    draft.location = Some("  ".to_string());
    let scheduled = service.schedule_activity(&draft).unwrap();
    assert_eq!(scheduled.title, "Coastal clean-up");
    assert_eq!(scheduled.location, None);
    assert_eq!(scheduled.status, ActivityStatus::Scheduled);

    let done = service
        .set_status(scheduled.id, ActivityStatus::Completed, Some(84))
        .unwrap();
    assert_eq!(done.participants_count, Some(84));

    let reopened = service
        .set_status(scheduled.id, ActivityStatus::Ongoing, None)
        .unwrap();
    assert_eq!(reopened.participants_count, Some(84));
    assert_eq!(
        service
            .list_activities(Some(ActivityStatus::Ongoing))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn filed_reports_start_pending_and_closed_is_final() {
    let conn = open_db_in_memory().unwrap();
    let service = reports(&conn);
    let mut draft = Report::new("Broken streetlight", "infrastructure", date(2024, 7, 3));
    draft.status = ReportStatus::Resolved;
    draft.priority = ReportPriority::High;
    let filed = service.file_report(&draft).unwrap();
    assert_eq!(filed.status, ReportStatus::Pending);

    service
        .set_status(filed.id, ReportStatus::InProgress)
        .unwrap();
    service.set_status(filed.id, ReportStatus::Closed).unwrap();
    let err = service
        .set_status(filed.id, ReportStatus::Pending)
        .unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::InvalidTransition {
            table: "reports",
            from: "closed",
            ..
        }
    ));
}

#[test]
fn report_list_filters_by_minimum_priority() {
    let conn = open_db_in_memory().unwrap();
    let service = reports(&conn);
    for (title, priority) in [
        ("Stray dogs", ReportPriority::Low),
        ("Flooded road", ReportPriority::Critical),
        ("Noise", ReportPriority::Medium),
    ] {
        let mut report = Report::new(title, "complaint", date(2024, 7, 3));
        report.priority = priority;
        service.file_report(&report).unwrap();
    }

    let urgent: Vec<String> = service
        .list_reports(&ReportListQuery {
            min_priority: Some(ReportPriority::Medium),
            ..ReportListQuery::default()
        })
        .unwrap()
        .into_iter()
        .map(|report| report.title)
        .collect();

    assert_eq!(urgent.len(), 2);
    assert!(!urgent.contains(&"Stray dogs".to_string()));
}

#[test]
fn dashboard_counts_ongoing_activities_and_submitted_reports() {
    let conn = open_db_in_memory().unwrap();
    let activity_service = activities(&conn);
    let report_service = reports(&conn);

    let fiesta = activity_service
        .schedule_activity(&Activity::new("Fiesta", "celebration", date(2024, 5, 15)))
        .unwrap();
    activity_service
        .schedule_activity(&Activity::new("Assembly", "meeting", date(2024, 6, 1)))
        .unwrap();
    activity_service
        .set_status(fiesta.id, ActivityStatus::Ongoing, None)
        .unwrap();

    let first = report_service
        .file_report(&Report::new("Noise", "complaint", date(2024, 5, 2)))
        .unwrap();
    report_service
        .file_report(&Report::new("Flooding", "hazard", date(2024, 5, 3)))
        .unwrap();
    report_service
        .set_status(first.id, ReportStatus::Resolved)
        .unwrap();

    let snapshot = DashboardService::new(
        SqliteHouseholdRepository::new(&conn, Session::local_admin()),
        SqliteResidentRepository::new(&conn, Session::local_admin()),
        SqliteActivityRepository::new(&conn, Session::local_admin()),
        SqliteReportRepository::new(&conn, Session::local_admin()),
    )
    .snapshot(date(2024, 5, 15))
    .unwrap();

    assert_eq!(snapshot.ongoing_activities, 1);
    assert_eq!(snapshot.reports_submitted, 2);
    assert_eq!(snapshot.pending_reports, 1);
}
