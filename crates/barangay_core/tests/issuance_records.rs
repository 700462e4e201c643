use barangay_core::db::open_db_in_memory;
use barangay_core::{
    Certificate, CertificateListQuery, CertificateService, CertificateStatus, CertificateType,
    Document, DocumentCategory, DocumentListQuery, DocumentService, FileRef, Gender,
    RecordServiceError, RepoError, Resident, ResidentId, ResidentRepository, Session,
    SqliteCertificateRepository, SqliteDocumentRepository, SqliteResidentRepository,
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
            "Villanueva",
            date(1992, 1, 15),
            Gender::Female,
        ))
        .unwrap()
}

fn certificates(
    conn: &Connection,
) -> CertificateService<SqliteCertificateRepository<'_>, SqliteResidentRepository<'_>> {
    CertificateService::new(
        SqliteCertificateRepository::new(conn, Session::local_admin()),
        SqliteResidentRepository::new(conn, Session::local_admin()),
    )
}

fn documents(conn: &Connection) -> DocumentService<SqliteDocumentRepository<'_>> {
    DocumentService::new(SqliteDocumentRepository::new(conn, Session::local_admin()))
}

fn clearance(resident_id: ResidentId, issued: NaiveDate) -> Certificate {
    Certificate::new(
        CertificateType::BarangayClearance,
        resident_id,
        "Employment",
        "Barangay Secretary",
        issued,
    )
}

fn file(name: &str) -> FileRef {
    FileRef {
        file_name: name.to_string(),
        file_path: format!("/srv/records/{name}"),
        file_type: Some("pdf".to_string()),
        file_size: Some(48_213),
    }
}

#[test]
fn certificate_numbers_run_per_issue_year() {
    let conn = open_db_in_memory().unwrap();
    let resident_id = seed_resident(&conn, "Liza");
    let service = certificates(&conn);

    let numbers: Vec<String> = [
        date(2024, 1, 8),
        date(2024, 12, 30),
        date(2025, 1, 2),
        date(2024, 6, 1),
    ]
    .into_iter()
    .map(|issued| {
        service
            .issue_certificate(&clearance(resident_id, issued))
            .unwrap()
            .certificate_number
    })
    .collect();

    assert_eq!(
        numbers,
        vec![
            "CERT-2024-0001",
            "CERT-2024-0002",
            "CERT-2025-0001",
            "CERT-2024-0003"
        ]
    );
}

#[test]
fn certificate_for_unregistered_resident_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let service = certificates(&conn);

    let err = service
        .issue_certificate(&clearance(Uuid::new_v4(), date(2024, 3, 1)))
        .unwrap_err();

    assert!(matches!(
        err,
        RecordServiceError::NotFound {
            table: "residents",
            ..
        }
    ));
    assert!(service
        .list_certificates(&CertificateListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn revoked_certificate_cannot_be_marked_expired() {
    let conn = open_db_in_memory().unwrap();
    let resident_id = seed_resident(&conn, "Liza");
    let service = certificates(&conn);
    let issued = service
        .issue_certificate(&clearance(resident_id, date(2024, 3, 1)))
        .unwrap();

    let revoked = service.revoke_certificate(issued.id).unwrap();
    assert_eq!(revoked.status, CertificateStatus::Revoked);
    assert_eq!(
        service.revoke_certificate(issued.id).unwrap().status,
        CertificateStatus::Revoked
    );

    let err = service.mark_expired(issued.id).unwrap_err();
    assert!(matches!(
        err,
        RecordServiceError::InvalidTransition {
            table: "certificates",
            from: "revoked",
            to: "expired",
        }
    ));
}

#[test]
fn resident_certificates_list_only_that_resident() {
    let conn = open_db_in_memory().unwrap();
    let liza = seed_resident(&conn, "Liza");
    let mara = seed_resident(&conn, "Mara");
    let service = certificates(&conn);
    service
        .issue_certificate(&clearance(liza, date(2024, 3, 1)))
        .unwrap();
    let mut residency = clearance(mara, date(2024, 3, 2));
    residency.certificate_type = CertificateType::CertificateOfResidency;
    residency.valid_until = Some(date(2024, 9, 2));
    service.issue_certificate(&residency).unwrap();

    let issued = service.resident_certificates(mara).unwrap();

    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].resident_name, "Mara Villanueva");
    let certificate = &issued[0].certificate;
    assert_eq!(
        certificate.certificate_type,
        CertificateType::CertificateOfResidency
    );
    assert_eq!(
        certificate.effective_status(date(2024, 10, 1)),
        CertificateStatus::Expired
    );
}

#[test]
fn document_tags_are_normalized_and_filterable() {
    let conn = open_db_in_memory().unwrap();
    let service = documents(&conn);
    let mut budget = Document::new("Annual Budget 2024", DocumentCategory::Financial);
    budget.tags = vec![" Budget ".to_string(), "budget".to_string(), "2024".to_string()];
    budget.file = Some(file("budget-2024.pdf"));
    let filed = service.file_document(&budget).unwrap();
    service
        .file_document(&Document::new("Memo on curfew", DocumentCategory::Memorandum))
        .unwrap();

    assert_eq!(filed.tags, vec!["2024", "budget"]);
    assert_eq!(service.list_tags().unwrap(), vec!["2024", "budget"]);

    let tagged = service
        .list_documents(&DocumentListQuery {
            tag: Some("BUDGET".to_string()),
            ..DocumentListQuery::default()
        })
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, filed.id);
    assert_eq!(tagged[0].file, Some(file("budget-2024.pdf")));
}

#[test]
fn revision_links_parent_and_archives_it() {
    let conn = open_db_in_memory().unwrap();
    let service = documents(&conn);
    let mut original = Document::new("Resolution 12", DocumentCategory::Resolution);
    original.document_number = Some("RES-2024-12".to_string());
    original.file = Some(file("res-12.pdf"));
    let original = service.file_document(&original).unwrap();

    let revised = service
        .revise_document(
            original.id,
            file("res-12-v2.pdf"),
            Some("Secretary".to_string()),
        )
        .unwrap();

    assert_eq!(revised.version, 2);
    assert_eq!(revised.parent_document_id, Some(original.id));
    assert_eq!(revised.document_number.as_deref(), Some("RES-2024-12"));
    assert!(service.get_document(original.id).unwrap().unwrap().is_archived);

    let visible = service
        .list_documents(&DocumentListQuery::default())
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, revised.id);
    let everything = service
        .list_documents(&DocumentListQuery {
            include_archived: true,
            ..DocumentListQuery::default()
        })
        .unwrap();
    assert_eq!(everything.len(), 2);

    let err = service.delete_document(original.id).unwrap_err();
    assert!(matches!(
        err,
        RecordServiceError::Repo(RepoError::Referenced {
            table: "documents",
            ..
        })
    ));
}

#[test]
fn updating_document_replaces_its_tag_set() {
    let conn = open_db_in_memory().unwrap();
    let service = documents(&conn);
    let mut draft = Document::new("Peace and order plan", DocumentCategory::Report);
    draft.tags = vec!["safety".to_string(), "tanod".to_string()];
    let mut filed = service.file_document(&draft).unwrap();

    filed.tags = vec!["Safety".to_string(), "planning".to_string()];
    let updated = service.update_document(&filed).unwrap();

    assert_eq!(updated.tags, vec!["planning", "safety"]);
    assert_eq!(service.list_tags().unwrap(), vec!["planning", "safety"]);
}
