//! `barangay certificate issue|list|revoke`

use anyhow::{Context, Result};
use barangay_core::{
    Certificate, CertificateId, CertificateListQuery, CertificateStatus, CertificateType,
    ResidentId,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{choice, format_day, AppContext};

const TYPES: &str = "clearance, residency, indigency, business_permit, good_moral, \
                     first_time_job_seeker";
const STATUSES: &str = "active, expired, revoked";

#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
    /// Issue a certificate to a registered resident.
    Issue(IssueArgs),

    /// List issued certificates, newest first.
    List {
        /// Only certificates of this resident.
        #[arg(long)]
        resident: Option<ResidentId>,

        #[arg(long = "type", value_parser = choice(CertificateType::parse, TYPES))]
        certificate_type: Option<CertificateType>,

        #[arg(long, value_parser = choice(CertificateStatus::parse, STATUSES))]
        status: Option<CertificateStatus>,
    },

    /// Revoke an issued certificate.
    Revoke { id: CertificateId },
}

#[derive(Args, Debug)]
pub struct IssueArgs {
    #[arg(value_parser = choice(CertificateType::parse, TYPES))]
    pub certificate_type: CertificateType,

    #[arg(long)]
    pub resident: ResidentId,

    #[arg(long)]
    pub purpose: String,

    /// Defaults to the acting role.
    #[arg(long)]
    pub issued_by: Option<String>,

    /// Issue date as YYYY-MM-DD. Defaults to the local date.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Last valid day as YYYY-MM-DD.
    #[arg(long)]
    pub valid_until: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

pub fn run(app: &AppContext, cmd: CertificateCommand) -> Result<()> {
    match cmd {
        CertificateCommand::Issue(args) => issue(app, args),
        CertificateCommand::List {
            resident,
            certificate_type,
            status,
        } => list(
            app,
            CertificateListQuery {
                resident_id: resident,
                certificate_type,
                status,
            },
        ),
        CertificateCommand::Revoke { id } => {
            let certificate = app
                .certificates()
                .revoke_certificate(id)
                .with_context(|| format!("failed to revoke certificate {id}"))?;
            println!("Certificate {} revoked", certificate.certificate_number);
            Ok(())
        }
    }
}

fn issue(app: &AppContext, args: IssueArgs) -> Result<()> {
    let issued_by = args
        .issued_by
        .unwrap_or_else(|| app.actor().to_string());
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut certificate = Certificate::new(
        args.certificate_type,
        args.resident,
        args.purpose,
        issued_by,
        date,
    );
    certificate.valid_until = args.valid_until;
    certificate.notes = args.notes;

    let certificate = app
        .certificates()
        .issue_certificate(&certificate)
        .context("failed to issue certificate")?;
    println!(
        "Issued {} ({})",
        certificate.certificate_number, certificate.id
    );
    Ok(())
}

fn list(app: &AppContext, query: CertificateListQuery) -> Result<()> {
    let today = Local::now().date_naive();
    let summaries = app.certificates().list_certificates(&query)?;
    if summaries.is_empty() {
        println!("No certificates found.");
        return Ok(());
    }

    println!(
        "{:<14}  {:<26}  {:<28}  {:<10}  {:<10}  {:<8}",
        "NUMBER", "TYPE", "RESIDENT", "ISSUED", "VALID TO", "STATUS"
    );
    for summary in &summaries {
        let certificate = &summary.certificate;
        println!(
            "{:<14}  {:<26}  {:<28}  {:<10}  {:<10}  {:<8}",
            certificate.certificate_number,
            certificate.certificate_type.as_str(),
            summary.resident_name,
            certificate.issued_date.format("%Y-%m-%d"),
            format_day(certificate.valid_until),
            certificate.effective_status(today).as_str(),
        );
    }
    Ok(())
}
