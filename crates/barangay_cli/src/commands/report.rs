//! `barangay report add|list|status`

use anyhow::{Context, Result};
use barangay_core::{Report, ReportId, ReportListQuery, ReportPriority, ReportStatus};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{choice, or_dash, AppContext};

const PRIORITIES: &str = "low, medium, high, critical";
const STATUSES: &str = "pending, in_progress, resolved, closed";

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// File an incident or complaint report.
    Add(AddArgs),

    /// List reports, newest first.
    List {
        #[arg(long, value_parser = choice(ReportStatus::parse, STATUSES))]
        status: Option<ReportStatus>,

        /// Hide reports below this priority.
        #[arg(long, value_parser = choice(ReportPriority::parse, PRIORITIES))]
        min_priority: Option<ReportPriority>,
    },

    /// Move a report through follow-up.
    Status {
        id: ReportId,

        #[arg(value_parser = choice(ReportStatus::parse, STATUSES))]
        status: ReportStatus,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,

    /// Free-form kind, e.g. `noise` or `road damage`.
    #[arg(long = "type")]
    pub report_type: String,

    #[arg(long, value_parser = choice(ReportPriority::parse, PRIORITIES))]
    pub priority: Option<ReportPriority>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub reported_by: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Report date as YYYY-MM-DD. Defaults to the local date.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run(app: &AppContext, cmd: ReportCommand) -> Result<()> {
    match cmd {
        ReportCommand::Add(args) => add(app, args),
        ReportCommand::List {
            status,
            min_priority,
        } => list(app, status, min_priority),
        ReportCommand::Status { id, status } => {
            let report = app
                .reports()
                .set_status(id, status)
                .with_context(|| format!("failed to update report {id}"))?;
            println!("{} is now {}", report.title, report.status.as_str());
            Ok(())
        }
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut report = Report::new(args.title, args.report_type, date);
    if let Some(priority) = args.priority {
        report.priority = priority;
    }
    report.location = args.location;
    report.reported_by = args.reported_by;
    report.description = args.description;

    let report = app
        .reports()
        .file_report(&report)
        .context("failed to file report")?;
    println!("Filed report {} ({})", report.title, report.id);
    Ok(())
}

fn list(
    app: &AppContext,
    status: Option<ReportStatus>,
    min_priority: Option<ReportPriority>,
) -> Result<()> {
    let reports = app.reports().list_reports(&ReportListQuery {
        status,
        min_priority,
    })?;
    if reports.is_empty() {
        println!("No reports found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28}  {:<10}  {:<8}  {:<11}  {:<16}",
        "ID", "TITLE", "DATE", "PRIORITY", "STATUS", "REPORTED BY"
    );
    for report in &reports {
        println!(
            "{:<36}  {:<28}  {:<10}  {:<8}  {:<11}  {:<16}",
            report.id,
            report.title,
            report.reported_date.format("%Y-%m-%d"),
            report.priority.as_str(),
            report.status.as_str(),
            or_dash(report.reported_by.as_deref()),
        );
    }
    Ok(())
}
