//! `barangay official appoint|list|status|remove`

use anyhow::{Context, Result};
use barangay_core::{Appointment, OfficialId, OfficialStatus, ResidentId};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{choice, format_day, AppContext};

#[derive(Subcommand, Debug)]
pub enum OfficialCommand {
    /// Seat a registered resident in a position.
    Appoint(AppointArgs),

    /// List officials with the resident's name.
    List {
        /// active | inactive
        #[arg(long, value_parser = choice(OfficialStatus::parse, "active, inactive"))]
        status: Option<OfficialStatus>,

        /// Only active seats whose term covers the reference date.
        #[arg(long, conflicts_with = "status")]
        current: bool,

        /// Reference date for `--current`. Defaults to the local date.
        #[arg(long, requires = "current")]
        today: Option<NaiveDate>,
    },

    /// Mark a seat active or inactive.
    Status {
        id: OfficialId,

        /// active | inactive
        #[arg(value_parser = choice(OfficialStatus::parse, "active, inactive"))]
        status: OfficialStatus,
    },

    /// Delete an official record.
    Remove { id: OfficialId },
}

#[derive(Args, Debug)]
pub struct AppointArgs {
    #[arg(long)]
    pub resident: ResidentId,

    #[arg(long)]
    pub position: String,

    /// First day of the term as YYYY-MM-DD.
    #[arg(long)]
    pub term_start: NaiveDate,

    /// Last day of the term as YYYY-MM-DD.
    #[arg(long)]
    pub term_end: Option<NaiveDate>,
}

pub fn run(app: &AppContext, cmd: OfficialCommand) -> Result<()> {
    match cmd {
        OfficialCommand::Appoint(args) => appoint(app, args),
        OfficialCommand::List {
            status,
            current,
            today,
        } => {
            let serving = current.then(|| today.unwrap_or_else(|| Local::now().date_naive()));
            list(app, status, serving)
        }
        OfficialCommand::Status { id, status } => {
            let official = app
                .officials()
                .set_status(id, status)
                .with_context(|| format!("failed to update official {id}"))?;
            println!("{} is now {}", official.position, official.status.as_str());
            Ok(())
        }
        OfficialCommand::Remove { id } => {
            app.officials()
                .remove_official(id)
                .with_context(|| format!("failed to remove official {id}"))?;
            println!("Official removed");
            Ok(())
        }
    }
}

fn appoint(app: &AppContext, args: AppointArgs) -> Result<()> {
    let official = app
        .officials()
        .appoint_official(&Appointment {
            resident_id: args.resident,
            position: args.position,
            term_start: args.term_start,
            term_end: args.term_end,
        })
        .context("failed to appoint official")?;
    println!("Appointed {} ({})", official.position, official.id);
    Ok(())
}

fn list(
    app: &AppContext,
    status: Option<OfficialStatus>,
    serving: Option<NaiveDate>,
) -> Result<()> {
    let service = app.officials();
    let summaries = match serving {
        Some(day) => service.current_officials(day)?,
        None => service.list_officials(status)?,
    };
    if summaries.is_empty() {
        println!("No officials found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<24}  {:<28}  {:<10}  {:<10}  {:<8}",
        "ID", "POSITION", "NAME", "FROM", "TO", "STATUS"
    );
    for summary in &summaries {
        let official = &summary.official;
        println!(
            "{:<36}  {:<24}  {:<28}  {:<10}  {:<10}  {:<8}",
            official.id,
            official.position,
            summary.resident_name,
            official.term_start.format("%Y-%m-%d"),
            format_day(official.term_end),
            official.status.as_str(),
        );
    }
    Ok(())
}
