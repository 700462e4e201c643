//! `barangay ordinance add|list|status`

use anyhow::{Context, Result};
use barangay_core::{Ordinance, OrdinanceId, OrdinanceListQuery, OrdinanceStatus};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{choice, AppContext};

const STATUSES: &str = "active, repealed, amended";

#[derive(Subcommand, Debug)]
pub enum OrdinanceCommand {
    /// Record an enacted ordinance.
    Add(AddArgs),

    /// List ordinances, newest first.
    List {
        #[arg(long, value_parser = choice(OrdinanceStatus::parse, STATUSES))]
        status: Option<OrdinanceStatus>,

        /// Case-insensitive filter on number or title.
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Mark an ordinance amended or repealed.
    Status {
        id: OrdinanceId,

        #[arg(value_parser = choice(OrdinanceStatus::parse, STATUSES))]
        status: OrdinanceStatus,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Ordinance number, unique across the registry.
    pub number: String,

    #[arg(long)]
    pub title: String,

    /// Enactment date as YYYY-MM-DD.
    #[arg(long)]
    pub enacted: NaiveDate,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub content: Option<String>,
}

pub fn run(app: &AppContext, cmd: OrdinanceCommand) -> Result<()> {
    match cmd {
        OrdinanceCommand::Add(args) => add(app, args),
        OrdinanceCommand::List { status, search } => list(app, status, search),
        OrdinanceCommand::Status { id, status } => {
            let ordinance = app
                .ordinances()
                .set_status(id, status)
                .with_context(|| format!("failed to update ordinance {id}"))?;
            println!(
                "Ordinance {} is now {}",
                ordinance.ordinance_number,
                ordinance.status.as_str()
            );
            Ok(())
        }
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let mut ordinance = Ordinance::new(args.number, args.title, args.enacted);
    ordinance.description = args.description;
    ordinance.content = args.content;

    let ordinance = app
        .ordinances()
        .enact_ordinance(&ordinance)
        .context("failed to record ordinance")?;
    println!(
        "Recorded ordinance {} ({})",
        ordinance.ordinance_number, ordinance.id
    );
    Ok(())
}

fn list(app: &AppContext, status: Option<OrdinanceStatus>, search: Option<String>) -> Result<()> {
    let ordinances = app
        .ordinances()
        .list_ordinances(&OrdinanceListQuery { status, search })?;
    if ordinances.is_empty() {
        println!("No ordinances found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<12}  {:<32}  {:<10}  {:<8}",
        "ID", "NUMBER", "TITLE", "ENACTED", "STATUS"
    );
    for ordinance in &ordinances {
        println!(
            "{:<36}  {:<12}  {:<32}  {:<10}  {:<8}",
            ordinance.id,
            ordinance.ordinance_number,
            ordinance.title,
            ordinance.date_enacted.format("%Y-%m-%d"),
            ordinance.status.as_str(),
        );
    }
    Ok(())
}
