//! `barangay resident add` and `barangay resident list`

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use barangay_core::{Gender, HouseholdId, ResidentDraft, ResidentListQuery};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{or_dash, AppContext};

#[derive(Subcommand, Debug)]
pub enum ResidentCommand {
    /// Register an unassigned resident.
    Add(AddArgs),

    /// List residents ordered by first name.
    List(ListArgs),
}

/// Thin wrapper so clap can parse `Gender` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct GenderArg(pub Gender);

impl FromStr for GenderArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Gender::parse(s)
            .map(Self)
            .ok_or_else(|| format!("unknown gender '{s}'; expected: male, female"))
    }
}

impl fmt::Display for GenderArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub middle_name: Option<String>,

    #[arg(long)]
    pub last_name: String,

    /// Birth date as YYYY-MM-DD.
    #[arg(long)]
    pub birth_date: NaiveDate,

    /// male | female
    #[arg(long)]
    pub gender: GenderArg,

    #[arg(long)]
    pub purok: Option<String>,

    #[arg(long = "street")]
    pub street_address: Option<String>,

    #[arg(long = "phone")]
    pub phone_number: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub senior: bool,

    #[arg(long)]
    pub pwd: bool,

    #[arg(long)]
    pub indigenous: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only members of this household.
    #[arg(long)]
    pub household: Option<HouseholdId>,

    /// Only residents without a household.
    #[arg(long, conflicts_with = "household")]
    pub unassigned: bool,

    /// Case-insensitive filter on first or last name.
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

pub fn run(app: &AppContext, cmd: ResidentCommand) -> Result<()> {
    match cmd {
        ResidentCommand::Add(args) => add(app, args),
        ResidentCommand::List(args) => list(app, args),
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let mut draft = ResidentDraft::new(
        args.first_name,
        args.last_name,
        args.birth_date,
        args.gender.0,
    );
    draft.middle_name = args.middle_name;
    draft.purok = args.purok;
    draft.street_address = args.street_address;
    draft.phone_number = args.phone_number;
    draft.email = args.email;
    draft.is_senior_citizen = args.senior;
    draft.is_pwd = args.pwd;
    draft.is_indigenous = args.indigenous;

    let resident = app
        .residents()
        .register_resident(&draft)
        .context("failed to register resident")?;
    println!("Registered {} ({})", resident.full_name(), resident.id);
    Ok(())
}

fn list(app: &AppContext, args: ListArgs) -> Result<()> {
    let residents = app.residents().list_residents(&ResidentListQuery {
        household_id: args.household,
        unassigned_only: args.unassigned,
        search: args.search,
    })?;
    if residents.is_empty() {
        println!("No residents found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28}  {:<10}  {:<6}  {:<12}",
        "ID", "NAME", "BORN", "GENDER", "HOUSE NO."
    );
    for resident in &residents {
        println!(
            "{:<36}  {:<28}  {:<10}  {:<6}  {:<12}",
            resident.id,
            resident.full_name(),
            resident.date_of_birth.format("%Y-%m-%d"),
            resident.gender.as_str(),
            or_dash(resident.house_number.as_deref()),
        );
    }
    Ok(())
}
