//! `barangay household add|edit|delete|list|members`

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Context, Result};
use barangay_core::{GeoPoint, HouseholdForm, HouseholdFormMessage, HouseholdId, ResidentId};
use clap::{Args, Subcommand};

use super::{or_dash, AppContext};

#[derive(Subcommand, Debug)]
pub enum HouseholdCommand {
    /// Register a household and attach the given residents.
    Add(AddArgs),

    /// Change household fields and, optionally, its member set.
    Edit(EditArgs),

    /// Detach all members and delete the household.
    Delete {
        /// Household id.
        id: HouseholdId,
    },

    /// List households with member counts.
    List {
        /// Case-insensitive filter on house number or purok.
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// List residents of a household.
    Members {
        /// Household id.
        id: HouseholdId,
    },
}

/// Optional household fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct HouseholdFields {
    #[arg(long)]
    pub purok: Option<String>,

    #[arg(long = "street")]
    pub street_address: Option<String>,

    /// true | false
    #[arg(long)]
    pub electricity: Option<bool>,

    /// true | false
    #[arg(long)]
    pub water: Option<bool>,

    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long = "lng", allow_hyphen_values = true)]
    pub longitude: Option<f64>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub house_number: String,

    #[command(flatten)]
    pub fields: HouseholdFields,

    /// Resident id to attach. Repeatable.
    #[arg(long = "member", short = 'm')]
    pub members: Vec<ResidentId>,

    /// Head of household. Attached as a member when not listed.
    #[arg(long)]
    pub head: Option<ResidentId>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Household id.
    pub id: HouseholdId,

    #[arg(long)]
    pub house_number: Option<String>,

    #[command(flatten)]
    pub fields: HouseholdFields,

    /// Replaces the member set with these residents. Repeatable.
    #[arg(long = "member", short = 'm', conflicts_with = "no_members")]
    pub members: Vec<ResidentId>,

    /// Detaches every current member.
    #[arg(long)]
    pub no_members: bool,

    /// Head of household. Attached as a member when not listed.
    #[arg(long, conflicts_with = "no_members")]
    pub head: Option<ResidentId>,
}

pub fn run(app: &AppContext, cmd: HouseholdCommand) -> Result<()> {
    match cmd {
        HouseholdCommand::Add(args) => add(app, args),
        HouseholdCommand::Edit(args) => edit(app, args),
        HouseholdCommand::Delete { id } => delete(app, id),
        HouseholdCommand::List { search } => list(app, search),
        HouseholdCommand::Members { id } => members(app, id),
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let mut form = HouseholdForm::for_add(app.config.default_location);
    form.update(HouseholdFormMessage::SetHouseNumber(args.house_number));
    apply_fields(&mut form, args.fields);
    select_exactly(&mut form, args.members.into_iter().collect());
    set_head(&mut form, args.head);

    submit(app, &mut form)
}

fn edit(app: &AppContext, args: EditArgs) -> Result<()> {
    let service = app.households();
    let household = service
        .get_household(args.id)?
        .ok_or_else(|| anyhow!("household {} not found", args.id))?;
    let members = service.household_members(args.id)?;

    let mut form = HouseholdForm::for_edit(&household, &members, app.config.default_location);
    if let Some(house_number) = args.house_number {
        form.update(HouseholdFormMessage::SetHouseNumber(house_number));
    }
    apply_fields(&mut form, args.fields);
    if args.no_members {
        select_exactly(&mut form, BTreeSet::new());
    } else if !args.members.is_empty() {
        select_exactly(&mut form, args.members.into_iter().collect());
    }
    set_head(&mut form, args.head);

    submit(app, &mut form)
}

fn delete(app: &AppContext, id: HouseholdId) -> Result<()> {
    let detached = app
        .households()
        .delete_household(id)
        .with_context(|| format!("failed to delete household {id}"))?;
    println!("Household deleted; {detached} resident(s) detached");
    Ok(())
}

fn list(app: &AppContext, search: Option<String>) -> Result<()> {
    let summaries = app.households().list_households(search)?;
    if summaries.is_empty() {
        println!("No households found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<12}  {:<16}  {:>7}  {:<5}  {:<5}",
        "ID", "HOUSE NO.", "PUROK", "MEMBERS", "POWER", "WATER"
    );
    for summary in &summaries {
        let household = &summary.household;
        println!(
            "{:<36}  {:<12}  {:<16}  {:>7}  {:<5}  {:<5}",
            household.id,
            household.house_number,
            or_dash(household.purok.as_deref()),
            summary.member_count,
            yes_no(household.has_electricity),
            yes_no(household.has_water),
        );
    }
    Ok(())
}

fn members(app: &AppContext, id: HouseholdId) -> Result<()> {
    let service = app.households();
    let household = service
        .get_household(id)?
        .ok_or_else(|| anyhow!("household {id} not found"))?;
    let members = service.household_members(id)?;

    println!(
        "Household {} ({} member(s))",
        household.house_number,
        members.len()
    );
    for resident in &members {
        let marker = if household.head_of_household_id == Some(resident.id) {
            "  (head)"
        } else {
            ""
        };
        println!("  {}  {}{marker}", resident.id, resident.full_name());
    }
    Ok(())
}

fn apply_fields(form: &mut HouseholdForm, fields: HouseholdFields) {
    if let Some(purok) = fields.purok {
        form.update(HouseholdFormMessage::SetPurok(purok));
    }
    if let Some(street_address) = fields.street_address {
        form.update(HouseholdFormMessage::SetStreetAddress(street_address));
    }
    if let Some(electricity) = fields.electricity {
        form.update(HouseholdFormMessage::SetElectricity(electricity));
    }
    if let Some(water) = fields.water {
        form.update(HouseholdFormMessage::SetWater(water));
    }
    if fields.latitude.is_some() || fields.longitude.is_some() {
        let current = form.location();
        form.update(HouseholdFormMessage::SetLocation(GeoPoint::new(
            fields.latitude.unwrap_or(current.latitude),
            fields.longitude.unwrap_or(current.longitude),
        )));
    }
}

/// Toggles residents until the form selection equals `target`.
fn select_exactly(form: &mut HouseholdForm, target: BTreeSet<ResidentId>) {
    let toggles: Vec<ResidentId> = form
        .selected_residents()
        .symmetric_difference(&target)
        .copied()
        .collect();
    for resident_id in toggles {
        form.update(HouseholdFormMessage::ToggleResident(resident_id));
    }
}

fn set_head(form: &mut HouseholdForm, head: Option<ResidentId>) {
    if head.is_some() {
        form.update(HouseholdFormMessage::SetHead(head));
    }
}

fn submit(app: &AppContext, form: &mut HouseholdForm) -> Result<()> {
    let outcome = form.submit(&app.households());
    if !outcome.ok {
        match outcome.detail {
            Some(detail) => bail!("{}: {detail}", outcome.message),
            None => bail!("{}", outcome.message),
        }
    }
    match outcome.household_id {
        Some(id) => println!("{} ({id})", outcome.message),
        None => println!("{}", outcome.message),
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
