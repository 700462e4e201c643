//! `barangay activity add|list|status`

use anyhow::{Context, Result};
use barangay_core::{Activity, ActivityId, ActivityStatus};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{choice, or_dash, AppContext};

const STATUSES: &str = "scheduled, ongoing, completed, cancelled";

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// Schedule a community activity.
    Add(AddArgs),

    /// List activities by date.
    List {
        #[arg(long, value_parser = choice(ActivityStatus::parse, STATUSES))]
        status: Option<ActivityStatus>,
    },

    /// Move an activity to another status.
    Status {
        id: ActivityId,

        #[arg(value_parser = choice(ActivityStatus::parse, STATUSES))]
        status: ActivityStatus,

        /// Attendance to record with the change.
        #[arg(long)]
        participants: Option<u32>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,

    /// Free-form kind, e.g. `meeting` or `clean-up drive`.
    #[arg(long = "type")]
    pub activity_type: String,

    /// Activity date as YYYY-MM-DD.
    #[arg(long)]
    pub date: NaiveDate,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub organizer: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

pub fn run(app: &AppContext, cmd: ActivityCommand) -> Result<()> {
    match cmd {
        ActivityCommand::Add(args) => add(app, args),
        ActivityCommand::List { status } => list(app, status),
        ActivityCommand::Status {
            id,
            status,
            participants,
        } => {
            let activity = app
                .activities()
                .set_status(id, status, participants)
                .with_context(|| format!("failed to update activity {id}"))?;
            println!("{} is now {}", activity.title, activity.status.as_str());
            Ok(())
        }
    }
}

fn add(app: &AppContext, args: AddArgs) -> Result<()> {
    let mut activity = Activity::new(args.title, args.activity_type, args.date);
    activity.location = args.location;
    activity.organizer = args.organizer;
    activity.description = args.description;

    let activity = app
        .activities()
        .schedule_activity(&activity)
        .context("failed to schedule activity")?;
    println!("Scheduled {} ({})", activity.title, activity.id);
    Ok(())
}

fn list(app: &AppContext, status: Option<ActivityStatus>) -> Result<()> {
    let activities = app.activities().list_activities(status)?;
    if activities.is_empty() {
        println!("No activities found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28}  {:<10}  {:<20}  {:<10}  {:>6}",
        "ID", "TITLE", "DATE", "LOCATION", "STATUS", "PEOPLE"
    );
    for activity in &activities {
        println!(
            "{:<36}  {:<28}  {:<10}  {:<20}  {:<10}  {:>6}",
            activity.id,
            activity.title,
            activity.activity_date.format("%Y-%m-%d"),
            or_dash(activity.location.as_deref()),
            activity.status.as_str(),
            activity
                .participants_count
                .map_or_else(|| "-".to_string(), |count| count.to_string()),
        );
    }
    Ok(())
}
