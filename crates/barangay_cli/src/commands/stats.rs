//! `barangay stats [--today YYYY-MM-DD]`

use anyhow::{Context, Result};
use barangay_core::DashboardService;
use chrono::{Local, NaiveDate};
use clap::Args;

use super::AppContext;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Reference date for ages. Defaults to the local date.
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

impl StatsArgs {
    pub fn run(self, app: &AppContext) -> Result<()> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let snapshot = DashboardService::new(
            app.household_repo(),
            app.resident_repo(),
            app.activity_repo(),
            app.report_repo(),
        )
            .snapshot(today)
            .context("failed to compute dashboard figures")?;

        println!("Total residents:       {}", snapshot.total_residents);
        println!("Total households:      {}", snapshot.total_households);
        println!("With electricity:      {}", snapshot.households_with_electricity);
        println!("With water:            {}", snapshot.households_with_water);
        println!("Without utilities:     {}", snapshot.households_without_utilities);
        println!("Unassigned residents:  {}", snapshot.unassigned_residents);
        println!("Senior citizens:       {}", snapshot.senior_citizens);
        println!("PWD:                   {}", snapshot.pwd_residents);
        println!("Indigenous:            {}", snapshot.indigenous_residents);
        println!("Ongoing activities:    {}", snapshot.ongoing_activities);
        println!(
            "Reports submitted:     {} ({} pending)",
            snapshot.reports_submitted, snapshot.pending_reports
        );
        println!("Population by age:");
        for bucket in &snapshot.population {
            println!("  {:<6} {}", bucket.age, bucket.population);
        }
        Ok(())
    }
}
