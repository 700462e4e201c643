//! Barangay registry command-line front end.
//!
//! # Usage
//!
//! ```text
//! barangay household add <house-number> [--purok ..] [--member <id>]... [--head <id>]
//! barangay household edit <id> [--house-number ..] [--member <id>]... [--no-members] [--head <id>]
//! barangay household delete <id>
//! barangay household list [--search <text>]
//! barangay household members <id>
//! barangay resident add --first-name .. --last-name .. --birth-date YYYY-MM-DD --gender male|female
//! barangay resident list [--household <id>] [--unassigned] [--search <text>]
//! barangay official appoint --resident <id> --position .. --term-start YYYY-MM-DD
//! barangay official list [--status ..] [--current [--today YYYY-MM-DD]]
//! barangay ordinance add <number> --title .. --enacted YYYY-MM-DD
//! barangay ordinance status <id> active|amended|repealed
//! barangay activity add <title> --type .. --date YYYY-MM-DD
//! barangay activity status <id> <status> [--participants <n>]
//! barangay report add <title> --type .. [--priority low|medium|high|critical]
//! barangay report status <id> pending|in_progress|resolved|closed
//! barangay certificate issue <type> --resident <id> --purpose ..
//! barangay certificate revoke <id>
//! barangay document add <title> --category .. [--file <path>] [--tag <tag>]...
//! barangay document revise <id> --file <path>
//! barangay stats [--today YYYY-MM-DD]
//! barangay version
//! ```

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use barangay_core::Role;
use clap::{Parser, Subcommand};

use commands::{
    activity::ActivityCommand, certificate::CertificateCommand, document::DocumentCommand,
    household::HouseholdCommand, official::OfficialCommand, ordinance::OrdinanceCommand,
    report::ReportCommand, resident::ResidentCommand, stats::StatsArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "barangay",
    version,
    about = "Maintain barangay resident, household, and civic records",
    long_about = None,
)]
struct Cli {
    /// SQLite database file. Overrides the configured default.
    #[arg(long, global = true, env = "BARANGAY_DB_PATH")]
    db: Option<PathBuf>,

    /// Role of the acting user: admin | staff | viewer.
    #[arg(long, global = true, env = "BARANGAY_ROLE", default_value = "admin")]
    role: RoleArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage households and their members.
    Household {
        #[command(subcommand)]
        command: HouseholdCommand,
    },

    /// Register and list residents.
    Resident {
        #[command(subcommand)]
        command: ResidentCommand,
    },

    /// Appoint and list barangay officials.
    Official {
        #[command(subcommand)]
        command: OfficialCommand,
    },

    /// Record enacted ordinances.
    Ordinance {
        #[command(subcommand)]
        command: OrdinanceCommand,
    },

    /// Schedule community activities.
    Activity {
        #[command(subcommand)]
        command: ActivityCommand,
    },

    /// File and follow up incident reports.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Issue and revoke resident certificates.
    Certificate {
        #[command(subcommand)]
        command: CertificateCommand,
    },

    /// File barangay documents and their revisions.
    Document {
        #[command(subcommand)]
        command: DocumentCommand,
    },

    /// Print dashboard figures.
    Stats(StatsArgs),

    /// Print core library version.
    Version,
}

/// Thin wrapper so clap can parse `Role` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct RoleArg(pub Role);

impl FromStr for RoleArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Role::parse(s)
            .map(Self)
            .ok_or_else(|| format!("unknown role '{s}'; expected: admin, staff, viewer"))
    }
}

impl fmt::Display for RoleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Version = cli.command {
        println!("barangay {}", barangay_core::core_version());
        return Ok(());
    }

    let app = commands::AppContext::open(cli.db, cli.role.0)?;
    match cli.command {
        Commands::Household { command } => commands::household::run(&app, command),
        Commands::Resident { command } => commands::resident::run(&app, command),
        Commands::Official { command } => commands::official::run(&app, command),
        Commands::Ordinance { command } => commands::ordinance::run(&app, command),
        Commands::Activity { command } => commands::activity::run(&app, command),
        Commands::Report { command } => commands::report::run(&app, command),
        Commands::Certificate { command } => commands::certificate::run(&app, command),
        Commands::Document { command } => commands::document::run(&app, command),
        Commands::Stats(args) => args.run(&app),
        Commands::Version => Ok(()),
    }
}
