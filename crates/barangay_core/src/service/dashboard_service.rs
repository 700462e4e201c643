//! Dashboard aggregate statistics.
//!
//! # Responsibility
//! - Compute the headline counts shown on the dashboard cards: residents,
//!   households, ongoing activities, and submitted reports.
//! - Bucket residents into the population-distribution age brackets.
//!
//! # Invariants
//! - Bracket populations sum to `total_residents`.
//! - Ages are computed against the caller-provided reference date.

use crate::model::activity::ActivityStatus;
use crate::model::household::Household;
use crate::model::report::ReportStatus;
use crate::model::resident::Resident;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::household_repo::{HouseholdListQuery, HouseholdRepository};
use crate::repo::report_repo::ReportRepository;
use crate::repo::resident_repo::{ResidentListQuery, ResidentRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use serde::Serialize;

/// Age bracket label with inclusive lower bound and optional inclusive upper bound.
struct AgeBracket {
    label: &'static str,
    min_age: u32,
    max_age: Option<u32>,
}

const AGE_BRACKETS: [AgeBracket; 4] = [
    AgeBracket {
        label: "0-17",
        min_age: 0,
        max_age: Some(17),
    },
    AgeBracket {
        label: "18-35",
        min_age: 18,
        max_age: Some(35),
    },
    AgeBracket {
        label: "36-59",
        min_age: 36,
        max_age: Some(59),
    },
    AgeBracket {
        label: "60+",
        min_age: 60,
        max_age: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationBucket {
    pub age: &'static str,
    pub population: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub total_residents: u32,
    pub total_households: u32,
    pub households_with_electricity: u32,
    pub households_with_water: u32,
    pub households_without_utilities: u32,
    pub unassigned_residents: u32,
    pub senior_citizens: u32,
    pub pwd_residents: u32,
    pub indigenous_residents: u32,
    pub ongoing_activities: u32,
    /// Every filed report, whatever its status.
    pub reports_submitted: u32,
    pub pending_reports: u32,
    pub population: Vec<PopulationBucket>,
}

pub struct DashboardService<H, R, A, P>
where
    H: HouseholdRepository,
    R: ResidentRepository,
    A: ActivityRepository,
    P: ReportRepository,
{
    households: H,
    residents: R,
    activities: A,
    reports: P,
}

impl<H, R, A, P> DashboardService<H, R, A, P>
where
    H: HouseholdRepository,
    R: ResidentRepository,
    A: ActivityRepository,
    P: ReportRepository,
{
    pub fn new(households: H, residents: R, activities: A, reports: P) -> Self {
        Self {
            households,
            residents,
            activities,
            reports,
        }
    }

    /// Computes all dashboard figures with ages taken on `today`.
    pub fn snapshot(&self, today: NaiveDate) -> RepoResult<DashboardSnapshot> {
        let households = self
            .households
            .list_households(&HouseholdListQuery::default())?;
        let residents = self
            .residents
            .list_residents(&ResidentListQuery::default())?;

        let count_households = |predicate: fn(&Household) -> bool| {
            count(
                households
                    .iter()
                    .filter(|summary| predicate(&summary.household)),
            )
        };
        let count_residents =
            |predicate: fn(&Resident) -> bool| count(residents.iter().filter(|r| predicate(r)));

        Ok(DashboardSnapshot {
            total_residents: count(residents.iter()),
            total_households: count(households.iter()),
            households_with_electricity: count_households(|h| h.has_electricity),
            households_with_water: count_households(|h| h.has_water),
            households_without_utilities: count_households(|h| h.lacks_utilities()),
            unassigned_residents: count_residents(|r| r.household_id.is_none()),
            senior_citizens: count_residents(|r| r.is_senior_citizen),
            pwd_residents: count_residents(|r| r.is_pwd),
            indigenous_residents: count_residents(|r| r.is_indigenous),
            ongoing_activities: self.activities.count_activities(ActivityStatus::Ongoing)?,
            reports_submitted: self.reports.count_reports(None)?,
            pending_reports: self.reports.count_reports(Some(ReportStatus::Pending))?,
            population: population_distribution(&residents, today),
        })
    }
}

/// Buckets residents into the fixed dashboard age brackets.
pub fn population_distribution(residents: &[Resident], today: NaiveDate) -> Vec<PopulationBucket> {
    let mut buckets: Vec<PopulationBucket> = AGE_BRACKETS
        .iter()
        .map(|bracket| PopulationBucket {
            age: bracket.label,
            population: 0,
        })
        .collect();

    for resident in residents {
        let age = resident.age_on(today);
        if let Some(index) = AGE_BRACKETS.iter().position(|bracket| {
            age >= bracket.min_age && bracket.max_age.map_or(true, |max_age| age <= max_age)
        }) {
            buckets[index].population += 1;
        }
    }
    buckets
}

fn count<I: Iterator>(items: I) -> u32 {
    u32::try_from(items.count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::population_distribution;
    use crate::model::resident::{Gender, Resident};
    use chrono::NaiveDate;

    fn born(year: i32, month: u32, day: u32) -> Resident {
        Resident::new(
            "Test",
            "Resident",
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            Gender::Female,
        )
    }

    #[test]
    fn brackets_use_inclusive_bounds() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let residents = vec![
            born(2024, 1, 1),
            born(2006, 1, 2),
            born(2006, 1, 1),
            born(1988, 1, 1),
            born(1964, 1, 2),
            born(1964, 1, 1),
        ];

        let buckets = population_distribution(&residents, today);
        let counts: Vec<(&str, u32)> = buckets
            .iter()
            .map(|bucket| (bucket.age, bucket.population))
            .collect();
        assert_eq!(
            counts,
            vec![("0-17", 2), ("18-35", 1), ("36-59", 2), ("60+", 1)]
        );
    }
}
