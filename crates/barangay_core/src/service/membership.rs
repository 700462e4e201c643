//! Household membership reconciliation.
//!
//! # Responsibility
//! - Diff a household's current members against the selected target set.
//! - Apply the diff as at most two bulk writes: one removal, one addition.
//!
//! # Invariants
//! - `to_remove` and `to_add` are disjoint.
//! - Residents in both sets, and residents in neither, receive no write.
//! - Removal is issued before addition; a failed removal skips the addition.
//! - No write is issued when both diffs are empty.

use crate::model::household::{normalize_house_number, HouseholdId};
use crate::model::resident::ResidentId;
use crate::repo::resident_repo::ResidentRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Minimal change set turning `current` membership into `target`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPlan {
    /// `current - target`: residents to detach.
    pub to_remove: BTreeSet<ResidentId>,
    /// `target - current`: residents to attach.
    pub to_add: BTreeSet<ResidentId>,
    /// Size of `current ∩ target`.
    pub unchanged: usize,
}

impl MembershipPlan {
    pub fn compute(current: &BTreeSet<ResidentId>, target: &BTreeSet<ResidentId>) -> Self {
        Self {
            to_remove: current.difference(target).copied().collect(),
            to_add: target.difference(current).copied().collect(),
            unchanged: current.intersection(target).count(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Number of bulk writes applying this plan issues (0..=2).
    pub fn write_count(&self) -> usize {
        usize::from(!self.to_remove.is_empty()) + usize::from(!self.to_add.is_empty())
    }
}

/// Store call that failed during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    FetchCurrent,
    Remove,
    Add,
}

impl ReconcilePhase {
    fn as_str(self) -> &'static str {
        match self {
            Self::FetchCurrent => "fetch_current",
            Self::Remove => "remove",
            Self::Add => "add",
        }
    }
}

#[derive(Debug)]
pub enum ReconcileError {
    /// House number is blank after trimming.
    BlankHouseNumber,
    /// Store rejected one of the reconciliation calls.
    Store {
        phase: ReconcilePhase,
        source: RepoError,
    },
}

impl ReconcileError {
    /// Phase of the failed store call, if any.
    pub fn phase(&self) -> Option<ReconcilePhase> {
        match self {
            Self::BlankHouseNumber => None,
            Self::Store { phase, .. } => Some(*phase),
        }
    }
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankHouseNumber => write!(f, "house number is required"),
            Self::Store { phase, source } => {
                write!(f, "membership {} failed: {source}", phase.as_str())
            }
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BlankHouseNumber => None,
            Self::Store { source, .. } => Some(source),
        }
    }
}

/// Applies membership diffs through a resident store.
pub struct MembershipReconciler<R: ResidentRepository> {
    store: R,
}

impl<R: ResidentRepository> MembershipReconciler<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Makes `target` the exact member set of `household_id`.
    ///
    /// Current members are fetched immediately before diffing. Returns the
    /// applied plan.
    ///
    /// # Errors
    /// - `BlankHouseNumber` before any store call.
    /// - `Store` tagged with the failing phase. A removal failure leaves the
    ///   addition unattempted; re-invoking reconciles from fresh state.
    pub fn reconcile_membership(
        &self,
        household_id: HouseholdId,
        house_number: &str,
        target: &BTreeSet<ResidentId>,
    ) -> Result<MembershipPlan, ReconcileError> {
        let house_number =
            normalize_house_number(house_number).map_err(|_| ReconcileError::BlankHouseNumber)?;
        let started_at = Instant::now();

        let current = self
            .store
            .member_ids(household_id)
            .map_err(|source| self.fail(household_id, ReconcilePhase::FetchCurrent, source))?;
        let plan = MembershipPlan::compute(&current, target);

        if !plan.to_remove.is_empty() {
            self.store
                .clear_household(&plan.to_remove)
                .map_err(|source| self.fail(household_id, ReconcilePhase::Remove, source))?;
        }

        if !plan.to_add.is_empty() {
            self.store
                .assign_household(&plan.to_add, household_id, house_number.as_str())
                .map_err(|source| self.fail(household_id, ReconcilePhase::Add, source))?;
        }

        info!(
            "event=membership_reconcile module=service status=ok household_id={} removed={} added={} unchanged={} writes={} duration_ms={}",
            household_id,
            plan.to_remove.len(),
            plan.to_add.len(),
            plan.unchanged,
            plan.write_count(),
            started_at.elapsed().as_millis()
        );
        Ok(plan)
    }

    fn fail(
        &self,
        household_id: HouseholdId,
        phase: ReconcilePhase,
        source: RepoError,
    ) -> ReconcileError {
        error!(
            "event=membership_reconcile module=service status=error household_id={} phase={} error={}",
            household_id,
            phase.as_str(),
            source
        );
        ReconcileError::Store { phase, source }
    }
}

#[cfg(test)]
mod tests {
    use super::MembershipPlan;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn plan_splits_current_and_target_into_disjoint_diffs() {
        let pool = ids(5);
        let current: BTreeSet<_> = pool[0..3].iter().copied().collect();
        let target: BTreeSet<_> = pool[2..5].iter().copied().collect();

        let plan = MembershipPlan::compute(&current, &target);
        assert_eq!(plan.to_remove, pool[0..2].iter().copied().collect());
        assert_eq!(plan.to_add, pool[3..5].iter().copied().collect());
        assert_eq!(plan.unchanged, 1);
        assert!(plan.to_remove.is_disjoint(&plan.to_add));
        assert_eq!(plan.write_count(), 2);
    }

    #[test]
    fn identical_sets_produce_noop_plan() {
        let current: BTreeSet<_> = ids(3).into_iter().collect();
        let plan = MembershipPlan::compute(&current, &current.clone());
        assert!(plan.is_noop());
        assert_eq!(plan.write_count(), 0);
        assert_eq!(plan.unchanged, 3);
    }

    #[test]
    fn empty_target_removes_everyone() {
        let current: BTreeSet<_> = ids(2).into_iter().collect();
        let plan = MembershipPlan::compute(&current, &BTreeSet::new());
        assert_eq!(plan.to_remove, current);
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.write_count(), 1);
    }
}
