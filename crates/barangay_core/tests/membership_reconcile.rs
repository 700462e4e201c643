use barangay_core::{
    HouseholdId, MembershipReconciler, ReconcileError, ReconcilePhase, RepoError, RepoResult,
    Resident, ResidentId, ResidentListQuery, ResidentRepository,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Select(HouseholdId),
    Clear(BTreeSet<ResidentId>),
    Assign {
        ids: BTreeSet<ResidentId>,
        household_id: HouseholdId,
        house_number: String,
    },
}

/// In-memory membership table that records every call it receives.
#[derive(Default)]
struct RecordingStore {
    links: RefCell<BTreeMap<ResidentId, Option<(HouseholdId, String)>>>,
    calls: RefCell<Vec<Call>>,
    reject: Option<ReconcilePhase>,
}

impl RecordingStore {
    fn with_members(household_id: HouseholdId, house_number: &str, ids: &[ResidentId]) -> Self {
        let store = Self::default();
        for id in ids {
            store
                .links
                .borrow_mut()
                .insert(*id, Some((household_id, house_number.to_string())));
        }
        store
    }

    fn add_unassigned(&self, id: ResidentId) {
        self.links.borrow_mut().insert(id, None);
    }

    fn link(&self, id: ResidentId) -> Option<(HouseholdId, String)> {
        self.links.borrow().get(&id).cloned().flatten()
    }

    fn writes(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| !matches!(call, Call::Select(_)))
            .cloned()
            .collect()
    }

    fn rejected() -> RepoError {
        RepoError::PermissionDenied {
            user_id: Uuid::nil(),
            action: "update residents",
        }
    }
}

impl ResidentRepository for RecordingStore {
    fn create_resident(&self, resident: &Resident) -> RepoResult<ResidentId> {
        Ok(resident.id)
    }

    fn update_resident(&self, _resident: &Resident) -> RepoResult<()> {
        Ok(())
    }

    fn get_resident(&self, _id: ResidentId) -> RepoResult<Option<Resident>> {
        Ok(None)
    }

    fn list_residents(&self, _query: &ResidentListQuery) -> RepoResult<Vec<Resident>> {
        Ok(Vec::new())
    }

    fn member_ids(&self, household_id: HouseholdId) -> RepoResult<BTreeSet<ResidentId>> {
        self.calls.borrow_mut().push(Call::Select(household_id));
        if self.reject == Some(ReconcilePhase::FetchCurrent) {
            return Err(Self::rejected());
        }
        Ok(self
            .links
            .borrow()
            .iter()
            .filter(|(_, link)| matches!(link, Some((owner, _)) if *owner == household_id))
            .map(|(id, _)| *id)
            .collect())
    }

    fn assign_household(
        &self,
        ids: &BTreeSet<ResidentId>,
        household_id: HouseholdId,
        house_number: &str,
    ) -> RepoResult<usize> {
        self.calls.borrow_mut().push(Call::Assign {
            ids: ids.clone(),
            household_id,
            house_number: house_number.to_string(),
        });
        if self.reject == Some(ReconcilePhase::Add) {
            return Err(Self::rejected());
        }
        let mut links = self.links.borrow_mut();
        for id in ids {
            links.insert(*id, Some((household_id, house_number.to_string())));
        }
        Ok(ids.len())
    }

    fn clear_household(&self, ids: &BTreeSet<ResidentId>) -> RepoResult<usize> {
        self.calls.borrow_mut().push(Call::Clear(ids.clone()));
        if self.reject == Some(ReconcilePhase::Remove) {
            return Err(Self::rejected());
        }
        let mut links = self.links.borrow_mut();
        for id in ids {
            links.insert(*id, None);
        }
        Ok(ids.len())
    }
}

fn residents(count: usize) -> Vec<ResidentId> {
    (0..count).map(|_| Uuid::new_v4()).collect()
}

fn set(ids: &[ResidentId]) -> BTreeSet<ResidentId> {
    ids.iter().copied().collect()
}

#[test]
fn new_household_members_are_assigned_in_one_bulk_write() {
    let household_id = Uuid::new_v4();
    let r = residents(2);
    let store = RecordingStore::default();
    r.iter().for_each(|id| store.add_unassigned(*id));
    let reconciler = MembershipReconciler::new(&store);

    let plan = reconciler
        .reconcile_membership(household_id, "101", &set(&r))
        .unwrap();

    assert!(plan.to_remove.is_empty());
    assert_eq!(
        store.writes(),
        vec![Call::Assign {
            ids: set(&r),
            household_id,
            house_number: "101".to_string(),
        }]
    );
    for id in &r {
        assert_eq!(store.link(*id), Some((household_id, "101".to_string())));
    }
}

#[test]
fn dropped_members_are_cleared_without_addition_call() {
    let household_id = Uuid::new_v4();
    let r = residents(3);
    let store = RecordingStore::with_members(household_id, "101", &r);
    let reconciler = MembershipReconciler::new(&store);

    reconciler
        .reconcile_membership(household_id, "101", &set(&r[1..2]))
        .unwrap();

    assert_eq!(store.writes(), vec![Call::Clear(set(&[r[0], r[2]]))]);
    assert_eq!(store.link(r[0]), None);
    assert_eq!(store.link(r[2]), None);
    assert_eq!(store.link(r[1]), Some((household_id, "101".to_string())));
}

#[test]
fn kept_members_are_not_rewritten_when_one_is_added() {
    let household_id = Uuid::new_v4();
    let r = residents(2);
    let store = RecordingStore::with_members(household_id, "101", &r[..1]);
    store.add_unassigned(r[1]);
    let reconciler = MembershipReconciler::new(&store);

    let plan = reconciler
        .reconcile_membership(household_id, "101", &set(&r))
        .unwrap();

    assert_eq!(plan.unchanged, 1);
    assert_eq!(
        store.writes(),
        vec![Call::Assign {
            ids: set(&r[1..]),
            household_id,
            house_number: "101".to_string(),
        }]
    );
}

#[test]
fn rejected_removal_skips_addition_and_returns_removal_error() {
    let household_id = Uuid::new_v4();
    let r = residents(2);
    let mut store = RecordingStore::with_members(household_id, "101", &r[..1]);
    store.add_unassigned(r[1]);
    store.reject = Some(ReconcilePhase::Remove);
    let reconciler = MembershipReconciler::new(&store);

    let err = reconciler
        .reconcile_membership(household_id, "101", &set(&r[1..]))
        .unwrap_err();

    assert_eq!(err.phase(), Some(ReconcilePhase::Remove));
    assert!(matches!(
        err,
        ReconcileError::Store {
            source: RepoError::PermissionDenied { .. },
            ..
        }
    ));
    assert_eq!(store.writes(), vec![Call::Clear(set(&r[..1]))]);
    assert_eq!(store.link(r[1]), None);
}

#[test]
fn identical_target_issues_no_writes() {
    let household_id = Uuid::new_v4();
    let r = residents(3);
    let store = RecordingStore::with_members(household_id, "55", &r);
    let reconciler = MembershipReconciler::new(&store);

    let plan = reconciler
        .reconcile_membership(household_id, "55", &set(&r))
        .unwrap();

    assert!(plan.is_noop());
    assert!(store.writes().is_empty());
    assert_eq!(store.calls.borrow().as_slice(), &[Call::Select(household_id)]);
}

#[test]
fn residents_outside_both_sets_never_appear_in_write_arguments() {
    let household_id = Uuid::new_v4();
    let other_household = Uuid::new_v4();
    let members = residents(3);
    let bystanders = residents(2);
    let store = RecordingStore::with_members(household_id, "9", &members);
    store
        .links
        .borrow_mut()
        .insert(bystanders[0], Some((other_household, "10".to_string())));
    store.add_unassigned(bystanders[1]);
    let newcomer = Uuid::new_v4();
    store.add_unassigned(newcomer);
    let reconciler = MembershipReconciler::new(&store);

    let target = set(&[members[0], newcomer]);
    reconciler
        .reconcile_membership(household_id, "9", &target)
        .unwrap();

    for call in store.writes() {
        let ids = match call {
            Call::Clear(ids) | Call::Assign { ids, .. } => ids,
            Call::Select(_) => unreachable!(),
        };
        assert!(!ids.contains(&bystanders[0]));
        assert!(!ids.contains(&bystanders[1]));
        assert!(!ids.contains(&members[0]));
    }
    assert_eq!(
        store.link(bystanders[0]),
        Some((other_household, "10".to_string()))
    );
    assert_eq!(store.link(bystanders[1]), None);
}

#[test]
fn removal_is_issued_before_addition() {
    let household_id = Uuid::new_v4();
    let r = residents(2);
    let store = RecordingStore::with_members(household_id, "3", &r[..1]);
    store.add_unassigned(r[1]);
    let reconciler = MembershipReconciler::new(&store);

    reconciler
        .reconcile_membership(household_id, "3", &set(&r[1..]))
        .unwrap();

    let writes = store.writes();
    assert_eq!(writes.len(), 2);
    assert!(matches!(writes[0], Call::Clear(_)));
    assert!(matches!(writes[1], Call::Assign { .. }));
}

#[test]
fn failed_addition_leaves_removal_applied_and_retry_converges() {
    let household_id = Uuid::new_v4();
    let r = residents(2);
    let mut store = RecordingStore::with_members(household_id, "3", &r[..1]);
    store.add_unassigned(r[1]);
    store.reject = Some(ReconcilePhase::Add);

    let target = set(&r[1..]);
    let err = MembershipReconciler::new(&store)
        .reconcile_membership(household_id, "3", &target)
        .unwrap_err();
    assert_eq!(err.phase(), Some(ReconcilePhase::Add));
    assert_eq!(store.link(r[0]), None);
    assert_eq!(store.link(r[1]), None);

    store.reject = None;
    let plan = MembershipReconciler::new(&store)
        .reconcile_membership(household_id, "3", &target)
        .unwrap();
    assert!(plan.to_remove.is_empty());
    assert_eq!(plan.to_add, target);
    assert_eq!(store.link(r[1]), Some((household_id, "3".to_string())));
}

#[test]
fn blank_house_number_is_rejected_before_any_store_call() {
    let store = RecordingStore::default();
    let err = MembershipReconciler::new(&store)
        .reconcile_membership(Uuid::new_v4(), "   ", &set(&residents(1)))
        .unwrap_err();

    assert!(matches!(err, ReconcileError::BlankHouseNumber));
    assert!(store.calls.borrow().is_empty());
}

#[test]
fn house_number_is_trimmed_before_assignment() {
    let household_id = Uuid::new_v4();
    let r = residents(1);
    let store = RecordingStore::default();
    store.add_unassigned(r[0]);

    MembershipReconciler::new(&store)
        .reconcile_membership(household_id, " 12B ", &set(&r))
        .unwrap();
    assert_eq!(store.link(r[0]), Some((household_id, "12B".to_string())));
}
