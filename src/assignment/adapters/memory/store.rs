//! Shared in-memory state behind the three repository handles.

use crate::assignment::domain::{Assignment, AssignmentId, Group, GroupId, Member, MemberId};
use crate::assignment::ports::StoreError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use super::{InMemoryAssignmentRepository, InMemoryGroupRepository, InMemoryMemberRepository};

/// A member row plus its insertion sequence.
///
/// The sequence disambiguates members created within the same clock tick
/// so roster listings stay in true creation order.
#[derive(Debug, Clone)]
pub(super) struct StoredMember {
    pub(super) member: Member,
    pub(super) seq: u64,
}

#[derive(Debug, Clone)]
pub(super) struct StoredAssignment {
    pub(super) assignment: Assignment,
    pub(super) seq: u64,
}

#[derive(Debug, Default)]
pub(super) struct SharedState {
    pub(super) groups: HashMap<GroupId, Group>,
    pub(super) members: HashMap<MemberId, StoredMember>,
    pub(super) assignments: HashMap<AssignmentId, StoredAssignment>,
    pub(super) next_seq: u64,
    pub(super) daily_count_faults: HashSet<MemberId>,
}

impl SharedState {
    pub(super) fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

pub(super) fn lock_poisoned<T>(err: PoisonError<T>) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

/// Thread-safe in-memory store backing all three repository ports.
///
/// Handy for tests and embedded use; every handle created from one store
/// observes the same rows, so cross-entity queries (daily counts, lifetime
/// counts) behave like they would against a single database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<SharedState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a group repository handle over this store.
    #[must_use]
    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository::new(Arc::clone(&self.state))
    }

    /// Returns a member repository handle over this store.
    #[must_use]
    pub fn members(&self) -> InMemoryMemberRepository {
        InMemoryMemberRepository::new(Arc::clone(&self.state))
    }

    /// Returns an assignment repository handle over this store.
    #[must_use]
    pub fn assignments(&self) -> InMemoryAssignmentRepository {
        InMemoryAssignmentRepository::new(Arc::clone(&self.state))
    }

    /// Makes every subsequent daily-count lookup for the member fail.
    ///
    /// Test hook for the eligibility rule that a failing lookup skips that
    /// member without blocking selection for the rest of the roster.
    pub fn fail_daily_count_for(&self, member_id: MemberId) {
        if let Ok(mut state) = self.state.write() {
            state.daily_count_faults.insert(member_id);
        }
    }
}
