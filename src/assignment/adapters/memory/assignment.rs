//! In-memory assignment repository.

use super::store::{lock_poisoned, SharedState, StoredAssignment};
use crate::assignment::domain::{
    Assignment, AssignmentId, AssignmentStatus, AssignmentWithMember, GroupId, MemberId,
};
use crate::assignment::ports::{AssignmentRepository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Assignment repository handle over an [`super::InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryAssignmentRepository {
    state: Arc<RwLock<SharedState>>,
}

impl InMemoryAssignmentRepository {
    pub(super) fn new(state: Arc<RwLock<SharedState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn create(&self, assignment: &Assignment) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let seq = state.take_seq();
        state.assignments.insert(
            assignment.id(),
            StoredAssignment {
                assignment: assignment.clone(),
                seq,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .assignments
            .get(&id)
            .map(|stored| stored.assignment.clone()))
    }

    async fn transition_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        Ok(state
            .assignments
            .get_mut(&id)
            .map(|stored| stored.assignment.transition(status, at))
            .unwrap_or(false))
    }

    async fn count_by_group(&self, group_id: GroupId) -> StoreResult<i64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .assignments
            .values()
            .filter(|stored| stored.assignment.group_id() == group_id)
            .count();
        i64::try_from(count).map_err(StoreError::persistence)
    }

    async fn counts_by_members(&self, ids: &[MemberId]) -> StoreResult<HashMap<MemberId, i64>> {
        let wanted: HashSet<MemberId> = ids.iter().copied().collect();
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut counts = HashMap::new();
        for stored in state.assignments.values() {
            let member_id = stored.assignment.member_id();
            if wanted.contains(&member_id) {
                *counts.entry(member_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn list_by_group(
        &self,
        group_id: GroupId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AssignmentWithMember>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut rows: Vec<&StoredAssignment> = state
            .assignments
            .values()
            .filter(|stored| stored.assignment.group_id() == group_id)
            .collect();
        rows.sort_by_key(|stored| {
            (
                std::cmp::Reverse(stored.assignment.created_at()),
                std::cmp::Reverse(stored.seq),
            )
        });

        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|stored| {
                let assignment = &stored.assignment;
                let member_name = state
                    .members
                    .get(&assignment.member_id())
                    .map(|stored| stored.member.name().to_owned())?;
                Some(AssignmentWithMember {
                    id: assignment.id(),
                    member_id: assignment.member_id(),
                    member_name,
                    metadata: assignment.metadata().map(str::to_owned),
                    status: assignment.status(),
                    created_at: assignment.created_at(),
                })
            })
            .collect();
        Ok(page)
    }
}
