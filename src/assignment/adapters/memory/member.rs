//! In-memory member repository.

use super::store::{lock_poisoned, SharedState, StoredMember};
use crate::assignment::domain::{GroupId, Member, MemberId};
use crate::assignment::ports::{MemberRepository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

/// Member repository handle over an [`super::InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryMemberRepository {
    state: Arc<RwLock<SharedState>>,
}

impl InMemoryMemberRepository {
    pub(super) fn new(state: Arc<RwLock<SharedState>>) -> Self {
        Self { state }
    }

    fn list_filtered(&self, group_id: GroupId, active_only: bool) -> StoreResult<Vec<Member>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut stored: Vec<&StoredMember> = state
            .members
            .values()
            .filter(|stored| stored.member.group_id() == group_id)
            .filter(|stored| !active_only || stored.member.is_active())
            .collect();
        stored.sort_by_key(|stored| (stored.member.created_at(), stored.seq));
        Ok(stored.into_iter().map(|stored| stored.member.clone()).collect())
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn create(&self, member: &Member) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let seq = state.take_seq();
        state.members.insert(
            member.id(),
            StoredMember {
                member: member.clone(),
                seq,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: MemberId) -> StoreResult<Option<Member>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.members.get(&id).map(|stored| stored.member.clone()))
    }

    async fn list_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>> {
        self.list_filtered(group_id, false)
    }

    async fn list_active_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>> {
        self.list_filtered(group_id, true)
    }

    async fn update(&self, member: &Member) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        match state.members.get_mut(&member.id()) {
            Some(stored) => {
                stored.member = member.clone();
                Ok(())
            }
            None => Err(StoreError::MemberNotFound(member.id())),
        }
    }

    async fn delete(&self, id: MemberId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.members.remove(&id).is_none() {
            return Err(StoreError::MemberNotFound(id));
        }
        state
            .assignments
            .retain(|_, stored| stored.assignment.member_id() != id);
        Ok(())
    }

    async fn increment_open(&self, id: MemberId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        match state.members.get_mut(&id) {
            Some(stored) => {
                stored.member.increment_open();
                Ok(())
            }
            None => Err(StoreError::MemberNotFound(id)),
        }
    }

    async fn decrement_open(&self, id: MemberId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        match state.members.get_mut(&id) {
            Some(stored) => {
                stored.member.decrement_open();
                Ok(())
            }
            None => Err(StoreError::MemberNotFound(id)),
        }
    }

    async fn daily_assignment_count(&self, id: MemberId) -> StoreResult<i64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        if state.daily_count_faults.contains(&id) {
            return Err(StoreError::persistence(std::io::Error::other(
                "injected daily-count failure",
            )));
        }
        // Server calendar day, mirroring CURRENT_DATE in the relational
        // adapter.
        let today = Utc::now().date_naive();
        let count = state
            .assignments
            .values()
            .filter(|stored| stored.assignment.member_id() == id)
            .filter(|stored| stored.assignment.created_at().date_naive() >= today)
            .count();
        i64::try_from(count).map_err(StoreError::persistence)
    }
}
