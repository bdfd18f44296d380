//! In-memory group repository.

use super::store::{lock_poisoned, SharedState};
use crate::assignment::domain::{ActorId, Group, GroupId};
use crate::assignment::ports::{GroupRepository, StoreError, StoreResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Group repository handle over an [`super::InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryGroupRepository {
    state: Arc<RwLock<SharedState>>,
}

impl InMemoryGroupRepository {
    pub(super) fn new(state: Arc<RwLock<SharedState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create(&self, group: &Group) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.groups.insert(group.id(), group.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: GroupId) -> StoreResult<Option<Group>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.groups.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: ActorId) -> StoreResult<Vec<Group>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut groups: Vec<Group> = state
            .groups
            .values()
            .filter(|group| group.owner() == owner)
            .cloned()
            .collect();
        groups.sort_by_key(Group::created_at);
        Ok(groups)
    }

    async fn update(&self, group: &Group) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        match state.groups.get_mut(&group.id()) {
            Some(existing) => {
                *existing = group.clone();
                Ok(())
            }
            None => Err(StoreError::GroupNotFound(group.id())),
        }
    }

    async fn delete(&self, id: GroupId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.groups.remove(&id).is_none() {
            return Err(StoreError::GroupNotFound(id));
        }
        // The group owns its roster and history; removal cascades.
        state
            .members
            .retain(|_, stored| stored.member.group_id() != id);
        state
            .assignments
            .retain(|_, stored| stored.assignment.group_id() != id);
        Ok(())
    }
}
