//! Service layer for group administration: creation, mutation, the pause
//! latch, and ownership checks.

use crate::assignment::domain::{
    Actor, ActorId, AssignmentDomainError, AssignmentStrategy, Group, GroupId, GroupUpdate,
};
use crate::assignment::ports::{AuditRecord, AuditSink, GroupRepository, StoreError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupRequest {
    actor: Actor,
    name: String,
    description: Option<String>,
    strategy: AssignmentStrategy,
}

impl CreateGroupRequest {
    /// Creates a request with the default weighted round-robin strategy.
    #[must_use]
    pub fn new(actor: Actor, name: impl Into<String>) -> Self {
        Self {
            actor,
            name: name.into(),
            description: None,
            strategy: AssignmentStrategy::WeightedRoundRobin,
        }
    }

    /// Sets the group description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the selection strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Request payload for partially updating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGroupRequest {
    group_id: GroupId,
    actor: Actor,
    name: Option<String>,
    description: Option<String>,
    active: Option<bool>,
}

impl UpdateGroupRequest {
    /// Creates an empty update request.
    #[must_use]
    pub const fn new(group_id: GroupId, actor: Actor) -> Self {
        Self {
            group_id,
            actor,
            name: None,
            description: None,
            active: None,
        }
    }

    /// Replaces the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Service-level errors for group administration.
#[derive(Debug, Error)]
pub enum GroupManagementError {
    /// The group does not exist.
    #[error("group not found: {0}")]
    NotFound(GroupId),

    /// Pause requested while the latch is already set.
    #[error("assignments are already paused for group {0}")]
    AlreadyPaused(GroupId),

    /// Resume requested while the latch is not set.
    #[error("assignments are not paused for group {0}")]
    NotPaused(GroupId),

    /// An update request carried no fields.
    #[error("no fields provided for update")]
    NoFieldsToUpdate,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for group administration operations.
pub type GroupManagementResult<T> = Result<T, GroupManagementError>;

/// Group administration service.
#[derive(Clone)]
pub struct GroupManagementService<G, S, C>
where
    G: GroupRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    groups: Arc<G>,
    audit: Arc<S>,
    clock: Arc<C>,
}

impl<G, S, C> GroupManagementService<G, S, C>
where
    G: GroupRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new group administration service.
    #[must_use]
    pub const fn new(groups: Arc<G>, audit: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            groups,
            audit,
            clock,
        }
    }

    /// Creates an active, unpaused group owned by the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::Domain`] when the name is blank or
    /// the strategy is reserved, or [`GroupManagementError::Store`] when
    /// persistence fails.
    pub async fn create(&self, request: CreateGroupRequest) -> GroupManagementResult<Group> {
        let CreateGroupRequest {
            actor,
            name,
            description,
            strategy,
        } = request;

        let group = Group::new(actor.id, name, description, strategy, &*self.clock)?;
        self.groups.create(&group).await?;

        self.emit_audit(
            AuditRecord::new(
                &actor,
                "group_created",
                "group",
                group.id().to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({ "name": group.name() })),
        );
        Ok(group)
    }

    /// Retrieves a group by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::NotFound`] for an unknown group.
    pub async fn get(&self, group_id: GroupId) -> GroupManagementResult<Group> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(GroupManagementError::NotFound(group_id))
    }

    /// Returns the groups owned by an actor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::Store`] when the lookup fails.
    pub async fn list_owned_by(&self, owner: ActorId) -> GroupManagementResult<Vec<Group>> {
        Ok(self.groups.list_by_owner(owner).await?)
    }

    /// Applies a partial update to a group.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::NotFound`] for an unknown group or
    /// [`GroupManagementError::NoFieldsToUpdate`] when the request carries
    /// nothing to change.
    pub async fn update(&self, request: UpdateGroupRequest) -> GroupManagementResult<Group> {
        let UpdateGroupRequest {
            group_id,
            actor,
            name,
            description,
            active,
        } = request;

        let mut group = self.get(group_id).await?;
        let update = GroupUpdate {
            name,
            description,
            active,
        };
        if !group.apply_update(update, &*self.clock) {
            return Err(GroupManagementError::NoFieldsToUpdate);
        }
        self.groups.update(&group).await?;

        self.emit_audit(
            AuditRecord::new(
                &actor,
                "group_updated",
                "group",
                group_id.to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({ "name": group.name() })),
        );
        Ok(group)
    }

    /// Deletes a group and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::NotFound`] for an unknown group.
    pub async fn delete(&self, group_id: GroupId, actor: &Actor) -> GroupManagementResult<()> {
        let group = self.get(group_id).await?;
        self.groups.delete(group_id).await?;

        self.emit_audit(
            AuditRecord::new(
                actor,
                "group_deleted",
                "group",
                group_id.to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({ "name": group.name() })),
        );
        Ok(())
    }

    /// Latches the pause flag, blocking new assignments until resumed.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::AlreadyPaused`] when the latch is
    /// already set.
    pub async fn pause(
        &self,
        group_id: GroupId,
        actor: &Actor,
        reason: Option<String>,
    ) -> GroupManagementResult<Group> {
        let mut group = self.get(group_id).await?;
        if group.is_paused() {
            return Err(GroupManagementError::AlreadyPaused(group_id));
        }

        group.pause(reason, actor.id, &*self.clock);
        self.groups.update(&group).await?;

        self.emit_audit(
            AuditRecord::new(
                actor,
                "group_paused",
                "group",
                group_id.to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({
                "name": group.name(),
                "reason": group.pause_reason(),
            })),
        );
        Ok(group)
    }

    /// Clears the pause latch and all pause metadata.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::NotPaused`] when the latch is not
    /// set.
    pub async fn resume(&self, group_id: GroupId, actor: &Actor) -> GroupManagementResult<Group> {
        let mut group = self.get(group_id).await?;
        if !group.is_paused() {
            return Err(GroupManagementError::NotPaused(group_id));
        }

        group.resume(&*self.clock);
        self.groups.update(&group).await?;

        self.emit_audit(
            AuditRecord::new(
                actor,
                "group_resumed",
                "group",
                group_id.to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({ "name": group.name() })),
        );
        Ok(group)
    }

    /// Whether the actor may mutate the group: its owner, or any admin.
    ///
    /// # Errors
    ///
    /// Returns [`GroupManagementError::NotFound`] for an unknown group.
    pub async fn can_modify(&self, group_id: GroupId, actor: &Actor) -> GroupManagementResult<bool> {
        let group = self.get(group_id).await?;
        Ok(group.owner() == actor.id || actor.role.is_admin())
    }

    fn emit_audit(&self, record: AuditRecord) {
        let sink = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(err) = sink.record(record).await {
                tracing::warn!(error = %err, "audit emission failed");
            }
        });
    }
}
