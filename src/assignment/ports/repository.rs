//! Repository ports for group, member, and assignment persistence.
//!
//! Each entity gets its own narrow contract; services depend only on
//! these traits, so the concrete store (relational, in-memory) stays
//! pluggable.

use crate::assignment::domain::{
    ActorId, Assignment, AssignmentId, AssignmentStatus, AssignmentWithMember, Group, GroupId,
    Member, MemberId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A mutation targeted a group that does not exist.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// A mutation targeted a member that does not exist.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// A mutation targeted an assignment that does not exist.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Group persistence contract.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Stores a new group.
    async fn create(&self, group: &Group) -> StoreResult<()>;

    /// Finds a group by identifier. Returns `None` when absent.
    async fn find_by_id(&self, id: GroupId) -> StoreResult<Option<Group>>;

    /// Returns the groups owned by an actor, creation time ascending.
    async fn list_by_owner(&self, owner: ActorId) -> StoreResult<Vec<Group>>;

    /// Persists changes to an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GroupNotFound`] when the group does not
    /// exist.
    async fn update(&self, group: &Group) -> StoreResult<()>;

    /// Removes a group and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GroupNotFound`] when the group does not
    /// exist.
    async fn delete(&self, id: GroupId) -> StoreResult<()>;
}

/// Member persistence contract.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Stores a new member.
    async fn create(&self, member: &Member) -> StoreResult<()>;

    /// Finds a member by identifier. Returns `None` when absent.
    async fn find_by_id(&self, id: MemberId) -> StoreResult<Option<Member>>;

    /// Returns every member of a group, creation time ascending.
    ///
    /// The ascending order is load-bearing: it is the stable tie-break
    /// used by selection and the row order of distribution reports.
    async fn list_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>>;

    /// Returns the active members of a group, creation time ascending.
    async fn list_active_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>>;

    /// Persists changes to an existing member.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MemberNotFound`] when the member does not
    /// exist.
    async fn update(&self, member: &Member) -> StoreResult<()>;

    /// Removes a member and its assignment history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MemberNotFound`] when the member does not
    /// exist.
    async fn delete(&self, id: MemberId) -> StoreResult<()>;

    /// Atomically bumps the member's open-assignment counter.
    async fn increment_open(&self, id: MemberId) -> StoreResult<()>;

    /// Atomically drops the member's open-assignment counter, clamping at
    /// zero.
    async fn decrement_open(&self, id: MemberId) -> StoreResult<()>;

    /// Counts the member's assignments created on or after the current
    /// calendar day, server timezone.
    async fn daily_assignment_count(&self, id: MemberId) -> StoreResult<i64>;
}

/// Assignment persistence contract.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Stores a new assignment record.
    async fn create(&self, assignment: &Assignment) -> StoreResult<()>;

    /// Finds an assignment by identifier. Returns `None` when absent.
    async fn find_by_id(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;

    /// Conditionally moves an open assignment into a terminal status,
    /// stamping `completed_at`.
    ///
    /// Returns `false` when the row does not exist, was no longer open, or
    /// the target status is not terminal, without mutating anything.
    /// Implementations must make the check-and-set appear atomic so racing
    /// callers observe at most one `true`.
    async fn transition_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Counts every assignment recorded against a group.
    async fn count_by_group(&self, group_id: GroupId) -> StoreResult<i64>;

    /// Counts lifetime assignments per member, regardless of status.
    /// Members with no assignments are absent from the map.
    async fn counts_by_members(&self, ids: &[MemberId]) -> StoreResult<HashMap<MemberId, i64>>;

    /// Returns one page of a group's history, newest first, joined with
    /// member names.
    async fn list_by_group(
        &self,
        group_id: GroupId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AssignmentWithMember>>;
}
