//! Service layer for assignment lifecycle orchestration.
//!
//! Provides [`AssignmentLifecycleService`] which coordinates next-assignee
//! preview, hand-off recording, completion and cancellation, history
//! pages, and distribution statistics.

use super::{eligibility, selector};
use crate::assignment::domain::{
    Actor, Assignment, AssignmentId, AssignmentStatus, AssignmentWithMember, DistributionReport,
    GroupId, Member, MemberId, MemberShare,
};
use crate::assignment::ports::{
    AssignmentRepository, AuditRecord, AuditSink, GroupRepository, MemberRepository, StoreError,
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Page size applied when the caller does not ask for one.
const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Upper bound on requested page sizes.
const MAX_PAGE_LIMIT: i64 = 200;

/// Request payload for recording a hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAssignmentRequest {
    group_id: GroupId,
    actor: Actor,
    member_id: Option<MemberId>,
    metadata: Option<String>,
}

impl RecordAssignmentRequest {
    /// Creates a request that lets the selector pick the assignee.
    #[must_use]
    pub const fn new(group_id: GroupId, actor: Actor) -> Self {
        Self {
            group_id,
            actor,
            member_id: None,
            metadata: None,
        }
    }

    /// Pins the assignment to an explicit member instead of selecting one.
    #[must_use]
    pub fn with_member(mut self, member_id: MemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    /// Attaches opaque metadata carried on the assignment record.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

/// Outcome of a successful record operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedAssignment {
    /// Identifier of the persisted assignment.
    pub assignment_id: AssignmentId,
    /// The member the work went to.
    pub member: Member,
    /// When the hand-off was recorded.
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// One page of a group's assignment history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentPage {
    /// Rows in newest-first order.
    pub items: Vec<AssignmentWithMember>,
    /// Lifetime assignment count for the group.
    pub total: i64,
    /// Page size actually applied.
    pub limit: i64,
    /// Offset actually applied.
    pub offset: i64,
}

/// Service-level errors for assignment lifecycle operations.
#[derive(Debug, Error)]
pub enum AssignmentLifecycleError {
    /// The group does not exist.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// The group's pause latch is set.
    #[error("assignments are paused for group {0}")]
    GroupPaused(GroupId),

    /// The group has no active members at all.
    #[error("group {0} has no active members")]
    NoActiveMembers(GroupId),

    /// Active members exist but every one is gated by availability or a
    /// capacity cap.
    #[error("no members of group {0} have capacity for a new assignment")]
    NoEligibleMembers(GroupId),

    /// An explicit member id was missing, inactive, or from another group.
    #[error("invalid or inactive member: {0}")]
    InvalidMember(MemberId),

    /// The assignment does not exist.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// The assignment already reached a terminal status.
    #[error("assignment {0} is not open")]
    AssignmentNotOpen(AssignmentId),

    /// Repository operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for assignment lifecycle operations.
pub type AssignmentLifecycleResult<T> = Result<T, AssignmentLifecycleError>;

/// Assignment lifecycle orchestration service.
///
/// Stateless between calls: every operation reads, computes, and writes
/// through the repository ports, so fairness survives restarts without a
/// persisted cursor.
#[derive(Clone)]
pub struct AssignmentLifecycleService<G, M, A, S, C>
where
    G: GroupRepository,
    M: MemberRepository,
    A: AssignmentRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    groups: Arc<G>,
    members: Arc<M>,
    assignments: Arc<A>,
    audit: Arc<S>,
    clock: Arc<C>,
}

impl<G, M, A, S, C> AssignmentLifecycleService<G, M, A, S, C>
where
    G: GroupRepository,
    M: MemberRepository,
    A: AssignmentRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(
        groups: Arc<G>,
        members: Arc<M>,
        assignments: Arc<A>,
        audit: Arc<S>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            groups,
            members,
            assignments,
            audit,
            clock,
        }
    }

    /// Previews the next assignee without committing anything.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLifecycleError::GroupNotFound`] for an unknown
    /// group, [`AssignmentLifecycleError::GroupPaused`] while the pause
    /// latch is set, [`AssignmentLifecycleError::NoActiveMembers`] for an
    /// empty active roster, and
    /// [`AssignmentLifecycleError::NoEligibleMembers`] when every active
    /// member is gated by availability or capacity.
    pub async fn calculate_next(&self, group_id: GroupId) -> AssignmentLifecycleResult<Member> {
        let group = self
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or(AssignmentLifecycleError::GroupNotFound(group_id))?;
        if group.is_paused() {
            return Err(AssignmentLifecycleError::GroupPaused(group_id));
        }

        let active = self.members.list_active_by_group(group_id).await?;
        if active.is_empty() {
            return Err(AssignmentLifecycleError::NoActiveMembers(group_id));
        }

        let eligible = eligibility::eligible_members(self.members.as_ref(), active).await;
        if eligible.is_empty() {
            return Err(AssignmentLifecycleError::NoEligibleMembers(group_id));
        }

        let ids: Vec<MemberId> = eligible.iter().map(Member::id).collect();
        let counts = self.assignments.counts_by_members(&ids).await?;
        selector::select_next(&eligible, &counts)
            .cloned()
            .ok_or(AssignmentLifecycleError::NoEligibleMembers(group_id))
    }

    /// Records a hand-off, selecting the assignee unless the request pins
    /// one.
    ///
    /// The open-assignment counter is a soft statistic: when its increment
    /// fails after the assignment row is in, the failure is logged and the
    /// call still succeeds.
    ///
    /// # Errors
    ///
    /// Returns the selection errors of [`Self::calculate_next`] for the
    /// automatic path, or [`AssignmentLifecycleError::InvalidMember`] when
    /// the pinned member is unknown, inactive, or belongs to another
    /// group.
    pub async fn record(
        &self,
        request: RecordAssignmentRequest,
    ) -> AssignmentLifecycleResult<RecordedAssignment> {
        let RecordAssignmentRequest {
            group_id,
            actor,
            member_id,
            metadata,
        } = request;

        let member = match member_id {
            Some(id) => {
                let member = self
                    .members
                    .find_by_id(id)
                    .await?
                    .ok_or(AssignmentLifecycleError::InvalidMember(id))?;
                if member.group_id() != group_id || !member.is_active() {
                    return Err(AssignmentLifecycleError::InvalidMember(id));
                }
                member
            }
            None => self.calculate_next(group_id).await?,
        };

        let assignment = Assignment::new(group_id, member.id(), metadata, &*self.clock);
        self.assignments.create(&assignment).await?;

        if let Err(err) = self.members.increment_open(member.id()).await {
            tracing::warn!(
                member = %member.id(),
                error = %err,
                "open counter increment failed after assignment insert",
            );
        }

        let recorded_at = assignment.created_at();
        self.emit_audit(
            AuditRecord::new(
                &actor,
                "assignment_recorded",
                "assignment",
                assignment.id().to_string(),
                recorded_at,
            )
            .with_detail(serde_json::json!({
                "group_id": group_id.to_string(),
                "member": member.name(),
            })),
        );

        Ok(RecordedAssignment {
            assignment_id: assignment.id(),
            member,
            recorded_at,
        })
    }

    /// Marks an open assignment completed and releases its counter slot.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLifecycleError::AssignmentNotFound`] for an
    /// unknown id and [`AssignmentLifecycleError::AssignmentNotOpen`] when
    /// the assignment already reached a terminal status — including when a
    /// racing caller won the transition.
    pub async fn complete(
        &self,
        id: AssignmentId,
        actor: &Actor,
    ) -> AssignmentLifecycleResult<()> {
        self.close(id, actor, AssignmentStatus::Completed, "assignment_completed")
            .await
    }

    /// Marks an open assignment cancelled and releases its counter slot.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::complete`].
    pub async fn cancel(&self, id: AssignmentId, actor: &Actor) -> AssignmentLifecycleResult<()> {
        self.close(id, actor, AssignmentStatus::Cancelled, "assignment_cancelled")
            .await
    }

    async fn close(
        &self,
        id: AssignmentId,
        actor: &Actor,
        status: AssignmentStatus,
        action: &str,
    ) -> AssignmentLifecycleResult<()> {
        let assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or(AssignmentLifecycleError::AssignmentNotFound(id))?;
        if assignment.status() != AssignmentStatus::Open {
            return Err(AssignmentLifecycleError::AssignmentNotOpen(id));
        }

        // The conditional transition is the arbiter under races; the
        // status precheck above only shortcuts the obvious case.
        let transitioned = self
            .assignments
            .transition_status(id, status, self.clock.utc())
            .await?;
        if !transitioned {
            return Err(AssignmentLifecycleError::AssignmentNotOpen(id));
        }

        if let Err(err) = self.members.decrement_open(assignment.member_id()).await {
            tracing::warn!(
                member = %assignment.member_id(),
                error = %err,
                "open counter decrement failed after status transition",
            );
        }

        self.emit_audit(AuditRecord::new(
            actor,
            action,
            "assignment",
            id.to_string(),
            self.clock.utc(),
        ));
        Ok(())
    }

    /// Returns one newest-first page of the group's history.
    ///
    /// Limit defaults to 50 and is clamped to `1..=200`; offset defaults
    /// to 0.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLifecycleError::GroupNotFound`] for an unknown
    /// group.
    pub async fn assignments(
        &self,
        group_id: GroupId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AssignmentLifecycleResult<AssignmentPage> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(AssignmentLifecycleError::GroupNotFound(group_id))?;

        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let items = self.assignments.list_by_group(group_id, limit, offset).await?;
        let total = self.assignments.count_by_group(group_id).await?;
        Ok(AssignmentPage {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Computes the expected-versus-actual distribution for a group.
    ///
    /// Inactive members appear with their historical counts but a zero
    /// entitlement; only active weights feed the denominator.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentLifecycleError::GroupNotFound`] for an unknown
    /// group.
    pub async fn distribution(
        &self,
        group_id: GroupId,
    ) -> AssignmentLifecycleResult<DistributionReport> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(AssignmentLifecycleError::GroupNotFound(group_id))?;

        let members = self.members.list_by_group(group_id).await?;
        let total = self.assignments.count_by_group(group_id).await?;
        let ids: Vec<MemberId> = members.iter().map(Member::id).collect();
        let counts = self.assignments.counts_by_members(&ids).await?;

        let active_weight: u64 = members
            .iter()
            .filter(|member| member.is_active())
            .map(|member| u64::from(member.weight().value()))
            .sum();

        let distribution = members
            .into_iter()
            .map(|member| {
                let actual = counts.get(&member.id()).copied().unwrap_or(0);
                let expected = if member.is_active() && active_weight > 0 {
                    entitled_share(member.weight().value(), active_weight, total)
                } else {
                    0.0
                };
                MemberShare {
                    member_id: member.id(),
                    name: member.name().to_owned(),
                    weight: member.weight(),
                    assignments: actual,
                    expected: round_to_cents(expected),
                    variance: round_to_cents(signed_drift(actual, expected)),
                }
            })
            .collect();

        Ok(DistributionReport {
            total_assignments: total,
            distribution,
        })
    }

    /// Queues an audit record on a detached task so sink latency or
    /// failure never reaches the caller.
    fn emit_audit(&self, record: AuditRecord) {
        let sink = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(err) = sink.record(record).await {
                tracing::warn!(error = %err, "audit emission failed");
            }
        });
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Counts and weight sums stay far below 2^52"
)]
fn entitled_share(weight: u32, active_weight: u64, total: i64) -> f64 {
    (f64::from(weight) / active_weight as f64) * total as f64
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Counts stay far below 2^52"
)]
fn signed_drift(actual: i64, expected: f64) -> f64 {
    actual as f64 - expected
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
