//! Service layer for roster maintenance: adding, updating, and removing
//! members of a group.

use crate::assignment::domain::{
    Actor, AssignmentDomainError, GroupId, Member, MemberId, MemberUpdate, Weight,
};
use crate::assignment::ports::{
    AuditRecord, AuditSink, GroupRepository, MemberRepository, StoreError,
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for adding a member to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberRequest {
    group_id: GroupId,
    actor: Actor,
    name: String,
    email: Option<String>,
    weight: Option<u32>,
    available: Option<bool>,
    timezone: Option<String>,
    working_hours: Option<Value>,
    max_daily_assignments: Option<u32>,
    max_concurrent_open: Option<u32>,
}

impl AddMemberRequest {
    /// Creates a request with required fields; the member starts active,
    /// available, and at the default weight.
    #[must_use]
    pub fn new(group_id: GroupId, actor: Actor, name: impl Into<String>) -> Self {
        Self {
            group_id,
            actor,
            name: name.into(),
            email: None,
            weight: None,
            available: None,
            timezone: None,
            working_hours: None,
            max_daily_assignments: None,
            max_concurrent_open: None,
        }
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the relative share.
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the initial availability flag.
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// Sets the IANA timezone (stored, not interpreted).
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Sets the opaque working-hours descriptor.
    #[must_use]
    pub fn with_working_hours(mut self, working_hours: Value) -> Self {
        self.working_hours = Some(working_hours);
        self
    }

    /// Caps assignments per calendar day.
    #[must_use]
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.max_daily_assignments = Some(cap);
        self
    }

    /// Caps concurrently open assignments.
    #[must_use]
    pub fn with_concurrent_cap(mut self, cap: u32) -> Self {
        self.max_concurrent_open = Some(cap);
        self
    }
}

/// Request payload for partially updating a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMemberRequest {
    member_id: MemberId,
    actor: Actor,
    name: Option<String>,
    email: Option<String>,
    weight: Option<u32>,
    active: Option<bool>,
    available: Option<bool>,
    timezone: Option<String>,
    working_hours: Option<Value>,
    max_daily_assignments: Option<u32>,
    max_concurrent_open: Option<u32>,
}

impl UpdateMemberRequest {
    /// Creates an empty update request.
    #[must_use]
    pub const fn new(member_id: MemberId, actor: Actor) -> Self {
        Self {
            member_id,
            actor,
            name: None,
            email: None,
            weight: None,
            active: None,
            available: None,
            timezone: None,
            working_hours: None,
            max_daily_assignments: None,
            max_concurrent_open: None,
        }
    }

    /// Replaces the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Replaces the relative share.
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Replaces the operator toggle.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Replaces the availability flag.
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// Replaces the IANA timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Replaces the working-hours descriptor.
    #[must_use]
    pub fn with_working_hours(mut self, working_hours: Value) -> Self {
        self.working_hours = Some(working_hours);
        self
    }

    /// Replaces the daily cap.
    #[must_use]
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.max_daily_assignments = Some(cap);
        self
    }

    /// Replaces the concurrent-open cap.
    #[must_use]
    pub fn with_concurrent_cap(mut self, cap: u32) -> Self {
        self.max_concurrent_open = Some(cap);
        self
    }
}

/// Service-level errors for roster maintenance.
#[derive(Debug, Error)]
pub enum MemberRosterError {
    /// The target group does not exist.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// The member does not exist.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// Removal requested while the member still holds open assignments.
    #[error("member {0} still has open assignments")]
    HasOpenAssignments(MemberId),

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

/// Result type for roster maintenance operations.
pub type MemberRosterResult<T> = Result<T, MemberRosterError>;

/// Roster maintenance service.
#[derive(Clone)]
pub struct MemberRosterService<G, M, S, C>
where
    G: GroupRepository,
    M: MemberRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    groups: Arc<G>,
    members: Arc<M>,
    audit: Arc<S>,
    clock: Arc<C>,
}

impl<G, M, S, C> MemberRosterService<G, M, S, C>
where
    G: GroupRepository,
    M: MemberRepository,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new roster service.
    #[must_use]
    pub const fn new(groups: Arc<G>, members: Arc<M>, audit: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            groups,
            members,
            audit,
            clock,
        }
    }

    /// Adds a member to an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`MemberRosterError::GroupNotFound`] for an unknown group
    /// or [`MemberRosterError::Domain`] when a field fails validation.
    pub async fn add(&self, request: AddMemberRequest) -> MemberRosterResult<Member> {
        let AddMemberRequest {
            group_id,
            actor,
            name,
            email,
            weight,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
        } = request;

        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(MemberRosterError::GroupNotFound(group_id))?;

        let mut member = Member::new(group_id, name, &*self.clock)?;
        let profile = MemberUpdate {
            name: None,
            email,
            weight: weight.map(Weight::new).transpose()?,
            active: None,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
        };
        member.apply_update(profile, &*self.clock);
        self.members.create(&member).await?;

        self.emit_audit(
            AuditRecord::new(
                &actor,
                "member_added",
                "member",
                member.id().to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({
                "group_id": group_id.to_string(),
                "name": member.name(),
            })),
        );
        Ok(member)
    }

    /// Retrieves a member by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MemberRosterError::MemberNotFound`] for an unknown
    /// member.
    pub async fn get(&self, member_id: MemberId) -> MemberRosterResult<Member> {
        self.members
            .find_by_id(member_id)
            .await?
            .ok_or(MemberRosterError::MemberNotFound(member_id))
    }

    /// Returns every member of a group, creation order.
    ///
    /// # Errors
    ///
    /// Returns [`MemberRosterError::GroupNotFound`] for an unknown group.
    pub async fn list(&self, group_id: GroupId) -> MemberRosterResult<Vec<Member>> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(MemberRosterError::GroupNotFound(group_id))?;
        Ok(self.members.list_by_group(group_id).await?)
    }

    /// Applies a partial update to a member.
    ///
    /// # Errors
    ///
    /// Returns [`MemberRosterError::MemberNotFound`] for an unknown member
    /// or [`MemberRosterError::NoFieldsToUpdate`] when the request carries
    /// nothing to change.
    pub async fn update(&self, request: UpdateMemberRequest) -> MemberRosterResult<Member> {
        let UpdateMemberRequest {
            member_id,
            actor,
            name,
            email,
            weight,
            active,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
        } = request;

        let mut member = self.get(member_id).await?;
        let update = MemberUpdate {
            name,
            email,
            weight: weight.map(Weight::new).transpose()?,
            active,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
        };
        if !member.apply_update(update, &*self.clock) {
            return Err(MemberRosterError::NoFieldsToUpdate);
        }
        self.members.update(&member).await?;

        self.emit_audit(AuditRecord::new(
            &actor,
            "member_updated",
            "member",
            member_id.to_string(),
            self.clock.utc(),
        ));
        Ok(member)
    }

    /// Removes a member and its assignment history.
    ///
    /// Removal is refused while the member still holds open assignments;
    /// complete or cancel them first.
    ///
    /// # Errors
    ///
    /// Returns [`MemberRosterError::MemberNotFound`] for an unknown member
    /// or [`MemberRosterError::HasOpenAssignments`] while the open counter
    /// is positive.
    pub async fn remove(&self, member_id: MemberId, actor: &Actor) -> MemberRosterResult<()> {
        let member = self.get(member_id).await?;
        if member.current_open_assignments() > 0 {
            return Err(MemberRosterError::HasOpenAssignments(member_id));
        }
        self.members.delete(member_id).await?;

        self.emit_audit(
            AuditRecord::new(
                actor,
                "member_removed",
                "member",
                member_id.to_string(),
                self.clock.utc(),
            )
            .with_detail(serde_json::json!({ "name": member.name() })),
        );
        Ok(())
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
