//! Diesel row models and domain conversions.

use super::schema::{assignments, groups, members};
use crate::assignment::domain::{
    ActorId, Assignment, AssignmentId, AssignmentStatus, AssignmentStrategy, Group, GroupId,
    Member, MemberId, PersistedAssignmentData, PersistedGroupData, PersistedMemberData, Weight,
};
use crate::assignment::ports::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Row model for group records.
///
/// Doubles as insert and changeset model; updates persist the full
/// aggregate, so absent optionals must null their columns.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupRow {
    pub id: uuid::Uuid,
    pub owner_id: uuid::Uuid,
    pub name: String,
    pub description: Option<String>,
    pub strategy: String,
    pub active: bool,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub paused_at: Option<DateTime<Utc>>,
    pub paused_by: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupRow {
    pub fn from_domain(group: &Group) -> Self {
        Self {
            id: group.id().into_inner(),
            owner_id: group.owner().into_inner(),
            name: group.name().to_owned(),
            description: group.description().map(str::to_owned),
            strategy: group.strategy().as_str().to_owned(),
            active: group.is_active(),
            paused: group.is_paused(),
            pause_reason: group.pause_reason().map(str::to_owned),
            paused_at: group.paused_at(),
            paused_by: group.paused_by().map(ActorId::into_inner),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }

    pub fn into_domain(self) -> StoreResult<Group> {
        let strategy =
            AssignmentStrategy::try_from(self.strategy.as_str()).map_err(StoreError::persistence)?;
        Ok(Group::from_persisted(PersistedGroupData {
            id: GroupId::from_uuid(self.id),
            owner: ActorId::from_uuid(self.owner_id),
            name: self.name,
            description: self.description,
            strategy,
            active: self.active,
            paused: self.paused,
            pause_reason: self.pause_reason,
            paused_at: self.paused_at,
            paused_by: self.paused_by.map(ActorId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Row model for member records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = members)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    pub id: uuid::Uuid,
    pub group_id: uuid::Uuid,
    pub name: String,
    pub email: Option<String>,
    pub weight: i32,
    pub active: bool,
    pub available: bool,
    pub timezone: Option<String>,
    pub working_hours: Option<Value>,
    pub max_daily_assignments: Option<i32>,
    pub max_concurrent_open: Option<i32>,
    pub current_open_assignments: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberRow {
    pub fn from_domain(member: &Member) -> StoreResult<Self> {
        Ok(Self {
            id: member.id().into_inner(),
            group_id: member.group_id().into_inner(),
            name: member.name().to_owned(),
            email: member.email().map(str::to_owned),
            weight: to_i32(member.weight().value())?,
            active: member.is_active(),
            available: member.is_available(),
            timezone: member.timezone().map(str::to_owned),
            working_hours: member.working_hours().cloned(),
            max_daily_assignments: member.max_daily_assignments().map(to_i32).transpose()?,
            max_concurrent_open: member.max_concurrent_open().map(to_i32).transpose()?,
            current_open_assignments: to_i32(member.current_open_assignments())?,
            created_at: member.created_at(),
            updated_at: member.updated_at(),
        })
    }

    pub fn into_domain(self) -> StoreResult<Member> {
        let weight = Weight::new(to_u32(self.weight)?).map_err(StoreError::persistence)?;
        Ok(Member::from_persisted(PersistedMemberData {
            id: MemberId::from_uuid(self.id),
            group_id: GroupId::from_uuid(self.group_id),
            name: self.name,
            email: self.email,
            weight,
            active: self.active,
            available: self.available,
            timezone: self.timezone,
            working_hours: self.working_hours,
            max_daily_assignments: self.max_daily_assignments.map(to_u32).transpose()?,
            max_concurrent_open: self.max_concurrent_open.map(to_u32).transpose()?,
            current_open_assignments: to_u32(self.current_open_assignments)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Row model for assignment records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    pub id: uuid::Uuid,
    pub group_id: uuid::Uuid,
    pub member_id: uuid::Uuid,
    pub metadata: Option<String>,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AssignmentRow {
    pub fn from_domain(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id().into_inner(),
            group_id: assignment.group_id().into_inner(),
            member_id: assignment.member_id().into_inner(),
            metadata: assignment.metadata().map(str::to_owned),
            status: assignment.status().as_str().to_owned(),
            completed_at: assignment.completed_at(),
            created_at: assignment.created_at(),
        }
    }

    pub fn into_domain(self) -> StoreResult<Assignment> {
        let status =
            AssignmentStatus::try_from(self.status.as_str()).map_err(StoreError::persistence)?;
        Ok(Assignment::from_persisted(PersistedAssignmentData {
            id: AssignmentId::from_uuid(self.id),
            group_id: GroupId::from_uuid(self.group_id),
            member_id: MemberId::from_uuid(self.member_id),
            metadata: self.metadata,
            status,
            completed_at: self.completed_at,
            created_at: self.created_at,
        }))
    }
}

fn to_i32(value: u32) -> StoreResult<i32> {
    i32::try_from(value).map_err(StoreError::persistence)
}

fn to_u32(value: i32) -> StoreResult<u32> {
    u32::try_from(value).map_err(StoreError::persistence)
}
