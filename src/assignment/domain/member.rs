//! Member aggregate root, weight, and capacity caps.

use super::{AssignmentDomainError, GroupId, MemberId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Relative share of work expressed as a non-negative integer.
///
/// The default of 100 means one "full share"; a member at weight 200
/// receives twice the assignments of a member at 100 in the limit. Zero is
/// permitted: such members are still selectable but rank purely on their
/// raw assignment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(u32);

impl Weight {
    /// Default relative share.
    pub const DEFAULT: Self = Self(100);

    /// Largest weight representable in the storage schema.
    const MAX_PERSISTED_VALUE: u32 = i32::MAX as u32;

    /// Creates a validated weight.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::WeightOutOfRange`] when the value
    /// exceeds the schema-backed maximum (`i32::MAX`).
    pub const fn new(value: u32) -> Result<Self, AssignmentDomainError> {
        if value > Self::MAX_PERSISTED_VALUE {
            return Err(AssignmentDomainError::WeightOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate assignee within a single group.
///
/// Carries the selection inputs (weight), the capacity gates (daily and
/// concurrent-open caps), and the soft open-assignment counter maintained
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    group_id: GroupId,
    name: String,
    email: Option<String>,
    weight: Weight,
    active: bool,
    available: bool,
    timezone: Option<String>,
    working_hours: Option<Value>,
    max_daily_assignments: Option<u32>,
    max_concurrent_open: Option<u32>,
    current_open_assignments: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted member aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMemberData {
    /// Persisted member identifier.
    pub id: MemberId,
    /// Persisted owning group.
    pub group_id: GroupId,
    /// Persisted display name.
    pub name: String,
    /// Persisted optional email.
    pub email: Option<String>,
    /// Persisted relative share.
    pub weight: Weight,
    /// Persisted operator toggle.
    pub active: bool,
    /// Persisted self-reported availability.
    pub available: bool,
    /// Persisted IANA timezone, stored but not interpreted.
    pub timezone: Option<String>,
    /// Persisted working-hours descriptor, stored but not interpreted.
    pub working_hours: Option<Value>,
    /// Persisted daily cap.
    pub max_daily_assignments: Option<u32>,
    /// Persisted concurrent-open cap.
    pub max_concurrent_open: Option<u32>,
    /// Persisted open-assignment counter.
    pub current_open_assignments: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing member.
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement relative share.
    pub weight: Option<Weight>,
    /// Replacement operator toggle.
    pub active: Option<bool>,
    /// Replacement availability flag.
    pub available: Option<bool>,
    /// Replacement timezone.
    pub timezone: Option<String>,
    /// Replacement working-hours descriptor.
    pub working_hours: Option<Value>,
    /// Replacement daily cap.
    pub max_daily_assignments: Option<u32>,
    /// Replacement concurrent-open cap.
    pub max_concurrent_open: Option<u32>,
}

impl MemberUpdate {
    /// Whether the update carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.weight.is_none()
            && self.active.is_none()
            && self.available.is_none()
            && self.timezone.is_none()
            && self.working_hours.is_none()
            && self.max_daily_assignments.is_none()
            && self.max_concurrent_open.is_none()
    }
}

impl Member {
    /// Creates a new member with default weight, active and available, and
    /// a zeroed open-assignment counter.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyMemberName`] when the name is
    /// blank.
    pub fn new(
        group_id: GroupId,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, AssignmentDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AssignmentDomainError::EmptyMemberName);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: MemberId::new(),
            group_id,
            name,
            email: None,
            weight: Weight::DEFAULT,
            active: true,
            available: true,
            timezone: None,
            working_hours: None,
            max_daily_assignments: None,
            max_concurrent_open: None,
            current_open_assignments: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a member from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMemberData) -> Self {
        let PersistedMemberData {
            id,
            group_id,
            name,
            email,
            weight,
            active,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
            current_open_assignments,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            group_id,
            name,
            email,
            weight,
            active,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
            current_open_assignments,
            created_at,
            updated_at,
        }
    }

    /// Applies a partial update, returning whether any field changed hands.
    pub fn apply_update(&mut self, update: MemberUpdate, clock: &impl Clock) -> bool {
        if update.is_empty() {
            return false;
        }
        let MemberUpdate {
            name,
            email,
            weight,
            active,
            available,
            timezone,
            working_hours,
            max_daily_assignments,
            max_concurrent_open,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = Some(email);
        }
        if let Some(weight) = weight {
            self.weight = weight;
        }
        if let Some(active) = active {
            self.active = active;
        }
        if let Some(available) = available {
            self.available = available;
        }
        if let Some(timezone) = timezone {
            self.timezone = Some(timezone);
        }
        if let Some(working_hours) = working_hours {
            self.working_hours = Some(working_hours);
        }
        if let Some(cap) = max_daily_assignments {
            self.max_daily_assignments = Some(cap);
        }
        if let Some(cap) = max_concurrent_open {
            self.max_concurrent_open = Some(cap);
        }
        self.updated_at = clock.utc();
        true
    }

    /// Whether the member can be handed new work at all: operator-enabled
    /// and self-reported available.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        self.active && self.available
    }

    /// Whether the member is under its concurrent-open cap. Uncapped
    /// members always have capacity.
    #[must_use]
    pub fn has_concurrent_capacity(&self) -> bool {
        self.max_concurrent_open
            .map_or(true, |cap| self.current_open_assignments < cap)
    }

    /// Bumps the open-assignment counter. Storage-side counter maintenance
    /// for adapters that keep aggregates in memory.
    pub fn increment_open(&mut self) {
        self.current_open_assignments = self.current_open_assignments.saturating_add(1);
    }

    /// Drops the open-assignment counter, clamping at zero.
    pub fn decrement_open(&mut self) {
        self.current_open_assignments = self.current_open_assignments.saturating_sub(1);
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the owning group.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the relative share.
    #[must_use]
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Returns the operator toggle.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the self-reported availability.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Returns the stored IANA timezone, if any.
    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// Returns the stored working-hours descriptor, if any.
    #[must_use]
    pub const fn working_hours(&self) -> Option<&Value> {
        self.working_hours.as_ref()
    }

    /// Returns the daily assignment cap, if any.
    #[must_use]
    pub const fn max_daily_assignments(&self) -> Option<u32> {
        self.max_daily_assignments
    }

    /// Returns the concurrent-open cap, if any.
    #[must_use]
    pub const fn max_concurrent_open(&self) -> Option<u32> {
        self.max_concurrent_open
    }

    /// Returns the open-assignment counter.
    #[must_use]
    pub const fn current_open_assignments(&self) -> u32 {
        self.current_open_assignments
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
