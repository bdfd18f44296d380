//! Group aggregate root and assignment strategy.

use super::{ActorId, AssignmentDomainError, GroupId, ParseStrategyError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Strategy used to pick the next assignee within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Weighted round-robin over eligible members.
    WeightedRoundRobin,
    /// Reserved; enumerated on the wire but not yet implemented.
    StrictRotation,
}

impl AssignmentStrategy {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeightedRoundRobin => "weighted_round_robin",
            Self::StrictRotation => "strict_rotation",
        }
    }

    /// Whether the strategy is reserved and cannot be assigned to new
    /// groups yet.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::StrictRotation)
    }
}

impl TryFrom<&str> for AssignmentStrategy {
    type Error = ParseStrategyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "weighted_round_robin" => Ok(Self::WeightedRoundRobin),
            "strict_rotation" => Ok(Self::StrictRotation),
            _ => Err(ParseStrategyError(value.to_owned())),
        }
    }
}

/// Assignment pool aggregate root.
///
/// A group owns its member roster and carries the pause latch that gates
/// new assignments. Pausing never blocks lifecycle transitions on
/// assignments that already exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    owner: ActorId,
    name: String,
    description: Option<String>,
    strategy: AssignmentStrategy,
    active: bool,
    paused: bool,
    pause_reason: Option<String>,
    paused_at: Option<DateTime<Utc>>,
    paused_by: Option<ActorId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted group aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedGroupData {
    /// Persisted group identifier.
    pub id: GroupId,
    /// Persisted owner identifier.
    pub owner: ActorId,
    /// Persisted display name.
    pub name: String,
    /// Persisted optional description.
    pub description: Option<String>,
    /// Persisted selection strategy.
    pub strategy: AssignmentStrategy,
    /// Persisted active flag.
    pub active: bool,
    /// Persisted pause latch.
    pub paused: bool,
    /// Persisted pause reason.
    pub pause_reason: Option<String>,
    /// Persisted pause timestamp.
    pub paused_at: Option<DateTime<Utc>>,
    /// Persisted pausing actor.
    pub paused_by: Option<ActorId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing group.
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement active flag.
    pub active: Option<bool>,
}

impl GroupUpdate {
    /// Whether the update carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.active.is_none()
    }
}

impl Group {
    /// Creates a new active, unpaused group.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyGroupName`] when the name is
    /// blank, or [`AssignmentDomainError::ReservedStrategy`] when the
    /// strategy is enumerated but not yet implemented.
    pub fn new(
        owner: ActorId,
        name: impl Into<String>,
        description: Option<String>,
        strategy: AssignmentStrategy,
        clock: &impl Clock,
    ) -> Result<Self, AssignmentDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AssignmentDomainError::EmptyGroupName);
        }
        if strategy.is_reserved() {
            return Err(AssignmentDomainError::ReservedStrategy(
                strategy.as_str().to_owned(),
            ));
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: GroupId::new(),
            owner,
            name,
            description,
            strategy,
            active: true,
            paused: false,
            pause_reason: None,
            paused_at: None,
            paused_by: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a group from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedGroupData) -> Self {
        let PersistedGroupData {
            id,
            owner,
            name,
            description,
            strategy,
            active,
            paused,
            pause_reason,
            paused_at,
            paused_by,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            owner,
            name,
            description,
            strategy,
            active,
            paused,
            pause_reason,
            paused_at,
            paused_by,
            created_at,
            updated_at,
        }
    }

    /// Latches the pause flag and records who paused and why.
    ///
    /// Callers are responsible for rejecting a pause on an already-paused
    /// group before invoking this.
    pub fn pause(&mut self, reason: Option<String>, paused_by: ActorId, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.paused = true;
        self.pause_reason = reason;
        self.paused_at = Some(timestamp);
        self.paused_by = Some(paused_by);
        self.updated_at = timestamp;
    }

    /// Clears the pause latch and all pause metadata.
    pub fn resume(&mut self, clock: &impl Clock) {
        self.paused = false;
        self.pause_reason = None;
        self.paused_at = None;
        self.paused_by = None;
        self.updated_at = clock.utc();
    }

    /// Applies a partial update, returning whether any field changed hands.
    pub fn apply_update(&mut self, update: GroupUpdate, clock: &impl Clock) -> bool {
        if update.is_empty() {
            return false;
        }
        let GroupUpdate {
            name,
            description,
            active,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(active) = active {
            self.active = active;
        }
        self.updated_at = clock.utc();
        true
    }

    /// Returns the group identifier.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the owning actor.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the selection strategy.
    #[must_use]
    pub const fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    /// Returns the active flag.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the pause latch.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns the pause reason, when paused with one.
    #[must_use]
    pub fn pause_reason(&self) -> Option<&str> {
        self.pause_reason.as_deref()
    }

    /// Returns the pause timestamp.
    #[must_use]
    pub const fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    /// Returns the actor who paused the group.
    #[must_use]
    pub const fn paused_by(&self) -> Option<ActorId> {
        self.paused_by
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
