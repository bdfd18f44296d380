//! Assignment record and its lifecycle state machine.

use super::{AssignmentId, GroupId, MemberId, ParseAssignmentStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Assignment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Work has been handed off and is outstanding.
    Open,
    /// Work was finished.
    Completed,
    /// The hand-off was withdrawn.
    Cancelled,
}

impl AssignmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseAssignmentStatusError(value.to_owned())),
        }
    }
}

/// One recorded hand-off of work to a member.
///
/// Created in [`AssignmentStatus::Open`], transitioned exactly once to a
/// terminal status, and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    id: AssignmentId,
    group_id: GroupId,
    member_id: MemberId,
    metadata: Option<String>,
    status: AssignmentStatus,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Persisted assignment identifier.
    pub id: AssignmentId,
    /// Persisted group the hand-off was recorded against.
    pub group_id: GroupId,
    /// Persisted receiving member.
    pub member_id: MemberId,
    /// Persisted opaque metadata.
    pub metadata: Option<String>,
    /// Persisted lifecycle status.
    pub status: AssignmentStatus,
    /// Persisted terminal timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// Records a fresh open hand-off to a member.
    #[must_use]
    pub fn new(
        group_id: GroupId,
        member_id: MemberId,
        metadata: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            group_id,
            member_id,
            metadata,
            status: AssignmentStatus::Open,
            completed_at: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAssignmentData) -> Self {
        let PersistedAssignmentData {
            id,
            group_id,
            member_id,
            metadata,
            status,
            completed_at,
            created_at,
        } = data;
        Self {
            id,
            group_id,
            member_id,
            metadata,
            status,
            completed_at,
            created_at,
        }
    }

    /// Moves the assignment into a terminal status.
    ///
    /// Returns `false` without mutating when the assignment is no longer
    /// open or the target status is not terminal; callers use the result
    /// to guarantee at-most-one transition.
    pub fn transition(&mut self, status: AssignmentStatus, at: DateTime<Utc>) -> bool {
        if self.status != AssignmentStatus::Open || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.completed_at = Some(at);
        true
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the group the hand-off was recorded against.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns the receiving member.
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// Returns the opaque metadata supplied at record time.
    #[must_use]
    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AssignmentStatus {
        self.status
    }

    /// Returns the terminal timestamp, set iff the status is terminal.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Assignment row joined with the receiving member's name, as served to
/// history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentWithMember {
    /// Assignment identifier.
    pub id: AssignmentId,
    /// Receiving member.
    pub member_id: MemberId,
    /// Member display name at query time.
    pub member_name: String,
    /// Opaque metadata supplied at record time.
    pub metadata: Option<String>,
    /// Lifecycle status.
    pub status: AssignmentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
