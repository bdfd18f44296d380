//! Distribution statistics: expected versus actual share per member.

use super::{MemberId, Weight};
use serde::{Deserialize, Serialize};

/// Per-member slice of a group's assignment distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberShare {
    /// Member identifier.
    pub member_id: MemberId,
    /// Member display name.
    pub name: String,
    /// Relative share configured for the member.
    pub weight: Weight,
    /// Lifetime assignment count, regardless of status.
    pub assignments: i64,
    /// Entitled count given the member's share of the active weight,
    /// rounded to two decimals. Zero for inactive members.
    pub expected: f64,
    /// Signed drift `assignments - expected`, rounded to two decimals.
    pub variance: f64,
}

/// Fairness report for one group.
///
/// Inactive members appear with their historical counts so the report
/// accounts for every recorded assignment; only active members take part
/// in the entitlement denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Lifetime assignment count across the group.
    pub total_assignments: i64,
    /// Per-member shares in roster order (creation time ascending).
    pub distribution: Vec<MemberShare>,
}
