//! Domain model for fair-assignment bookkeeping.
//!
//! The assignment domain models groups, their weighted member rosters, and
//! the hand-off records that flow `open → completed | cancelled`, while
//! keeping all infrastructure concerns outside of the domain boundary.

mod actor;
mod assignment;
mod error;
mod group;
mod ids;
mod member;
mod stats;

pub use actor::{Actor, UserRole};
pub use assignment::{
    Assignment, AssignmentStatus, AssignmentWithMember, PersistedAssignmentData,
};
pub use error::{
    AssignmentDomainError, ParseAssignmentStatusError, ParseStrategyError, ParseUserRoleError,
};
pub use group::{AssignmentStrategy, Group, GroupUpdate, PersistedGroupData};
pub use ids::{ActorId, AssignmentId, GroupId, MemberId};
pub use member::{Member, MemberUpdate, PersistedMemberData, Weight};
pub use stats::{DistributionReport, MemberShare};
