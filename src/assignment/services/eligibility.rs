//! Capacity gating for assignment candidates.

use crate::assignment::domain::Member;
use crate::assignment::ports::MemberRepository;

/// Filters active members down to those that can take a new assignment.
///
/// A member survives when it is assignable (active and available), under
/// its concurrent-open cap, and under its daily cap. The daily cap is the
/// only check that needs the store; when that lookup fails the member is
/// skipped so one bad row never blocks selection for the rest of the
/// roster.
pub async fn eligible_members<M>(members: &M, candidates: Vec<Member>) -> Vec<Member>
where
    M: MemberRepository + ?Sized,
{
    let mut eligible = Vec::with_capacity(candidates.len());
    for member in candidates {
        if !member.is_assignable() || !member.has_concurrent_capacity() {
            continue;
        }
        if let Some(cap) = member.max_daily_assignments() {
            match members.daily_assignment_count(member.id()).await {
                Ok(count) if count >= i64::from(cap) => continue,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        member = %member.id(),
                        error = %err,
                        "daily-count lookup failed; skipping member",
                    );
                    continue;
                }
            }
        }
        eligible.push(member);
    }
    eligible
}
