//! Service orchestration tests for assignment lifecycle operations.

use super::harness::{owner, Harness};
use crate::assignment::adapters::memory::InMemoryAuditSink;
use crate::assignment::domain::{AssignmentStatus, GroupId, UserRole};
use crate::assignment::services::{
    AssignmentLifecycleError, RecordAssignmentRequest, UpdateMemberRequest,
};
use rstest::{fixture, rstest};
use std::time::Duration;

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

async fn wait_for_audit_action(audit: &InMemoryAuditSink, action: &str) {
    for _ in 0..100 {
        if audit.records().iter().any(|record| record.action == action) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("audit record for '{action}' did not arrive");
}

// ── Selection errors ────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calculate_next_fails_for_unknown_group(harness: Harness) {
    let result = harness.lifecycle.calculate_next(GroupId::new()).await;
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::GroupNotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calculate_next_fails_without_active_members(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;

    let result = harness.lifecycle.calculate_next(group.id()).await;

    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::NoActiveMembers(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_roster_counts_as_no_active_members(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;
    harness
        .roster
        .update(UpdateMemberRequest::new(member.id(), actor.clone()).with_active(false))
        .await
        .expect("member update should succeed");

    let result = harness.lifecycle.calculate_next(group.id()).await;

    // Distinct from the capacity case: nobody is active at all.
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::NoActiveMembers(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gated_roster_counts_as_no_eligible_members(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;
    harness
        .roster
        .update(UpdateMemberRequest::new(member.id(), actor.clone()).with_available(false))
        .await
        .expect("member update should succeed");

    let result = harness.lifecycle.calculate_next(group.id()).await;

    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::NoEligibleMembers(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn daily_count_failure_does_not_block_selection(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let faulty = harness.add_member(group.id(), &actor, "Faulty", 100).await;
    let healthy = harness.add_member(group.id(), &actor, "Healthy", 100).await;
    harness
        .roster
        .update(UpdateMemberRequest::new(faulty.id(), actor.clone()).with_daily_cap(5))
        .await
        .expect("member update should succeed");
    harness.store.fail_daily_count_for(faulty.id());

    let next = harness
        .lifecycle
        .calculate_next(group.id())
        .await
        .expect("selection should survive one failing member");

    assert_eq!(next.id(), healthy.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn calculate_next_is_side_effect_free(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let first = harness
        .lifecycle
        .calculate_next(group.id())
        .await
        .expect("preview should succeed");
    let second = harness
        .lifecycle
        .calculate_next(group.id())
        .await
        .expect("preview should succeed");

    assert_eq!(first.id(), member.id());
    assert_eq!(second.id(), member.id());
    let page = harness
        .lifecycle
        .assignments(group.id(), None, None)
        .await
        .expect("listing should succeed");
    assert_eq!(page.total, 0);
}

// ── Recording ───────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_persists_and_bumps_open_counter(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let recorded = harness
        .lifecycle
        .record(
            RecordAssignmentRequest::new(group.id(), actor.clone()).with_metadata("ticket-42"),
        )
        .await
        .expect("record should succeed");

    assert_eq!(recorded.member.id(), member.id());
    let refreshed = harness
        .roster
        .get(member.id())
        .await
        .expect("member lookup should succeed");
    assert_eq!(refreshed.current_open_assignments(), 1);

    let page = harness
        .lifecycle
        .assignments(group.id(), None, None)
        .await
        .expect("listing should succeed");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, recorded.assignment_id);
    assert_eq!(page.items[0].metadata.as_deref(), Some("ticket-42"));
    assert_eq!(page.items[0].status, AssignmentStatus::Open);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_accepts_explicit_member(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let first = harness.add_member(group.id(), &actor, "First", 100).await;
    let second = harness.add_member(group.id(), &actor, "Second", 100).await;
    // Selection would pick `first`; pinning overrides it.
    let _ = first;

    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_member(second.id()))
        .await
        .expect("record should succeed");

    assert_eq!(recorded.member.id(), second.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_rejects_member_from_another_group(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let other_group = harness.create_group(&actor).await;
    let foreign = harness
        .add_member(other_group.id(), &actor, "Foreign", 100)
        .await;

    let result = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_member(foreign.id()))
        .await;

    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::InvalidMember(id)) if id == foreign.id()
    ));
    let page = harness
        .lifecycle
        .assignments(group.id(), None, None)
        .await
        .expect("listing should succeed");
    assert_eq!(page.total, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_rejects_inactive_member(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;
    harness
        .roster
        .update(UpdateMemberRequest::new(member.id(), actor.clone()).with_active(false))
        .await
        .expect("member update should succeed");

    let result = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_member(member.id()))
        .await;

    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::InvalidMember(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_on_paused_group_is_rejected(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "Sam", 100).await;
    harness
        .groups
        .pause(group.id(), &actor, Some("maintenance".to_owned()))
        .await
        .expect("pause should succeed");

    let result = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await;

    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::GroupPaused(_))
    ));
}

// ── Completion and cancellation ─────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_then_complete_restores_counter_and_keeps_history(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");
    harness
        .lifecycle
        .complete(recorded.assignment_id, &actor)
        .await
        .expect("complete should succeed");

    let refreshed = harness
        .roster
        .get(member.id())
        .await
        .expect("member lookup should succeed");
    assert_eq!(refreshed.current_open_assignments(), 0);

    // Lifetime count is status-agnostic; the completed hand-off still
    // counts toward fairness.
    let report = harness
        .lifecycle
        .distribution(group.id())
        .await
        .expect("distribution should succeed");
    assert_eq!(report.total_assignments, 1);
    assert_eq!(report.distribution[0].assignments, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_then_cancel_restores_counter(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");
    harness
        .lifecycle
        .cancel(recorded.assignment_id, &actor)
        .await
        .expect("cancel should succeed");

    let refreshed = harness
        .roster
        .get(member.id())
        .await
        .expect("member lookup should succeed");
    assert_eq!(refreshed.current_open_assignments(), 0);

    let page = harness
        .lifecycle
        .assignments(group.id(), None, None)
        .await
        .expect("listing should succeed");
    assert_eq!(page.items[0].status, AssignmentStatus::Cancelled);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_unknown_assignment_fails(harness: Harness) {
    let actor = owner();
    let result = harness
        .lifecycle
        .complete(crate::assignment::domain::AssignmentId::new(), &actor)
        .await;
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::AssignmentNotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_completion_fails_and_counter_drops_once(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");
    harness
        .lifecycle
        .complete(recorded.assignment_id, &actor)
        .await
        .expect("first completion should succeed");

    let result = harness
        .lifecycle
        .complete(recorded.assignment_id, &actor)
        .await;
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::AssignmentNotOpen(_))
    ));

    let refreshed = harness
        .roster
        .get(member.id())
        .await
        .expect("member lookup should succeed");
    assert_eq!(refreshed.current_open_assignments(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_after_complete_fails(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "Sam", 100).await;

    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");
    harness
        .lifecycle
        .complete(recorded.assignment_id, &actor)
        .await
        .expect("completion should succeed");

    let result = harness.lifecycle.cancel(recorded.assignment_id, &actor).await;
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::AssignmentNotOpen(_))
    ));
}

// ── History pages ───────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_defaults_to_newest_first_page_of_fifty(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "Sam", 100).await;

    for label in ["first", "second", "third"] {
        harness
            .lifecycle
            .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_metadata(label))
            .await
            .expect("record should succeed");
    }

    let page = harness
        .lifecycle
        .assignments(group.id(), None, None)
        .await
        .expect("listing should succeed");

    assert_eq!(page.total, 3);
    assert_eq!(page.limit, 50);
    assert_eq!(page.offset, 0);
    let labels: Vec<_> = page
        .items
        .iter()
        .map(|item| item.metadata.as_deref())
        .collect();
    assert_eq!(labels, vec![Some("third"), Some("second"), Some("first")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_honours_limit_and_offset(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "Sam", 100).await;

    for label in ["first", "second", "third"] {
        harness
            .lifecycle
            .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_metadata(label))
            .await
            .expect("record should succeed");
    }

    let page = harness
        .lifecycle
        .assignments(group.id(), Some(1), Some(1))
        .await
        .expect("listing should succeed");

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].metadata.as_deref(), Some("second"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_for_unknown_group_fails(harness: Harness) {
    let result = harness
        .lifecycle
        .assignments(GroupId::new(), None, None)
        .await;
    assert!(matches!(
        result,
        Err(AssignmentLifecycleError::GroupNotFound(_))
    ));
}

// ── Distribution ────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn distribution_rounds_expected_and_variance(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let light = harness.add_member(group.id(), &actor, "Light", 100).await;
    let heavy = harness.add_member(group.id(), &actor, "Heavy", 200).await;

    harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_member(light.id()))
        .await
        .expect("record should succeed");

    let report = harness
        .lifecycle
        .distribution(group.id())
        .await
        .expect("distribution should succeed");

    assert_eq!(report.total_assignments, 1);
    let light_share = &report.distribution[0];
    assert_eq!(light_share.member_id, light.id());
    assert_eq!(light_share.assignments, 1);
    assert!((light_share.expected - 0.33).abs() < f64::EPSILON);
    assert!((light_share.variance - 0.67).abs() < f64::EPSILON);

    let heavy_share = &report.distribution[1];
    assert_eq!(heavy_share.member_id, heavy.id());
    assert_eq!(heavy_share.assignments, 0);
    assert!((heavy_share.expected - 0.67).abs() < f64::EPSILON);
    assert!((heavy_share.variance - (-0.67)).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inactive_members_keep_history_but_lose_entitlement(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let keeper = harness.add_member(group.id(), &actor, "Keeper", 100).await;
    let leaver = harness.add_member(group.id(), &actor, "Leaver", 100).await;

    for member_id in [keeper.id(), keeper.id(), leaver.id()] {
        harness
            .lifecycle
            .record(RecordAssignmentRequest::new(group.id(), actor.clone()).with_member(member_id))
            .await
            .expect("record should succeed");
    }
    harness
        .roster
        .update(UpdateMemberRequest::new(leaver.id(), actor.clone()).with_active(false))
        .await
        .expect("member update should succeed");

    let report = harness
        .lifecycle
        .distribution(group.id())
        .await
        .expect("distribution should succeed");

    assert_eq!(report.total_assignments, 3);
    let keeper_share = &report.distribution[0];
    assert!((keeper_share.expected - 3.0).abs() < f64::EPSILON);
    assert!((keeper_share.variance - (-1.0)).abs() < f64::EPSILON);

    // Inactive members still appear, with zero entitlement.
    let leaver_share = &report.distribution[1];
    assert_eq!(leaver_share.assignments, 1);
    assert!((leaver_share.expected - 0.0).abs() < f64::EPSILON);
    assert!((leaver_share.variance - 1.0).abs() < f64::EPSILON);
}

// ── Audit ───────────────────────────────────────────────────────────

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_emits_audit_without_blocking(harness: Harness) {
    let actor = owner();
    assert_eq!(actor.role, UserRole::User);
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "Sam", 100).await;

    harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");

    wait_for_audit_action(&harness.audit, "assignment_recorded").await;
    let records = harness.audit.records();
    let record = records
        .iter()
        .find(|record| record.action == "assignment_recorded")
        .expect("audit record present");
    assert_eq!(record.actor_id, Some(actor.id));
    assert_eq!(record.resource_type, "assignment");
}
