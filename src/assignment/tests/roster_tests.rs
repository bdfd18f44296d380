//! Service orchestration tests for roster maintenance.

use super::harness::{owner, Harness};
use crate::assignment::domain::{AssignmentDomainError, GroupId, MemberId, Weight};
use crate::assignment::services::{
    AddMemberRequest, MemberRosterError, RecordAssignmentRequest, UpdateMemberRequest,
};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_applies_profile_fields(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;

    let member = harness
        .roster
        .add(
            AddMemberRequest::new(group.id(), actor.clone(), "Sam")
                .with_email("sam@example.com")
                .with_weight(250)
                .with_timezone("Europe/Berlin")
                .with_working_hours(serde_json::json!({ "monday": "09:00-17:00" }))
                .with_daily_cap(8)
                .with_concurrent_cap(3),
        )
        .await
        .expect("member creation should succeed");

    assert_eq!(member.group_id(), group.id());
    assert_eq!(member.email(), Some("sam@example.com"));
    assert_eq!(member.weight(), Weight::new(250).expect("valid weight"));
    assert_eq!(member.timezone(), Some("Europe/Berlin"));
    assert_eq!(member.max_daily_assignments(), Some(8));
    assert_eq!(member.max_concurrent_open(), Some(3));
    assert!(member.is_assignable());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_to_unknown_group_fails(harness: Harness) {
    let result = harness
        .roster
        .add(AddMemberRequest::new(GroupId::new(), owner(), "Sam"))
        .await;

    assert!(matches!(result, Err(MemberRosterError::GroupNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_rejects_out_of_range_weight(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let oversized = u32::try_from(i64::from(i32::MAX) + 1).expect("fits in u32");

    let result = harness
        .roster
        .add(AddMemberRequest::new(group.id(), actor.clone(), "Sam").with_weight(oversized))
        .await;

    assert!(matches!(
        result,
        Err(MemberRosterError::Domain(
            AssignmentDomainError::WeightOutOfRange(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_without_fields_is_rejected(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    let result = harness
        .roster
        .update(UpdateMemberRequest::new(member.id(), actor.clone()))
        .await;

    assert!(matches!(result, Err(MemberRosterError::NoFieldsToUpdate)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_unknown_member_fails(harness: Harness) {
    let result = harness
        .roster
        .update(UpdateMemberRequest::new(MemberId::new(), owner()).with_weight(50))
        .await;

    assert!(matches!(result, Err(MemberRosterError::MemberNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_persists_changed_fields(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;

    harness
        .roster
        .update(
            UpdateMemberRequest::new(member.id(), actor.clone())
                .with_weight(300)
                .with_available(false),
        )
        .await
        .expect("member update should succeed");

    let refreshed = harness
        .roster
        .get(member.id())
        .await
        .expect("member lookup should succeed");
    assert_eq!(refreshed.weight(), Weight::new(300).expect("valid weight"));
    assert!(!refreshed.is_available());
    assert_eq!(refreshed.name(), "Sam");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_is_refused_while_assignments_are_open(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    let member = harness.add_member(group.id(), &actor, "Sam", 100).await;
    let recorded = harness
        .lifecycle
        .record(RecordAssignmentRequest::new(group.id(), actor.clone()))
        .await
        .expect("record should succeed");

    let result = harness.roster.remove(member.id(), &actor).await;
    assert!(matches!(
        result,
        Err(MemberRosterError::HasOpenAssignments(id)) if id == member.id()
    ));

    // Closing the open hand-off unblocks removal.
    harness
        .lifecycle
        .complete(recorded.assignment_id, &actor)
        .await
        .expect("completion should succeed");
    harness
        .roster
        .remove(member.id(), &actor)
        .await
        .expect("removal should succeed");

    let result = harness.roster.get(member.id()).await;
    assert!(matches!(result, Err(MemberRosterError::MemberNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_returns_members_in_creation_order(harness: Harness) {
    let actor = owner();
    let group = harness.create_group(&actor).await;
    harness.add_member(group.id(), &actor, "First", 100).await;
    harness.add_member(group.id(), &actor, "Second", 100).await;
    harness.add_member(group.id(), &actor, "Third", 100).await;

    let members = harness
        .roster
        .list(group.id())
        .await
        .expect("listing should succeed");

    let names: Vec<_> = members.iter().map(|member| member.name()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}
