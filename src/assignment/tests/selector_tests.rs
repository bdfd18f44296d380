//! Unit tests for weighted round-robin selection.

use crate::assignment::domain::{GroupId, Member, MemberId, MemberUpdate, Weight};
use crate::assignment::services::selector::select_next;
use mockable::DefaultClock;
use rstest::rstest;
use std::collections::HashMap;

fn member_with_weight(group_id: GroupId, name: &str, weight: u32) -> Member {
    let clock = DefaultClock;
    let mut member = Member::new(group_id, name, &clock).expect("valid member");
    member.apply_update(
        MemberUpdate {
            weight: Some(Weight::new(weight).expect("valid weight")),
            ..MemberUpdate::default()
        },
        &clock,
    );
    member
}

fn counts(pairs: &[(MemberId, i64)]) -> HashMap<MemberId, i64> {
    pairs.iter().copied().collect()
}

#[rstest]
fn empty_candidate_list_selects_nobody() {
    assert!(select_next(&[], &HashMap::new()).is_none());
}

#[rstest]
fn zero_counts_select_the_first_candidate() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "first", 100),
        member_with_weight(group_id, "second", 100),
    ];

    let winner = select_next(&members, &HashMap::new()).expect("non-empty candidates");
    assert_eq!(winner.name(), "first");
}

#[rstest]
fn furthest_below_entitlement_wins() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "heavy", 200),
        member_with_weight(group_id, "light", 100),
    ];
    // heavy: 2 / 2.0 = 1.0; light: 2 / 1.0 = 2.0
    let counts = counts(&[(members[0].id(), 2), (members[1].id(), 2)]);

    let winner = select_next(&members, &counts).expect("non-empty candidates");
    assert_eq!(winner.name(), "heavy");
}

#[rstest]
fn ties_resolve_to_creation_order() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "older", 100),
        member_with_weight(group_id, "newer", 100),
    ];
    let counts = counts(&[(members[0].id(), 3), (members[1].id(), 3)]);

    let winner = select_next(&members, &counts).expect("non-empty candidates");
    assert_eq!(winner.name(), "older");
}

#[rstest]
fn zero_weight_falls_back_to_raw_count() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "weightless", 0),
        member_with_weight(group_id, "weighted", 100),
    ];
    // weightless ranks on its raw count (0) and is still selectable.
    let counts = counts(&[(members[1].id(), 1)]);

    let winner = select_next(&members, &counts).expect("non-empty candidates");
    assert_eq!(winner.name(), "weightless");
}

#[rstest]
fn members_with_no_history_catch_up_first() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "veteran", 100),
        member_with_weight(group_id, "rookie", 100),
    ];
    let counts = counts(&[(members[0].id(), 40)]);

    let winner = select_next(&members, &counts).expect("non-empty candidates");
    assert_eq!(winner.name(), "rookie");
}

/// Driving the selector in a loop converges on the configured 2:1:3
/// split: twelve picks land 4, 2, and 6 assignments.
#[rstest]
fn repeated_selection_converges_to_weight_proportions() {
    let group_id = GroupId::new();
    let members = vec![
        member_with_weight(group_id, "a", 200),
        member_with_weight(group_id, "b", 100),
        member_with_weight(group_id, "c", 300),
    ];

    let mut tally: HashMap<MemberId, i64> = HashMap::new();
    for _ in 0..12 {
        let winner = select_next(&members, &tally).expect("non-empty candidates");
        *tally.entry(winner.id()).or_insert(0) += 1;
    }

    assert_eq!(tally.get(&members[0].id()), Some(&4));
    assert_eq!(tally.get(&members[1].id()), Some(&2));
    assert_eq!(tally.get(&members[2].id()), Some(&6));
}
