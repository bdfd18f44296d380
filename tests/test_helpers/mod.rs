//! Shared setup for end-to-end assignment scenarios.

use mockable::DefaultClock;
use rondo::assignment::adapters::memory::{
    InMemoryAssignmentRepository, InMemoryAuditSink, InMemoryGroupRepository,
    InMemoryMemberRepository, InMemoryStore,
};
use rondo::assignment::domain::{Actor, ActorId, Group, Member, UserRole};
use rondo::assignment::services::{
    AddMemberRequest, AssignmentLifecycleService, CreateGroupRequest, GroupManagementService,
    MemberRosterService,
};
use std::sync::Arc;

pub type Lifecycle = AssignmentLifecycleService<
    InMemoryGroupRepository,
    InMemoryMemberRepository,
    InMemoryAssignmentRepository,
    InMemoryAuditSink,
    DefaultClock,
>;

pub type Groups = GroupManagementService<InMemoryGroupRepository, InMemoryAuditSink, DefaultClock>;

pub type Roster = MemberRosterService<
    InMemoryGroupRepository,
    InMemoryMemberRepository,
    InMemoryAuditSink,
    DefaultClock,
>;

/// Every service wired over one shared in-memory store.
pub struct TestBed {
    pub lifecycle: Lifecycle,
    pub groups: Groups,
    pub roster: Roster,
}

impl TestBed {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let group_repo = Arc::new(store.groups());
        let member_repo = Arc::new(store.members());
        let assignment_repo = Arc::new(store.assignments());
        let audit = Arc::new(InMemoryAuditSink::new());
        let clock = Arc::new(DefaultClock);

        let lifecycle = AssignmentLifecycleService::new(
            Arc::clone(&group_repo),
            Arc::clone(&member_repo),
            Arc::clone(&assignment_repo),
            Arc::clone(&audit),
            Arc::clone(&clock),
        );
        let groups = GroupManagementService::new(
            Arc::clone(&group_repo),
            Arc::clone(&audit),
            Arc::clone(&clock),
        );
        let roster = MemberRosterService::new(group_repo, member_repo, audit, clock);

        Self {
            lifecycle,
            groups,
            roster,
        }
    }

    /// Creates a group and populates it with named, weighted members.
    pub async fn group_with_members(
        &self,
        actor: &Actor,
        members: &[(&str, u32)],
    ) -> (Group, Vec<Member>) {
        let group = self
            .groups
            .create(CreateGroupRequest::new(actor.clone(), "on-call-rotation"))
            .await
            .expect("group creation should succeed");

        let mut roster = Vec::with_capacity(members.len());
        for (name, weight) in members {
            let member = self
                .roster
                .add(AddMemberRequest::new(group.id(), actor.clone(), *name).with_weight(*weight))
                .await
                .expect("member creation should succeed");
            roster.push(member);
        }
        (group, roster)
    }
}

/// A regular user who owns the groups it creates.
pub fn operator() -> Actor {
    Actor::new(ActorId::new(), "Morgan Operator", UserRole::User)
}
