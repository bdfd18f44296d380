//! Diesel schema for fair-assignment persistence.

diesel::table! {
    /// Assignment pools with their pause latch.
    groups (id) {
        /// Group identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Selection strategy.
        #[max_length = 50]
        strategy -> Varchar,
        /// Soft-delete style active flag.
        active -> Bool,
        /// Pause latch gating new assignments.
        paused -> Bool,
        /// Optional pause reason.
        pause_reason -> Nullable<Text>,
        /// When the pause latch was set.
        paused_at -> Nullable<Timestamptz>,
        /// Who set the pause latch.
        paused_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Candidate assignees; rows cascade with their group.
    members (id) {
        /// Member identifier.
        id -> Uuid,
        /// Owning group.
        group_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional contact email.
        #[max_length = 255]
        email -> Nullable<Varchar>,
        /// Relative share of work.
        weight -> Int4,
        /// Operator toggle.
        active -> Bool,
        /// Self-reported availability.
        available -> Bool,
        /// IANA timezone, stored but not interpreted.
        #[max_length = 64]
        timezone -> Nullable<Varchar>,
        /// Opaque working-hours descriptor.
        working_hours -> Nullable<Jsonb>,
        /// Daily assignment cap.
        max_daily_assignments -> Nullable<Int4>,
        /// Concurrent-open cap.
        max_concurrent_open -> Nullable<Int4>,
        /// Open-assignment counter, clamped at zero.
        current_open_assignments -> Int4,
        /// Creation timestamp; roster order.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Hand-off records; never deleted by the engine.
    assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Group the hand-off was recorded against.
        group_id -> Uuid,
        /// Receiving member.
        member_id -> Uuid,
        /// Opaque metadata supplied at record time.
        metadata -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Terminal timestamp, set iff completed or cancelled.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(members -> groups (group_id));
diesel::joinable!(assignments -> members (member_id));

diesel::allow_tables_to_appear_in_same_query!(assignments, groups, members);
