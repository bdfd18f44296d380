//! `PostgreSQL` member repository.

use super::models::MemberRow;
use super::schema::members;
use super::{run_blocking, AssignmentPgPool};
use crate::assignment::domain::{GroupId, Member, MemberId};
use crate::assignment::ports::{MemberRepository, StoreError, StoreResult};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed member repository.
#[derive(Debug, Clone)]
pub struct PostgresMemberRepository {
    pool: AssignmentPgPool,
}

impl PostgresMemberRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn create(&self, member: &Member) -> StoreResult<()> {
        let row = MemberRow::from_domain(member)?;
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(members::table)
                .values(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: MemberId) -> StoreResult<Option<Member>> {
        run_blocking(&self.pool, move |connection| {
            let row = members::table
                .find(id.into_inner())
                .select(MemberRow::as_select())
                .first::<MemberRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(MemberRow::into_domain).transpose()
        })
        .await
    }

    async fn list_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>> {
        run_blocking(&self.pool, move |connection| {
            let rows = members::table
                .filter(members::group_id.eq(group_id.into_inner()))
                .order((members::created_at.asc(), members::id.asc()))
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(MemberRow::into_domain).collect()
        })
        .await
    }

    async fn list_active_by_group(&self, group_id: GroupId) -> StoreResult<Vec<Member>> {
        run_blocking(&self.pool, move |connection| {
            let rows = members::table
                .filter(members::group_id.eq(group_id.into_inner()))
                .filter(members::active.eq(true))
                .order((members::created_at.asc(), members::id.asc()))
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(MemberRow::into_domain).collect()
        })
        .await
    }

    async fn update(&self, member: &Member) -> StoreResult<()> {
        let id = member.id();
        let row = MemberRow::from_domain(member)?;
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(members::table.find(id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::MemberNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: MemberId) -> StoreResult<()> {
        run_blocking(&self.pool, move |connection| {
            // Assignment history cascades via its foreign key.
            let deleted = diesel::delete(members::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if deleted == 0 {
                return Err(StoreError::MemberNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn increment_open(&self, id: MemberId) -> StoreResult<()> {
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(members::table.find(id.into_inner()))
                .set(
                    members::current_open_assignments.eq(members::current_open_assignments + 1),
                )
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::MemberNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn decrement_open(&self, id: MemberId) -> StoreResult<()> {
        run_blocking(&self.pool, move |connection| {
            // Clamped in SQL so concurrent decrements can never drive the
            // counter below zero.
            let clamped = diesel::dsl::sql::<diesel::sql_types::Integer>(
                "GREATEST(current_open_assignments - 1, 0)",
            );
            let updated = diesel::update(members::table.find(id.into_inner()))
                .set(members::current_open_assignments.eq(clamped))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::MemberNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn daily_assignment_count(&self, id: MemberId) -> StoreResult<i64> {
        run_blocking(&self.pool, move |connection| {
            // Server calendar day; member timezones are stored but not
            // interpreted here.
            let row = diesel::sql_query(concat!(
                "SELECT COUNT(*) AS count FROM assignments ",
                "WHERE member_id = $1 AND created_at >= CURRENT_DATE",
            ))
            .bind::<diesel::sql_types::Uuid, _>(id.into_inner())
            .get_result::<CountRow>(connection)
            .map_err(StoreError::persistence)?;
            Ok(row.count)
        })
        .await
    }
}
