//! `PostgreSQL` assignment repository.

use super::models::AssignmentRow;
use super::schema::{assignments, members};
use super::{run_blocking, AssignmentPgPool};
use crate::assignment::domain::{
    Assignment, AssignmentId, AssignmentStatus, AssignmentWithMember, GroupId, MemberId,
};
use crate::assignment::ports::{AssignmentRepository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::collections::HashMap;

/// `PostgreSQL`-backed assignment repository.
#[derive(Debug, Clone)]
pub struct PostgresAssignmentRepository {
    pool: AssignmentPgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn create(&self, assignment: &Assignment) -> StoreResult<()> {
        let row = AssignmentRow::from_domain(assignment);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(assignments::table)
                .values(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        run_blocking(&self.pool, move |connection| {
            let row = assignments::table
                .find(id.into_inner())
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(AssignmentRow::into_domain).transpose()
        })
        .await
    }

    async fn transition_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        if !status.is_terminal() {
            return Ok(false);
        }
        run_blocking(&self.pool, move |connection| {
            // Conditional update: the status filter makes racing callers
            // observe at most one affected row.
            let updated = diesel::update(
                assignments::table
                    .find(id.into_inner())
                    .filter(assignments::status.eq(AssignmentStatus::Open.as_str())),
            )
            .set((
                assignments::status.eq(status.as_str()),
                assignments::completed_at.eq(Some(at)),
            ))
            .execute(connection)
            .map_err(StoreError::persistence)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn count_by_group(&self, group_id: GroupId) -> StoreResult<i64> {
        run_blocking(&self.pool, move |connection| {
            assignments::table
                .filter(assignments::group_id.eq(group_id.into_inner()))
                .count()
                .get_result::<i64>(connection)
                .map_err(StoreError::persistence)
        })
        .await
    }

    async fn counts_by_members(&self, ids: &[MemberId]) -> StoreResult<HashMap<MemberId, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, move |connection| {
            let rows = assignments::table
                .filter(assignments::member_id.eq_any(uuids))
                .group_by(assignments::member_id)
                .select((assignments::member_id, diesel::dsl::count_star()))
                .load::<(uuid::Uuid, i64)>(connection)
                .map_err(StoreError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|(member_id, count)| (MemberId::from_uuid(member_id), count))
                .collect())
        })
        .await
    }

    async fn list_by_group(
        &self,
        group_id: GroupId,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AssignmentWithMember>> {
        run_blocking(&self.pool, move |connection| {
            let rows = assignments::table
                .inner_join(members::table)
                .filter(assignments::group_id.eq(group_id.into_inner()))
                .order((assignments::created_at.desc(), assignments::id.desc()))
                .limit(limit)
                .offset(offset)
                .select((
                    assignments::id,
                    assignments::member_id,
                    members::name,
                    assignments::metadata,
                    assignments::status,
                    assignments::created_at,
                ))
                .load::<(
                    uuid::Uuid,
                    uuid::Uuid,
                    String,
                    Option<String>,
                    String,
                    DateTime<Utc>,
                )>(connection)
                .map_err(StoreError::persistence)?;

            rows.into_iter()
                .map(|(id, member_id, member_name, metadata, status, created_at)| {
                    let status = AssignmentStatus::try_from(status.as_str())
                        .map_err(StoreError::persistence)?;
                    Ok(AssignmentWithMember {
                        id: AssignmentId::from_uuid(id),
                        member_id: MemberId::from_uuid(member_id),
                        member_name,
                        metadata,
                        status,
                        created_at,
                    })
                })
                .collect()
        })
        .await
    }
}
