//! `PostgreSQL` group repository.

use super::models::GroupRow;
use super::schema::groups;
use super::{run_blocking, AssignmentPgPool};
use crate::assignment::domain::{ActorId, Group, GroupId};
use crate::assignment::ports::{GroupRepository, StoreError, StoreResult};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed group repository.
#[derive(Debug, Clone)]
pub struct PostgresGroupRepository {
    pool: AssignmentPgPool,
}

impl PostgresGroupRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: &Group) -> StoreResult<()> {
        let row = GroupRow::from_domain(group);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(groups::table)
                .values(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: GroupId) -> StoreResult<Option<Group>> {
        run_blocking(&self.pool, move |connection| {
            let row = groups::table
                .find(id.into_inner())
                .select(GroupRow::as_select())
                .first::<GroupRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(GroupRow::into_domain).transpose()
        })
        .await
    }

    async fn list_by_owner(&self, owner: ActorId) -> StoreResult<Vec<Group>> {
        run_blocking(&self.pool, move |connection| {
            let rows = groups::table
                .filter(groups::owner_id.eq(owner.into_inner()))
                .order(groups::created_at.asc())
                .select(GroupRow::as_select())
                .load::<GroupRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(GroupRow::into_domain).collect()
        })
        .await
    }

    async fn update(&self, group: &Group) -> StoreResult<()> {
        let id = group.id();
        let row = GroupRow::from_domain(group);
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(groups::table.find(id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::GroupNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: GroupId) -> StoreResult<()> {
        run_blocking(&self.pool, move |connection| {
            // Members and assignments cascade via their foreign keys.
            let deleted = diesel::delete(groups::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if deleted == 0 {
                return Err(StoreError::GroupNotFound(id));
            }
            Ok(())
        })
        .await
    }
}
