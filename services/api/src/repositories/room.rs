//! PostgreSQL room repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RoomChanges, RoomRepository};
use crate::models::Room;

/// Room repository for database operations
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new room repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn insert(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> DatabaseResult<Room> {
        sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Room>> {
        sqlx::query_as::<_, Room>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM rooms
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<Option<Room>> {
        sqlx::query_as::<_, Room>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM rooms
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RoomChanges,
    ) -> DatabaseResult<bool> {
        // COALESCE keeps the stored value for fields left out of the update
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM rooms
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
