//! In-process room repository
//!
//! Used for local runs without PostgreSQL (`API_STORAGE=memory`) and by the
//! HTTP tests. Rooms are kept in insertion order.

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RoomChanges, RoomRepository};
use crate::models::Room;

#[derive(Clone, Default)]
pub struct InMemoryRoomRepository {
    rooms: Arc<RwLock<Vec<Room>>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> DatabaseResult<Room> {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.rooms.write().await.push(room.clone());
        Ok(room)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .iter()
            .filter(|room| room.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .iter()
            .find(|room| room.id == id && room.owner_id == owner_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RoomChanges,
    ) -> DatabaseResult<bool> {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms
            .iter_mut()
            .find(|room| room.id == id && room.owner_id == owner_id)
        else {
            return Ok(false);
        };

        if let Some(name) = &changes.name {
            room.name = name.clone();
        }
        if let Some(description) = &changes.description {
            room.description = Some(description.clone());
        }
        room.updated_at = Utc::now();

        Ok(true)
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|room| !(room.id == id && room.owner_id == owner_id));
        Ok(rooms.len() < before)
    }
}
