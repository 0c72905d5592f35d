//! API models for rooms and their request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Room entity as persisted
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for room creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRoom {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

/// Room update payload; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateRoom {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Room summary returned in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomForm {
    pub id: Uuid,
    pub name: String,
}

/// Full room representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response for resource creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    pub id: Uuid,
}

impl From<Room> for RoomForm {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
        }
    }
}

impl From<Room> for RoomDetail {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
            description: room.description,
            owner_id: room.owner_id,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}
