//! Repositories for room storage
//!
//! [`RoomRepository`] is the storage port used by the room service. Every
//! lookup and write is scoped to an owner so a caller can never reach a
//! room owned by somebody else.

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::Room;

pub mod memory;
pub mod room;

pub use memory::InMemoryRoomRepository;
pub use room::PgRoomRepository;

/// Validated field values for an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Storage port for rooms
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Persist a new room and return it with its assigned id
    async fn insert(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> DatabaseResult<Room>;

    /// All rooms owned by `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Room>>;

    /// The room with `id` if it is owned by `owner_id`
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<Option<Room>>;

    /// Apply `changes` to an owned room; false when no such room exists
    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &RoomChanges,
    ) -> DatabaseResult<bool>;

    /// Remove an owned room; false when no such room exists
    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> DatabaseResult<bool>;
}
