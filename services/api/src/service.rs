//! Room service
//!
//! Every operation takes the authenticated caller and only ever touches
//! rooms that caller owns. Rooms owned by somebody else are reported as not
//! found, the same as ids that do not exist.

use common::error::DatabaseError;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    middleware::AuthUser,
    models::{CreatedResource, NewRoom, RoomDetail, RoomForm, UpdateRoom},
    repositories::{RoomChanges, RoomRepository},
};

/// Maximum room name length, in characters
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum room description length, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Errors returned by room operations
#[derive(Error, Debug)]
pub enum RoomError {
    /// The payload failed validation
    #[error("{0}")]
    Validation(String),

    /// No room with this id is owned by the caller
    #[error("Room {0} not found")]
    NotFound(String),

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Clone)]
pub struct RoomService {
    repository: Arc<dyn RoomRepository>,
}

impl RoomService {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Create a room owned by the caller
    pub async fn create_room(
        &self,
        caller: &AuthUser,
        new_room: NewRoom,
    ) -> Result<CreatedResource, RoomError> {
        let name = validate_name(&new_room.name)?;
        let description = new_room
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let room = self
            .repository
            .insert(caller.id, &name, description.as_deref())
            .await?;

        info!(room_id = %room.id, owner_id = %caller.id, "Room created");
        Ok(CreatedResource { id: room.id })
    }

    /// List the caller's rooms, oldest first
    pub async fn get_current_user_rooms(
        &self,
        caller: &AuthUser,
    ) -> Result<Vec<RoomForm>, RoomError> {
        let rooms = self.repository.list_by_owner(caller.id).await?;
        Ok(rooms.into_iter().map(RoomForm::from).collect())
    }

    /// Fetch one of the caller's rooms
    pub async fn get_room(&self, caller: &AuthUser, room_id: &str) -> Result<RoomDetail, RoomError> {
        let id = parse_room_id(room_id)?;
        self.repository
            .find_owned(caller.id, id)
            .await?
            .map(RoomDetail::from)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    /// Apply the fields present in `form` to one of the caller's rooms
    pub async fn update_room(
        &self,
        caller: &AuthUser,
        room_id: &str,
        form: UpdateRoom,
    ) -> Result<(), RoomError> {
        let id = parse_room_id(room_id)?;

        if form.is_empty() {
            // Nothing to write, but an unknown room is still an error
            return match self.repository.find_owned(caller.id, id).await? {
                Some(_) => Ok(()),
                None => Err(RoomError::NotFound(room_id.to_string())),
            };
        }

        let changes = RoomChanges {
            name: form.name.as_deref().map(validate_name).transpose()?,
            description: form
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
        };

        if !self.repository.update_owned(caller.id, id, &changes).await? {
            return Err(RoomError::NotFound(room_id.to_string()));
        }

        info!(room_id = %id, owner_id = %caller.id, "Room updated");
        Ok(())
    }

    /// Delete one of the caller's rooms
    ///
    /// Deleting a room that is already gone fails with [`RoomError::NotFound`].
    pub async fn delete_room(&self, caller: &AuthUser, room_id: &str) -> Result<(), RoomError> {
        let id = parse_room_id(room_id)?;

        if !self.repository.delete_owned(caller.id, id).await? {
            return Err(RoomError::NotFound(room_id.to_string()));
        }

        info!(room_id = %id, owner_id = %caller.id, "Room deleted");
        Ok(())
    }
}

/// Ids that are not UUIDs cannot name a stored room
fn parse_room_id(room_id: &str) -> Result<Uuid, RoomError> {
    Uuid::parse_str(room_id).map_err(|_| RoomError::NotFound(room_id.to_string()))
}

fn validate_name(name: &str) -> Result<String, RoomError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(RoomError::Validation("Room name is required".to_string()));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RoomError::Validation(format!(
            "Room name must be at most {} characters long",
            MAX_NAME_LENGTH
        )));
    }

    Ok(name.to_string())
}

fn validate_description(description: &str) -> Result<String, RoomError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(RoomError::Validation(format!(
            "Room description must be at most {} characters long",
            MAX_DESCRIPTION_LENGTH
        )));
    }

    Ok(description.to_string())
}
