use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::shared::SharedRoomState;

/// [RoomRegistry] keeps the state of every room known to a single user session
/// Rooms are created on first use and share nothing with each other
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    session_user_id: String,
    rooms: HashMap<String, Arc<SharedRoomState>>,
}

impl RoomRegistry {
    pub fn new(session_user_id: impl Into<String>) -> Self {
        RoomRegistry {
            session_user_id: session_user_id.into(),
            rooms: HashMap::new(),
        }
    }

    pub fn session_user_id(&self) -> &str {
        &self.session_user_id
    }

    /// Returns the room with the given id, creating an empty one if it is not known yet
    pub fn get_or_create(&mut self, room_id: &str) -> Arc<SharedRoomState> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!(room_id, "creating room state");
                Arc::new(SharedRoomState::new(room_id, self.session_user_id.clone()))
            })
            .clone()
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<SharedRoomState>> {
        self.rooms.get(room_id).cloned()
    }

    /// Forgets the room, e.g. after the session user has left it
    pub fn remove(&mut self, room_id: &str) -> Option<Arc<SharedRoomState>> {
        self.rooms.remove(room_id)
    }

    pub fn room_ids(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }
}
