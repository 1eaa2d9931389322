use std::{collections::HashMap, sync::Arc};

use comms::event::StateEvent;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    history_lock::HistoryLock,
    member::Member,
    room_state::RoomState,
    state_table::StateEventsByKey,
};

/// [SharedRoomState] wraps a [RoomState] so that it can be shared between tasks
///
/// Every accessor takes the inner lock itself. Reads of already computed values only need
/// the read lock, the write lock is taken when a value has to be computed first.
/// The history lock lives outside of the state lock, so a running history fetch
/// never blocks state updates or readers.
#[derive(Debug)]
pub struct SharedRoomState {
    room_id: String,
    state: RwLock<RoomState>,
    history_lock: Arc<HistoryLock>,
}

impl SharedRoomState {
    pub fn new(room_id: impl Into<String>, session_user_id: impl Into<String>) -> Self {
        Self::from_room_state(RoomState::new(room_id, session_user_id))
    }

    pub fn from_room_state(room: RoomState) -> Self {
        SharedRoomState {
            room_id: room.room_id().to_string(),
            history_lock: room.history_lock(),
            state: RwLock::new(room),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Locks the room for reading, e.g. to read the notification fields
    pub async fn read(&self) -> RwLockReadGuard<'_, RoomState> {
        self.state.read().await
    }

    /// Locks the room for writing, e.g. to update the notification fields
    pub async fn write(&self) -> RwLockWriteGuard<'_, RoomState> {
        self.state.write().await
    }

    pub async fn apply_state_event(&self, event: StateEvent) {
        self.state.write().await.apply_state_event(event);
    }

    pub async fn get_state_event(&self, event_type: &str, state_key: &str) -> Option<StateEvent> {
        self.state
            .read()
            .await
            .get_state_event(event_type, state_key)
            .cloned()
    }

    pub async fn get_state_events(&self, event_type: &str) -> Option<StateEventsByKey> {
        self.state.read().await.get_state_events(event_type).cloned()
    }

    pub async fn title(&self) -> String {
        {
            let room = self.state.read().await;
            if let Some(title) = room.cached_title() {
                return title.to_string();
            }
        }

        self.state.write().await.title().to_string()
    }

    pub async fn topic(&self) -> String {
        {
            let room = self.state.read().await;
            if let Some(topic) = room.cached_topic() {
                return topic.to_string();
            }
        }

        self.state.write().await.topic().to_string()
    }

    pub async fn members(&self) -> HashMap<String, Member> {
        {
            let room = self.state.read().await;
            if let Some(cache) = room.cached_members() {
                return cache.members().clone();
            }
        }

        self.state.write().await.members().clone()
    }

    pub async fn member(&self, user_id: &str) -> Option<Member> {
        {
            let room = self.state.read().await;
            if let Some(cache) = room.cached_members() {
                return cache.get(user_id).cloned();
            }
        }

        self.state.write().await.member(user_id).cloned()
    }

    pub async fn session_owner_member(&self) -> Option<Member> {
        {
            let room = self.state.read().await;
            if let Some(cache) = room.cached_members() {
                return cache.get(room.session_user_id()).cloned();
            }
        }

        self.state.write().await.session_owner_member().cloned()
    }

    pub async fn prev_batch(&self) -> String {
        self.state.read().await.prev_batch.clone()
    }

    pub async fn set_prev_batch(&self, prev_batch: String) {
        self.state.write().await.prev_batch = prev_batch;
    }

    pub async fn mark_new_message(&self, notify: bool, highlight: bool) {
        self.state.write().await.mark_new_message(notify, highlight);
    }

    pub async fn mark_read(&self) {
        self.state.write().await.mark_read();
    }

    /// Waits until no other history fetch is running for this room and marks one as running
    pub async fn acquire_history_lock(&self) {
        self.history_lock.acquire().await;
    }

    /// Marks the history fetch as finished, does nothing if none is running
    pub fn release_history_lock(&self) {
        self.history_lock.release();
    }

    pub fn history_lock(&self) -> &HistoryLock {
        &self.history_lock
    }
}
