use std::{collections::HashMap, sync::Arc};

use comms::{
    content::{self, string_field},
    event::StateEvent,
};
use tracing::{debug, trace};

use crate::{
    history_lock::HistoryLock,
    member::{Member, MemberCache},
    state_table::{StateEventsByKey, StateTable},
    title,
};

/// Caches that have to be dropped when a state event of some type is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Invalidation {
    members: bool,
    title: bool,
    topic: bool,
}

const MEMBERS_AND_TITLE: Invalidation = Invalidation {
    members: true,
    title: true,
    topic: false,
};
const TITLE: Invalidation = Invalidation {
    members: false,
    title: true,
    topic: false,
};
const TOPIC: Invalidation = Invalidation {
    members: false,
    title: false,
    topic: true,
};

// Member based titles depend on the roster, so membership changes drop the title too
const INVALIDATIONS: &[(&str, Invalidation)] = &[
    (content::ROOM_MEMBER, MEMBERS_AND_TITLE),
    (content::ROOM_NAME, TITLE),
    (content::ROOM_CANONICAL_ALIAS, TITLE),
    (content::ROOM_ALIAS, TITLE),
    (content::ROOM_ALIASES, TITLE),
    (content::ROOM_TOPIC, TOPIC),
];

fn invalidation_for(event_type: &str) -> Invalidation {
    INVALIDATIONS
        .iter()
        .find(|(invalidating_type, _)| *invalidating_type == event_type)
        .map(|(_, invalidation)| *invalidation)
        .unwrap_or_default()
}

/// [RoomState] holds the current state of a single room and the display values derived from it
///
/// Title, topic and member roster are computed lazily and cached until a state event that
/// could change them is applied. `None` in a cache means it has to be computed again,
/// an empty string is a computed value like any other.
///
/// The lazy accessors take `&mut self`, use [crate::SharedRoomState] to share a room between tasks.
#[derive(Debug)]
pub struct RoomState {
    room_id: String,
    /// The user whose session this room was created for
    session_user_id: String,
    state: StateTable,

    /// Pagination token of the oldest fetched batch, used for fetching more history
    pub prev_batch: String,
    /// The number of unread messages that were notified about
    pub unread_messages: usize,
    /// Whether any of the unread messages were highlights
    pub highlighted: bool,
    /// Whether the room has new messages
    /// Can be true while `unread_messages` is zero, e.g. for notices that do not notify
    pub has_new_messages: bool,

    title_cache: Option<String>,
    topic_cache: Option<String>,
    member_cache: Option<MemberCache>,

    history_lock: Arc<HistoryLock>,
}

impl RoomState {
    pub fn new(room_id: impl Into<String>, session_user_id: impl Into<String>) -> Self {
        RoomState {
            room_id: room_id.into(),
            session_user_id: session_user_id.into(),
            state: StateTable::new(),
            prev_batch: String::new(),
            unread_messages: 0,
            highlighted: false,
            has_new_messages: false,
            title_cache: None,
            topic_cache: None,
            member_cache: None,
            history_lock: Arc::new(HistoryLock::new()),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn session_user_id(&self) -> &str {
        &self.session_user_id
    }

    /// Updates the room state with the given event, clobbering any earlier event with
    /// the same type and state key, and drops every cache the event could affect
    pub fn apply_state_event(&mut self, event: StateEvent) {
        let invalidation = invalidation_for(&event.event_type);

        if invalidation.members {
            self.member_cache = None;
        }
        if invalidation.title {
            self.title_cache = None;
        }
        if invalidation.topic {
            self.topic_cache = None;
        }

        debug!(
            room_id = %self.room_id,
            event_type = %event.event_type,
            state_key = %event.state_key,
            ?invalidation,
            "applying state event"
        );

        self.state.insert(event);
    }

    /// Returns the state event for the given type/state key combo
    pub fn get_state_event(&self, event_type: &str, state_key: &str) -> Option<&StateEvent> {
        self.state.get(event_type, state_key)
    }

    /// Returns all state events of the given type, keyed by state key
    pub fn get_state_events(&self, event_type: &str) -> Option<&StateEventsByKey> {
        self.state.get_of_type(event_type)
    }

    /// Returns the display name of the room, resolving it first if needed
    pub fn title(&mut self) -> &str {
        let title = match self.title_cache.take() {
            Some(title) => title,
            None => self.resolve_title(),
        };

        self.title_cache.insert(title).as_str()
    }

    /// Returns the topic of the room from the `m.room.topic` state event
    /// A missing event or a malformed topic gives an empty topic
    pub fn topic(&mut self) -> &str {
        let topic = match self.topic_cache.take() {
            Some(topic) => topic,
            None => self
                .state
                .get(content::ROOM_TOPIC, "")
                .and_then(|event| string_field(&event.content, "topic"))
                .unwrap_or_default()
                .to_string(),
        };

        self.topic_cache.insert(topic).as_str()
    }

    /// Returns the members of the room that have not left, keyed by user id
    pub fn members(&mut self) -> &HashMap<String, Member> {
        self.member_cache().members()
    }

    /// Returns the member with the given user id, or `None` if they are unknown or have left
    pub fn member(&mut self, user_id: &str) -> Option<&Member> {
        self.member_cache().get(user_id)
    }

    /// Returns the member of the user whose session this room was created for
    pub fn session_owner_member(&mut self) -> Option<&Member> {
        let session_user_id = self.session_user_id.clone();
        self.member_cache().get(&session_user_id)
    }

    /// Rebuilds the member roster from the current membership events
    pub fn rebuild_member_cache(&mut self) -> &MemberCache {
        let cache = MemberCache::build(
            self.state
                .get_of_type(content::ROOM_MEMBER)
                .into_iter()
                .flat_map(StateEventsByKey::values),
            &self.session_user_id,
        );

        debug!(room_id = %self.room_id, members = cache.len(), "rebuilt member cache");

        self.member_cache.insert(cache)
    }

    /// Cached title, `None` if it has not been resolved since the last invalidation
    pub fn cached_title(&self) -> Option<&str> {
        self.title_cache.as_deref()
    }

    /// Cached topic, `None` if it has not been resolved since the last invalidation
    pub fn cached_topic(&self) -> Option<&str> {
        self.topic_cache.as_deref()
    }

    /// Cached roster, `None` if it has not been built since the last invalidation
    pub fn cached_members(&self) -> Option<&MemberCache> {
        self.member_cache.as_ref()
    }

    /// Waits until no other history fetch is running for this room and marks one as running
    pub async fn acquire_history_lock(&self) {
        self.history_lock.acquire().await;
        trace!(room_id = %self.room_id, "history lock acquired");
    }

    /// Same as [RoomState::acquire_history_lock] but blocks the current thread
    pub fn blocking_acquire_history_lock(&self) {
        self.history_lock.blocking_acquire();
        trace!(room_id = %self.room_id, "history lock acquired");
    }

    /// Marks a history fetch as running if none is, returns whether it did
    pub fn try_acquire_history_lock(&self) -> bool {
        self.history_lock.try_acquire()
    }

    /// Marks the history fetch as finished, does nothing if none is running
    pub fn release_history_lock(&self) {
        if self.history_lock.release() {
            trace!(room_id = %self.room_id, "history lock released");
        }
    }

    /// Handle to the history lock that can be used without borrowing the room
    pub fn history_lock(&self) -> Arc<HistoryLock> {
        self.history_lock.clone()
    }

    /// Records a new message in the room
    /// `notify` counts it as unread, `highlight` marks the room as highlighted
    pub fn mark_new_message(&mut self, notify: bool, highlight: bool) {
        self.has_new_messages = true;
        if notify {
            self.unread_messages += 1;
        }
        if highlight {
            self.highlighted = true;
        }
    }

    /// Clears the new message statuses of the room
    pub fn mark_read(&mut self) {
        self.unread_messages = 0;
        self.highlighted = false;
        self.has_new_messages = false;
    }

    fn member_cache(&mut self) -> &MemberCache {
        match self.member_cache.take() {
            Some(cache) => &*self.member_cache.insert(cache),
            None => self.rebuild_member_cache(),
        }
    }

    fn resolve_title(&mut self) -> String {
        let title = match title::from_state(&self.state) {
            Some(title) => title.to_string(),
            None => title::from_members(self.member_cache()),
        };

        debug!(room_id = %self.room_id, %title, "resolved room title");

        title
    }
}
