use serde::{Deserialize, Serialize};

use crate::content::Content;

/// A user's relationship to a room as carried by `m.room.member` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Join,
    Invite,
    Leave,
    Ban,
    Knock,
}

impl Membership {
    /// Parses the wire value of a membership, returns `None` for values this client does not know
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "join" => Some(Membership::Join),
            "invite" => Some(Membership::Invite),
            "leave" => Some(Membership::Leave),
            "ban" => Some(Membership::Ban),
            "knock" => Some(Membership::Knock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Membership::Join => "join",
            Membership::Invite => "invite",
            Membership::Leave => "leave",
            Membership::Ban => "ban",
            Membership::Knock => "knock",
        }
    }
}

/// A state event for a single room
/// The pair of `event_type` and `state_key` identifies which piece of room state the event replaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    /// The type of the event e.g. `m.room.name`
    #[serde(rename = "type")]
    pub event_type: String,
    /// The key of the state inside the type, the user id for membership events and empty for most others
    pub state_key: String,
    /// The content of the event
    #[serde(default)]
    pub content: Content,
    /// The user that has sent the event, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// The id of the event, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl StateEvent {
    pub fn new(
        event_type: impl Into<String>,
        state_key: impl Into<String>,
        content: Content,
    ) -> Self {
        StateEvent {
            event_type: event_type.into(),
            state_key: state_key.into(),
            content,
            sender: None,
            event_id: None,
        }
    }
}

/// An event from the room timeline
/// Timeline events are state events when they carry a `state_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub event_id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    #[serde(default)]
    pub content: Content,
    /// Milliseconds since the unix epoch on the originating server
    #[serde(default)]
    pub origin_server_ts: u64,
}

impl RoomEvent {
    pub fn is_state(&self) -> bool {
        self.state_key.is_some()
    }

    /// Converts the event into a [StateEvent], returns `None` for events without a state key
    pub fn as_state_event(&self) -> Option<StateEvent> {
        let state_key = self.state_key.as_ref()?;

        Some(StateEvent {
            event_type: self.event_type.clone(),
            state_key: state_key.clone(),
            content: self.content.clone(),
            sender: Some(self.sender.clone()),
            event_id: Some(self.event_id.clone()),
        })
    }
}
