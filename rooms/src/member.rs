use std::collections::HashMap;

use comms::{
    content::{non_empty_string_field, string_field},
    event::{Membership, StateEvent},
};

/// [Member] is a room member as described by its latest `m.room.member` state event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// The user id of the member, taken from the state key
    pub user_id: String,
    /// The name to show for the member, falls back to the user id
    pub display_name: String,
    /// Avatar of the member, if any
    pub avatar_url: Option<String>,
    pub membership: Membership,
}

impl Member {
    /// Builds a member from a membership state event
    /// Returns `None` when the event does not carry a membership this client understands
    pub fn from_state_event(event: &StateEvent) -> Option<Self> {
        let membership = string_field(&event.content, "membership").and_then(Membership::parse)?;
        let display_name = non_empty_string_field(&event.content, "displayname")
            .unwrap_or(&event.state_key)
            .to_string();

        Some(Member {
            user_id: event.state_key.clone(),
            display_name,
            avatar_url: non_empty_string_field(&event.content, "avatar_url").map(String::from),
            membership,
        })
    }
}

/// [MemberCache] is the roster derived from the membership events of a room
///
/// The roster and the first other member are always built together from a single pass,
/// so the first other member is always one of the cached members.
#[derive(Debug, Clone, Default)]
pub struct MemberCache {
    members: HashMap<String, Member>,
    first_other_member: Option<String>,
}

impl MemberCache {
    /// Builds the cache from membership events, skipping members that have left the room
    pub fn build<'a>(
        events: impl IntoIterator<Item = &'a StateEvent>,
        session_user_id: &str,
    ) -> Self {
        let mut members = HashMap::new();
        let mut first_other_member = None;

        for member in events.into_iter().filter_map(Member::from_state_event) {
            if member.membership == Membership::Leave {
                continue;
            }

            if first_other_member.is_none() && member.user_id != session_user_id {
                first_other_member = Some(member.user_id.clone());
            }

            members.insert(member.user_id.clone(), member);
        }

        MemberCache {
            members,
            first_other_member,
        }
    }

    pub fn members(&self) -> &HashMap<String, Member> {
        &self.members
    }

    pub fn get(&self, user_id: &str) -> Option<&Member> {
        self.members.get(user_id)
    }

    /// The first member found during the build that is not the session user
    pub fn first_other_member(&self) -> Option<&Member> {
        self.first_other_member
            .as_deref()
            .and_then(|user_id| self.members.get(user_id))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
