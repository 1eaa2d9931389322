use comms::content::{self, non_empty_string_field};

use crate::{member::MemberCache, state_table::StateTable};

/// Title used when nobody but the session user is in the room
pub const EMPTY_ROOM_TITLE: &str = "Empty room";

/// Resolves the title from the naming state events of the room, in order of precedence:
///
/// 1. the name from `m.room.name`
/// 2. the canonical alias from `m.room.canonical_alias`
/// 3. the first alias from `m.room.aliases`
///
/// Returns `None` when none of them give a non-empty title, in which case the title
/// has to be derived from the members with [from_members].
pub fn from_state(state: &StateTable) -> Option<&str> {
    from_name_event(state)
        .or_else(|| from_canonical_alias(state))
        .or_else(|| from_aliases(state))
}

fn from_name_event(state: &StateTable) -> Option<&str> {
    let event = state.get(content::ROOM_NAME, "")?;
    non_empty_string_field(&event.content, "name")
}

fn from_canonical_alias(state: &StateTable) -> Option<&str> {
    let event = state.get(content::ROOM_CANONICAL_ALIAS, "")?;
    non_empty_string_field(&event.content, "alias")
}

// Deprecated: `m.room.aliases` should not be used for display names anymore,
// but some servers and clients still only publish aliases through it.
fn from_aliases(state: &StateTable) -> Option<&str> {
    state
        .get_of_type(content::ROOM_ALIASES)?
        .values()
        .filter_map(|event| event.content.get("aliases")?.as_array())
        .find(|aliases| !aliases.is_empty())?
        .first()?
        .as_str()
        .filter(|alias| !alias.is_empty())
}

/// Derives the title from the room members
///
/// - Less than two members: [EMPTY_ROOM_TITLE]
/// - Exactly two members: the display name of the other member
/// - More than two members: the display name of one of the other members followed by
///   "and N others", where N excludes both the session user and the named member
pub fn from_members(members: &MemberCache) -> String {
    let first_other = match members.first_other_member() {
        Some(member) if members.len() > 1 => member,
        _ => return EMPTY_ROOM_TITLE.to_string(),
    };

    if members.len() == 2 {
        first_other.display_name.clone()
    } else {
        format!(
            "{} and {} others",
            first_other.display_name,
            members.len() - 2
        )
    }
}

#[cfg(test)]
mod tests {
    use comms::event::StateEvent;
    use serde_json::json;

    use super::*;

    fn state_of(events: Vec<(&str, &str, serde_json::Value)>) -> StateTable {
        let mut table = StateTable::new();
        for (event_type, state_key, content) in events {
            table.insert(StateEvent::new(
                event_type,
                state_key,
                serde_json::from_value(content).unwrap(),
            ));
        }
        table
    }

    fn members_of(state: &StateTable, session_user_id: &str) -> MemberCache {
        MemberCache::build(
            state
                .get_of_type(content::ROOM_MEMBER)
                .into_iter()
                .flat_map(|events| events.values()),
            session_user_id,
        )
    }

    #[test]
    fn test_name_wins_over_aliases() {
        let state = state_of(vec![
            ("m.room.aliases", "example.org", json!({ "aliases": ["#old:example.org"] })),
            ("m.room.canonical_alias", "", json!({ "alias": "#rust:example.org" })),
            ("m.room.name", "", json!({ "name": "Rust" })),
        ]);

        assert_eq!(from_state(&state), Some("Rust"));
    }

    #[test]
    fn test_canonical_alias_when_name_is_empty_or_malformed() {
        let empty_name = state_of(vec![
            ("m.room.name", "", json!({ "name": "" })),
            ("m.room.canonical_alias", "", json!({ "alias": "#rust:example.org" })),
        ]);
        let malformed_name = state_of(vec![
            ("m.room.name", "", json!({ "name": ["Rust"] })),
            ("m.room.canonical_alias", "", json!({ "alias": "#rust:example.org" })),
        ]);

        assert_eq!(from_state(&empty_name), Some("#rust:example.org"));
        assert_eq!(from_state(&malformed_name), Some("#rust:example.org"));
    }

    #[test]
    fn test_first_non_empty_aliases_list_is_used() {
        let state = state_of(vec![
            ("m.room.aliases", "a.example.org", json!({ "aliases": [] })),
            ("m.room.aliases", "b.example.org", json!({ "aliases": ["#b:b.example.org", "#c:b.example.org"] })),
        ]);

        assert_eq!(from_state(&state), Some("#b:b.example.org"));
    }

    #[test]
    fn test_non_string_first_alias_falls_through() {
        let state = state_of(vec![
            ("m.room.aliases", "a.example.org", json!({ "aliases": [12] })),
            ("m.room.aliases", "b.example.org", json!({ "aliases": ["#b:b.example.org"] })),
        ]);

        assert_eq!(from_state(&state), None);
    }

    #[test]
    fn test_no_naming_events() {
        assert_eq!(from_state(&StateTable::new()), None);
    }

    #[test]
    fn test_members_title_empty_room() {
        let only_me = state_of(vec![("m.room.member", "@me:x", json!({ "membership": "join" }))]);

        assert_eq!(from_members(&members_of(&only_me, "@me:x")), EMPTY_ROOM_TITLE);
        assert_eq!(from_members(&MemberCache::default()), EMPTY_ROOM_TITLE);
    }

    #[test]
    fn test_members_title_two_members() {
        let state = state_of(vec![
            ("m.room.member", "@me:x", json!({ "membership": "join" })),
            ("m.room.member", "@alice:x", json!({ "membership": "join", "displayname": "Alice" })),
        ]);

        assert_eq!(from_members(&members_of(&state, "@me:x")), "Alice");
    }

    #[test]
    fn test_members_title_many_members() {
        let state = state_of(vec![
            ("m.room.member", "@me:x", json!({ "membership": "join" })),
            ("m.room.member", "@bob:x", json!({ "membership": "join", "displayname": "Bob" })),
            ("m.room.member", "@carol:x", json!({ "membership": "invite" })),
            ("m.room.member", "@dave:x", json!({ "membership": "join" })),
        ]);

        assert_eq!(from_members(&members_of(&state, "@me:x")), "Bob and 2 others");
    }
}
