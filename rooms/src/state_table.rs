use std::collections::{BTreeMap, HashMap};

use comms::event::StateEvent;

/// State events of a single type, keyed by state key
/// Ordered so that every walk over the events of a type sees them in the same order
pub type StateEventsByKey = BTreeMap<String, StateEvent>;

/// [StateTable] keeps the latest state event for every (type, state key) pair of a room
///
/// Applying an event for a pair that already exists clobbers the previous event, no history is kept.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    events: HashMap<String, StateEventsByKey>,
}

impl StateTable {
    pub fn new() -> Self {
        StateTable {
            events: HashMap::new(),
        }
    }

    /// Stores the event under its type and state key, returns the event it replaced if any
    pub fn insert(&mut self, event: StateEvent) -> Option<StateEvent> {
        self.events
            .entry(event.event_type.clone())
            .or_default()
            .insert(event.state_key.clone(), event)
    }

    /// Returns the state event for the given type/state key combo
    pub fn get(&self, event_type: &str, state_key: &str) -> Option<&StateEvent> {
        self.events.get(event_type)?.get(state_key)
    }

    /// Returns all state events of the given type
    pub fn get_of_type(&self, event_type: &str) -> Option<&StateEventsByKey> {
        self.events.get(event_type)
    }

    /// Number of (type, state key) pairs stored
    pub fn len(&self) -> usize {
        self.events.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
