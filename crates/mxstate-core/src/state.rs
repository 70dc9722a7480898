//! Room state store
//!
//! A [`Room`] holds the current state of one Matrix room as a two-level map,
//! event type to state key to event. Updating is replacing: a new event for
//! an occupied `(type, state key)` slot clobbers the previous occupant no
//! matter its timestamp, sender or content. There is no history and no
//! conflict resolution; the last call wins.
//!
//! # Examples
//! ```rust
//! use mxstate_core::{Event, MembershipResolver, Room, StateStore};
//! use ruma::events::room::member::MembershipState;
//!
//! let room = Room::new("!room:example.org");
//! room.update_state(Event::membership("@alice:example.org", MembershipState::Join));
//!
//! assert_eq!(room.get_membership_state("@alice:example.org"), "join");
//! assert_eq!(room.get_membership_state("@nobody:example.org"), "leave");
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::{debug, field, instrument, warn, Span};

use crate::traits::StateStore;
use crate::types::{Event, ROOM_NAME};

type StateMap = HashMap<String, HashMap<String, Arc<Event>>>;

/// Current state of a single room
#[derive(Debug)]
pub struct Room {
    id: String,
    state: RwLock<StateMap>,
}

impl Room {
    /// Create a room with empty state
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self {
            id: id.into(),
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Create a room pre-seeded with `events`, applied in order
    #[instrument(level = "debug", skip_all, fields(room_id = field::Empty))]
    pub fn with_state<T, I>(id: T, events: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = Event>,
    {
        let room = Self::new(id);
        Span::current().record("room_id", room.id.as_str());
        for event in events {
            room.update_state(event);
        }
        debug!("🔧 Seeded room {} with {} state events", room.id, room.len());
        room
    }

    /// The room identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Every current event of `event_type`
    pub fn state_events(&self, event_type: &str) -> Vec<Arc<Event>> {
        self.read()
            .get(event_type)
            .map(|events| events.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every current state event of the room
    pub fn snapshot(&self) -> Vec<Arc<Event>> {
        self.read()
            .values()
            .flat_map(|events| events.values().cloned())
            .collect()
    }

    /// Number of occupied `(type, state key)` slots
    pub fn len(&self) -> usize {
        self.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The room name from `m.room.name`, if set to a string
    pub fn name(&self) -> Option<String> {
        self.get_state_event(ROOM_NAME, "")
            .and_then(|event| event.content.get_str("name").map(str::to_owned))
    }

    // The maps are only ever replaced slot by slot, so a panic while a guard
    // was held cannot leave them half-written.
    fn read(&self) -> RwLockReadGuard<'_, StateMap> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StateMap> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for Room {
    fn update_state(&self, event: Event) {
        let Some(state_key) = event.state_key.clone() else {
            warn!(
                room_id = %self.id,
                event_type = %event.event_type,
                "⚠️ Ignoring event without a state key"
            );
            return;
        };

        let mut state = self.write();
        let replaced = state
            .entry(event.event_type.clone())
            .or_default()
            .insert(state_key, Arc::new(event))
            .is_some();

        if replaced {
            debug!(room_id = %self.id, "🔄 Replaced state event");
        }
    }

    fn get_state_event(&self, event_type: &str, state_key: &str) -> Option<Arc<Event>> {
        self.read()
            .get(event_type)
            .and_then(|events| events.get(state_key))
            .cloned()
    }

    fn state_keys(&self, event_type: &str) -> Vec<String> {
        self.read()
            .get(event_type)
            .map(|events| events.keys().cloned().collect())
            .unwrap_or_default()
    }
}
