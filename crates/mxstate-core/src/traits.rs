//! Core traits for mxstate
//!
//! [`StateStore`] is the seam between the state model and everything that
//! reads it. Membership queries are layered on top of it in
//! [`crate::membership`].

use std::sync::Arc;

use crate::types::Event;

/// Current state of one room, addressed by `(event type, state key)`
pub trait StateStore {
    /// Store `event` in its `(type, state key)` slot, replacing any occupant
    fn update_state(&self, event: Event);

    /// The event currently occupying `(event_type, state_key)`, if any
    fn get_state_event(&self, event_type: &str, state_key: &str) -> Option<Arc<Event>>;

    /// Every state key currently set for `event_type`
    fn state_keys(&self, event_type: &str) -> Vec<String>;
}
