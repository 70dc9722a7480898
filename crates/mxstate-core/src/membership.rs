//! Membership queries
//!
//! Interprets `m.room.member` state events. A user with no membership event
//! is treated as having left, and so is a user whose event has a missing or
//! non-string `membership` field. [`MembershipResolver::get_membership_state`]
//! keeps that lossy behaviour; [`MembershipResolver::membership`] reports the
//! three cases separately for callers that need to tell them apart.

use ruma::events::room::member::MembershipState;
use tracing::trace;

use crate::traits::StateStore;
use crate::types::ROOM_MEMBER;

/// Outcome of a membership lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipLookup {
    /// A membership event exists and carries a string `membership`
    Known(MembershipState),
    /// No membership event exists for the user
    Unknown,
    /// A membership event exists but `membership` is missing or not a string
    Malformed,
}

impl MembershipLookup {
    /// Collapse to the protocol string, treating unknown and malformed as `leave`
    pub fn as_str(&self) -> &str {
        match self {
            MembershipLookup::Known(state) => state.as_str(),
            MembershipLookup::Unknown | MembershipLookup::Malformed => "leave",
        }
    }
}

/// Membership queries layered on a [`StateStore`]
pub trait MembershipResolver: StateStore {
    /// Resolve a user's membership, keeping "never seen" and "malformed" apart
    fn membership(&self, user_id: &str) -> MembershipLookup {
        let Some(event) = self.get_state_event(ROOM_MEMBER, user_id) else {
            return MembershipLookup::Unknown;
        };
        match event.content.get_str("membership") {
            Some(membership) => MembershipLookup::Known(MembershipState::from(membership)),
            None => {
                trace!(user_id, "membership event without a string membership");
                MembershipLookup::Malformed
            }
        }
    }

    /// The user's membership string, `leave` when unknown or malformed
    fn get_membership_state(&self, user_id: &str) -> String {
        self.membership(user_id).as_str().to_owned()
    }

    fn is_joined(&self, user_id: &str) -> bool {
        self.membership(user_id) == MembershipLookup::Known(MembershipState::Join)
    }

    /// Users whose resolved membership equals `membership`
    fn members_with(&self, membership: &MembershipState) -> Vec<String> {
        self.state_keys(ROOM_MEMBER)
            .into_iter()
            .filter(|user_id| match self.membership(user_id) {
                MembershipLookup::Known(state) => &state == membership,
                _ => false,
            })
            .collect()
    }
}

impl<S: StateStore + ?Sized> MembershipResolver for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Room;
    use crate::types::{Content, Event};
    use mockall::mock;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::Arc;
    use test_log::test;

    mock! {
        Store {}
        impl StateStore for Store {
            fn update_state(&self, event: Event);
            fn get_state_event(&self, event_type: &str, state_key: &str) -> Option<Arc<Event>>;
            fn state_keys(&self, event_type: &str) -> Vec<String>;
        }
    }

    fn member_event(user_id: &str, content: serde_json::Value) -> Event {
        Event::state(ROOM_MEMBER, user_id, Content::try_from(content).unwrap())
    }

    #[test]
    fn test_unknown_user_defaults_to_leave() {
        let room = Room::new("!room:example.org");
        assert_eq!(room.get_membership_state("@nobody:example.org"), "leave");
        assert_eq!(room.membership("@nobody:example.org"), MembershipLookup::Unknown);
    }

    #[test]
    fn test_join_round_trip() {
        let room = Room::new("!room:example.org");
        room.update_state(member_event("@alice:example.org", json!({ "membership": "join" })));

        assert_eq!(room.get_membership_state("@alice:example.org"), "join");
        assert_eq!(
            room.membership("@alice:example.org"),
            MembershipLookup::Known(MembershipState::Join)
        );
        assert!(room.is_joined("@alice:example.org"));
    }

    #[test]
    fn test_non_string_membership_falls_back_to_leave() {
        let room = Room::new("!room:example.org");
        room.update_state(member_event("@bob:example.org", json!({ "membership": 42 })));
        room.update_state(member_event("@carol:example.org", json!({ "membership": null })));
        room.update_state(member_event("@dave:example.org", json!({ "displayname": "Dave" })));

        for user_id in ["@bob:example.org", "@carol:example.org", "@dave:example.org"] {
            assert_eq!(room.get_membership_state(user_id), "leave");
            assert_eq!(room.membership(user_id), MembershipLookup::Malformed);
            assert!(!room.is_joined(user_id));
        }
    }

    #[test]
    fn test_rejoin_then_leave_keeps_no_history() {
        let room = Room::new("!room:example.org");
        room.update_state(Event::membership("@alice:example.org", MembershipState::Join));
        assert_eq!(room.get_membership_state("@alice:example.org"), "join");

        room.update_state(Event::membership("@alice:example.org", MembershipState::Leave));
        assert_eq!(room.get_membership_state("@alice:example.org"), "leave");
        assert_eq!(
            room.membership("@alice:example.org"),
            MembershipLookup::Known(MembershipState::Leave)
        );
        assert_eq!(room.state_events(ROOM_MEMBER).len(), 1);
    }

    #[test]
    fn test_unlisted_membership_is_returned_verbatim() {
        let room = Room::new("!room:example.org");
        room.update_state(member_event("@eve:example.org", json!({ "membership": "lurking" })));

        assert_eq!(room.get_membership_state("@eve:example.org"), "lurking");
        assert!(matches!(room.membership("@eve:example.org"), MembershipLookup::Known(_)));
    }

    #[test]
    fn test_members_with() {
        let room = Room::new("!room:example.org");
        room.update_state(Event::membership("@alice:example.org", MembershipState::Join));
        room.update_state(Event::membership("@bob:example.org", MembershipState::Invite));
        room.update_state(Event::membership("@carol:example.org", MembershipState::Join));
        room.update_state(member_event("@dave:example.org", json!({ "membership": 1 })));

        let mut joined = room.members_with(&MembershipState::Join);
        joined.sort();
        assert_eq!(joined, vec!["@alice:example.org", "@carol:example.org"]);
        assert_eq!(room.members_with(&MembershipState::Invite), vec!["@bob:example.org"]);
        assert!(room.members_with(&MembershipState::Ban).is_empty());
    }

    #[test]
    fn test_resolver_queries_member_type_with_user_id_verbatim() {
        let mut store = MockStore::new();
        store
            .expect_get_state_event()
            .with(eq(ROOM_MEMBER), eq("@alice:example.org"))
            .times(1)
            .returning(|_, user_id| {
                Some(Arc::new(Event::membership(user_id, MembershipState::Ban)))
            });

        assert_eq!(store.get_membership_state("@alice:example.org"), "ban");
    }
}
