/**
 * Room state tracking tests for mxstate
 */

use std::sync::Arc;

use mxstate::core::{
    Content, Event, MembershipLookup, MembershipResolver, MxStateError, Room, RoomRegistry,
    StateStore, StoreConfig, ROOM_MEMBER,
};
use ruma::events::room::member::MembershipState;
use serde_json::json;
use test_log::test;

const ROOM_ID: &str = "!lobby:example.org";

fn member(user_id: &str, membership: &str) -> Event {
    Event::state(ROOM_MEMBER, user_id, Content::from_iter([("membership", membership)]))
        .with_room_id(ROOM_ID)
}

/// A user's membership follows their latest event
#[test]
fn test_membership_lifecycle() {
    let registry = RoomRegistry::default();

    assert!(registry.apply(member("@alice:example.org", "invite")).is_ok());
    let room = registry.get(ROOM_ID).unwrap();
    assert_eq!(room.get_membership_state("@alice:example.org"), "invite");

    registry.apply(member("@alice:example.org", "join")).unwrap();
    assert_eq!(room.get_membership_state("@alice:example.org"), "join");
    assert!(room.is_joined("@alice:example.org"));

    registry.apply(member("@alice:example.org", "ban")).unwrap();
    assert_eq!(room.get_membership_state("@alice:example.org"), "ban");
    assert!(!room.is_joined("@alice:example.org"));
}

/// Unknown users and malformed content both read as `leave`
#[test]
fn test_membership_defaults_to_leave() {
    let room = Room::new(ROOM_ID);
    room.update_state(Event::state(
        ROOM_MEMBER,
        "@bob:example.org",
        Content::try_from(json!({ "membership": 5 })).unwrap(),
    ));

    assert_eq!(room.get_membership_state("@carol:example.org"), "leave");
    assert_eq!(room.get_membership_state("@bob:example.org"), "leave");
    assert_eq!(room.membership("@carol:example.org"), MembershipLookup::Unknown);
    assert_eq!(room.membership("@bob:example.org"), MembershipLookup::Malformed);
}

/// Events for different rooms stay apart
#[test]
fn test_rooms_are_isolated() {
    let registry = RoomRegistry::default();
    registry.apply(member("@alice:example.org", "join")).unwrap();
    registry
        .apply(member("@alice:example.org", "leave").with_room_id("!other:example.org"))
        .unwrap();

    assert_eq!(registry.len(), 2);
    let lobby = registry.get(ROOM_ID).unwrap();
    let other = registry.get("!other:example.org").unwrap();
    assert_eq!(lobby.get_membership_state("@alice:example.org"), "join");
    assert_eq!(other.get_membership_state("@alice:example.org"), "leave");
}

/// Rooms must be tracked explicitly when auto creation is off
#[test]
fn test_explicit_tracking() {
    let registry = RoomRegistry::new(StoreConfig {
        auto_create_rooms: false,
        ..Default::default()
    });

    let result = registry.apply(member("@alice:example.org", "join"));
    assert!(matches!(result, Err(MxStateError::NotFound(_))));

    registry.track(Room::new(ROOM_ID)).unwrap();
    registry.apply(member("@alice:example.org", "join")).unwrap();
    assert_eq!(
        registry.get(ROOM_ID).unwrap().members_with(&MembershipState::Join),
        vec!["@alice:example.org".to_string()]
    );
}

/// Readers see either the old or the new event, never a partial one
#[test]
fn test_shared_room_across_threads() {
    let room = Arc::new(Room::new(ROOM_ID));
    let handles: Vec<_> = ["join", "leave", "invite", "ban"]
        .into_iter()
        .map(|membership| {
            let room = Arc::clone(&room);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    room.update_state(member("@alice:example.org", membership));
                    let seen = room.get_membership_state("@alice:example.org");
                    assert!(["join", "leave", "invite", "ban"].contains(&seen.as_str()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(room.state_keys(ROOM_MEMBER), vec!["@alice:example.org".to_string()]);
}
