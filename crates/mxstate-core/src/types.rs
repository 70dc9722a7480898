//! Core types for mxstate
//!
//! This module defines the event model consumed by the room state store.
//! Events use the Matrix client-server JSON shape so they can be decoded
//! straight from sync responses or application service transactions.
//!
//! Event content is dynamically typed JSON. It is kept as an open
//! `serde_json` object and read back through explicit narrowing accessors
//! such as [`Content::get_str`].

use std::collections::HashMap;

use ruma::events::room::member::MembershipState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MxStateError, Result};

/// Event type of membership state events
pub const ROOM_MEMBER: &str = "m.room.member";

/// Event type of the room name state event
pub const ROOM_NAME: &str = "m.room.name";

/// The content of an event: an open JSON object without a fixed schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(Map<String, Value>);

impl Content {
    /// Create empty content
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw JSON value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get the value under `key` if, and only if, it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is present, whatever its type
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a value, returning the one it replaced
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Content {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Content {
    type Error = MxStateError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(MxStateError::InvalidEvent(format!(
                "event content must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Content {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A Matrix event as delivered to clients and application services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event_id: String,

    /// Sender user ID
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender: String,

    /// Event type, e.g. `m.room.member`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Room this event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    /// State key. `Some("")` is a valid key; `None` means a timeline event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,

    /// Origin server timestamp in milliseconds
    #[serde(default)]
    pub origin_server_ts: u64,

    /// Event content
    #[serde(default)]
    pub content: Content,

    /// Event ID redacted by this event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redacts: Option<String>,

    /// Unsigned data added by the homeserver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<HashMap<String, Value>>,
}

impl Event {
    /// Create a state event addressed by `(event_type, state_key)`
    pub fn state<T, K>(event_type: T, state_key: K, content: Content) -> Self
    where
        T: Into<String>,
        K: Into<String>,
    {
        Self {
            event_type: event_type.into(),
            state_key: Some(state_key.into()),
            content,
            ..Default::default()
        }
    }

    /// Create an `m.room.member` event for `user_id`
    pub fn membership<K: Into<String>>(user_id: K, membership: MembershipState) -> Self {
        let content = Content::from_iter([("membership", membership.as_str())]);
        Self::state(ROOM_MEMBER, user_id, content)
    }

    /// Create a timeline (non-state) event
    pub fn message<T: Into<String>>(event_type: T, content: Content) -> Self {
        Self {
            event_type: event_type.into(),
            content,
            ..Default::default()
        }
    }

    pub fn with_room_id<R: Into<String>>(mut self, room_id: R) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_sender<S: Into<String>>(mut self, sender: S) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn with_event_id<E: Into<String>>(mut self, event_id: E) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn with_timestamp(mut self, origin_server_ts: u64) -> Self {
        self.origin_server_ts = origin_server_ts;
        self
    }

    /// Whether this event carries a state key
    pub fn is_state(&self) -> bool {
        self.state_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_content_narrowing() {
        let content = Content::try_from(json!({
            "membership": "join",
            "count": 42,
            "nested": { "a": 1 },
            "nothing": null
        }))
        .unwrap();

        assert_eq!(content.get_str("membership"), Some("join"));
        assert_eq!(content.get_str("count"), None);
        assert_eq!(content.get_str("nested"), None);
        assert_eq!(content.get_str("nothing"), None);
        assert_eq!(content.get("count"), Some(&json!(42)));
        assert!(content.contains_key("nothing"));
        assert!(!content.contains_key("missing"));
        assert_eq!(content.len(), 4);
    }

    #[test]
    fn test_content_must_be_object() {
        let err = Content::try_from(json!(["join"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(Content::try_from(json!("join")).is_err());
    }

    #[test]
    fn test_event_from_wire() {
        let event: Event = serde_json::from_value(json!({
            "type": "m.room.member",
            "event_id": "$abc:example.org",
            "sender": "@alice:example.org",
            "room_id": "!room:example.org",
            "state_key": "@alice:example.org",
            "origin_server_ts": 1_700_000_000_000u64,
            "content": { "membership": "join", "displayname": "Alice" }
        }))
        .unwrap();

        assert_eq!(event.event_type, ROOM_MEMBER);
        assert_eq!(event.state_key.as_deref(), Some("@alice:example.org"));
        assert_eq!(event.room_id.as_deref(), Some("!room:example.org"));
        assert_eq!(event.content.get_str("displayname"), Some("Alice"));
        assert!(event.is_state());
    }

    #[test]
    fn test_empty_state_key_is_distinct_from_none() {
        let with_key: Event = serde_json::from_value(json!({
            "type": "m.room.name",
            "state_key": "",
            "content": { "name": "Lobby" }
        }))
        .unwrap();
        let without_key: Event = serde_json::from_value(json!({
            "type": "m.room.message",
            "content": { "body": "hi" }
        }))
        .unwrap();

        assert_eq!(with_key.state_key.as_deref(), Some(""));
        assert!(with_key.is_state());
        assert_eq!(without_key.state_key, None);
        assert!(!without_key.is_state());

        let serialized = serde_json::to_value(&with_key).unwrap();
        assert_eq!(serialized["state_key"], json!(""));
    }

    #[test]
    fn test_membership_builder() {
        let event = Event::membership("@bob:example.org", MembershipState::Invite)
            .with_room_id("!room:example.org")
            .with_sender("@alice:example.org");

        assert_eq!(event.event_type, "m.room.member");
        assert_eq!(event.state_key.as_deref(), Some("@bob:example.org"));
        assert_eq!(event.content.get_str("membership"), Some("invite"));
        assert_eq!(event.sender, "@alice:example.org");
    }
}
