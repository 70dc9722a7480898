//! mxstate Application Service Library
//!
//! Author: arkSong <arksong2018@gmail.com>
//! Version: 0.11.0-alpha
//! Date: 2024-03-21
//!
//! Receives event transactions pushed by a homeserver, keeps the room state
//! of every room it hears about in a [`RoomRegistry`], and hands each event
//! to registered listeners. Also provides the JSON response helpers used to
//! answer the homeserver.

use std::sync::Arc;

use mxstate_core::Event;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{AppserviceError, ErrorCode, Result};
pub use handlers::{respond, write_blank_ok};
pub use mxstate_core::RoomRegistry;
pub use routes::create_router;
pub use server::Appservice;

/// The events of one homeserver transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

/// A callback receiving every event of every transaction
pub type EventListener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Application service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppserviceConfig {
    /// Token the homeserver authenticates its requests with
    pub hs_token: String,

    /// Number of recent transaction IDs remembered for deduplication
    pub transaction_cache_size: usize,

    /// Maximum accepted request body, in bytes
    pub max_request_size: usize,
}

impl Default for AppserviceConfig {
    fn default() -> Self {
        Self {
            hs_token: String::new(),
            transaction_cache_size: 1024,
            max_request_size: 20 * 1024 * 1024,
        }
    }
}

impl AppserviceConfig {
    /// Create a configuration with the given homeserver token
    pub fn new<T: Into<String>>(hs_token: T) -> Self {
        Self {
            hs_token: hs_token.into(),
            ..Default::default()
        }
    }
}
