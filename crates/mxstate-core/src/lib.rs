//! mxstate Core Library
//!
//! Author: arkSong <arksong2018@gmail.com>
//! Version: 0.11.0-alpha
//! Date: 2024-03-21
//!
//! In-memory room state tracking for Matrix bots, bridges and clients.
//!
//! # Features
//! - Current room state keyed by `(event type, state key)`, last write wins
//! - Membership queries with a `leave` default for unknown users
//! - A registry routing state events to their rooms
//!
//! # Examples
//! ```rust
//! use mxstate_core::{Event, MembershipResolver, Result, RoomRegistry, StoreConfig};
//! use ruma::events::room::member::MembershipState;
//!
//! fn example() -> Result<()> {
//!     let registry = RoomRegistry::new(StoreConfig::default());
//!     registry.apply(
//!         Event::membership("@alice:example.org", MembershipState::Join)
//!             .with_room_id("!room:example.org"),
//!     )?;
//!
//!     let room = registry.room("!room:example.org")?;
//!     assert!(room.is_joined("@alice:example.org"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod membership;
pub mod registry;
pub mod state;
pub mod traits;
pub mod types;

pub use config::StoreConfig;
pub use error::{MxStateError, Result};
pub use membership::{MembershipLookup, MembershipResolver};
pub use registry::RoomRegistry;
pub use state::Room;
pub use traits::StateStore;
pub use types::{Content, Event, ROOM_MEMBER, ROOM_NAME};
