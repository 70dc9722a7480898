//! Multi-room registry
//!
//! Owns one [`Room`] per tracked room and routes incoming state events to
//! them. The registry lock only guards the room map; every room keeps its
//! own lock for its state, so writers on different rooms never contend.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, info, instrument, warn};

use crate::config::StoreConfig;
use crate::state::Room;
use crate::traits::StateStore;
use crate::types::Event;
use crate::{MxStateError, Result};

/// The set of rooms an application is tracking
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    config: StoreConfig,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new(config: StoreConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get a tracked room
    pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room_id)
            .cloned()
    }

    /// Get a room, tracking it first if needed
    ///
    /// Unlike [`RoomRegistry::apply`] this ignores `auto_create_rooms`, but
    /// still honours `max_rooms`.
    pub fn room(&self, room_id: &str) -> Result<Arc<Room>> {
        if let Some(room) = self.get(room_id) {
            return Ok(room);
        }

        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(room) = rooms.get(room_id) {
            return Ok(Arc::clone(room));
        }
        self.check_capacity(&rooms, room_id)?;

        debug!("🏠 Tracking new room {}", room_id);
        let room = Arc::new(Room::new(room_id));
        rooms.insert(room_id.to_owned(), Arc::clone(&room));
        Ok(room)
    }

    /// Track a pre-built room, returning any room it replaced
    ///
    /// Replacing a tracked room is always allowed; adding a new one is
    /// subject to `max_rooms`.
    pub fn track(&self, room: Room) -> Result<Option<Arc<Room>>> {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        if !rooms.contains_key(room.id()) {
            self.check_capacity(&rooms, room.id())?;
        }
        Ok(rooms.insert(room.id().to_owned(), Arc::new(room)))
    }

    fn check_capacity(&self, rooms: &HashMap<String, Arc<Room>>, room_id: &str) -> Result<()> {
        match self.config.max_rooms {
            Some(max) if rooms.len() >= max => Err(MxStateError::LimitExceeded(format!(
                "cannot track {room_id}: already tracking {max} rooms"
            ))),
            _ => Ok(()),
        }
    }

    /// Route a state event to its room
    ///
    /// Events without a state key are not state and are skipped.
    #[instrument(level = "debug", skip(self, event), fields(event_type = %event.event_type))]
    pub fn apply(&self, event: Event) -> Result<()> {
        if !event.is_state() {
            debug!("⏭️ Skipping non-state event");
            return Ok(());
        }

        let Some(room_id) = event.room_id.clone() else {
            warn!("⚠️ State event has no room_id");
            return Err(MxStateError::InvalidEvent(format!(
                "{} state event has no room_id",
                event.event_type
            )));
        };

        let room = match self.get(&room_id) {
            Some(room) => room,
            None if self.config.auto_create_rooms => self.room(&room_id)?,
            None => {
                return Err(MxStateError::NotFound(format!("room {room_id} is not tracked")));
            }
        };

        room.update_state(event);
        Ok(())
    }

    /// Stop tracking a room, returning it if it was tracked
    pub fn forget(&self, room_id: &str) -> Option<Arc<Room>> {
        let removed = self
            .rooms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(room_id);
        if removed.is_some() {
            info!("👋 Stopped tracking room {}", room_id);
        }
        removed
    }

    /// IDs of every tracked room
    pub fn room_ids(&self) -> Vec<String> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
