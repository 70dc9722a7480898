//! Configuration for the room registry
//!
//! Loaded as the `[store]` table of the service configuration, or built
//! directly by library users.

use serde::{Deserialize, Serialize};

use crate::{MxStateError, Result};

/// Room registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Start tracking a room the first time one of its events is applied
    pub auto_create_rooms: bool,

    /// Number of rooms to reserve space for up front
    pub initial_capacity: usize,

    /// Upper bound on tracked rooms, `None` for unbounded
    pub max_rooms: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            auto_create_rooms: true,
            initial_capacity: 16,
            max_rooms: None,
        }
    }
}

impl StoreConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_rooms == Some(0) {
            return Err(MxStateError::InvalidConfig(
                "store.max_rooms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
