//! Application service state
//!
//! [`Appservice`] is shared by every request handler. It owns the room
//! registry that transactions are applied to, the registered listeners and
//! the memory of recently processed transaction IDs.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use axum::Router;
use lru::LruCache;
use mxstate_core::{Event, MxStateError, RoomRegistry};
use tracing::{debug, info, instrument, warn};

use crate::{routes, AppserviceConfig, EventList, EventListener};

/// Whether a transaction was applied or recognised as a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Applied,
    Duplicate,
}

/// Shared application service state
pub struct Appservice {
    config: AppserviceConfig,
    registry: Arc<RoomRegistry>,
    listeners: RwLock<Vec<EventListener>>,
    transactions: Mutex<LruCache<String, ()>>,
}

impl std::fmt::Debug for Appservice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Appservice")
            .field("registry", &self.registry)
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl Appservice {
    /// Create an application service applying state to `registry`
    pub fn new(config: AppserviceConfig, registry: Arc<RoomRegistry>) -> Self {
        let capacity = NonZeroUsize::new(config.transaction_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            registry,
            listeners: RwLock::new(Vec::new()),
            transactions: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn config(&self) -> &AppserviceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Register a callback for every received event
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the homeserver presented the configured token
    pub fn is_authorized(&self, token: Option<&str>) -> bool {
        matches!(token, Some(token) if !self.config.hs_token.is_empty() && token == self.config.hs_token)
    }

    /// Apply a transaction unless `txn_id` was already seen
    ///
    /// The ID is reserved before any event is applied, so a concurrent retry
    /// of the same transaction is reported as a duplicate. For each event the
    /// state goes to the registry first, then the event is handed to the
    /// listeners. Events the registry refuses are logged and skipped so one
    /// bad event does not make the homeserver retry the whole batch.
    #[instrument(level = "debug", skip(self, transaction), fields(events = transaction.events.len()))]
    pub fn handle_transaction(&self, txn_id: &str, transaction: EventList) -> TransactionOutcome {
        if self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(txn_id.to_owned(), ())
            .is_some()
        {
            debug!("🔁 Transaction {} already processed", txn_id);
            return TransactionOutcome::Duplicate;
        }

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut applied = 0usize;
        for event in transaction.events {
            if event.is_state() {
                match self.registry.apply(event.clone()) {
                    Ok(()) => applied += 1,
                    Err(MxStateError::NotFound(reason)) => debug!("⏭️ {}", reason),
                    Err(err) => warn!("⚠️ Skipping state event: {}", err),
                }
            }
            for listener in &listeners {
                listener(&event);
            }
        }

        info!("✅ Transaction {} processed, {} state events applied", txn_id, applied);
        TransactionOutcome::Applied
    }

    /// Build the HTTP router serving this application service
    pub fn router(self: Arc<Self>) -> Router {
        routes::create_router(self)
    }
}
