//! Conversation storage
//!
//! State and booking context live between turns keyed by conversation id.
//! Storage sits behind a trait so a shared backend can replace the default
//! in-memory map. Horizontal scaling without one needs session affinity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use bbq_assistant_config::SessionConfig;
use bbq_assistant_core::{BookingContext, ConversationState};

use crate::ServerError;

/// Stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub state: ConversationState,
    pub context: BookingContext,
    pub turn_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    /// Fresh conversation at the greeting step
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: ConversationState::Greeting,
            context: BookingContext::default(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a completed turn
    pub fn advance(&mut self, state: ConversationState, context: BookingContext) {
        self.state = state;
        self.context = context;
        self.turn_count += 1;
        self.updated_at = Utc::now();
    }

    pub fn is_idle(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(timeout) {
            Ok(timeout) => now - self.updated_at > timeout,
            Err(_) => false,
        }
    }
}

/// Pluggable conversation storage
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<ConversationRecord>, ServerError>;

    /// Insert or replace
    async fn save(&self, record: ConversationRecord) -> Result<(), ServerError>;

    /// Returns whether a record was removed
    async fn remove(&self, id: &str) -> Result<bool, ServerError>;

    async fn list_ids(&self) -> Result<Vec<String>, ServerError>;

    /// Whether records are visible to other instances
    fn is_distributed(&self) -> bool;
}

/// Process-local store with a capacity bound and idle eviction
pub struct InMemoryConversationStore {
    records: RwLock<HashMap<String, ConversationRecord>>,
    max_sessions: usize,
    idle_timeout: Duration,
    cleanup_interval: Duration,
}

impl InMemoryConversationStore {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(1800),
            Duration::from_secs(60),
        )
    }

    pub fn with_config(max_sessions: usize, idle_timeout: Duration, cleanup_interval: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
            cleanup_interval,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_config(
            config.max_sessions,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.cleanup_interval_secs),
        )
    }

    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    /// Evict records idle past the timeout; returns how many went
    pub fn cleanup_expired(&self) -> usize {
        let mut records = self.records.write();
        self.cleanup_expired_internal(&mut records, Utc::now())
    }

    fn cleanup_expired_internal(
        &self,
        records: &mut HashMap<String, ConversationRecord>,
        now: DateTime<Utc>,
    ) -> usize {
        let before = records.len();
        records.retain(|id, record| {
            let keep = !record.is_idle(self.idle_timeout, now);
            if !keep {
                tracing::debug!(conversation_id = %id, "Expired conversation");
            }
            keep
        });
        before - records.len()
    }

    /// Periodic eviction. Send `true` on the returned channel to stop it.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let interval = store.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = store.cleanup_expired();
                        let remaining = store.count();
                        crate::metrics::set_active_conversations(remaining);
                        if removed > 0 {
                            tracing::info!(removed, remaining, "Conversation cleanup");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Conversation cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, id: &str) -> Result<Option<ConversationRecord>, ServerError> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn save(&self, record: ConversationRecord) -> Result<(), ServerError> {
        let mut records = self.records.write();

        if !records.contains_key(&record.id) && records.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut records, Utc::now());
            if records.len() >= self.max_sessions {
                tracing::warn!(max_sessions = self.max_sessions, "Conversation store full");
                return Err(ServerError::Session("Max sessions reached".to_string()));
            }
        }

        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, ServerError> {
        Ok(self.records.write().remove(id).is_some())
    }

    async fn list_ids(&self) -> Result<Vec<String>, ServerError> {
        Ok(self.records.read().keys().cloned().collect())
    }

    fn is_distributed(&self) -> bool {
        false
    }
}

/// One async mutex per conversation key
///
/// Holding the guard across load, step and save keeps overlapping turns for
/// one conversation from overwriting each other. An entry lives only while a
/// turn for its key holds or waits on it.
#[derive(Default)]
pub struct TurnLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TurnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> TurnGuard<'_> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        TurnGuard {
            guard: Some(lock.lock_owned().await),
            locks: self,
            key: key.to_string(),
        }
    }

    /// Remove the entry for `key` unless another turn still holds a handle to it
    fn release(&self, key: &str) {
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive turn for one conversation key; the entry is released on drop
pub struct TurnGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a TurnLocks,
    key: String,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the map holds the only remaining handle
        self.guard.take();
        self.locks.release(&self.key);
    }
}
