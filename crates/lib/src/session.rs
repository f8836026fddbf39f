//! # Conversation Store
//!
//! In-memory, per-session chat history. Sessions hold at most
//! `max_history` turns (oldest dropped first) and are evicted after
//! `idle_timeout` without a write. Liveness is validated on every access,
//! so a caller never sees turns from an expired session even between
//! sweeper runs. Nothing here is persisted.

use crate::types::{ChatRole, ChatTurn};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const DEFAULT_MAX_HISTORY: usize = 20;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct Session {
    turns: VecDeque<ChatTurn>,
    last_activity: Instant,
}

impl Session {
    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_activity.elapsed() > idle_timeout
    }
}

/// Point-in-time counters over live sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub messages: usize,
}

/// Bounded, self-expiring chat history keyed by opaque session id.
#[derive(Debug)]
pub struct ConversationStore {
    inner: Mutex<HashMap<String, Session>>,
    max_history: usize,
    idle_timeout: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY, DEFAULT_IDLE_TIMEOUT)
    }
}

impl ConversationStore {
    pub fn new(max_history: usize, idle_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_history,
            idle_timeout,
        }
    }

    /// Records a turn, trimming to the newest `max_history` and refreshing
    /// the idle clock. An expired session is dropped first, so the new
    /// turn starts a fresh history.
    pub fn append(&self, session_id: &str, role: ChatRole, content: impl Into<String>) {
        let mut map = self.lock();
        if map
            .get(session_id)
            .is_some_and(|s| s.is_expired(self.idle_timeout))
        {
            map.remove(session_id);
        }

        let session = map.entry(session_id.to_string()).or_insert_with(|| Session {
            turns: VecDeque::new(),
            last_activity: Instant::now(),
        });
        session.turns.push_back(ChatTurn {
            role,
            content: content.into(),
        });
        while session.turns.len() > self.max_history {
            session.turns.pop_front();
        }
        session.last_activity = Instant::now();
    }

    /// The recorded turns, oldest first. Empty for unknown or expired
    /// sessions; reading does not refresh the idle clock.
    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        let mut map = self.lock();
        match map.get(session_id) {
            Some(session) if session.is_expired(self.idle_timeout) => {
                map.remove(session_id);
                Vec::new()
            }
            Some(session) => session.turns.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn clear(&self, session_id: &str) {
        self.lock().remove(session_id);
    }

    /// Counts live sessions and their turns, evicting expired ones first.
    pub fn stats(&self) -> StoreStats {
        let mut map = self.lock();
        map.retain(|_, session| !session.is_expired(self.idle_timeout));
        StoreStats {
            sessions: map.len(),
            messages: map.values().map(|s| s.turns.len()).sum(),
        }
    }

    /// Evicts every expired session and reports how many were dropped.
    pub fn sweep(&self) -> usize {
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, session| !session.is_expired(self.idle_timeout));
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, remaining = map.len(), "evicted idle sessions");
        }
        evicted
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // Session state is disposable; a poisoned map is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `sweep` on a fixed interval until the returned handle is aborted.
pub fn spawn_sweeper(store: Arc<ConversationStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = store.sweep();
            if evicted > 0 {
                info!(evicted, "conversation sweeper evicted idle sessions");
            }
        }
    })
}
