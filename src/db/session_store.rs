use chrono::{DateTime, Duration, Utc};
use log::{debug, error};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::flash::FlashMessage;
use crate::models::trip::TripRecord;
use crate::services::trip_store::TripStore;

/// Everything the server keeps for one browser session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_trip: Option<TripRecord>,
    pub saved_trips: TripStore,
    pub flashes: Vec<FlashMessage>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_trip: None,
            saved_trips: TripStore::new(),
            flashes: Vec::new(),
            last_seen: now,
        }
    }
}

/// Process-wide, in-memory session storage. Nothing survives a restart.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Registers a fresh session and evicts idle ones.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, state| now - state.last_seen <= self.lifetime);
        if sessions.len() != before {
            debug!("Purged {} idle sessions", before - sessions.len());
        }
        sessions.insert(id.clone(), SessionState::new(now));
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the session's state under the write lock. A session
    /// that vanished (expired, or unknown id) is recreated empty.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let now = Utc::now();
        let mut sessions = self.write();
        let state = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionState::new(now));
        state.last_seen = now;
        f(state)
    }

    /// Like [`with_session`](Self::with_session) but leaves unknown ids alone.
    pub fn with_existing<R>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let mut sessions = self.write();
        let state = sessions.get_mut(id)?;
        state.last_seen = Utc::now();
        Some(f(state))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, SessionState>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            error!("Session store lock poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SessionState>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            error!("Session store lock poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }
}
