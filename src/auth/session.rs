//! Session store for depot.
//!
//! Maps opaque bearer tokens to user ids with a per-entry time-to-live.
//! The store has no background sweeper requirement; expired entries are
//! removed lazily when `get` touches them, plus on explicit `cleanup`
//! calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// Default session duration (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// A single token entry.
#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new(user_id: i64, ttl: Duration) -> Self {
        let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
        Self {
            user_id,
            expires_at,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Ephemeral token -> user id mapping with per-key expiry.
///
/// A token resolves to at most one user at any instant; absence (unknown
/// or expired) means unauthenticated. Interior locking lets a single
/// shared handle serve all requests.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh opaque session token.
    pub fn generate_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Store a token -> user mapping that expires after `ttl`.
    pub fn set(&self, token: impl Into<String>, user_id: i64, ttl: Duration) {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .insert(token.into(), SessionEntry::new(user_id, ttl));
    }

    /// Resolve a token to a user id.
    ///
    /// Returns `None` for unknown and expired tokens alike; expired
    /// entries are removed on the way out. Never errors - callers treat
    /// absence as unauthorized.
    pub fn get(&self, token: &str) -> Option<i64> {
        let mut entries = self.entries.lock().expect("session store lock poisoned");

        match entries.get(token) {
            Some(entry) if entry.is_expired() => {
                entries.remove(token);
                debug!(token = %token, "Session expired on lookup");
                None
            }
            Some(entry) => Some(entry.user_id),
            None => None,
        }
    }

    /// Remove a token immediately.
    ///
    /// Returns `true` if the token was present (expired or not).
    pub fn delete(&self, token: &str) -> bool {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .remove(token)
            .is_some()
    }

    /// Sweep out expired entries to bound memory growth.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().expect("session store lock poisoned");
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Cleaned up expired sessions");
        }
        removed
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
