//! Session registry: live sign-ins keyed by session id

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::UserSession;
use crate::shared::ShutdownSignal;

#[derive(Debug, Clone)]
struct SessionEntry {
    user: UserSession,
    expires_at: DateTime<Utc>,
}

/// Thread-safe registry of signed-in users
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
}

/// Shared, reference-counted session registry
pub type SharedSessionRegistry = Arc<SessionRegistry>;

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared() -> SharedSessionRegistry {
        Arc::new(Self::new())
    }

    /// Register a session and return its id.
    pub fn open(&self, user: UserSession, expires_at: DateTime<Utc>) -> String {
        let sid = Uuid::new_v4().to_string();
        debug!(email = %user.email, sid = %sid, "Opening session");
        self.sessions
            .insert(sid.clone(), SessionEntry { user, expires_at });
        sid
    }

    /// The live session for `sid`. Expired entries are dropped on sight.
    pub fn get(&self, sid: &str, now: DateTime<Utc>) -> Option<UserSession> {
        if let Some(entry) = self.sessions.get(sid) {
            if entry.expires_at > now {
                return Some(entry.user.clone());
            }
        }
        self.sessions.remove_if(sid, |_, entry| entry.expires_at <= now);
        None
    }

    /// `true` if a session was removed.
    pub fn close(&self, sid: &str) -> bool {
        self.sessions.remove(sid).is_some()
    }

    /// Drop every session expired at `now`; returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    /// Number of active sessions
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Purge expired sessions every `interval` until shutdown.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration, shutdown: ShutdownSignal) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            info!(
                "Session sweeper started (interval: {}s)",
                interval.as_secs()
            );
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = registry.purge_expired(Utc::now());
                        if purged > 0 {
                            debug!(purged, "Purged expired sessions");
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("Session sweeper stopped");
                        break;
                    }
                }
            }
        });
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
