use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::application::cache::{SessionCache, SharedSession};

struct Entry {
    session: SharedSession,
    expires_at: Instant,
}

/// In-process [`SessionCache`] with a sliding expiry: every `get` pushes the
/// entry's deadline out by the configured TTL. Expired entries are dropped
/// lazily on access; [`purge_expired`](Self::purge_expired) sweeps the rest.
pub struct MemorySessionCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemorySessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Drops every entry past its deadline, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionCache for MemorySessionCache {
    fn set(&self, user_id: &str, session: SharedSession) {
        self.entries.insert(
            user_id.to_string(),
            Entry {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    fn get(&self, user_id: &str) -> Option<SharedSession> {
        let now = Instant::now();
        let mut expired = false;
        let session = self.entries.get_mut(user_id).and_then(|mut entry| {
            if entry.expires_at <= now {
                expired = true;
                None
            } else {
                entry.expires_at = now + self.ttl;
                Some(entry.session.clone())
            }
        });
        if expired {
            self.entries
                .remove_if(user_id, |_, entry| entry.expires_at <= now);
        }
        session
    }

    fn remove(&self, user_id: &str) {
        self.entries.remove(user_id);
    }
}
