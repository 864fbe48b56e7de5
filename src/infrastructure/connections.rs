use std::collections::HashSet;

use dashmap::DashMap;

/// Concurrent registry of which users currently hold live connections.
///
/// Connection lifecycle events arrive from arbitrary tasks; the matchmaking
/// loop only ever reads it as a reachability predicate. A user either has a
/// fully visible connection set or no entry at all: per-key locking means
/// `has_any` never observes a half-updated set, and a user whose last
/// connection goes away is removed entirely.
#[derive(Default)]
pub struct ConnectionRegistry {
    user_connections: DashMap<String, HashSet<String>>,
    connection_users: DashMap<String, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: &str, connection_id: &str) {
        if user_id.is_empty() || connection_id.is_empty() {
            return;
        }
        self.user_connections
            .entry(user_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
        self.connection_users
            .insert(connection_id.to_string(), user_id.to_string());
    }

    pub fn unregister(&self, connection_id: &str) {
        let Some((_, user_id)) = self.connection_users.remove(connection_id) else {
            return;
        };
        if let Some(mut connections) = self.user_connections.get_mut(&user_id) {
            connections.remove(connection_id);
            let now_empty = connections.is_empty();
            drop(connections);
            if now_empty {
                self.user_connections
                    .remove_if(&user_id, |_, connections| connections.is_empty());
            }
        }
    }

    pub fn has_any(&self, user_id: &str) -> bool {
        self.user_connections
            .get(user_id)
            .is_some_and(|connections| !connections.is_empty())
    }

    pub fn list(&self, user_id: &str) -> Vec<String> {
        self.user_connections
            .get(user_id)
            .map(|connections| connections.iter().cloned().collect())
            .unwrap_or_default()
    }
}
