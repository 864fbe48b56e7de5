use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::models::GameSession;

/// The one handle to a live session. Both participants' cache keys and the
/// opponent queue all alias the same lock, so every mutation is serialized
/// through the write guard.
pub type SharedSession = Arc<RwLock<GameSession>>;

pub fn shared(session: GameSession) -> SharedSession {
    Arc::new(RwLock::new(session))
}

/// Keyed store of live sessions, one entry per participant, with a sliding
/// expiry owned by the implementation.
pub trait SessionCache: Send + Sync {
    fn set(&self, user_id: &str, session: SharedSession);
    fn get(&self, user_id: &str) -> Option<SharedSession>;
    fn remove(&self, user_id: &str);
}
