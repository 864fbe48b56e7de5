use async_trait::async_trait;
use serde::Serialize;

use crate::domain::board::BoardState;
use crate::domain::models::Player;

/// Push event delivered to clients over whatever transport the outer layer
/// provides.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    MatchFound {
        white: Player,
        black: Player,
        matched_at_ms: u64,
    },
    BoardUpdated(BoardState),
    GameOver(Player),
    MatchNotFound,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::MatchFound { .. } => "MatchFound",
            Event::BoardUpdated(_) => "BoardUpdated",
            Event::GameOver(_) => "GameOver",
            Event::MatchNotFound => "MatchNotFound",
        }
    }
}

/// Best-effort push notifier. Implementations must not fail upward; a
/// recipient without a live transport simply misses the event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipients: &[String], event: Event);
}
