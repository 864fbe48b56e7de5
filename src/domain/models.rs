use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::board::BoardState;

/// Display name used for the scripted side of singleplayer games.
pub const SCRIPTED_OPPONENT_NAME: &str = "Scribe";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Scripted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub display_name: String,
    pub kind: PlayerKind,
}

impl Player {
    pub fn human(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            kind: PlayerKind::Human,
        }
    }

    pub fn scripted() -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            display_name: SCRIPTED_OPPONENT_NAME.to_string(),
            kind: PlayerKind::Scripted,
        }
    }

    pub fn is_scripted(&self) -> bool {
        self.kind == PlayerKind::Scripted
    }
}

/// One player's request to be paired, owned by the matchmaking queue until
/// it is either paired or expired.
#[derive(Clone, Debug)]
pub struct JoinRequest {
    pub user_id: String,
    pub display_name: String,
    pub enqueued_at: Instant,
}

impl JoinRequest {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            enqueued_at: Instant::now(),
        }
    }
}

/// A live game between two players. Shared between both participants'
/// cache keys; see [`crate::application::cache::SharedSession`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    pub white: Player,
    pub black: Player,
    pub board: BoardState,
}

impl GameSession {
    pub fn new(white: Player, black: Player) -> Self {
        Self {
            white,
            black,
            board: BoardState::new(),
        }
    }

    /// The player whose five pawns are all home, if either side's are.
    pub fn winner(&self) -> Option<&Player> {
        if self.board.white_finished() {
            Some(&self.white)
        } else if self.board.black_finished() {
            Some(&self.black)
        } else {
            None
        }
    }

    pub fn scripted_player(&self) -> Option<&Player> {
        [&self.white, &self.black]
            .into_iter()
            .find(|player| player.is_scripted())
    }

    /// The human counterpart in a singleplayer game.
    pub fn human_player(&self) -> Option<&Player> {
        [&self.white, &self.black]
            .into_iter()
            .find(|player| !player.is_scripted())
    }
}
