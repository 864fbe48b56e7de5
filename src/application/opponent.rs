use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::cache::{SessionCache, SharedSession};
use crate::application::notify::{Event, Notifier};
use crate::application::queue::{OpponentQueue, QueueClosed};
use crate::config::OpponentConfig;

/// Plays the scripted side of queued games, one session at a time.
///
/// A session is enqueued whenever the turn passes to the scripted player.
/// The worker keeps moving while the throw grants extra turns (1, 4 or 5)
/// and legal moves exist; with no legal move it passes once and stops.
pub struct OpponentService {
    queue: Arc<OpponentQueue>,
    cache: Arc<dyn SessionCache>,
    notifier: Arc<dyn Notifier>,
    config: OpponentConfig,
    cancel: CancellationToken,
}

impl OpponentService {
    pub fn new(
        queue: Arc<OpponentQueue>,
        cache: Arc<dyn SessionCache>,
        notifier: Arc<dyn Notifier>,
        config: OpponentConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue,
            cache,
            notifier,
            config,
            cancel,
        }
    }

    pub async fn run(self: Arc<Self>) {
        info!("scripted opponent service running");

        loop {
            let session = tokio::select! {
                _ = self.cancel.cancelled() => break,
                dequeued = self.queue.dequeue() => match dequeued {
                    Ok(session) => session,
                    Err(QueueClosed) => break,
                }
            };
            self.play_turn(&session).await;
        }
    }

    async fn play_turn(&self, session: &SharedSession) {
        let (scripted, human) = {
            let game = session.read().await;
            match (game.scripted_player(), game.human_player()) {
                (Some(scripted), Some(human)) => (scripted.clone(), human.clone()),
                _ => {
                    warn!("queued session has no scripted side, skipping");
                    return;
                }
            }
        };
        debug!(user_id = %human.user_id, "scripted opponent playing turn");

        let mut still_moving = true;
        while still_moving {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(self.config.think_delay()) => {}
            }

            let (board, winner) = {
                let mut game = session.write().await;
                still_moving = matches!(game.board.sticks_value, 1 | 4 | 5);
                let pick = game
                    .board
                    .movable_positions
                    .choose(&mut rand::thread_rng())
                    .copied();
                match pick {
                    Some(source) => {
                        debug!(
                            source,
                            distance = game.board.sticks_value,
                            "scripted opponent moving pawn"
                        );
                        if let Err(err) = game.board.move_pawn(source) {
                            error!(%err, "scripted move was declined");
                        }
                        game.board.roll_sticks();
                    }
                    None => {
                        game.board.pass_turn();
                        debug!(user_id = %human.user_id, "scripted opponent passing turn");
                        still_moving = false;
                    }
                }
                (game.board.clone(), game.winner().cloned())
            };

            self.notifier
                .notify(std::slice::from_ref(&human.user_id), Event::BoardUpdated(board))
                .await;

            if let Some(winner) = winner {
                info!(winner = %winner.display_name, "game over");
                self.notifier
                    .notify(std::slice::from_ref(&human.user_id), Event::GameOver(winner))
                    .await;
                self.cache.remove(&human.user_id);
                self.cache.remove(&scripted.user_id);
                return;
            }
        }
        debug!(user_id = %human.user_id, "scripted opponent finished turn");
    }
}
