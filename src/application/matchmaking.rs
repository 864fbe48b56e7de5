use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::cache::{self, SessionCache};
use crate::application::notify::{Event, Notifier};
use crate::application::queue::{MatchmakingQueue, QueueClosed};
use crate::config::MatchmakingConfig;
use crate::domain::models::{GameSession, JoinRequest, Player};
use crate::infrastructure::connections::ConnectionRegistry;

/// Pairs queued join requests into games and expires requests that waited
/// too long.
///
/// [`run`](Self::run) drives two concurrent loops over the same queue: the
/// pairing loop consumes requests two at a time, the cleanup loop trims the
/// stale head on a fixed interval. Both observe the cancellation token, and
/// the cleanup loop is joined before `run` returns.
pub struct MatchmakingService {
    queue: Arc<MatchmakingQueue>,
    connections: Arc<ConnectionRegistry>,
    cache: Arc<dyn SessionCache>,
    notifier: Arc<dyn Notifier>,
    config: MatchmakingConfig,
    cancel: CancellationToken,
}

impl MatchmakingService {
    pub fn new(
        queue: Arc<MatchmakingQueue>,
        connections: Arc<ConnectionRegistry>,
        cache: Arc<dyn SessionCache>,
        notifier: Arc<dyn Notifier>,
        config: MatchmakingConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue,
            connections,
            cache,
            notifier,
            config,
            cancel,
        }
    }

    pub async fn run(self: Arc<Self>) {
        info!("matchmaking service running");

        let cleanup = tokio::spawn({
            let service = Arc::clone(&self);
            async move { service.cleanup_loop().await }
        });

        'pairing: loop {
            // The queue only blocks on dequeue, so wait for a full pair by
            // polling the count.
            while self.queue.len() < 2 {
                tokio::select! {
                    _ = self.cancel.cancelled() => break 'pairing,
                    _ = sleep(self.config.pair_poll()) => {}
                }
            }

            let first = tokio::select! {
                _ = self.cancel.cancelled() => break 'pairing,
                dequeued = self.queue.dequeue() => match dequeued {
                    Ok(request) => request,
                    Err(QueueClosed) => break 'pairing,
                }
            };
            debug!(user_id = %first.user_id, name = %first.display_name, "dequeued first match request");

            let second = tokio::select! {
                _ = self.cancel.cancelled() => break 'pairing,
                dequeued = self.queue.dequeue() => match dequeued {
                    Ok(request) => request,
                    Err(QueueClosed) => break 'pairing,
                }
            };
            debug!(user_id = %second.user_id, name = %second.display_name, "dequeued second match request");

            self.process_pair(first, second).await;
        }

        // Joined before shutdown completes so no expiry notification is
        // orphaned mid-send.
        if let Err(err) = cleanup.await {
            error!(%err, "cleanup task failed");
        }
    }

    async fn process_pair(&self, first: JoinRequest, second: JoinRequest) {
        info!(white = %first.user_id, black = %second.user_id, "paired players");

        let white = Player::human(first.user_id, first.display_name);
        let black = Player::human(second.user_id, second.display_name);
        let matched_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        let session = GameSession::new(white.clone(), black.clone());

        // Give both participants a window to come online before announcing.
        let deadline = Instant::now() + self.config.connection_timeout();
        while Instant::now() < deadline {
            if self.connections.has_any(&white.user_id) && self.connections.has_any(&black.user_id)
            {
                break;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(self.config.connection_poll()) => {}
            }
        }

        let connected: Vec<String> = [&white, &black]
            .into_iter()
            .filter(|player| self.connections.has_any(&player.user_id))
            .map(|player| player.user_id.clone())
            .collect();

        if connected.is_empty() {
            // Known gap: the requesters are neither requeued nor told.
            warn!(
                white = %white.user_id,
                black = %black.user_id,
                "neither participant became reachable, discarding session"
            );
            return;
        }
        if connected.len() < 2 {
            warn!(
                connected = %connected[0],
                "only one participant reachable, announcing to the connected subset"
            );
        }

        let board = session.board.clone();
        let shared = cache::shared(session);
        self.cache.set(&white.user_id, Arc::clone(&shared));
        self.cache.set(&black.user_id, shared);

        self.notifier
            .notify(
                &connected,
                Event::MatchFound {
                    white,
                    black,
                    matched_at_ms,
                },
            )
            .await;
        self.notifier
            .notify(&connected, Event::BoardUpdated(board))
            .await;
        debug!(users = ?connected, "announced match");
    }

    async fn cleanup_loop(&self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.config.cleanup_interval()) => {}
            }

            let mut removed = 0usize;
            while let Some(head) = self.queue.try_peek() {
                if head.enqueued_at.elapsed() <= self.config.queue_timeout() {
                    // FIFO: everything behind the head has waited less.
                    break;
                }
                let expired = tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    dequeued = self.queue.dequeue() => match dequeued {
                        Ok(request) => request,
                        Err(QueueClosed) => return,
                    }
                };
                if expired.user_id != head.user_id {
                    // Something else consumed the head between the peek and
                    // the dequeue; abort this pass instead of expiring more.
                    warn!(
                        expected = %head.user_id,
                        dequeued = %expired.user_id,
                        "queue head changed while expiring, aborting cleanup pass"
                    );
                    break;
                }
                self.notifier
                    .notify(std::slice::from_ref(&expired.user_id), Event::MatchNotFound)
                    .await;
                debug!(user_id = %expired.user_id, "removed expired match request");
                removed += 1;
            }

            if removed > 0 {
                info!(count = removed, "expired match requests cleaned up");
            }
        }
    }
}
