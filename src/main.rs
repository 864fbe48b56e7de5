use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use senet_server::application::cache::SessionCache;
use senet_server::application::matchmaking::MatchmakingService;
use senet_server::application::notify::Notifier;
use senet_server::application::opponent::OpponentService;
use senet_server::application::queue::BoundedQueue;
use senet_server::config::AppConfig;
use senet_server::infrastructure::connections::ConnectionRegistry;
use senet_server::infrastructure::memory_cache::MemorySessionCache;
use senet_server::infrastructure::notifier::ChannelNotifier;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load();
    let cancel = CancellationToken::new();

    let connections = Arc::new(ConnectionRegistry::new());
    let cache: Arc<dyn SessionCache> = Arc::new(MemorySessionCache::new(config.cache.sliding_ttl()));
    let (notifier, mut outbox) = ChannelNotifier::new(256);
    let notifier: Arc<dyn Notifier> = Arc::new(notifier);

    let matchmaking_queue = Arc::new(BoundedQueue::new(config.matchmaking.queue_capacity));
    let opponent_queue = Arc::new(BoundedQueue::new(config.opponent.queue_capacity));

    let matchmaking = Arc::new(MatchmakingService::new(
        Arc::clone(&matchmaking_queue),
        Arc::clone(&connections),
        Arc::clone(&cache),
        Arc::clone(&notifier),
        config.matchmaking.clone(),
        cancel.clone(),
    ));
    let opponent = Arc::new(OpponentService::new(
        Arc::clone(&opponent_queue),
        Arc::clone(&cache),
        Arc::clone(&notifier),
        config.opponent.clone(),
        cancel.clone(),
    ));

    let matchmaking_task = tokio::spawn(matchmaking.run());
    let opponent_task = tokio::spawn(opponent.run());

    // The transport layer owns real delivery; until one is wired in, surface
    // outbound events in the log.
    let outbox_task = tokio::spawn(async move {
        while let Some(delivery) = outbox.recv().await {
            info!(recipient = %delivery.recipient, event = delivery.event.name(), "outbound notification");
        }
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
    }
    info!("shutting down");

    cancel.cancel();
    matchmaking_queue.close();
    opponent_queue.close();

    if let Err(err) = matchmaking_task.await {
        error!(%err, "matchmaking task failed");
    }
    if let Err(err) = opponent_task.await {
        error!(%err, "opponent task failed");
    }
    drop(notifier);
    if let Err(err) = outbox_task.await {
        error!(%err, "outbox task failed");
    }
}
