use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use senet_server::application::cache::{self, SessionCache, SharedSession};
use senet_server::application::notify::{Event, Notifier};
use senet_server::application::opponent::OpponentService;
use senet_server::application::queue::{BoundedQueue, OpponentQueue};
use senet_server::config::OpponentConfig;
use senet_server::domain::models::{GameSession, Player};
use senet_server::infrastructure::memory_cache::MemorySessionCache;
use senet_server::infrastructure::notifier::{ChannelNotifier, Delivery};

struct Harness {
    queue: Arc<OpponentQueue>,
    cache: Arc<MemorySessionCache>,
    inbox: mpsc::Receiver<Delivery>,
    cancel: CancellationToken,
    service: tokio::task::JoinHandle<()>,
}

fn start() -> Harness {
    let queue = Arc::new(BoundedQueue::new(100));
    let cache = Arc::new(MemorySessionCache::new(Duration::from_secs(3600)));
    let (notifier, inbox) = ChannelNotifier::new(64);
    let cancel = CancellationToken::new();

    let config = OpponentConfig {
        queue_capacity: 100,
        think_delay_ms: 10,
    };
    let service = Arc::new(OpponentService::new(
        Arc::clone(&queue),
        Arc::clone(&cache) as Arc<dyn SessionCache>,
        Arc::new(notifier) as Arc<dyn Notifier>,
        config,
        cancel.clone(),
    ));
    let service = tokio::spawn(service.run());

    Harness {
        queue,
        cache,
        inbox,
        cancel,
        service,
    }
}

async fn next_delivery(inbox: &mut mpsc::Receiver<Delivery>) -> Delivery {
    timeout(Duration::from_secs(2), inbox.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notifier outbox closed")
}

fn scripted_vs(human: Player) -> (SharedSession, Player, Player) {
    let scripted = Player::scripted();
    let session = GameSession::new(scripted.clone(), human.clone());
    (cache::shared(session), scripted, human)
}

#[tokio::test]
async fn finishing_move_ends_the_game() {
    let mut harness = start();
    let (session, scripted, human) = scripted_vs(Player::human("u1", "AncientAnt1"));

    {
        let mut game = session.write().await;
        game.board.white_positions = vec![30, 30, 31, 32, 29];
        game.board.black_positions = vec![1, 3, 5, 7, 9];
        game.board.sticks_value = 1;
        game.board.is_white_turn = true;
        game.board.set_movable();
        assert_eq!(game.board.movable_positions, vec![29]);
    }
    harness.cache.set(&human.user_id, Arc::clone(&session));
    harness.cache.set(&scripted.user_id, Arc::clone(&session));

    harness.queue.enqueue(Arc::clone(&session)).await.unwrap();

    let update = next_delivery(&mut harness.inbox).await;
    assert_eq!(update.recipient, "u1");
    match &update.event {
        Event::BoardUpdated(board) => {
            assert!(board.white_positions.iter().all(|&pawn| pawn >= 30));
        }
        other => panic!("expected BoardUpdated, got {other:?}"),
    }

    let game_over = next_delivery(&mut harness.inbox).await;
    assert_eq!(game_over.recipient, "u1");
    match &game_over.event {
        Event::GameOver(winner) => assert_eq!(winner.user_id, scripted.user_id),
        other => panic!("expected GameOver, got {other:?}"),
    }

    // The finished session is evicted for both participants.
    assert!(harness.cache.get(&human.user_id).is_none());
    assert!(harness.cache.get(&scripted.user_id).is_none());

    harness.cancel.cancel();
    harness.queue.close();
    harness.service.await.unwrap();
}

#[tokio::test]
async fn no_legal_move_passes_once_and_yields() {
    let mut harness = start();
    let human = Player::human("u1", "AncientAnt1");
    let scripted = Player::scripted();
    // Scripted plays black here; a pawn on 27 cannot move with a throw of 4.
    let session = cache::shared(GameSession::new(human.clone(), scripted));

    {
        let mut game = session.write().await;
        game.board.white_positions = vec![0, 2, 4, 6, 8];
        game.board.black_positions = vec![27, 30, 30, 31, 32];
        game.board.sticks_value = 4;
        game.board.is_white_turn = false;
        game.board.set_movable();
        assert!(game.board.movable_positions.is_empty());
    }

    harness.queue.enqueue(Arc::clone(&session)).await.unwrap();

    let update = next_delivery(&mut harness.inbox).await;
    assert_eq!(update.recipient, "u1");
    match &update.event {
        Event::BoardUpdated(board) => {
            // The pass handed the turn to the human.
            assert!(board.is_white_turn);
            assert_eq!(board.black_positions, vec![27, 30, 30, 31, 32]);
        }
        other => panic!("expected BoardUpdated, got {other:?}"),
    }

    // The scripted side never double-passes in one invocation.
    assert!(
        timeout(Duration::from_millis(150), harness.inbox.recv())
            .await
            .is_err()
    );

    harness.cancel.cancel();
    harness.queue.close();
    harness.service.await.unwrap();
}

#[tokio::test]
async fn session_without_scripted_side_is_skipped() {
    let mut harness = start();
    let session = cache::shared(GameSession::new(
        Player::human("u1", "AncientAnt1"),
        Player::human("u2", "BoldBeetle2"),
    ));

    harness.queue.enqueue(session).await.unwrap();

    assert!(
        timeout(Duration::from_millis(150), harness.inbox.recv())
            .await
            .is_err()
    );

    harness.cancel.cancel();
    harness.queue.close();
    harness.service.await.unwrap();
}
