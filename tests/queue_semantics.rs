use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use senet_server::application::queue::{BoundedQueue, QueueClosed};

#[tokio::test]
async fn dequeue_order_matches_enqueue_order() {
    let queue = BoundedQueue::new(100);
    for n in 0..20 {
        queue.enqueue(n).await.unwrap();
    }
    assert_eq!(queue.len(), 20);

    for n in 0..20 {
        assert_eq!(queue.dequeue().await.unwrap(), n);
    }
    assert!(queue.is_empty());
}

#[tokio::test]
async fn peek_does_not_consume() {
    let queue = BoundedQueue::new(4);
    queue.enqueue("head").await.unwrap();
    queue.enqueue("tail").await.unwrap();

    assert_eq!(queue.try_peek(), Some("head"));
    assert_eq!(queue.try_peek(), Some("head"));
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.dequeue().await.unwrap(), "head");
    assert_eq!(queue.try_peek(), Some("tail"));
}

#[tokio::test]
async fn peek_on_empty_queue() {
    let queue: BoundedQueue<u32> = BoundedQueue::new(4);
    assert_eq!(queue.try_peek(), None);
}

#[tokio::test]
async fn enqueue_blocks_when_full() {
    let queue = Arc::new(BoundedQueue::new(2));
    queue.enqueue(1).await.unwrap();
    queue.enqueue(2).await.unwrap();

    // A third enqueue must suspend rather than drop or error.
    let blocked = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.enqueue(3).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished());

    // Freeing a slot lets it through, preserving order.
    assert_eq!(queue.dequeue().await.unwrap(), 1);
    blocked.await.unwrap().unwrap();
    assert_eq!(queue.dequeue().await.unwrap(), 2);
    assert_eq!(queue.dequeue().await.unwrap(), 3);
}

#[tokio::test]
async fn dequeue_blocks_until_item_arrives() {
    let queue = Arc::new(BoundedQueue::new(4));

    let waiting = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.dequeue().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiting.is_finished());

    queue.enqueue(7).await.unwrap();
    let item = timeout(Duration::from_secs(1), waiting)
        .await
        .expect("dequeue should wake")
        .unwrap();
    assert_eq!(item.unwrap(), 7);
}

#[tokio::test]
async fn each_item_reaches_exactly_one_consumer() {
    // Two concurrent consumers racing over the same heads must split the
    // items without duplication, the property that keeps an expired request
    // from also being paired.
    let queue = Arc::new(BoundedQueue::new(100));
    for n in 0..100u32 {
        queue.enqueue(n).await.unwrap();
    }

    let consumer = |queue: Arc<BoundedQueue<u32>>| {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                match timeout(Duration::from_millis(100), queue.dequeue()).await {
                    Ok(Ok(item)) => seen.push(item),
                    _ => break,
                }
            }
            seen
        })
    };
    let a = consumer(Arc::clone(&queue));
    let b = consumer(Arc::clone(&queue));

    let mut all = a.await.unwrap();
    all.extend(b.await.unwrap());
    all.sort_unstable();
    assert_eq!(all, (0..100).collect::<Vec<_>>());
}

#[tokio::test]
async fn close_fails_producers_and_consumers() {
    let queue: Arc<BoundedQueue<u32>> = Arc::new(BoundedQueue::new(2));

    let waiting = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move { queue.dequeue().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    queue.close();
    assert_eq!(waiting.await.unwrap(), Err(QueueClosed));
    assert_eq!(queue.enqueue(1).await, Err(QueueClosed));
    assert_eq!(queue.dequeue().await, Err(QueueClosed));
}
