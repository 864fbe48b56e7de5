use std::collections::VecDeque;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::application::cache::SharedSession;
use crate::domain::models::JoinRequest;

pub type MatchmakingQueue = BoundedQueue<JoinRequest>;
pub type OpponentQueue = BoundedQueue<SharedSession>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("queue is closed")]
pub struct QueueClosed;

/// Bounded FIFO with blocking-producer backpressure.
///
/// `enqueue` suspends while the queue is full instead of dropping or
/// erroring; `dequeue` suspends while it is empty. Both fail only after
/// [`close`](Self::close). The head can be inspected without consuming it,
/// and an item is handed to exactly one consumer even under concurrent
/// dequeues.
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    open_slots: Semaphore,
    ready_items: Semaphore,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            open_slots: Semaphore::new(capacity),
            ready_items: Semaphore::new(0),
        }
    }

    /// Appends `item`, waiting for a free slot while the queue is full.
    pub async fn enqueue(&self, item: T) -> Result<(), QueueClosed> {
        let permit = self.open_slots.acquire().await.map_err(|_| QueueClosed)?;
        permit.forget();
        self.items.lock().push_back(item);
        self.ready_items.add_permits(1);
        Ok(())
    }

    /// Removes and returns the head, waiting while the queue is empty.
    pub async fn dequeue(&self) -> Result<T, QueueClosed> {
        let permit = self.ready_items.acquire().await.map_err(|_| QueueClosed)?;
        permit.forget();
        let item = self
            .items
            .lock()
            .pop_front()
            .expect("a ready permit always covers a queued item");
        self.open_slots.add_permits(1);
        Ok(item)
    }

    /// Clones the head without removing it.
    pub fn try_peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.items.lock().front().cloned()
    }

    /// How many items are currently waiting.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Shuts the queue down: pending and future enqueues and dequeues fail
    /// with [`QueueClosed`].
    pub fn close(&self) {
        self.open_slots.close();
        self.ready_items.close();
    }
}
