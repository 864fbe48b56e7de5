use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::notify::{Event, Notifier};

/// One event addressed to one recipient, ready for a transport layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub recipient: String,
    pub event: Event,
}

/// [`Notifier`] that fans events out into an mpsc outbox. The push transport
/// (or a test) drains the receiving end; if nobody is listening the events
/// are dropped, keeping delivery best-effort.
pub struct ChannelNotifier {
    outbox: mpsc::Sender<Delivery>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Delivery>) {
        let (outbox, inbox) = mpsc::channel(capacity);
        (Self { outbox }, inbox)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, recipients: &[String], event: Event) {
        for recipient in recipients {
            let delivery = Delivery {
                recipient: recipient.clone(),
                event: event.clone(),
            };
            if self.outbox.send(delivery).await.is_err() {
                debug!(event = event.name(), "notification outbox closed, dropping event");
            }
        }
    }
}
