//! NotificationHub: engine-owned pub-sub of committed mutation records.
//!
//! Backed by a `tokio::sync::broadcast` channel. Publishing never blocks and
//! never fails: with no subscribers the record is dropped, and a subscriber
//! that falls more than `capacity` records behind loses the oldest ones.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

use tandem_core::models::Notification;
use tandem_core::EventId;

#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire-and-forget publish.
    pub fn publish(&self, notification: Notification) {
        // An error only means nobody is listening.
        let _ = self.sender.send(notification);
    }

    /// Stream of every notification.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
            filter: None,
        }
    }

    /// Stream of notifications for one event.
    pub fn subscribe_event(&self, event_id: EventId) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
            filter: Some(event_id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A subscription, optionally filtered by event id.
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<Notification>,
    filter: Option<EventId>,
}

impl EventStream {
    fn wants(&self, notification: &Notification) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |id| &notification.event_id == id)
    }

    /// Wait for the next matching notification. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if self.wants(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching notification if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) if self.wants(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification subscriber lagged");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything currently buffered.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
