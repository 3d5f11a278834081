//! Fan-out of encoded messages to every connected observer.

use crate::monitor::PinMessage;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the per-observer backlog before an observer counts as lagging.
pub const BROADCAST_CAPACITY: usize = 64;

/// Delivers messages to all subscribed observers.
///
/// Publishing never blocks and never fails. Each observer drains its own
/// receiver, so a slow observer cannot hold up the others.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Arc<PinMessage>>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(BROADCAST_CAPACITY)
    }
}

impl Broadcaster {
    /// Create a broadcaster that buffers up to `capacity` messages per observer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send `message` to every current subscriber and return how many there
    /// were. With no subscribers this is a silent no-op.
    pub fn publish(&self, message: PinMessage) -> usize {
        match self.tx.send(Arc::new(message)) {
            Ok(receivers) => {
                debug!("Published pin update to {} observers", receivers);
                receivers
            }
            Err(_) => 0,
        }
    }

    /// Register a new receiver. Only messages published afterwards are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PinMessage>> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
