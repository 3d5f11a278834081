//! Observer connect/disconnect handling.
//!
//! A connect invalidates the shared baseline so the next sampling pass is a
//! full snapshot. Every observer shares one stream, so this resync is seen
//! by all observers, not only the newcomer.

use crate::error::{Result, ViewerError};
use crate::monitor::{PinMessage, ResetHandle};
use crate::web::broadcast::Broadcaster;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{info, warn};
use uuid::Uuid;

/// Reacts to observer connect and disconnect events.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle {
    broadcaster: Broadcaster,
    reset: ResetHandle,
    observers: Arc<AtomicUsize>,
    max_observers: usize,
}

impl ConnectionLifecycle {
    /// Create a lifecycle feeding `reset` and handing out `broadcaster`
    /// subscriptions.
    pub fn new(broadcaster: Broadcaster, reset: ResetHandle, max_observers: usize) -> Self {
        Self {
            broadcaster,
            reset,
            observers: Arc::new(AtomicUsize::new(0)),
            max_observers,
        }
    }

    /// Admit a new observer.
    ///
    /// The subscription is taken before the reset is requested, and the
    /// session drops every message produced before the reset was applied.
    /// The first message the observer receives is therefore a full snapshot.
    pub fn on_connect(&self) -> Result<ObserverSession> {
        let max = self.max_observers;
        self.observers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then_some(count + 1)
            })
            .map_err(|count| {
                ViewerError::web_server_error(format!(
                    "observer limit reached ({} of {})",
                    count, max
                ))
            })?;

        let receiver = self.broadcaster.subscribe();
        let min_generation = self.reset.request_reset();
        let session = ObserverSession {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            min_generation,
            receiver,
            lifecycle: self.clone(),
        };

        info!(
            "Observer {} connected, resync requested (generation {})",
            session.id, min_generation
        );
        Ok(session)
    }

    /// Record that an observer went away. No baseline change.
    pub fn on_disconnect(&self, id: Uuid) {
        let _ = self
            .observers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));
        info!("Observer {} disconnected", id);
    }

    /// Currently connected observers.
    pub fn observer_count(&self) -> usize {
        self.observers.load(Ordering::Acquire)
    }

    /// Configured observer limit.
    pub fn max_observers(&self) -> usize {
        self.max_observers
    }

    fn request_resync(&self) -> u64 {
        self.reset.request_reset()
    }
}

/// One connected observer's view of the broadcast stream.
///
/// Dropping the session reports the disconnect.
#[derive(Debug)]
pub struct ObserverSession {
    id: Uuid,
    connected_at: DateTime<Utc>,
    min_generation: u64,
    receiver: Receiver<Arc<PinMessage>>,
    lifecycle: ConnectionLifecycle,
}

impl ObserverSession {
    /// Session identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the observer connected.
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Wait for the next message for this observer.
    ///
    /// Messages older than the observer's last resync are skipped. If the
    /// observer fell behind and messages were dropped, a fresh resync is
    /// requested so it never shows a partial state. Returns `None` once the
    /// broadcaster is gone.
    pub async fn next_message(&mut self) -> Option<Arc<PinMessage>> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.generation >= self.min_generation => return Some(message),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    self.min_generation = self.lifecycle.request_resync();
                    warn!(
                        "Observer {} lagged by {} messages, resync requested (generation {})",
                        self.id, skipped, self.min_generation
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ObserverSession {
    fn drop(&mut self) {
        self.lifecycle.on_disconnect(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(generation: u64, payload: &str) -> PinMessage {
        PinMessage {
            generation,
            full_snapshot: false,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_connect_requests_reset() {
        let reset = ResetHandle::new();
        let lifecycle = ConnectionLifecycle::new(Broadcaster::default(), reset.clone(), 10);

        let _session = lifecycle.on_connect().unwrap();
        assert_eq!(reset.current(), 1);
        assert_eq!(lifecycle.observer_count(), 1);
    }

    #[test]
    fn test_disconnect_only_decrements() {
        let reset = ResetHandle::new();
        let lifecycle = ConnectionLifecycle::new(Broadcaster::default(), reset.clone(), 10);

        let session = lifecycle.on_connect().unwrap();
        drop(session);
        assert_eq!(lifecycle.observer_count(), 0);
        assert_eq!(reset.current(), 1);
    }

    #[test]
    fn test_observer_limit() {
        let lifecycle = ConnectionLifecycle::new(Broadcaster::default(), ResetHandle::new(), 1);
        let _first = lifecycle.on_connect().unwrap();
        assert!(matches!(lifecycle.on_connect(), Err(ViewerError::WebServer(_))));
        assert_eq!(lifecycle.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_messages_skipped() {
        let broadcaster = Broadcaster::default();
        let lifecycle = ConnectionLifecycle::new(broadcaster.clone(), ResetHandle::new(), 10);
        let mut session = lifecycle.on_connect().unwrap();

        broadcaster.publish(message(0, r#"{"4":1}"#));
        broadcaster.publish(message(1, r#"{"2":1,"4":1}"#));

        let first = session.next_message().await.unwrap();
        assert_eq!(first.payload, r#"{"2":1,"4":1}"#);
    }

    #[tokio::test]
    async fn test_lagging_observer_resyncs() {
        let broadcaster = Broadcaster::new(1);
        let reset = ResetHandle::new();
        let lifecycle = ConnectionLifecycle::new(broadcaster.clone(), reset.clone(), 10);
        let mut session = lifecycle.on_connect().unwrap();

        broadcaster.publish(message(1, r#"{"2":1}"#));
        broadcaster.publish(message(1, r#"{"2":0}"#));
        broadcaster.publish(message(2, r#"{"2":0,"4":0}"#));

        let next = session.next_message().await.unwrap();
        assert_eq!(next.generation, 2);
        assert_eq!(reset.current(), 2);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let lifecycle = ConnectionLifecycle::new(Broadcaster::default(), ResetHandle::new(), 10);
        let first = lifecycle.on_connect().unwrap();
        let second = lifecycle.on_connect().unwrap();
        assert_ne!(first.id(), second.id());
        assert!(first.connected_at() <= second.connected_at());
        assert_eq!(lifecycle.observer_count(), 2);
    }
}
