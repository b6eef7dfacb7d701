//! # Change Notification
//!
//! Lets a UI binding re-read getters when the state they derive from changes.
//!
//! ```text
//! Store action ──► mutation applied ──► emitter.emit_change(StoreChange::Addresses)
//!                                              │
//!                        ┌─────────────────────┴──────────────────┐
//!                        ▼                                        ▼
//!                  NoOpEmitter                        ChannelEmitter (broadcast)
//!                  (tests, headless)                  UI subscribers re-render
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Which slice of state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreChange {
    LoginUser,
    Drawer,
    Addresses,
    Posts,
}

/// An event delivered to channel subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Changed { change: StoreChange },
    Error { message: String, retryable: bool },
}

/// Trait for emitting store events to a UI layer.
pub trait StoreEventEmitter: Send + Sync {
    /// Emits after a mutation has been applied.
    fn emit_change(&self, change: StoreChange);

    /// Emits when an action fails.
    fn emit_error(&self, error: &StoreError);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl StoreEventEmitter for NoOpEmitter {
    fn emit_change(&self, _change: StoreChange) {}
    fn emit_error(&self, _error: &StoreError) {}
}

/// Fans events out over a tokio broadcast channel.
///
/// Sending with no live subscribers is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: broadcast::Sender<StoreEvent>,
}

impl ChannelEmitter {
    /// Creates an emitter and its first subscriber.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<StoreEvent>) {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        (ChannelEmitter { tx }, rx)
    }

    /// Adds another subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl StoreEventEmitter for ChannelEmitter {
    fn emit_change(&self, change: StoreChange) {
        let _ = self.tx.send(StoreEvent::Changed { change });
    }

    fn emit_error(&self, error: &StoreError) {
        let _ = self.tx.send(StoreEvent::Error {
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;

    #[tokio::test]
    async fn test_channel_emitter_delivers_to_all_subscribers() {
        let (emitter, mut first) = ChannelEmitter::new(8);
        let mut second = emitter.subscribe();

        emitter.emit_change(StoreChange::Drawer);
        emitter.emit_error(&StoreError::from(BackendError::Unavailable("offline".into())));

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                StoreEvent::Changed {
                    change: StoreChange::Drawer
                }
            );
            match rx.recv().await.unwrap() {
                StoreEvent::Error { retryable, .. } => assert!(retryable),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_send_without_subscribers_is_dropped() {
        let (emitter, rx) = ChannelEmitter::new(1);
        drop(rx);
        emitter.emit_change(StoreChange::Posts);
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(StoreEvent::Changed {
            change: StoreChange::LoginUser,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "changed", "change": "login_user"})
        );
    }
}
