//! # Extension Relay
//!
//! Pushes finished prompts to every attached browser extension.
//!
//! ```text
//!  FinalReview ──try_deliver──▶ OutboundSink ──▶ broadcaster task
//!                                                    │ broadcast()
//!                        ┌───────────────────────────┼──────────────┐
//!                        ▼                           ▼              ▼
//!                  Subscription 1              Subscription 2      ...
//!                  (websocket task)            (websocket task)
//! ```
//!
//! `Relay` is an explicitly constructed service handed to whoever needs it;
//! there is no process-wide registry. Every hop is non-blocking: the sink
//! refuses messages when its queue is full, and a subscriber whose queue is
//! full or closed is dropped from the registry.

pub mod server;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages buffered per subscriber before it is considered stalled.
pub const SUBSCRIBER_QUEUE: usize = 16;

/// Messages the outbound sink holds while the broadcaster is busy.
pub const SINK_CAPACITY: usize = 1;

/// The message an extension receives: `{"type":"chatgpt-prompt","prompt":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt: String,
}

impl PromptMessage {
    pub const KIND: &'static str = "chatgpt-prompt";

    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            prompt: prompt.into(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Anything that can report how many consumers are attached right now.
pub trait ConsumerCount: Send + Sync {
    fn connected(&self) -> usize;
}

#[derive(Default)]
struct Registry {
    subscribers: Mutex<HashMap<u64, mpsc::Sender<String>>>,
    next_id: AtomicU64,
}

/// Subscriber registry plus fan-out.
#[derive(Clone, Default)]
pub struct Relay {
    inner: Arc<Registry>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, mpsc::Sender<String>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new consumer. It stays registered until dropped or until a
    /// delivery to it fails.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_QUEUE);
        self.subscribers().insert(id, sender);
        debug!("Subscriber {} registered", id);
        Subscription {
            id,
            relay: self.clone(),
            receiver,
        }
    }

    fn unsubscribe(&self, id: u64) {
        if self.subscribers().remove(&id).is_some() {
            debug!("Subscriber {} unregistered", id);
        }
    }

    /// Offer `message` to every subscriber without waiting. Returns how many
    /// accepted it; the ones that did not are removed.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut delivered = 0;
        self.subscribers()
            .retain(|id, sender| match sender.try_send(message.to_string()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(e) => {
                    warn!("Dropping subscriber {}: {}", id, e);
                    false
                }
            });
        delivered
    }

    /// Start the task that drains an `OutboundSink` into `broadcast`.
    ///
    /// Must be called from within a tokio runtime. The task ends once every
    /// clone of the returned sink has been dropped.
    pub fn spawn_broadcaster(&self) -> (OutboundSink, JoinHandle<()>) {
        let (sink, mut receiver) = OutboundSink::channel(SINK_CAPACITY);
        let relay = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                let delivered = relay.broadcast(&message);
                info!(
                    "Broadcast {} bytes to {} subscriber(s)",
                    message.len(),
                    delivered
                );
            }
            debug!("Broadcaster stopped");
        });
        (sink, handle)
    }
}

impl ConsumerCount for Relay {
    fn connected(&self) -> usize {
        self.subscribers().len()
    }
}

/// A registered consumer's inbox. Unregisters itself on drop.
pub struct Subscription {
    id: u64,
    relay: Relay,
    receiver: mpsc::Receiver<String>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next message, or `None` once the relay has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.relay.unsubscribe(self.id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("relay busy")]
    Busy,
    #[error("relay stopped")]
    Stopped,
}

/// Write side of the relay. Cheap to clone, never blocks.
#[derive(Debug, Clone)]
pub struct OutboundSink {
    sender: mpsc::Sender<String>,
}

impl OutboundSink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Hand `message` to the relay if it can take it right now.
    pub fn try_deliver(&self, message: String) -> Result<(), DeliveryError> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Busy,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Stopped,
        })
    }
}
