//! Per-session publish channel.
//!
//! Each session id is a topic backed by a `tokio::sync::broadcast` channel.
//! Delivery is fire-and-forget: publishing never waits for subscribers, and
//! events sent while nobody is connected are dropped. This is a documented
//! at-most-once guarantee; clients re-fetch the full message list on
//! (re)connect to reconcile state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::store::EmailMessage;

/// Per-topic channel capacity. Slow subscribers past this lag drop events.
const TOPIC_CAPACITY: usize = 64;

/// Events delivered to clients joined to a session topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum PushEvent {
    /// One newly received message.
    #[serde(rename = "session:message")]
    Message(EmailMessage),
    /// The session's ttl elapsed and it was removed.
    #[serde(rename = "session:expired")]
    Expired,
}

/// Room-based publish hub keyed by session id.
#[derive(Debug, Clone, Default)]
pub struct PushHub {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<PushEvent>>>>,
}

impl PushHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a topic, creating it on first use.
    #[must_use]
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<PushEvent> {
        let mut topics = self.topics.write().unwrap();
        topics
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Deliver an event to everyone currently joined to the topic.
    ///
    /// Returns the number of receivers reached; zero means the event was
    /// dropped (no topic, or nobody listening).
    pub fn publish(&self, session_id: &str, event: PushEvent) -> usize {
        let topics = self.topics.read().unwrap();
        let Some(sender) = topics.get(session_id) else {
            debug!(session_id, "push event dropped, no topic");
            return 0;
        };
        sender.send(event).unwrap_or(0)
    }

    /// Drop the topic if its last receiver is gone.
    pub fn prune(&self, session_id: &str) {
        let mut topics = self.topics.write().unwrap();
        if topics
            .get(session_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            topics.remove(session_id);
        }
    }

    /// Number of live topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap().len()
    }
}
