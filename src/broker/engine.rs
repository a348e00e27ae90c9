//! Broker engine
//!
//! The in-memory router responsible for:
//! - managing topics and their subscriber sets
//! - keeping the connection registry's reverse links in step with them
//! - fanning a published frame out to every current subscriber
//!
//! Concurrency and usage notes:
//! - The API is synchronous and meant to be held behind one lock (see
//!   `Hub`). Every join, leave, unregister and publish runs under that lock,
//!   so membership is never observed half-updated.
//! - Publishing only pushes onto unbounded per-connection channels and never
//!   awaits socket I/O, so the lock is held for time proportional to the
//!   subscriber count. Because pushes happen in lock order, two publishes to
//!   one topic reach every shared subscriber in the same order.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::topic::{ConnectionId, Topic, TopicId};
use crate::client::{Client, ConnectionRegistry};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct Broker {
    pub topics: HashMap<TopicId, Topic>,
    pub registry: ConnectionRegistry,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with no topics. If the id was already live the
    /// old handle's memberships are removed first.
    pub fn register(&mut self, client: Client) {
        let id = client.id.clone();
        if let Some(previous) = self.registry.register(client) {
            warn!("Connection {id} registered twice; dropping previous handle");
            self.remove_memberships(&id, previous.topics);
        }
    }

    /// Remove a connection and cascade it out of every topic it joined.
    /// Returns `false` if the id was unknown.
    pub fn unregister(&mut self, id: &str) -> bool {
        match self.registry.unregister(id) {
            Some(client) => {
                let joined = client.topics.len();
                self.remove_memberships(id, client.topics);
                debug!("Cleaned up {id} from {joined} topic(s)");
                true
            }
            None => false,
        }
    }

    /// Subscribe a connection to a topic, creating the topic if needed.
    /// Returns `true` only when the membership is new; repeated joins and
    /// joins from unknown connections change nothing.
    pub fn join(&mut self, id: &str, topic: TopicId) -> bool {
        if !self.registry.attach(id, &topic) {
            return false;
        }
        self.topics
            .entry(topic.clone())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(id.to_string())
    }

    /// Unsubscribe a connection. The topic entry is dropped once empty.
    /// Returns `false` if the connection was not a member.
    pub fn leave(&mut self, id: &str, topic: &TopicId) -> bool {
        self.registry.detach(id, topic);
        self.unsubscribe(id, topic)
    }

    /// Serialize `message` once and push it to every subscriber of `topic`.
    /// A broken channel is counted and skipped; it never stops the loop.
    pub fn publish<T: Serialize>(&self, topic: &TopicId, message: &T) -> Delivery {
        let mut delivery = Delivery::default();

        let Some(subscribers) = self.topics.get(topic) else {
            debug!("No subscribers on {topic}; dropping message");
            return delivery;
        };

        let frame = match serde_json::to_string(message) {
            Ok(json) => WsMessage::text(json),
            Err(e) => {
                warn!("Failed to serialize message for {topic}: {e}");
                return delivery;
            }
        };

        for sub_id in &subscribers.subscribers {
            match self.registry.get(sub_id) {
                Some(client) => {
                    if client.send(frame.clone()) {
                        delivery.delivered += 1;
                    } else {
                        warn!("Failed to deliver {topic} message to {sub_id}: channel closed");
                        delivery.failed += 1;
                    }
                }
                None => {
                    warn!("Subscriber {sub_id} on {topic} has no registered connection");
                    delivery.failed += 1;
                }
            }
        }

        debug!(
            "Published to {topic}: {} delivered, {} failed",
            delivery.delivered, delivery.failed
        );
        delivery
    }

    /// Push a frame to one connection only.
    pub fn send_to<T: Serialize>(&self, id: &str, message: &T) -> bool {
        let Some(client) = self.registry.get(id) else {
            return false;
        };
        match serde_json::to_string(message) {
            Ok(json) => client.send(WsMessage::text(json)),
            Err(e) => {
                warn!("Failed to serialize message for {id}: {e}");
                false
            }
        }
    }

    /// Snapshot of a topic's members. Empty for unknown topics.
    pub fn connections_of(&self, topic: &TopicId) -> Vec<ConnectionId> {
        self.topics
            .get(topic)
            .map(|t| t.subscribers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn topics_of(&self, id: &str) -> Vec<TopicId> {
        self.registry.topics_of(id)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Unregister every connection. Dropping the handles closes their
    /// outbound channels, which ends each transport send loop.
    pub fn drain(&mut self) -> usize {
        let clients = self.registry.drain();
        self.topics.clear();
        clients.len()
    }

    fn remove_memberships(&mut self, id: &str, topics: impl IntoIterator<Item = TopicId>) {
        for topic in topics {
            self.unsubscribe(id, &topic);
        }
    }

    fn unsubscribe(&mut self, id: &str, topic: &TopicId) -> bool {
        let Some(t) = self.topics.get_mut(topic) else {
            return false;
        };
        let removed = t.unsubscribe(id);
        if t.is_empty() {
            self.topics.remove(topic);
            debug!("Topic {topic} is empty; removed");
        }
        removed
    }
}
