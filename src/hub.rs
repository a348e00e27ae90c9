//! Shared service object
//!
//! `Hub` owns the one `Broker` instance behind a mutex and is the only way
//! the rest of the process reaches it. It is built by the entry point,
//! cloned into every task that needs to publish or subscribe, and shut down
//! explicitly with `shutdown`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broker, ConnectionId, Delivery, TopicId, UserId};
use crate::client::Client;
use crate::config::Settings;
use crate::transport::message::ServerMessage;
use crate::utils::{LoadcastError, Result};

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub connections: usize,
    pub topics: usize,
}

#[derive(Debug, Clone)]
pub struct Hub {
    broker: Arc<Mutex<Broker>>,
    closed: Arc<AtomicBool>,
    max_connections: usize,
}

impl Hub {
    pub fn new(max_connections: usize) -> Self {
        Self {
            broker: Arc::new(Mutex::new(Broker::new())),
            closed: Arc::new(AtomicBool::new(false)),
            max_connections,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.broker.max_connections)
    }

    // Membership is updated before any call returns; a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Broker> {
        self.broker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new connection for `sender` and return its id. Refused
    /// once `shutdown` has started.
    pub fn connect(&self, sender: UnboundedSender<WsMessage>) -> Result<ConnectionId> {
        let mut broker = self.lock();
        // checked under the lock; shutdown sets the flag before draining
        if self.closed.load(Ordering::SeqCst) {
            return Err(LoadcastError::ShuttingDown);
        }
        if broker.connection_count() >= self.max_connections {
            warn!("Refusing connection: limit of {} reached", self.max_connections);
            return Err(LoadcastError::ConnectionLimit(self.max_connections));
        }
        let client = Client::new(sender);
        let id = client.id.clone();
        broker.register(client);
        info!("{id} connected");
        Ok(id)
    }

    /// Unregister a connection and remove it from all its topics.
    pub fn disconnect(&self, id: &str) -> bool {
        let removed = self.lock().unregister(id);
        if removed {
            info!("{id} disconnected");
        }
        removed
    }

    pub fn join(&self, id: &str, topic: TopicId) -> bool {
        self.lock().join(id, topic)
    }

    pub fn leave(&self, id: &str, topic: &TopicId) -> bool {
        self.lock().leave(id, topic)
    }

    pub fn publish<T: Serialize>(&self, topic: &TopicId, message: &T) -> Delivery {
        self.lock().publish(topic, message)
    }

    pub fn send_to<T: Serialize>(&self, id: &str, message: &T) -> bool {
        self.lock().send_to(id, message)
    }

    /// Push an application event into a user's inbox topic.
    pub fn notify_user(&self, user: &UserId, event: impl Into<String>, payload: Value) -> Delivery {
        let message = ServerMessage::Notification {
            event: event.into(),
            payload,
        };
        self.publish(&TopicId::from(user.clone()), &message)
    }

    pub fn connections_of(&self, topic: &TopicId) -> Vec<ConnectionId> {
        self.lock().connections_of(topic)
    }

    pub fn topics_of(&self, id: &str) -> Vec<TopicId> {
        self.lock().topics_of(id)
    }

    pub fn active_topics(&self) -> Vec<TopicId> {
        self.lock().topics.keys().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> HubStats {
        let broker = self.lock();
        HubStats {
            connections: broker.connection_count(),
            topics: broker.topic_count(),
        }
    }

    /// Drop every connection and refuse new ones. Their outbound channels
    /// close, which ends the transport send loops. Returns how many
    /// connections were live.
    pub fn shutdown(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        let dropped = self.lock().drain();
        info!("Hub shut down; closed {dropped} connection(s)");
        dropped
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
