//! Connection registry
//!
//! Tracks every live connection and the topics it belongs to. The registry
//! holds the connection → topics direction of membership; the broker holds
//! topic → connections and is the only caller of `attach`/`detach`, which is
//! how the two directions stay symmetric.

use std::collections::HashMap;

use crate::broker::topic::{ConnectionId, TopicId};
use crate::client::Client;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Client>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a client. A previous client registered under the same id is
    /// returned so the caller can clean up its memberships.
    pub fn register(&mut self, client: Client) -> Option<Client> {
        self.connections.insert(client.id.clone(), client)
    }

    /// Remove a client, returning it with the topics it still belonged to.
    /// Unknown ids are a no-op.
    pub fn unregister(&mut self, id: &str) -> Option<Client> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    /// Record that `id` joined `topic`. Returns `false` for unknown ids or
    /// when the link already existed.
    pub fn attach(&mut self, id: &str, topic: &TopicId) -> bool {
        match self.connections.get_mut(id) {
            Some(client) => client.topics.insert(topic.clone()),
            None => false,
        }
    }

    /// Drop the `id` → `topic` link. Returns `false` if it was not there.
    pub fn detach(&mut self, id: &str, topic: &TopicId) -> bool {
        match self.connections.get_mut(id) {
            Some(client) => client.topics.remove(topic),
            None => false,
        }
    }

    pub fn topics_of(&self, id: &str) -> Vec<TopicId> {
        self.connections
            .get(id)
            .map(|client| client.topics.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.connections.keys()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Remove every client at once.
    pub fn drain(&mut self) -> Vec<Client> {
        self.connections.drain().map(|(_, client)| client).collect()
    }
}
