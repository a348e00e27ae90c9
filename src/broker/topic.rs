//! Topic management
//!
//! A `Topic` holds the set of connection ids subscribed to one `TopicId`.
//! Topic identity is the pair (kind, raw id), so a user inbox and a load
//! channel keyed by the same string are distinct map keys and can never
//! cross-deliver.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the broker
//! lock) when modifying subscriptions.

use std::collections::HashSet;
use std::fmt;

use crate::broker::message::{LoadId, UserId};

pub type ConnectionId = String;

/// The two semantic classes of topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    UserInbox,
    LoadTracking,
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicKind::UserInbox => write!(f, "user"),
            TopicKind::LoadTracking => write!(f, "load"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicId {
    UserInbox(UserId),
    LoadTracking(LoadId),
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicId::UserInbox(user) => write!(f, "user-{user}"),
            TopicId::LoadTracking(load) => write!(f, "load-{load}"),
        }
    }
}

impl From<UserId> for TopicId {
    fn from(user: UserId) -> Self {
        TopicId::UserInbox(user)
    }
}

impl From<LoadId> for TopicId {
    fn from(load: LoadId) -> Self {
        TopicId::LoadTracking(load)
    }
}

#[derive(Debug)]
pub struct Topic {
    pub id: TopicId,
    pub subscribers: HashSet<ConnectionId>,
}

impl Topic {
    /// Create a new topic with no subscribers.
    pub fn new(id: TopicId) -> Self {
        Self {
            id,
            subscribers: HashSet::new(),
        }
    }

    /// Add a subscriber. Returns `false` if it was already present.
    pub fn subscribe(&mut self, id: ConnectionId) -> bool {
        self.subscribers.insert(id)
    }

    /// Remove a subscriber. Returns `false` if it was not present.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}
