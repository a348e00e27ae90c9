//! Client representation
//!
//! `Client` models a connected socket and holds the sending side of a
//! per-connection channel. The transport's send loop drains the receiving
//! side onto the socket, so anything pushed here is delivered in push order.
//! `topics` is the reverse index of topic membership and is only updated by
//! the broker, which keeps it in step with each topic's subscriber set.

use std::collections::HashSet;

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::topic::{ConnectionId, TopicId};

#[derive(Debug)]
pub struct Client {
    pub id: ConnectionId,
    pub sender: UnboundedSender<WsMessage>,
    pub topics: HashSet<TopicId>,
}

impl Client {
    /// Create a client with a fresh `client-<uuid>` id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self::with_id(format!("client-{}", Uuid::new_v4()), sender)
    }

    pub fn with_id(id: impl Into<ConnectionId>, sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: id.into(),
            sender,
            topics: HashSet::new(),
        }
    }

    /// Push a frame onto the outbound channel. Returns `false` once the
    /// receiving side has gone away.
    pub fn send(&self, msg: WsMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}
