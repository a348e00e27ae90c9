//! The `error` module defines the error taxonomy for `loadcast`.
//!
//! Only failures that a caller can act on live here. Unknown-target cases
//! (leaving a topic you never joined, unregistering a connection that is
//! already gone) are normal during disconnect races and are reported as
//! `false` or zero counts instead.

use thiserror::Error;

use crate::broker::topic::TopicKind;

#[derive(Debug, Error)]
pub enum LoadcastError {
    /// A user or load identifier was missing, empty or padded with whitespace.
    #[error("invalid {kind} identifier")]
    InvalidTopicIdentifier { kind: TopicKind },

    /// An inbound frame could not be decoded into a known event.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The registry already holds the configured maximum of live connections.
    #[error("connection limit of {0} reached")]
    ConnectionLimit(usize),

    /// The hub has been shut down and takes no new connections.
    #[error("server is shutting down")]
    ShuttingDown,

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoadcastError>;
