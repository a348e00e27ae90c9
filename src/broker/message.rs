//! Identifier and event definitions for the broker
//!
//! `UserId` and `LoadId` can only be built through `parse`, which rejects
//! empty or whitespace-padded input. Everything past the transport boundary
//! therefore works with identifiers that are already known to be valid.
//!
//! `LocationUpdate` carries the routing key plus an opaque JSON payload; the
//! broker never inspects the payload.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::broker::topic::{TopicId, TopicKind};
use crate::utils::{LoadcastError, Result};

fn validate(raw: String, kind: TopicKind) -> Result<String> {
    if raw.is_empty() || raw.trim() != raw {
        return Err(LoadcastError::InvalidTopicIdentifier { kind });
    }
    Ok(raw)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        validate(raw.into(), TopicKind::UserInbox).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LoadId(String);

impl LoadId {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        validate(raw.into(), TopicKind::LoadTracking).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The load-tracking topic this load publishes to.
    pub fn topic(&self) -> TopicId {
        TopicId::LoadTracking(self.clone())
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A location report for one load. Forwarded, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub load_id: LoadId,
    pub payload: Value,
}

impl LocationUpdate {
    pub fn new(load_id: LoadId, payload: Value) -> Self {
        Self { load_id, payload }
    }
}
