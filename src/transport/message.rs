//! Wire protocol
//!
//! JSON text frames tagged by `type`, with camelCase field names. Identifier
//! fields accept a string or a number and default to an empty string when
//! absent, so a missing id is reported the same way as an empty one.
//! `updateLocation` must carry a `payload`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::broker::message::LocationUpdate;

/// Read an identifier given as either a JSON string or a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the inbox topic of a user.
    #[serde(rename_all = "camelCase")]
    Join {
        #[serde(default, deserialize_with = "string_or_number")]
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Leave {
        #[serde(default, deserialize_with = "string_or_number")]
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    TrackLoad {
        #[serde(default, deserialize_with = "string_or_number")]
        load_id: String,
    },
    #[serde(rename_all = "camelCase")]
    StopTrackingLoad {
        #[serde(default, deserialize_with = "string_or_number")]
        load_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateLocation {
        #[serde(default, deserialize_with = "string_or_number")]
        load_id: String,
        payload: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    LocationUpdated {
        load_id: String,
        payload: Value,
        timestamp: i64,
    },
    Notification {
        event: String,
        payload: Value,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Outbound frame for a location update, stamped with the publish time.
    pub fn location_updated(update: LocationUpdate) -> Self {
        ServerMessage::LocationUpdated {
            load_id: update.load_id.as_str().to_string(),
            payload: update.payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
