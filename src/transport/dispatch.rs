//! Inbound event dispatch
//!
//! Each text frame is decoded once into a `ClientMessage`, its identifiers
//! are validated, and it is applied to the hub as one independent unit of
//! work. The only output is an optional reply for the originating
//! connection; errors are never broadcast.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::broker::{LoadId, UserId};
use crate::hub::Hub;
use crate::tracking::LocationFanout;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::{LoadcastError, Result};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    hub: Hub,
    fanout: LocationFanout,
    strict_identifiers: bool,
}

impl Dispatcher {
    pub fn new(hub: Hub, strict_identifiers: bool) -> Self {
        let fanout = LocationFanout::new(hub.clone());
        Self {
            hub,
            fanout,
            strict_identifiers,
        }
    }

    /// Decode and apply one raw frame from connection `id`.
    pub fn handle_text(&self, id: &str, text: &str) -> Option<ServerMessage> {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.handle(id, msg),
            Err(err) => {
                let preview: String = text.chars().take(100).collect();
                self.reject(
                    id,
                    LoadcastError::MalformedMessage(format!("{err} | {preview}")),
                )
            }
        }
    }

    pub fn handle(&self, id: &str, msg: ClientMessage) -> Option<ServerMessage> {
        match self.apply(id, msg) {
            Ok(()) => None,
            Err(err) => self.reject(id, err),
        }
    }

    fn apply(&self, id: &str, msg: ClientMessage) -> Result<()> {
        match msg {
            ClientMessage::Join { user_id } => {
                let user = UserId::parse(user_id)?;
                if self.hub.join(id, user.clone().into()) {
                    info!("{id} joined inbox of user {user}");
                }
            }
            ClientMessage::Leave { user_id } => {
                let user = UserId::parse(user_id)?;
                if self.hub.leave(id, &user.clone().into()) {
                    info!("{id} left inbox of user {user}");
                }
            }
            ClientMessage::TrackLoad { load_id } => {
                let load = LoadId::parse(load_id)?;
                if self.hub.join(id, load.topic()) {
                    info!("{id} is tracking load {load}");
                }
            }
            ClientMessage::StopTrackingLoad { load_id } => {
                let load = LoadId::parse(load_id)?;
                if self.hub.leave(id, &load.topic()) {
                    info!("{id} stopped tracking load {load}");
                }
            }
            ClientMessage::UpdateLocation { load_id, payload } => {
                self.update_location(id, load_id, payload)?;
            }
        }
        Ok(())
    }

    fn update_location(&self, id: &str, load_id: String, payload: Value) -> Result<()> {
        let delivery = self.fanout.report_location(load_id, payload)?;
        debug!(
            "{id} reported a location: {} delivered, {} failed",
            delivery.delivered, delivery.failed
        );
        Ok(())
    }

    fn reject(&self, id: &str, err: LoadcastError) -> Option<ServerMessage> {
        warn!("Rejected message from {id}: {err}");
        self.strict_identifiers
            .then(|| ServerMessage::error(err.to_string()))
    }
}
