use serde_json::Value;
use tracing::debug;

use crate::broker::{Delivery, LoadId, LocationUpdate};
use crate::hub::Hub;
use crate::transport::message::ServerMessage;
use crate::utils::Result;

/// Stateless routing from a load id to its tracking topic.
#[derive(Debug, Clone)]
pub struct LocationFanout {
    hub: Hub,
}

impl LocationFanout {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    /// Validate `load_id` and forward `payload` untouched to everyone
    /// tracking that load. Nobody tracking it is not an error.
    pub fn report_location(&self, load_id: impl Into<String>, payload: Value) -> Result<Delivery> {
        let load_id = LoadId::parse(load_id)?;
        Ok(self.publish(LocationUpdate::new(load_id, payload)))
    }

    pub fn publish(&self, update: LocationUpdate) -> Delivery {
        let topic = update.load_id.topic();
        let delivery = self
            .hub
            .publish(&topic, &ServerMessage::location_updated(update));
        if delivery.delivered == 0 && delivery.failed == 0 {
            debug!("Location for {topic} had no trackers");
        }
        delivery
    }
}
