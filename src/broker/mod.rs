//! The `broker` module is the topic router: topic identifiers, the
//! membership map and fan-out to subscribed connections.

pub mod engine;
pub mod message;
pub mod topic;

pub use engine::{Broker, Delivery};
pub use message::{LoadId, LocationUpdate, UserId};
pub use topic::{ConnectionId, Topic, TopicId, TopicKind};
