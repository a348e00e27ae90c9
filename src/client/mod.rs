//! The `client` module defines the connection side of the service.
//!
//! `Client` is the handle for one live socket session: its id, the sending
//! half of its outbound channel and the set of topics it has joined.
//! `ConnectionRegistry` owns every live `Client` keyed by id.

pub mod pubsub_client;
pub mod registry;

pub use pubsub_client::Client;
pub use registry::ConnectionRegistry;
