//! # loadcast
//!
//! `loadcast` is the real-time location fan-out service of a logistics
//! platform. Clients connect over WebSockets, subscribe to the loads they
//! want to follow (and to their own user inbox), and every location report
//! for a load is pushed to the connections tracking it at that moment.
//!
//! ## Core Modules
//!
//! - `broker`: topic identifiers, membership and fan-out to subscribers.
//! - `client`: connection handles and the connection registry.
//! - `hub`: the shared, explicitly constructed service object.
//! - `tracking`: location reports routed to load-tracking topics.
//! - `transport`: wire protocol, inbound dispatch and the WebSocket server.
//! - `config`: layered configuration.
//! - `utils`: error type and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod hub;
pub mod tracking;
pub mod transport;
pub mod utils;

pub use hub::Hub;
