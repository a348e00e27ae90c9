//! The `transport` module is the socket boundary.
//!
//! It defines the JSON protocol spoken with clients, decodes and dispatches
//! inbound frames into the hub, and runs the WebSocket server that owns each
//! connection's lifecycle.

pub mod dispatch;
pub mod message;
pub mod websocket;

pub use dispatch::Dispatcher;
pub use message::{ClientMessage, ServerMessage};
pub use websocket::{serve, start_websocket_server};
