//! The `utils` module provides shared definitions used across `loadcast`:
//! the crate error type and tracing initialization.

pub mod error;
pub mod logging;

pub use error::{LoadcastError, Result};
