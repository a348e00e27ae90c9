//! Location fan-out: turns a reported position for a load into one
//! `locationUpdated` frame for every connection tracking that load.

pub mod fanout;

pub use fanout::LocationFanout;

#[cfg(test)]
mod tests;
