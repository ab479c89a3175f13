//! Unit-state sampling core
//!
//! Handle caching, state classification and the bulk scans that fold many
//! unit states into one health signal.

pub mod aggregate;
pub mod cache;
pub mod reload;
pub mod session;
pub mod state;
