//! HTTP handlers for the SemNet REST API.
//!
//! Handlers are a thin layer over [`semnet_core::NetworkService`] — zero
//! reimplemented engine logic.

pub mod health;
pub mod network;

pub use health::health_check;
pub use network::generate_network;
