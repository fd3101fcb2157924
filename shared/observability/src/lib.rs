//! Chameleon observability.
//!
//! Subscriber setup for binaries built on the connectors. Libraries only
//! emit `tracing` events; installing a subscriber is left to the host.

pub mod init;

pub use init::*;
