//! Infrastructure layer: shared connection registry and concrete transports.

pub mod registry;
pub mod transport;

pub use registry::{ConnectionRegistry, OutboundPath, Peer, OUTBOUND_CAPACITY};
