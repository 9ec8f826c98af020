//! Real-time Endpoint
//!
//! WebSocket sessions bridging dashboard clients to the broadcaster.

pub(crate) mod session;
pub(crate) mod socket;
