//! WebSocket connection lifecycle: frame handling and the per-player echo session.

pub mod echo;
pub mod session;
