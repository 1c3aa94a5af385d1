//! # sling-lobby
//!
//! Lobby domain core for the Gravity Sling server.
//!
//! - [`ConnectionId`] — opaque identity for one live connection
//! - [`Slot`] / [`SlotAllocator`] — lowest-available player numbering,
//!   assign-on-connect / release-on-disconnect
//!
//! No I/O lives here; the transport layer (`sling-server`) calls in at
//! session start and session end.

#![deny(unsafe_code)]

pub mod allocator;
pub mod ids;

pub use allocator::{Slot, SlotAllocator};
pub use ids::ConnectionId;
