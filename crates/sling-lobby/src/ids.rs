//! Connection identity.
//!
//! IDs are UUID v7 (time-ordered) generated via [`uuid::Uuid::now_v7`].
//! A `ConnectionId` is minted once when the transport accepts a
//! connection and is never reused, so it is safe to key registry state
//! on it for the whole connection lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, comparable handle for one live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Mint a new unique ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_has_prefix() {
        let id = ConnectionId::new();
        assert!(id.to_string().starts_with("conn_"));
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = std::collections::HashMap::new();
        let id = ConnectionId::new();
        let _ = map.insert(id, 1);
        assert_eq!(map.get(&id), Some(&1));
    }

    #[test]
    fn serde_roundtrip() {
        let id = ConnectionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: ConnectionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
