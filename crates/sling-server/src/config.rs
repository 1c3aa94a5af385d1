//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid JSON for [`ServerConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the lobby server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent players; further upgrades get 503.
    pub max_players: usize,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Origins allowed to open a WebSocket.
    ///
    /// Empty means allow all (dev mode). Non-empty requires an exact
    /// match on the `Origin` header; mismatches are rejected with 403.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_players: 64,
            max_message_size: 1024 * 1024, // 1 MiB
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Whether a connection with the given `Origin` header may upgrade.
    #[must_use]
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|o| self.allowed_origins.iter().any(|a| a == o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_host_and_port() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
    }

    #[test]
    fn default_max_players() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.max_players, 64);
    }

    #[test]
    fn default_max_message_size() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.max_message_size, 1024 * 1024);
    }

    #[test]
    fn default_allows_any_origin() {
        let cfg = ServerConfig::default();
        assert!(cfg.origin_allowed(Some("http://anywhere.example")));
        assert!(cfg.origin_allowed(None));
    }

    #[test]
    fn origin_list_is_exact_match() {
        let cfg = ServerConfig {
            allowed_origins: vec!["https://play.example".into()],
            ..ServerConfig::default()
        };
        assert!(cfg.origin_allowed(Some("https://play.example")));
        assert!(!cfg.origin_allowed(Some("https://evil.example")));
        assert!(!cfg.origin_allowed(Some("https://play.example.evil")));
    }

    #[test]
    fn origin_list_rejects_missing_header() {
        let cfg = ServerConfig {
            allowed_origins: vec!["https://play.example".into()],
            ..ServerConfig::default()
        };
        assert!(!cfg.origin_allowed(None));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
            max_players: 4,
            max_message_size: 512,
            allowed_origins: vec!["https://play.example".into()],
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.port, cfg.port);
        assert_eq!(back.max_players, cfg.max_players);
        assert_eq!(back.allowed_origins, cfg.allowed_origins);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let cfg: ServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.max_players, 64);
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"host":"0.0.0.0","port":9001}"#).unwrap();

        let cfg = ServerConfig::from_file(&path).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9001);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = ServerConfig::from_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn from_file_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ServerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
