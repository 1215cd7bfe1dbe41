//! Read-only configuration lookup consumed by the core (spec §6).
//!
//! The core never parses files itself: it talks to a [`ConfigLookup`]
//! trait object, so unit tests can hand it an in-memory fake instead of a
//! real `config.toml`. [`TomlConfig`] is the production implementation,
//! mirroring `src/config.rs` / `src/config/links.rs` in the teacher.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A connect block: configuration authorising an incoming or outgoing
/// server link (spec glossary "Connect block").
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectBlock {
    pub name: String,
    pub address: String,
    #[serde(default = "default_digest")]
    pub encryption: String,
    pub send_password: String,
    pub receive_password: String,
}

fn default_digest() -> String {
    "sha256".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub name: String,
    pub sid: String,
    pub network: String,
    pub description: String,
    #[serde(default)]
    pub cloak_secret: String,
}

/// Parsed `config.toml`: one `[server]` table, zero or more `[[connect]]`
/// blocks, and a free-form `[extra]` table for anything else a pluggable
/// handler might want via `conf()`.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub server: ServerSection,
    #[serde(default, rename = "connect")]
    pub connects: Vec<ConnectBlock>,
    #[serde(default)]
    pub extra: HashMap<String, HashMap<String, String>>,
}

impl TomlConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn connect_block(&self, server_name: &str) -> Option<&ConnectBlock> {
        self.connects.iter().find(|c| c.name == server_name)
    }
}

/// The read-only lookup contract the core depends on (spec §6):
/// `conf(section, key)` for free-form settings, `conn(server_name, key)`
/// for connect-block fields (`address`, `encryption`, `send_password`,
/// `receive_password`).
pub trait ConfigLookup: Send + Sync {
    fn conf(&self, section: &str, key: &str) -> Option<String>;
    fn conn(&self, server_name: &str, key: &str) -> Option<String>;

    /// Whether a connect block exists at all for `server_name` (spec
    /// §4.C: "If no connect block exists for that name, close with
    /// *Invalid credentials*").
    fn has_connect_block(&self, server_name: &str) -> bool {
        self.conn(server_name, "address").is_some()
    }
}

impl ConfigLookup for TomlConfig {
    fn conf(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            ("server", "name") => Some(self.server.name.clone()),
            ("server", "sid") => Some(self.server.sid.clone()),
            ("server", "network") => Some(self.server.network.clone()),
            ("server", "description") => Some(self.server.description.clone()),
            ("server", "cloak_secret") => Some(self.server.cloak_secret.clone()),
            _ => self.extra.get(section).and_then(|t| t.get(key)).cloned(),
        }
    }

    fn conn(&self, server_name: &str, key: &str) -> Option<String> {
        let block = self.connect_block(server_name)?;
        match key {
            "address" => Some(block.address.clone()),
            "encryption" => Some(block.encryption.clone()),
            "send_password" => Some(block.send_password.clone()),
            "receive_password" => Some(block.receive_password.clone()),
            _ => None,
        }
    }
}

/// An in-memory lookup for unit tests, avoiding a filesystem round-trip.
#[derive(Default)]
pub struct FakeConfig {
    conf: HashMap<(String, String), String>,
    conn: HashMap<(String, String), String>,
}

impl FakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conf(mut self, section: &str, key: &str, value: &str) -> Self {
        self.conf.insert((section.to_string(), key.to_string()), value.to_string());
        self
    }

    pub fn with_conn(mut self, server_name: &str, key: &str, value: &str) -> Self {
        self.conn.insert((server_name.to_string(), key.to_string()), value.to_string());
        self
    }
}

impl ConfigLookup for FakeConfig {
    fn conf(&self, section: &str, key: &str) -> Option<String> {
        self.conf.get(&(section.to_string(), key.to_string())).cloned()
    }

    fn conn(&self, server_name: &str, key: &str) -> Option<String> {
        self.conn.get(&(server_name.to_string(), key.to_string())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_config_round_trips_conf_and_conn() {
        let cfg = FakeConfig::new()
            .with_conf("server", "name", "hub.example.net")
            .with_conn("leaf.example.net", "receive_password", "digestvalue");

        assert_eq!(cfg.conf("server", "name").as_deref(), Some("hub.example.net"));
        assert_eq!(cfg.conf("server", "sid"), None);
        assert_eq!(
            cfg.conn("leaf.example.net", "receive_password").as_deref(),
            Some("digestvalue")
        );
        assert!(cfg.has_connect_block("leaf.example.net"));
        assert!(!cfg.has_connect_block("unknown.example.net"));
    }
}
