//! Server configuration read from the environment.

use navien_core::TableName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Connection descriptor handed to the storage engine.
    pub database_url: String,
    pub table: TableName,
    /// When set, `/navien` answers 400 to a malformed JSON body instead of
    /// treating it as absent.
    pub reject_malformed_body: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite::memory:".to_string(),
            table: TableName::default(),
            reject_malformed_body: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(table) = lookup("NAVIEN_TABLE") {
            config.table = TableName::parse(&table).map_err(|e| ConfigError::Invalid {
                key: "NAVIEN_TABLE",
                value: table.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(flag) = lookup("NAVIEN_REJECT_MALFORMED_BODY") {
            config.reject_malformed_body = parse_bool(&flag).ok_or_else(|| ConfigError::Invalid {
                key: "NAVIEN_REJECT_MALFORMED_BODY",
                value: flag.clone(),
                reason: "expected true or false".to_string(),
            })?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
