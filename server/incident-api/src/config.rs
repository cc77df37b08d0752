//! Service configuration with sane defaults, overridable from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DB_PATH_VAR: &str = "INCIDENT_API_DB";
pub const HOST_VAR: &str = "INCIDENT_API_HOST";
pub const PORT_VAR: &str = "PORT";
pub const MAX_CONNECTIONS_VAR: &str = "INCIDENT_API_MAX_CONNECTIONS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{var}: invalid value {value:?}: {reason}")]
  Invalid {
    var: &'static str,
    value: String,
    reason: String,
  },
}

/// Runtime settings for the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Path to an existing SQLite crime database.
  pub db_path: PathBuf,
  /// Interface to bind the HTTP listener to.
  pub host: IpAddr,
  pub port: u16,
  /// Upper bound on pooled SQLite connections.
  pub max_connections: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      db_path: PathBuf::from("db").join("stpaul_crime.sqlite3"),
      host: IpAddr::V4(Ipv4Addr::LOCALHOST),
      port: 8000,
      max_connections: 5,
    }
  }
}

impl Config {
  /// Build a config from process environment variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  /// Build a config from an arbitrary variable lookup; unset variables keep
  /// their defaults.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();

    if let Some(path) = non_empty(lookup(DB_PATH_VAR)) {
      config.db_path = PathBuf::from(path);
    }
    if let Some(host) = non_empty(lookup(HOST_VAR)) {
      config.host = host
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid(HOST_VAR, &host, e.to_string()))?;
    }
    if let Some(port) = non_empty(lookup(PORT_VAR)) {
      config.port = port
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(PORT_VAR, &port, e.to_string()))?;
    }
    if let Some(max) = non_empty(lookup(MAX_CONNECTIONS_VAR)) {
      let parsed: u32 = max
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid(MAX_CONNECTIONS_VAR, &max, e.to_string()))?;
      if parsed == 0 {
        return Err(invalid(MAX_CONNECTIONS_VAR, &max, "must be at least 1".into()));
      }
      config.max_connections = parsed;
    }

    Ok(config)
  }

  pub fn bind_addr(&self) -> SocketAddr {
    SocketAddr::new(self.host, self.port)
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: &str, reason: String) -> ConfigError {
  ConfigError::Invalid {
    var,
    value: value.to_string(),
    reason,
  }
}
