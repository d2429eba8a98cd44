//! Configuration management for Turnstile.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{Result, TurnstileError};
use crate::limiter::{ClientLimits, DEFAULT_LIMIT, DEFAULT_WINDOW};

/// Main configuration for the Turnstile service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnstileConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Limit applied to clients with no explicit entry
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Window in seconds applied to clients with no explicit entry
    #[serde(default = "default_window_secs")]
    pub default_window_secs: u64,

    /// Per-client limits applied at startup
    #[serde(default)]
    pub clients: HashMap<String, ClientLimitsConfig>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_window_secs: default_window_secs(),
            clients: HashMap::new(),
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW.as_secs()
}

/// Limits for a single client as written in the configuration file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClientLimitsConfig {
    /// Maximum requests allowed per window
    pub limit: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl From<ClientLimitsConfig> for ClientLimits {
    fn from(config: ClientLimitsConfig) -> Self {
        Self {
            limit: config.limit,
            window: Duration::from_secs(config.window_secs),
        }
    }
}

impl LimitsConfig {
    /// The process-wide defaults used to seed unseen identities.
    pub fn defaults(&self) -> ClientLimits {
        ClientLimits {
            limit: self.default_limit,
            window: Duration::from_secs(self.default_window_secs),
        }
    }
}

impl TurnstileConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TurnstileError::Config(format!("Failed to parse config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TurnstileConfig::default();

        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert_eq!(config.limits.default_limit, DEFAULT_LIMIT);
        assert_eq!(config.limits.default_window_secs, DEFAULT_WINDOW.as_secs());
        assert!(config.limits.clients.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  listen_addr: 0.0.0.0:9000
limits:
  default_limit: 10
  default_window_secs: 30
  clients:
    "PT A":
      limit: 3
      window_secs: 5
    "PT B":
      limit: 3
      window_secs: 3
"#;
        let config: TurnstileConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.server.listen_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.limits.default_limit, 10);
        assert_eq!(config.limits.clients.len(), 2);

        let limits: ClientLimits = config.limits.clients["PT A"].into();
        assert_eq!(limits.limit, 3);
        assert_eq!(limits.window, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let yaml = r#"
limits:
  default_limit: 7
"#;
        let config: TurnstileConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert_eq!(config.limits.default_limit, 7);
        assert_eq!(config.limits.default_window_secs, DEFAULT_WINDOW.as_secs());
    }

    #[test]
    fn test_limits_defaults_conversion() {
        let limits = LimitsConfig {
            default_limit: 4,
            default_window_secs: 9,
            clients: HashMap::new(),
        };

        let defaults = limits.defaults();
        assert_eq!(defaults.limit, 4);
        assert_eq!(defaults.window, Duration::from_secs(9));
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = TurnstileConfig::from_file("/nonexistent/turnstile.yaml");
        assert!(matches!(result, Err(TurnstileError::Io(_))));
    }
}
