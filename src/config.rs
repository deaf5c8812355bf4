//! Configuration loading for the interactive client binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Default connection target, used when no host/port is given on the
/// command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Client-side tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Interval in milliseconds between the health and receive polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/mudlink/config.toml` on Unix/macOS, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if no config directory is available.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("mudlink").join("config.toml")
    }

    /// Loads configuration from the default config file. A missing file is
    /// not an error; it yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.host.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "connection.host must not be empty".to_string(),
            });
        }

        if self.connection.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "connection.port must be non-zero".to_string(),
            });
        }

        if self.client.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "client.poll_interval_ms must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).expect("create config");
        file.write_all(content.as_bytes()).expect("write config");
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(config.connection.host, "127.0.0.1");
        assert_eq!(config.connection.port, 4000);
        assert_eq!(config.client.poll_interval_ms, 50);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let (_dir, path) = write_config(
            r#"
[connection]
host = "mud.example.net"
port = 2323
"#,
        );
        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.connection.host, "mud.example.net");
        assert_eq!(config.connection.port, 2323);
        assert_eq!(config.client.poll_interval_ms, 50);
    }

    #[test]
    fn zero_port_fails_validation() {
        let (_dir, path) = write_config("[connection]\nport = 0\n");
        let err = Config::load_from(&path).expect_err("should fail validation");
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let (_dir, path) = write_config("[connection\nhost = ");
        let err = Config::load_from(&path).expect_err("should fail to parse");
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
