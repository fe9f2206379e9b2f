//! Configuration management for Kobi Server

use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Invalid bind address {0}")]
    InvalidAddress(String),

    #[error("Storage and staging directories must differ: {0}")]
    SameDirectories(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the catalog
    pub books_dir: PathBuf,
    /// Scratch directory for in-progress uploads
    pub staging_dir: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            storage: StorageConfig {
                books_dir: PathBuf::from("./books"),
                staging_dir: PathBuf::from("./temp"),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl Config {
    /// Load from the process environment; unset variables keep their defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load from any variable source. A value that is set but invalid is an
    /// error, never a silent default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                books_dir: lookup("BOOKS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.books_dir),
                staging_dir: lookup("STAGING_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.staging_dir),
                max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                    .unwrap_or(defaults.storage.max_upload_bytes),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the upload protocol cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.books_dir == self.storage.staging_dir {
            return Err(ConfigError::SameDirectories(self.storage.books_dir.clone()));
        }
        Ok(())
    }

    /// Socket address to bind the listener to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.storage.max_upload_bytes, 52_428_800);
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn test_same_directories_rejected() {
        let mut config = Config::default();
        config.storage.staging_dir = config.storage.books_dir.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SameDirectories(_))
        ));
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        assert!(matches!(config.bind_addr(), Err(ConfigError::InvalidAddress(_))));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_keeps_set_values() {
        let vars = [
            ("BOOKS_DIR", "/srv/library"),
            ("STAGING_DIR", "/srv/incoming"),
            ("SERVER_PORT", "8080"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.storage.books_dir, PathBuf::from("/srv/library"));
        assert_eq!(config.storage.staging_dir, PathBuf::from("/srv/incoming"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.max_upload_bytes, 1_048_576);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_value_is_an_error_not_defaults() {
        let vars = [("BOOKS_DIR", "/srv/library"), ("MAX_UPLOAD_BYTES", "50MB")];
        match Config::from_lookup(lookup(&vars)) {
            Err(ConfigError::InvalidValue { var, value }) => {
                assert_eq!(var, "MAX_UPLOAD_BYTES");
                assert_eq!(value, "50MB");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_same_directories_from_lookup_rejected() {
        let vars = [("BOOKS_DIR", "/srv/books"), ("STAGING_DIR", "/srv/books")];
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::SameDirectories(_))
        ));
    }
}
