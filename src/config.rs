//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which store the facade talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Redis,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Allowed CORS origin, `*` for any
    pub origin: String,
    /// Store backend
    pub backend: BackendKind,
    /// Redis host name
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis database index
    pub redis_db: u32,
    /// Capacity of the in-memory backend
    pub max_entries: usize,
    /// In-memory backend sweep interval in seconds
    pub cleanup_interval: u64,
    /// Bound on each store round-trip, None = unbounded
    pub store_timeout_ms: Option<u64>,
    /// Reject keys and values with no canonical form
    pub strict_keys: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `ORIGIN` - allowed CORS origin (default: `*`)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB` - Redis address (default: redis:6379/0)
    /// - `MAX_ENTRIES` - in-memory capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - in-memory sweep frequency in seconds (default: 1)
    /// - `STORE_TIMEOUT_MS` - per round-trip timeout (default: none)
    /// - `STRICT_KEYS` - reject un-encodable keys (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            origin: env::var("ORIGIN").unwrap_or(defaults.origin),
            backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_db: parse_var("REDIS_DB").unwrap_or(defaults.redis_db),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS").filter(|ms| *ms > 0),
            strict_keys: parse_var("STRICT_KEYS").unwrap_or(defaults.strict_keys),
        }
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }

    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            origin: "*".to_string(),
            backend: BackendKind::Redis,
            redis_host: "redis".to_string(),
            redis_port: 6379,
            redis_db: 0,
            max_entries: 10_000,
            cleanup_interval: 1,
            store_timeout_ms: None,
            strict_keys: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.backend, BackendKind::Redis);
        assert_eq!(config.redis_url(), "redis://redis:6379/0");
        assert_eq!(config.store_timeout(), None);
        assert!(!config.strict_keys);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("memory".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert_eq!(" Redis ".parse::<BackendKind>(), Ok(BackendKind::Redis));
        assert!("postgres".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_redis_url_uses_db_index() {
        let config = Config {
            redis_host: "localhost".to_string(),
            redis_port: 6380,
            redis_db: 3,
            ..Config::default()
        };
        assert_eq!(config.redis_url(), "redis://localhost:6380/3");
    }

    #[test]
    fn test_store_timeout() {
        let config = Config {
            store_timeout_ms: Some(250),
            ..Config::default()
        };
        assert_eq!(config.store_timeout(), Some(Duration::from_millis(250)));
    }
}
