//! Configuration Module
//!
//! Loads service configuration from environment variables and validates it
//! before any backend is built.

use std::env;
use std::time::Duration;

use crate::backends::{require_address, BackendKind};
use crate::error::{CacheError, Result};
use crate::facade::{FacadeConfig, Route};

/// Service configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of entries the local engine holds
    pub capacity: usize,
    /// TTL in seconds for writes that do not carry one
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Active backends
    pub backends: Vec<BackendKind>,
    /// Route for calls that name no backend
    pub default_route: Route,
    /// Address of the key-value store
    pub redis_addr: Option<String>,
    /// Address of the memory-object store
    pub memcached_addr: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Local engine capacity (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_BACKENDS` - Comma list of `lru`, `redis`, `memcached` (default: `lru`)
    /// - `CACHE_MODE` - `mirror` or one backend name for selector mode (default: `mirror`)
    /// - `REDIS_ADDR` - e.g. `localhost:6379`
    /// - `MEMCACHED_ADDR` - e.g. `localhost:11211`
    ///
    /// Unset variables fall back to defaults; set but malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            capacity: parse_var("CACHE_CAPACITY")?.unwrap_or(defaults.capacity),
            default_ttl: parse_var("DEFAULT_TTL")?.unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server_port),
            backends: match read_var("CACHE_BACKENDS") {
                Some(list) => parse_backends(&list)?,
                None => defaults.backends,
            },
            default_route: match read_var("CACHE_MODE") {
                Some(mode) => parse_route(&mode)?,
                None => defaults.default_route,
            },
            redis_addr: read_var("REDIS_ADDR"),
            memcached_addr: read_var("MEMCACHED_ADDR"),
        })
    }

    /// Rejects configurations that must not serve traffic.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if self.backends.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "at least one cache backend must be active".to_string(),
            ));
        }
        for kind in self.backends.iter().copied().filter(BackendKind::is_remote) {
            require_address(kind, self.address(kind))?;
        }
        if let Route::Only(kind) = self.default_route {
            if !self.is_active(kind) {
                return Err(CacheError::InvalidConfiguration(format!(
                    "CACHE_MODE selects {} but it is not in CACHE_BACKENDS",
                    kind
                )));
            }
        }
        Ok(())
    }

    pub fn is_active(&self, kind: BackendKind) -> bool {
        self.backends.contains(&kind)
    }

    /// Configured address of a remote backend; `None` for the local engine.
    pub fn address(&self, kind: BackendKind) -> Option<&str> {
        match kind {
            BackendKind::Lru => None,
            BackendKind::Redis => self.redis_addr.as_deref(),
            BackendKind::Memcached => self.memcached_addr.as_deref(),
        }
    }

    /// The facade's share of the configuration.
    pub fn facade(&self) -> FacadeConfig {
        FacadeConfig {
            default_route: self.default_route,
            default_ttl: Duration::from_secs(self.default_ttl),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: 60,
            server_port: 8080,
            backends: vec![BackendKind::Lru],
            default_route: Route::Mirror,
            redis_addr: None,
            memcached_addr: None,
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    read_var(name)
        .map(|raw| {
            raw.parse().map_err(|_| {
                CacheError::InvalidConfiguration(format!("{} has invalid value {:?}", name, raw))
            })
        })
        .transpose()
}

/// Parses a comma list of backend names, deduplicated in priority order.
pub fn parse_backends(list: &str) -> Result<Vec<BackendKind>> {
    let mut backends = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<BackendKind>()
                .map_err(|e| CacheError::InvalidConfiguration(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    backends.sort();
    backends.dedup();
    Ok(backends)
}

/// Parses `mirror` or a backend name.
pub fn parse_route(mode: &str) -> Result<Route> {
    if mode.trim().eq_ignore_ascii_case("mirror") {
        return Ok(Route::Mirror);
    }
    mode.parse::<BackendKind>()
        .map(Route::Only)
        .map_err(|e| CacheError::InvalidConfiguration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.backends, vec![BackendKind::Lru]);
        assert_eq!(config.default_route, Route::Mirror);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        for name in [
            "CACHE_CAPACITY",
            "DEFAULT_TTL",
            "SERVER_PORT",
            "CACHE_BACKENDS",
            "CACHE_MODE",
            "REDIS_ADDR",
            "MEMCACHED_ADDR",
        ] {
            env::remove_var(name);
        }
        assert_eq!(Config::from_env().unwrap(), Config::default());

        env::set_var("CACHE_CAPACITY", "5");
        env::set_var("CACHE_BACKENDS", "redis, lru");
        env::set_var("CACHE_MODE", "redis");
        env::set_var("REDIS_ADDR", "localhost:6379");
        let config = Config::from_env().unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.backends, vec![BackendKind::Lru, BackendKind::Redis]);
        assert_eq!(config.default_route, Route::Only(BackendKind::Redis));
        assert_eq!(config.redis_addr.as_deref(), Some("localhost:6379"));
        assert!(config.validate().is_ok());

        env::set_var("CACHE_CAPACITY", "many");
        assert!(matches!(
            Config::from_env(),
            Err(CacheError::InvalidConfiguration(_))
        ));

        for name in ["CACHE_CAPACITY", "CACHE_BACKENDS", "CACHE_MODE", "REDIS_ADDR"] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_requires_remote_addresses() {
        let config = Config {
            backends: vec![BackendKind::Lru, BackendKind::Memcached],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfiguration(_))
        ));

        let config = Config {
            memcached_addr: Some("localhost:11211".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_huge_capacity() {
        let config = Config {
            capacity: 1_000_000_000_000,
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        let engine = crate::cache::LruEngine::new(config.capacity);
        engine.set("k", "v", Duration::from_secs(config.default_ttl)).unwrap();
        assert_eq!(engine.get("k").unwrap(), "v");
    }

    #[test]
    fn test_address_per_backend() {
        let config = Config {
            redis_addr: Some("localhost:6379".to_string()),
            ..Config::default()
        };
        assert_eq!(config.address(BackendKind::Redis), Some("localhost:6379"));
        assert_eq!(config.address(BackendKind::Memcached), None);
        assert_eq!(config.address(BackendKind::Lru), None);
    }

    #[test]
    fn test_validate_selector_must_be_active() {
        let config = Config {
            default_route: Route::Only(BackendKind::Redis),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_backend() {
        let config = Config {
            backends: Vec::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_backends() {
        assert_eq!(
            parse_backends("memcached,lru,memcached").unwrap(),
            vec![BackendKind::Lru, BackendKind::Memcached]
        );
        assert!(parse_backends("lru,postgres").is_err());
    }

    #[test]
    fn test_parse_route() {
        assert_eq!(parse_route("Mirror").unwrap(), Route::Mirror);
        assert_eq!(parse_route("lru").unwrap(), Route::Only(BackendKind::Lru));
        assert!(matches!(
            parse_route("everywhere"),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_facade_config() {
        let config = Config {
            default_ttl: 30,
            ..Config::default()
        };
        let facade = config.facade();
        assert_eq!(facade.default_ttl, Duration::from_secs(30));
        assert_eq!(facade.default_route, Route::Mirror);
    }
}
