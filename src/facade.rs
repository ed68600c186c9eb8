//! Unified Facade
//!
//! Composes the local engine and the remote adapters behind the cache
//! contract. Each call is routed either to one named backend (selector mode)
//! or across all active backends (mirror mode).
//!
//! Mirror writes are applied in priority order and stop at the first error.
//! Backends written before the failure keep the new state; nothing is rolled
//! back, and callers must tolerate that divergence.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backends::BackendKind;
use crate::cache::{validate_key, Cache, LruEngine};
use crate::error::{CacheError, Result};

// == Route ==
/// Where a facade call goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Every active backend: writes fan out, reads take the first hit
    Mirror,
    /// Exactly one backend, result relayed unchanged
    Only(BackendKind),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Mirror => f.write_str("mirror"),
            Route::Only(kind) => write!(f, "{}", kind),
        }
    }
}

// == Facade Config ==
/// Behaviour applied when callers leave choices open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Route used when a call names no backend
    pub default_route: Route,
    /// TTL used when a write names none
    pub default_ttl: Duration,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            default_route: Route::Mirror,
            default_ttl: Duration::from_secs(60),
        }
    }
}

// == Unified Cache ==
/// Facade over one local engine and any number of remote adapters.
///
/// Holds references only; all cache state lives in the backends.
pub struct UnifiedCache {
    config: FacadeConfig,
    local: Option<Arc<LruEngine>>,
    /// Active backends sorted by read priority
    backends: Vec<(BackendKind, Arc<dyn Cache>)>,
}

impl fmt::Debug for UnifiedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiedCache")
            .field("config", &self.config)
            .field("backends", &self.backends().collect::<Vec<_>>())
            .finish()
    }
}

impl UnifiedCache {
    pub fn builder(config: FacadeConfig) -> UnifiedCacheBuilder {
        UnifiedCacheBuilder {
            config,
            local: None,
            key_value: None,
            memory_object: None,
        }
    }

    /// Active backend kinds in priority order.
    pub fn backends(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.backends.iter().map(|(kind, _)| *kind)
    }

    /// The local engine, when active.
    pub fn local(&self) -> Option<&Arc<LruEngine>> {
        self.local.as_ref()
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Resolves an optional per-call selector against the configured default.
    pub fn route(&self, selector: Option<BackendKind>) -> Route {
        selector.map_or(self.config.default_route, Route::Only)
    }

    fn backend(&self, kind: BackendKind) -> Result<&Arc<dyn Cache>> {
        self.backends
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, backend)| backend)
            .ok_or_else(|| {
                CacheError::InvalidRequest(format!("cache type {} is not active", kind))
            })
    }

    // == Set ==
    /// Writes `key`, using the default TTL when `ttl` is `None`.
    pub async fn set(
        &self,
        route: Route,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        validate_key(key)?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        match route {
            Route::Only(kind) => self.backend(kind)?.set(key, value, ttl).await,
            Route::Mirror => {
                for (applied, (kind, backend)) in self.backends.iter().enumerate() {
                    if let Err(err) = backend.set(key, value, ttl).await {
                        report_partial("set", key, *kind, applied, &err);
                        return Err(err);
                    }
                }
                debug!(key, "mirrored set to all backends");
                Ok(())
            }
        }
    }

    // == Get ==
    /// Reads `key`. In mirror mode backends are tried in priority order and
    /// the first hit wins; later backends are not contacted.
    pub async fn get(&self, route: Route, key: &str) -> Result<String> {
        validate_key(key)?;

        match route {
            Route::Only(kind) => self.backend(kind)?.get(key).await,
            Route::Mirror => {
                let mut missed = false;
                let mut unavailable = None;

                for (kind, backend) in &self.backends {
                    match backend.get(key).await {
                        Ok(value) => {
                            debug!(key, backend = %kind, "mirror read hit");
                            return Ok(value);
                        }
                        Err(err) if err.is_unavailable() => {
                            warn!(key, backend = %kind, error = %err, "skipping unavailable backend");
                            unavailable.get_or_insert(err);
                        }
                        Err(_) => missed = true,
                    }
                }

                // Only report infrastructure trouble when no backend could answer at all
                match unavailable {
                    Some(err) if !missed => Err(err),
                    _ => Err(CacheError::NotFoundAnywhere(key.to_string())),
                }
            }
        }
    }

    // == Delete ==
    /// Deletes `key`. In mirror mode the first failure, including a
    /// `KeyNotFound`, stops the sequence.
    pub async fn delete(&self, route: Route, key: &str) -> Result<()> {
        validate_key(key)?;

        match route {
            Route::Only(kind) => self.backend(kind)?.delete(key).await,
            Route::Mirror => {
                for (applied, (kind, backend)) in self.backends.iter().enumerate() {
                    if let Err(err) = backend.delete(key).await {
                        report_partial("delete", key, *kind, applied, &err);
                        return Err(err);
                    }
                }
                Ok(())
            }
        }
    }

    // == Get All ==
    /// Snapshot of live entries. In mirror mode snapshots are merged and the
    /// higher-priority backend wins on duplicate keys.
    pub async fn get_all(&self, route: Route) -> Result<HashMap<String, String>> {
        match route {
            Route::Only(kind) => self.backend(kind)?.get_all().await,
            Route::Mirror => {
                let mut merged = HashMap::new();
                for (_, backend) in &self.backends {
                    for (key, value) in backend.get_all().await? {
                        merged.entry(key).or_insert(value);
                    }
                }
                Ok(merged)
            }
        }
    }
}

fn report_partial(op: &str, key: &str, kind: BackendKind, applied: usize, err: &CacheError) {
    if applied > 0 {
        warn!(
            op,
            key,
            backend = %kind,
            applied,
            error = %err,
            "mirror write stopped; earlier backends keep the change"
        );
    } else {
        debug!(op, key, backend = %kind, error = %err, "mirror write failed on first backend");
    }
}

// == Builder ==
/// Assembles a [`UnifiedCache`] and checks it can serve.
pub struct UnifiedCacheBuilder {
    config: FacadeConfig,
    local: Option<Arc<LruEngine>>,
    key_value: Option<Arc<dyn Cache>>,
    memory_object: Option<Arc<dyn Cache>>,
}

impl UnifiedCacheBuilder {
    pub fn local(mut self, engine: Arc<LruEngine>) -> Self {
        self.local = Some(engine);
        self
    }

    /// Sets the key-value (Redis) backend.
    pub fn key_value(mut self, store: Arc<dyn Cache>) -> Self {
        self.key_value = Some(store);
        self
    }

    /// Sets the memory-object (Memcached) backend.
    pub fn memory_object(mut self, store: Arc<dyn Cache>) -> Self {
        self.memory_object = Some(store);
        self
    }

    /// Fails with `InvalidConfiguration` when no backend is active or the
    /// default route names an inactive one.
    pub fn build(self) -> Result<UnifiedCache> {
        let mut backends: Vec<(BackendKind, Arc<dyn Cache>)> = Vec::new();
        if let Some(engine) = &self.local {
            backends.push((BackendKind::Lru, Arc::clone(engine) as Arc<dyn Cache>));
        }
        if let Some(store) = self.key_value {
            backends.push((BackendKind::Redis, store));
        }
        if let Some(store) = self.memory_object {
            backends.push((BackendKind::Memcached, store));
        }

        if backends.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "at least one cache backend must be active".to_string(),
            ));
        }
        if let Route::Only(kind) = self.config.default_route {
            if !backends.iter().any(|(k, _)| *k == kind) {
                return Err(CacheError::InvalidConfiguration(format!(
                    "default cache type {} is not active",
                    kind
                )));
            }
        }

        Ok(UnifiedCache {
            config: self.config,
            local: self.local,
            backends,
        })
    }
}
