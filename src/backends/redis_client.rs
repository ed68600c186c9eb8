//! Redis Client
//!
//! [`KeyValueClient`] over a multiplexed `redis` connection.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::RedisError;

use crate::backends::{ClientError, KeyValueClient};
use crate::cache::MAX_TTL;

/// Shared multiplexed connection to one Redis server.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    /// Connects to `address`, given either as `host:port` or a `redis://` URL.
    pub async fn open(address: &str) -> Result<Self, ClientError> {
        let url = if address.contains("://") {
            address.to_string()
        } else {
            format!("redis://{}", address)
        };
        let client = redis::Client::open(url.as_str())
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(map_err)?;
        Ok(Self { connection })
    }
}

fn map_err(err: RedisError) -> ClientError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        ClientError::Connection(err.to_string())
    } else {
        ClientError::Protocol(err.to_string())
    }
}

#[async_trait]
impl KeyValueClient for RedisClient {
    async fn ping(&self) -> Result<(), ClientError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ClientError> {
        let millis = u64::try_from(ttl.min(MAX_TTL).as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let mut conn = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_err)
    }

    async fn delete(&self, key: &str) -> Result<bool, ClientError> {
        let mut conn = self.connection.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(removed > 0)
    }
}
