//! Redis lock provider implementation.

use std::time::Duration;

use fred::prelude::*;
use queued_lock_core::error::{LockError, LockResult};
use queued_lock_core::options::{LockConfig, LockOptions, LockOptionsBuilder};
use queued_lock_core::session::QueuedLock;
use queued_lock_core::traits::LockProvider;
use tracing::debug;

use crate::store::RedisQueueStore;

/// Builder for Redis lock provider configuration.
pub struct RedisLockProviderBuilder {
    url: Option<String>,
    client: Option<RedisClient>,
    options: LockOptionsBuilder,
}

impl RedisLockProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: None,
            client: None,
            options: LockOptions::builder(),
        }
    }

    /// Sets the Redis server URL, e.g. `redis://localhost:6379/0`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Uses an existing Redis client instead of connecting to a URL.
    ///
    /// The client must already be connected.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the global timeout shared by every lock of this provider.
    ///
    /// `Duration::ZERO` disables expiry: a crashed holder then keeps the
    /// lock until someone clears it.
    pub fn global_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.global_timeout(timeout);
        self
    }

    /// Sets the minimum time between two polls while waiting.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options = self.options.poll_interval(interval);
        self
    }

    /// Builds the provider, connecting to the URL if one was given.
    ///
    /// # Errors
    ///
    /// * `LockError::InvalidConfiguration` - bad tunables, or neither a URL
    ///   nor a client was given
    /// * `LockError::Connection` - the URL is invalid or unreachable
    pub async fn build(self) -> LockResult<RedisLockProvider> {
        let options = self.options.build()?;

        let client = match (self.client, self.url) {
            (Some(client), _) => client,
            (None, Some(url)) => connect(&url).await?,
            (None, None) => {
                return Err(LockError::InvalidConfiguration(
                    "no Redis client or URL provided".to_string(),
                ));
            }
        };

        Ok(RedisLockProvider {
            store: RedisQueueStore::new(client),
            options,
        })
    }
}

impl Default for RedisLockProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn connect(url: &str) -> LockResult<RedisClient> {
    let config = RedisConfig::from_url(url).map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid Redis URL: {}", e),
        )))
    })?;

    let client = RedisClient::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await.map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::other(format!(
            "failed to connect to Redis: {}",
            e
        ))))
    })?;
    debug!(url, "connected to Redis");

    Ok(client)
}

/// Provider for Redis-backed queued locks.
///
/// Holds one connected client and the tunables shared by every lock it
/// creates.
pub struct RedisLockProvider {
    store: RedisQueueStore,
    options: LockOptions,
}

impl RedisLockProvider {
    /// Returns a new builder for configuring the provider.
    pub fn builder() -> RedisLockProviderBuilder {
        RedisLockProviderBuilder::new()
    }

    /// Creates a provider using the specified Redis URL and default tunables.
    pub async fn new(url: impl Into<String>) -> LockResult<Self> {
        Self::builder().url(url).build().await
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    pub fn store(&self) -> &RedisQueueStore {
        &self.store
    }

    /// Binds `name` to this provider's tunables.
    pub fn config(&self, name: &str) -> LockResult<LockConfig> {
        LockConfig::new(name, self.options)
    }
}

impl LockProvider for RedisLockProvider {
    type Store = RedisQueueStore;

    fn create_lock(&self, name: &str) -> LockResult<QueuedLock<Self::Store>> {
        Ok(self.config(name)?.session(self.store.clone()))
    }
}
