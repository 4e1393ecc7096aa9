//! Mock providers and stores for testing the provider abstraction.

use queued_lock_core::error::LockResult;
use queued_lock_core::memory::InMemoryQueueStore;
use queued_lock_core::options::{LockConfig, LockOptions};
use queued_lock_core::session::QueuedLock;
use queued_lock_core::traits::{InsertPosition, LockProvider, QueueOp, QueueStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock provider handing out sessions over one shared in-memory store.
pub struct MockLockProvider {
    store: InMemoryQueueStore,
    options: LockOptions,
}

impl MockLockProvider {
    /// Creates a new mock provider with a short poll interval.
    pub fn new() -> Self {
        Self::with_options(
            LockOptions::builder()
                .poll_interval(Duration::from_millis(5))
                .build()
                .unwrap(),
        )
    }

    pub fn with_options(options: LockOptions) -> Self {
        Self {
            store: InMemoryQueueStore::new(),
            options,
        }
    }

    pub fn store(&self) -> &InMemoryQueueStore {
        &self.store
    }
}

impl Default for MockLockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LockProvider for MockLockProvider {
    type Store = InMemoryQueueStore;

    fn create_lock(&self, name: &str) -> LockResult<QueuedLock<Self::Store>> {
        Ok(LockConfig::new(name, self.options)?.session(self.store.clone()))
    }
}

/// Store that accepts writes but always reads back an empty queue.
#[derive(Clone, Default)]
pub struct EmptyReadStore {
    inner: InMemoryQueueStore,
    reads: Arc<AtomicUsize>,
}

impl EmptyReadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryQueueStore {
        &self.inner
    }

    /// Number of range reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl QueueStore for EmptyReadStore {
    const BACKEND: &'static str = "empty-read";

    async fn push_tail(&self, key: &str, value: &str) -> LockResult<()> {
        self.inner.push_tail(key, value).await
    }

    async fn range(&self, _key: &str, _start: i64, _stop: i64) -> LockResult<Vec<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn remove(&self, key: &str, value: &str) -> LockResult<usize> {
        self.inner.remove(key, value).await
    }

    async fn insert(
        &self,
        key: &str,
        pivot: &str,
        value: &str,
        position: InsertPosition,
    ) -> LockResult<bool> {
        self.inner.insert(key, pivot, value, position).await
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.inner.delete(key).await
    }

    async fn execute(&self, ops: Vec<QueueOp>) -> LockResult<()> {
        self.inner.execute(ops).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_creates_locks() {
        let provider = MockLockProvider::new();
        let lock = provider.create_lock("test-lock").unwrap();
        assert_eq!(lock.name(), "test-lock");
    }

    #[tokio::test]
    async fn test_mock_lock_try_acquire() {
        let provider = MockLockProvider::new();
        let mut lock1 = provider.create_lock("test-lock").unwrap();
        let mut lock2 = provider.create_lock("test-lock").unwrap();

        // First acquisition should succeed
        assert!(lock1.try_acquire().await.unwrap());

        // Second acquisition should fail
        assert!(!lock2.try_acquire().await.unwrap());
    }
}
