//! Core traits for queued locks.

use std::future::Future;
use std::time::Duration;

use crate::error::LockResult;

// ============================================================================
// Queue Store Trait
// ============================================================================

/// Where `QueueStore::insert` places the new value relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// A single list mutation, used to build atomic batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueOp {
    /// Append `value` at the tail of the list.
    PushTail { key: String, value: String },
    /// Remove every occurrence of `value`.
    Remove { key: String, value: String },
    /// Insert `value` next to the first occurrence of `pivot`.
    Insert {
        key: String,
        pivot: String,
        value: String,
        position: InsertPosition,
    },
    /// Delete the whole list.
    Delete { key: String },
}

impl QueueOp {
    pub fn push_tail(key: &str, value: &str) -> Self {
        Self::PushTail {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn remove(key: &str, value: &str) -> Self {
        Self::Remove {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn insert_before(key: &str, pivot: &str, value: &str) -> Self {
        Self::Insert {
            key: key.to_string(),
            pivot: pivot.to_string(),
            value: value.to_string(),
            position: InsertPosition::Before,
        }
    }

    pub fn delete(key: &str) -> Self {
        Self::Delete {
            key: key.to_string(),
        }
    }
}

/// Client of the shared store that holds lock queues.
///
/// Every method must execute atomically with respect to other clients, and
/// `execute` must apply the whole batch atomically: no other client may
/// observe or interleave with a partially applied batch. Lists are created
/// implicitly by the first push and disappear when emptied.
///
/// Connectivity failures are returned unmodified; the lock protocol never
/// retries them.
///
/// # Example
///
/// ```rust,ignore
/// store.push_tail("jobs", "a").await?;
/// store.execute(vec![
///     QueueOp::insert_before("jobs", "a", "b"),
///     QueueOp::remove("jobs", "a"),
/// ]).await?;
/// assert_eq!(store.all("jobs").await?, vec!["b".to_string()]);
/// ```
pub trait QueueStore: Send + Sync {
    /// Short backend name used in tracing spans.
    const BACKEND: &'static str;

    /// Appends `value` to the tail of the list at `key`.
    fn push_tail(&self, key: &str, value: &str) -> impl Future<Output = LockResult<()>> + Send;

    /// Returns the entries between `start` and `stop`, both inclusive.
    ///
    /// Negative indices count from the tail (`-1` is the last entry). Out of
    /// range indices are clamped; a missing list yields an empty vector.
    fn range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> impl Future<Output = LockResult<Vec<String>>> + Send;

    /// Removes every entry equal to `value`, returning how many were removed.
    fn remove(&self, key: &str, value: &str) -> impl Future<Output = LockResult<usize>> + Send;

    /// Inserts `value` next to the first entry equal to `pivot`.
    ///
    /// Returns `false` when the pivot (or the list) does not exist.
    fn insert(
        &self,
        key: &str,
        pivot: &str,
        value: &str,
        position: InsertPosition,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Deletes the list at `key`.
    fn delete(&self, key: &str) -> impl Future<Output = LockResult<()>> + Send;

    /// Applies `ops` as one all-or-nothing transaction.
    fn execute(&self, ops: Vec<QueueOp>) -> impl Future<Output = LockResult<()>> + Send;

    /// Returns the first entry of the list, if any.
    fn head(&self, key: &str) -> impl Future<Output = LockResult<Option<String>>> + Send {
        async move { Ok(self.range(key, 0, 0).await?.into_iter().next()) }
    }

    /// Returns the whole list.
    fn all(&self, key: &str) -> impl Future<Output = LockResult<Vec<String>>> + Send {
        self.range(key, 0, -1)
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Factory for creating lock sessions by name.
///
/// Providers encapsulate the store connection and the lock tunables, so that
/// every place contending on a name uses the same global timeout.
///
/// # Example
///
/// ```rust,ignore
/// // Configure once at startup
/// let provider = RedisLockProvider::new("redis://localhost:6379").await?;
///
/// // Create sessions by name anywhere in the application
/// let mut lock = provider.create_lock("my-resource")?;
/// if lock.acquire(true, Some(Duration::from_secs(5))).await? {
///     do_work().await;
///     lock.release().await?;
/// }
/// ```
pub trait LockProvider: Send + Sync {
    /// The store sessions created by this provider talk to.
    type Store: QueueStore;

    /// Creates a new session contending on `name`.
    fn create_lock(&self, name: &str) -> LockResult<crate::session::QueuedLock<Self::Store>>;
}

/// Extension trait providing convenience methods for lock providers.
pub trait LockProviderExt: LockProvider {
    /// Creates a session for `name` and waits up to `timeout` for the lock.
    ///
    /// Returns the holding session, or `None` if the timeout elapsed first.
    fn acquire_lock(
        &self,
        name: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = LockResult<Option<crate::session::QueuedLock<Self::Store>>>> + Send
    where
        Self: Sync,
    {
        async move {
            let mut lock = self.create_lock(name)?;
            Ok(lock.acquire(true, timeout).await?.then_some(lock))
        }
    }

    /// Creates a session for `name` and polls for the lock exactly once.
    fn try_acquire_lock(
        &self,
        name: &str,
    ) -> impl Future<Output = LockResult<Option<crate::session::QueuedLock<Self::Store>>>> + Send
    where
        Self: Sync,
    {
        async move {
            let mut lock = self.create_lock(name)?;
            Ok(lock.try_acquire().await?.then_some(lock))
        }
    }
}

// Blanket implementation for all LockProviders
impl<T: LockProvider> LockProviderExt for T {}
