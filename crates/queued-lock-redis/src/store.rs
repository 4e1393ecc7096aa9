//! Redis list store.

use fred::prelude::*;
use fred::types::ListLocation;
use queued_lock_core::error::{LockError, LockResult};
use queued_lock_core::traits::{InsertPosition, QueueOp, QueueStore};
use tracing::{instrument, trace};

/// Wraps a failed Redis command into a backend error, keeping the command
/// name in the message.
fn command_failed(command: &'static str) -> impl FnOnce(RedisError) -> LockError {
    move |e| {
        LockError::Backend(Box::new(std::io::Error::other(format!(
            "Redis {command} failed: {e}"
        ))))
    }
}

fn list_location(position: InsertPosition) -> ListLocation {
    match position {
        InsertPosition::Before => ListLocation::Before,
        InsertPosition::After => ListLocation::After,
    }
}

/// A `QueueStore` backed by Redis lists.
///
/// Single commands map to `RPUSH`, `LRANGE`, `LREM`, `LINSERT` and `DEL`;
/// batches run inside `MULTI`/`EXEC`.
#[derive(Clone)]
pub struct RedisQueueStore {
    client: RedisClient,
}

impl RedisQueueStore {
    /// Wraps a connected client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

impl std::fmt::Debug for RedisQueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueueStore").finish_non_exhaustive()
    }
}

impl QueueStore for RedisQueueStore {
    const BACKEND: &'static str = "redis";

    async fn push_tail(&self, key: &str, value: &str) -> LockResult<()> {
        let _: i64 = self
            .client
            .rpush(key, value)
            .await
            .map_err(command_failed("RPUSH"))?;
        Ok(())
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> LockResult<Vec<String>> {
        self.client
            .lrange(key, start, stop)
            .await
            .map_err(command_failed("LRANGE"))
    }

    async fn remove(&self, key: &str, value: &str) -> LockResult<usize> {
        let removed: i64 = self
            .client
            .lrem(key, 0, value)
            .await
            .map_err(command_failed("LREM"))?;
        Ok(removed.max(0) as usize)
    }

    async fn insert(
        &self,
        key: &str,
        pivot: &str,
        value: &str,
        position: InsertPosition,
    ) -> LockResult<bool> {
        // LINSERT returns the new length, -1 for a missing pivot, 0 for a missing key
        let length: i64 = self
            .client
            .linsert(key, list_location(position), pivot, value)
            .await
            .map_err(command_failed("LINSERT"))?;
        Ok(length > 0)
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        let _: i64 = self.client.del(key).await.map_err(command_failed("DEL"))?;
        Ok(())
    }

    #[instrument(skip(self, ops), fields(backend = "redis", ops = ops.len()))]
    async fn execute(&self, ops: Vec<QueueOp>) -> LockResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let trx = self.client.multi();
        for op in &ops {
            let queued: Result<RedisValue, RedisError> = match op {
                QueueOp::PushTail { key, value } => trx.rpush(key.as_str(), value.as_str()).await,
                QueueOp::Remove { key, value } => trx.lrem(key.as_str(), 0, value.as_str()).await,
                QueueOp::Insert {
                    key,
                    pivot,
                    value,
                    position,
                } => {
                    trx.linsert(
                        key.as_str(),
                        list_location(*position),
                        pivot.as_str(),
                        value.as_str(),
                    )
                    .await
                }
                QueueOp::Delete { key } => trx.del(key.as_str()).await,
            };
            queued.map_err(command_failed("MULTI"))?;
        }

        let _: RedisValue = trx.exec(true).await.map_err(command_failed("EXEC"))?;
        trace!("transaction committed");
        Ok(())
    }
}
