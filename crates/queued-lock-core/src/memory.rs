//! In-process queue store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::LockResult;
use crate::traits::{InsertPosition, QueueOp, QueueStore};

type Lists = HashMap<String, VecDeque<String>>;

/// A `QueueStore` held in process memory.
///
/// Clones share the same lists, so sessions created from clones contend
/// with each other exactly like sessions on different hosts sharing a Redis
/// server. Every call, and every batch, runs under a single mutex.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueStore {
    lists: Arc<Mutex<Lists>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the list at `key`.
    pub fn len(&self, key: &str) -> usize {
        self.lists().get(key).map_or(0, VecDeque::len)
    }

    /// Whether the list at `key` is missing or empty.
    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }

    fn lists(&self) -> MutexGuard<'_, Lists> {
        // a panic while holding the guard cannot leave a list half-edited
        self.lists.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn push_tail(lists: &mut Lists, key: &str, value: &str) {
    lists
        .entry(key.to_string())
        .or_default()
        .push_back(value.to_string());
}

fn remove(lists: &mut Lists, key: &str, value: &str) -> usize {
    let Some(list) = lists.get_mut(key) else {
        return 0;
    };
    let before = list.len();
    list.retain(|entry| entry != value);
    let removed = before - list.len();
    if list.is_empty() {
        lists.remove(key);
    }
    removed
}

fn insert(lists: &mut Lists, key: &str, pivot: &str, value: &str, position: InsertPosition) -> bool {
    let Some(list) = lists.get_mut(key) else {
        return false;
    };
    let Some(index) = list.iter().position(|entry| entry == pivot) else {
        return false;
    };
    let index = match position {
        InsertPosition::Before => index,
        InsertPosition::After => index + 1,
    };
    list.insert(index, value.to_string());
    true
}

fn range(lists: &Lists, key: &str, start: i64, stop: i64) -> Vec<String> {
    let Some(list) = lists.get(key) else {
        return Vec::new();
    };
    let len = list.len() as i64;
    let normalize = |index: i64| if index < 0 { len + index } else { index };

    let start = normalize(start).max(0);
    let stop = normalize(stop).min(len - 1);
    if start > stop {
        return Vec::new();
    }

    list.iter()
        .skip(start as usize)
        .take((stop - start + 1) as usize)
        .cloned()
        .collect()
}

fn apply(lists: &mut Lists, op: &QueueOp) {
    match op {
        QueueOp::PushTail { key, value } => push_tail(lists, key, value),
        QueueOp::Remove { key, value } => {
            remove(lists, key, value);
        }
        QueueOp::Insert {
            key,
            pivot,
            value,
            position,
        } => {
            insert(lists, key, pivot, value, *position);
        }
        QueueOp::Delete { key } => {
            lists.remove(key);
        }
    }
}

impl QueueStore for InMemoryQueueStore {
    const BACKEND: &'static str = "memory";

    async fn push_tail(&self, key: &str, value: &str) -> LockResult<()> {
        push_tail(&mut self.lists(), key, value);
        Ok(())
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> LockResult<Vec<String>> {
        Ok(range(&self.lists(), key, start, stop))
    }

    async fn remove(&self, key: &str, value: &str) -> LockResult<usize> {
        Ok(remove(&mut self.lists(), key, value))
    }

    async fn insert(
        &self,
        key: &str,
        pivot: &str,
        value: &str,
        position: InsertPosition,
    ) -> LockResult<bool> {
        Ok(insert(&mut self.lists(), key, pivot, value, position))
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        self.lists().remove(key);
        Ok(())
    }

    async fn execute(&self, ops: Vec<QueueOp>) -> LockResult<()> {
        let mut lists = self.lists();
        for op in &ops {
            apply(&mut lists, op);
        }
        Ok(())
    }
}
