//! Redis backend for queued locks.
//!
//! Each lock is a Redis list named after the lock. Any client that follows
//! the same ticket format and queue direction can share the list.

pub mod provider;
pub mod store;

pub use provider::{RedisLockProvider, RedisLockProviderBuilder};
pub use store::RedisQueueStore;
