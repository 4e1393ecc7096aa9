//! Fair, crash-tolerant distributed locks over a shared Redis list.
//!
//! Every contender appends a ticket to the lock's queue and waits until its
//! ticket reaches the head, so contenders are served in arrival order. A
//! holder refreshes its claim by calling `acquire` again; a claim that is not
//! refreshed within the global timeout is purged by whoever waits behind it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use queued_lock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = RedisLockProvider::builder()
//!         .url("redis://localhost:6379")
//!         .global_timeout(Duration::from_secs(30))
//!         .build()
//!         .await?;
//!
//!     let mut lock = provider.create_lock("my-resource")?;
//!
//!     // Wait up to 5 seconds for our turn
//!     if lock.acquire(true, Some(Duration::from_secs(5))).await? {
//!         println!("Doing critical work...");
//!         lock.release().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-process store
//!
//! [`InMemoryQueueStore`] implements the same protocol without a server,
//! which is handy in tests:
//!
//! ```rust
//! use queued_lock::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> LockResult<()> {
//! let store = InMemoryQueueStore::new();
//! let mut lock = QueuedLock::new("jobs", store.clone(), LockOptions::default())?;
//!
//! assert!(lock.try_acquire().await?);
//! assert!(lock.has_lock().await?);
//! assert!(lock.release().await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `queued-lock-core`: protocol, tickets, store trait and in-memory store
//! - `queued-lock-redis`: Redis backend
//!
//! For fine-grained control, you can depend on individual crates instead.

// Re-export core types and traits
pub use queued_lock_core::*;

// Re-export redis backend
pub use queued_lock_redis::*;
