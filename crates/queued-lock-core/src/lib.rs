//! Core types for fair, queued locks over a shared list store.
//!
//! Contenders queue tickets in a list kept by a [`QueueStore`] and hold the
//! lock while their ticket is at the head. Tickets that are not refreshed
//! within the global timeout are purged by the contenders waiting behind
//! them, so a crashed holder never blocks the lock forever.

pub mod error;
pub mod identity;
pub mod memory;
pub mod options;
pub mod prelude;
pub mod session;
pub mod ticket;
pub mod timeout;
pub mod traits;

pub use error::{LockError, LockResult};
pub use prelude::*;
