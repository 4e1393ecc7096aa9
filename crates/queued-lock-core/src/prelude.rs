//! Convenience prelude for queued lock types.

pub use crate::error::{LockError, LockResult};
pub use crate::identity::HostIdentity;
pub use crate::memory::InMemoryQueueStore;
pub use crate::options::{
    DEFAULT_GLOBAL_TIMEOUT, DEFAULT_POLL_INTERVAL, LockConfig, LockOptions, LockOptionsBuilder,
};
pub use crate::session::QueuedLock;
pub use crate::ticket::Ticket;
pub use crate::traits::{InsertPosition, LockProvider, LockProviderExt, QueueOp, QueueStore};
