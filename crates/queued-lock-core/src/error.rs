//! Error types for queued lock operations.

use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Losing a race for the lock is not an error: `acquire` and `release`
/// report that through their boolean results.
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock tunables were rejected at construction.
    #[error("invalid lock configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid lock name.
    #[error("invalid lock name: {0}")]
    InvalidName(String),

    /// The queue stayed empty right after this session pushed its ticket.
    #[error("coordination store is misbehaving: {0}")]
    StoreMisbehaving(String),

    /// A queue entry could not be decoded as a ticket.
    #[error("invalid ticket: {0}")]
    InvalidTicket(String),

    /// Backend connection failed.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
