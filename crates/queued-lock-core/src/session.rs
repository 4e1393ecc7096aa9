//! The queued lock session.
//!
//! Contenders append a ticket to the tail of a shared list and own the lock
//! while their ticket sits at the head. A holder keeps its claim alive by
//! re-acquiring, which swaps its head ticket for a freshly stamped one in a
//! single transaction. When a head ticket outlives the global timeout, each
//! waiting contender walks the entries ahead of its own ticket and purges
//! the stale ones, stopping at the first live contender, which is always
//! served first.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{Span, debug, field, instrument, warn};

use crate::error::{LockError, LockResult};
use crate::identity::HostIdentity;
use crate::options::{LockOptions, validate_name};
use crate::ticket::{Ticket, unix_now};
use crate::timeout::Deadline;
use crate::traits::{QueueOp, QueueStore};

/// Shortest pause between two polls of the queue.
const MIN_POLL_SLEEP: Duration = Duration::from_micros(10);

/// Outcome of scanning the queue ahead of our own ticket.
#[derive(Debug, PartialEq, Eq)]
enum Sweep {
    /// Every entry ahead of ours was stale and has been removed.
    Reached,
    /// A live contender is ahead of us; stale entries before it were removed.
    Blocked,
    /// Our ticket is no longer in the queue.
    Missing,
}

/// One contender for a named, queued lock.
///
/// The session keeps no belief about ownership that is not re-checked
/// against the store: `has_lock` reads the queue head on every call.
///
/// # Example
///
/// ```rust,ignore
/// let mut lock = QueuedLock::new("nightly-report", store, LockOptions::default())?;
///
/// if lock.acquire(true, Some(Duration::from_secs(5))).await? {
///     build_report().await;
///     // refresh the claim during long work
///     lock.acquire(true, None).await?;
///     finish_report().await;
///     lock.release().await?;
/// }
/// ```
#[derive(Debug)]
pub struct QueuedLock<S> {
    name: String,
    store: S,
    options: LockOptions,
    identity: HostIdentity,
    owner_id: String,
    acquired_at: Option<f64>,
    lock_timestamp: Option<f64>,
}

impl<S: QueueStore> QueuedLock<S> {
    /// Creates a session for the lock `name` stored in `store`.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidName` if `name` is empty.
    pub fn new(name: impl Into<String>, store: S, options: LockOptions) -> LockResult<Self> {
        Self::with_identity(name, store, options, HostIdentity::current().clone())
    }

    /// Creates a session whose owner ids use `identity` instead of the
    /// hostname of this process.
    pub fn with_identity(
        name: impl Into<String>,
        store: S,
        options: LockOptions,
        identity: HostIdentity,
    ) -> LockResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self::build(name, store, options, identity))
    }

    pub(crate) fn from_parts(name: String, store: S, options: LockOptions) -> Self {
        Self::build(name, store, options, HostIdentity::current().clone())
    }

    fn build(name: String, store: S, options: LockOptions, identity: HostIdentity) -> Self {
        let owner_id = identity.generate_owner_id();
        Self {
            name,
            store,
            options,
            identity,
            owner_id,
            acquired_at: None,
            lock_timestamp: None,
        }
    }

    /// The lock name, which is also the store key of the queue.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Owner id of the current or most recent queue entry of this session.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// When this session last obtained the lock (not updated by refreshes).
    ///
    /// Survives release and expiry; only `clear` resets it.
    pub fn acquired_at(&self) -> Option<f64> {
        self.acquired_at
    }

    /// Timestamp of the ticket currently representing this session's claim.
    pub fn lock_timestamp(&self) -> Option<f64> {
        self.lock_timestamp
    }

    /// Seconds left before the held ticket goes stale.
    ///
    /// Negative once the ticket has expired; `None` when this session holds
    /// no ticket.
    pub fn seconds_remaining(&self) -> Option<f64> {
        self.lock_timestamp.map(|stamp| {
            stamp - (unix_now() - self.options.global_timeout().as_secs_f64())
        })
    }

    /// Acquires the lock, or refreshes it if this session already holds it.
    ///
    /// * `blocking` - keep polling until the lock is obtained (or the
    ///   timeout elapses); otherwise poll exactly once.
    /// * `blocking_timeout` - maximum time to wait when blocking. `None` or
    ///   zero waits indefinitely.
    ///
    /// Returns `Ok(false)` if the lock was not obtained, in which case this
    /// session's ticket has been removed from the queue.
    ///
    /// # Errors
    ///
    /// * `LockError::StoreMisbehaving` - the queue read back empty twice
    ///   right after our ticket was pushed
    /// * store errors are returned unmodified
    #[instrument(
        skip(self),
        fields(
            lock.name = %self.name,
            backend = S::BACKEND,
            refreshed = field::Empty,
            acquired = field::Empty,
            elapsed_ms = field::Empty,
        )
    )]
    pub async fn acquire(
        &mut self,
        blocking: bool,
        blocking_timeout: Option<Duration>,
    ) -> LockResult<bool> {
        if let Some(head) = self.held_head().await? {
            self.refresh(&head).await?;
            Span::current().record("refreshed", true);
            Span::current().record("acquired", true);
            return Ok(true);
        }

        self.owner_id = self.identity.generate_owner_id();
        let ticket = Ticket::issue(self.owner_id.clone()).encode();
        self.store.push_tail(&self.name, &ticket).await?;
        debug!(ticket = %ticket, "enqueued ticket");

        let deadline = Deadline::after(blocking_timeout);
        while !deadline.is_expired() {
            let pass_start = Instant::now();

            let head = self.read_head_or_requeue(&ticket).await?;

            let mut obtained = head == ticket;
            if !obtained && self.options.expires() && self.is_stale(&head, unix_now()) {
                match self.sweep(&ticket).await? {
                    // a holder refresh may have landed between our read and the purge
                    Sweep::Reached => {
                        let head = self.store.head(&self.name).await?;
                        obtained = head.as_deref() == Some(ticket.as_str());
                    }
                    Sweep::Blocked => {}
                    Sweep::Missing => {
                        debug!(ticket = %ticket, "ticket vanished during sweep, re-enqueueing");
                        self.store.push_tail(&self.name, &ticket).await?;
                        continue;
                    }
                }
            }

            if obtained {
                self.mark_acquired();
                self.refresh(&ticket).await?;
                Span::current().record("acquired", true);
                Span::current().record("elapsed_ms", deadline.elapsed().as_millis() as u64);
                return Ok(true);
            }

            if !blocking {
                self.store.remove(&self.name, &ticket).await?;
                Span::current().record("acquired", false);
                return Ok(false);
            }

            let mut sleep_for = self
                .options
                .poll_interval()
                .saturating_sub(pass_start.elapsed())
                .max(MIN_POLL_SLEEP);
            if let Some(left) = deadline.remaining() {
                sleep_for = sleep_for.min(left);
            }
            tokio::time::sleep(sleep_for).await;
        }

        self.store.remove(&self.name, &ticket).await?;
        debug!(ticket = %ticket, "gave up waiting for lock");
        Span::current().record("acquired", false);
        Span::current().record("elapsed_ms", deadline.elapsed().as_millis() as u64);
        Ok(false)
    }

    /// Polls for the lock exactly once.
    pub async fn try_acquire(&mut self) -> LockResult<bool> {
        self.acquire(false, None).await
    }

    /// Releases every ticket carrying this session's owner id.
    ///
    /// Returns `false` if there was nothing to release.
    #[instrument(skip(self), fields(lock.name = %self.name, backend = S::BACKEND))]
    pub async fn release(&mut self) -> LockResult<bool> {
        let ops: Vec<QueueOp> = self
            .store
            .all(&self.name)
            .await?
            .iter()
            .filter(|raw| {
                Ticket::decode(raw).is_ok_and(|ticket| ticket.owner_id() == self.owner_id)
            })
            .map(|raw| QueueOp::remove(&self.name, raw))
            .collect();

        self.lock_timestamp = None;

        if ops.is_empty() {
            return Ok(false);
        }

        debug!(count = ops.len(), "releasing tickets");
        self.store.execute(ops).await?;
        Ok(true)
    }

    /// Checks the store to see whether this session holds the lock.
    ///
    /// Queries the store on every call; a stale head ticket does not count
    /// as holding even if it is ours.
    pub async fn has_lock(&self) -> LockResult<bool> {
        Ok(self.held_head().await?.is_some())
    }

    /// Deletes the whole queue, for every contender.
    ///
    /// Sessions waiting in `acquire` put themselves back in the queue. Use
    /// only to recover from a stuck lock.
    #[instrument(skip(self), fields(lock.name = %self.name, backend = S::BACKEND))]
    pub async fn clear(&mut self) -> LockResult<()> {
        self.store.delete(&self.name).await?;
        warn!("cleared lock queue");
        self.acquired_at = None;
        self.lock_timestamp = None;
        Ok(())
    }

    /// Returns the decoded queue, head first.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidTicket` if any entry does not decode.
    pub async fn queue(&self) -> LockResult<Vec<Ticket>> {
        self.store
            .all(&self.name)
            .await?
            .iter()
            .map(|raw| Ticket::decode(raw))
            .collect()
    }

    /// Returns the raw head entry if it is our live ticket.
    async fn held_head(&self) -> LockResult<Option<String>> {
        let Some(head) = self.store.head(&self.name).await? else {
            return Ok(None);
        };
        let Ok(ticket) = Ticket::decode(&head) else {
            return Ok(None);
        };

        let ours = ticket.owner_id() == self.owner_id
            && !ticket.is_stale(self.options.global_timeout(), unix_now());
        Ok(ours.then_some(head))
    }

    /// Reads the head, re-pushing our ticket once if the queue is empty.
    async fn read_head_or_requeue(&self, ticket: &str) -> LockResult<String> {
        if let Some(head) = self.store.head(&self.name).await? {
            return Ok(head);
        }

        warn!(lock.name = %self.name, "queue unexpectedly empty, re-enqueueing");
        self.store.remove(&self.name, ticket).await?;
        self.store.push_tail(&self.name, ticket).await?;

        match self.store.head(&self.name).await? {
            Some(head) => Ok(head),
            None => {
                if let Err(e) = self.store.remove(&self.name, ticket).await {
                    debug!(error = %e, "failed to remove ticket after empty read");
                }
                warn!(lock.name = %self.name, "queue still empty after re-enqueue");
                Err(LockError::StoreMisbehaving(format!(
                    "queue {:?} read back empty right after push",
                    self.name
                )))
            }
        }
    }

    /// Walks the queue from the head towards our ticket, purging every stale
    /// entry on the way. The walk stops at the first live entry.
    async fn sweep(&self, ticket: &str) -> LockResult<Sweep> {
        let entries = self.store.all(&self.name).await?;
        if !entries.iter().any(|entry| entry == ticket) {
            return Ok(Sweep::Missing);
        }

        let now = unix_now();
        let mut stale = Vec::new();
        let mut outcome = Sweep::Reached;
        for entry in &entries {
            if entry == ticket {
                break;
            }
            if !self.is_stale(entry, now) {
                outcome = Sweep::Blocked;
                break;
            }
            stale.push(QueueOp::remove(&self.name, entry));
        }

        if !stale.is_empty() {
            debug!(count = stale.len(), "purging stale tickets");
            self.store.execute(stale).await?;
        }
        Ok(outcome)
    }

    /// Whether a raw entry counts as abandoned. Undecodable entries do.
    fn is_stale(&self, raw: &str, now: f64) -> bool {
        match Ticket::decode(raw) {
            Ok(ticket) => ticket.is_stale(self.options.global_timeout(), now),
            Err(e) => {
                warn!(lock.name = %self.name, error = %e, "treating undecodable entry as stale");
                true
            }
        }
    }

    fn mark_acquired(&mut self) {
        let now = unix_now();
        self.acquired_at = Some(now);
        self.lock_timestamp = Some(now);
    }

    /// Replaces our ticket `current` with a freshly stamped one.
    ///
    /// The new ticket goes in before the old one and the old one is removed
    /// in the same transaction, so the head never changes owner.
    async fn refresh(&mut self, current: &str) -> LockResult<()> {
        let now = unix_now();
        let fresh = Ticket::new(self.owner_id.clone(), now).encode();

        if fresh != current {
            self.store
                .execute(vec![
                    QueueOp::insert_before(&self.name, current, &fresh),
                    QueueOp::remove(&self.name, current),
                ])
                .await?;
        }

        self.lock_timestamp = Some(now);
        debug!(ticket = %fresh, "refreshed ticket");
        Ok(())
    }
}
