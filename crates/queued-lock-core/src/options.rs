//! Lock tunables and reusable lock configurations.

use std::time::Duration;

use crate::error::{LockError, LockResult};
use crate::session::QueuedLock;
use crate::traits::QueueStore;

/// Default time a held ticket stays valid without a refresh.
pub const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default minimum time between two polls of the queue.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Validated lock tunables.
///
/// Every session contending on the same name must use the same
/// `global_timeout`, otherwise contenders disagree on which tickets are
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    global_timeout: Duration,
    poll_interval: Duration,
}

impl LockOptions {
    /// Returns a new builder with default settings.
    pub fn builder() -> LockOptionsBuilder {
        LockOptionsBuilder::new()
    }

    /// Maximum time a ticket may go without refresh. Zero disables expiry.
    pub fn global_timeout(&self) -> Duration {
        self.global_timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether abandoned tickets are ever reclaimed.
    pub fn expires(&self) -> bool {
        !self.global_timeout.is_zero()
    }
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            global_timeout: DEFAULT_GLOBAL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Builder for lock tunables.
///
/// Values are kept as seconds until `build()`, so negative or non-finite
/// inputs are reported as configuration errors instead of panicking.
#[derive(Debug, Clone)]
pub struct LockOptionsBuilder {
    global_timeout_secs: f64,
    poll_interval_secs: f64,
}

impl LockOptionsBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            global_timeout_secs: DEFAULT_GLOBAL_TIMEOUT.as_secs_f64(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs_f64(),
        }
    }

    /// Sets the global timeout. `Duration::ZERO` means tickets never expire.
    pub fn global_timeout(self, timeout: Duration) -> Self {
        self.global_timeout_secs(timeout.as_secs_f64())
    }

    /// Sets the global timeout in seconds.
    pub fn global_timeout_secs(mut self, secs: f64) -> Self {
        self.global_timeout_secs = secs;
        self
    }

    /// Sets the poll interval.
    pub fn poll_interval(self, interval: Duration) -> Self {
        self.poll_interval_secs(interval.as_secs_f64())
    }

    /// Sets the poll interval in seconds.
    pub fn poll_interval_secs(mut self, secs: f64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Builds the options.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidConfiguration` if the global timeout is
    /// negative or the poll interval is not strictly positive.
    pub fn build(self) -> LockResult<LockOptions> {
        if !self.global_timeout_secs.is_finite() || self.global_timeout_secs < 0.0 {
            return Err(LockError::InvalidConfiguration(format!(
                "global timeout {} must be a non-negative number of seconds",
                self.global_timeout_secs
            )));
        }
        if !self.poll_interval_secs.is_finite() || self.poll_interval_secs <= 0.0 {
            return Err(LockError::InvalidConfiguration(format!(
                "poll interval {} must be > 0 seconds",
                self.poll_interval_secs
            )));
        }

        Ok(LockOptions {
            global_timeout: Duration::from_secs_f64(self.global_timeout_secs),
            poll_interval: Duration::from_secs_f64(self.poll_interval_secs),
        })
    }
}

impl Default for LockOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A lock name bound to its tunables.
///
/// Define one per logical lock and create sessions from it wherever the
/// lock is needed, so all of them agree on the tunables.
///
/// # Example
///
/// ```rust,ignore
/// let reports = LockConfig::new("reports", LockOptions::default())?;
///
/// let mut lock = reports.session(store.clone());
/// lock.acquire(true, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LockConfig {
    name: String,
    options: LockOptions,
}

impl LockConfig {
    /// # Errors
    ///
    /// Returns `LockError::InvalidName` if `name` is empty.
    pub fn new(name: impl Into<String>, options: LockOptions) -> LockResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, options })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Creates a new session for this lock against `store`.
    pub fn session<S: QueueStore>(&self, store: S) -> QueuedLock<S> {
        QueuedLock::from_parts(self.name.clone(), store, self.options)
    }
}

pub(crate) fn validate_name(name: &str) -> LockResult<()> {
    if name.is_empty() {
        return Err(LockError::InvalidName("lock name cannot be empty".to_string()));
    }
    Ok(())
}
