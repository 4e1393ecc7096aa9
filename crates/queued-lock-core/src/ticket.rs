//! Queue tickets and their wire encoding.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{LockError, LockResult};

/// Separates the owner id from the timestamp in an encoded ticket.
///
/// Owner ids never contain this sequence.
pub const TICKET_DELIMITER: &str = "__";

/// One contender's claim in a lock queue.
///
/// Encoded as `{owner_id}__{issued_at}`, with `issued_at` in seconds since
/// the Unix epoch rendered with six fractional digits, e.g.
/// `web-1+0c9f...__1700000000.123456`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    owner_id: String,
    issued_at: f64,
}

impl Ticket {
    pub fn new(owner_id: impl Into<String>, issued_at: f64) -> Self {
        Self {
            owner_id: owner_id.into(),
            issued_at,
        }
    }

    /// Creates a ticket issued at the current time.
    pub fn issue(owner_id: impl Into<String>) -> Self {
        Self::new(owner_id, unix_now())
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Seconds since the Unix epoch at which the ticket was issued or refreshed.
    pub fn issued_at(&self) -> f64 {
        self.issued_at
    }

    /// Seconds elapsed between issue and `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.issued_at
    }

    /// Whether the ticket outlived `global_timeout` at `now`.
    ///
    /// A zero timeout means tickets never expire.
    pub fn is_stale(&self, global_timeout: Duration, now: f64) -> bool {
        !global_timeout.is_zero() && self.age(now) > global_timeout.as_secs_f64()
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses an encoded ticket.
    ///
    /// Splits on the last delimiter, so only the owner id part may be odd.
    pub fn decode(raw: &str) -> LockResult<Self> {
        let (owner_id, issued_at) = raw.rsplit_once(TICKET_DELIMITER).ok_or_else(|| {
            LockError::InvalidTicket(format!("missing delimiter in {raw:?}"))
        })?;

        if owner_id.is_empty() {
            return Err(LockError::InvalidTicket(format!("empty owner in {raw:?}")));
        }

        let issued_at: f64 = issued_at
            .parse()
            .map_err(|e| LockError::InvalidTicket(format!("bad timestamp in {raw:?}: {e}")))?;
        if !issued_at.is_finite() {
            return Err(LockError::InvalidTicket(format!(
                "non-finite timestamp in {raw:?}"
            )));
        }

        Ok(Self::new(owner_id, issued_at))
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:.6}", self.owner_id, TICKET_DELIMITER, self.issued_at)
    }
}

impl FromStr for Ticket {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Current wall-clock time in fractional seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
