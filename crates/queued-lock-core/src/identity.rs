//! Owner identities for queue tickets.

use std::sync::{Arc, OnceLock};

use uuid::Uuid;

use crate::ticket::TICKET_DELIMITER;

/// Token used when the hostname cannot be read.
const UNKNOWN_HOST: &str = "unknown-host";

/// Host-scoped part of every owner id.
///
/// Read once per process, so a hostname change while the process runs
/// cannot change how this process recognizes its own tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    token: Arc<str>,
}

impl HostIdentity {
    /// Creates an identity from an explicit token.
    ///
    /// Underscores are replaced so the token can never form the ticket
    /// delimiter.
    pub fn new(token: impl AsRef<str>) -> Self {
        let token = token.as_ref().trim().replace('_', "-");
        let token = if token.is_empty() {
            UNKNOWN_HOST.to_string()
        } else {
            token
        };
        debug_assert!(!token.contains(TICKET_DELIMITER));

        Self {
            token: Arc::from(token),
        }
    }

    /// The identity of this process, derived from the hostname.
    pub fn current() -> &'static HostIdentity {
        static CURRENT: OnceLock<HostIdentity> = OnceLock::new();
        CURRENT.get_or_init(|| {
            let host = hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| UNKNOWN_HOST.to_string());
            Self::new(host)
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Generates a fresh owner id: `{token}+{uuid}{uuid}`.
    pub fn generate_owner_id(&self) -> String {
        format!(
            "{}+{}{}",
            self.token,
            Uuid::new_v4().hyphenated(),
            Uuid::new_v4().hyphenated()
        )
    }
}
