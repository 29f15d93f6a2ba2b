//! Tickets and the ticket registry
//!
//! A ticket is an identifiable, expirable record of protocol state. Tickets of
//! every kind share one [`TicketRegistry`]; the id prefix ([`Ticket::PREFIX`])
//! keeps their id spaces apart. Registries store the serialized
//! [`TicketRecord`] form, so any backend able to hold JSON can hold tickets.

mod cleaner;
mod memory;
mod registry;
mod transient;

pub use cleaner::{RegistryCleaner, RegistryCleanerConfig};
pub use memory::MemoryTicketRegistry;
pub use registry::TicketRegistry;
pub use transient::{
    normalize_ticket_id, SessionTicketFactory, TicketProperties, TransientSessionTicket,
    TransientSessionTicketFactory, DEFAULT_TIME_TO_KILL_SECS, TRANSIENT_SESSION_TICKET_PREFIX,
};

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// When a ticket stops being usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpirationPolicy {
    /// Never expires
    Never,
    /// Expires a fixed time after creation
    HardTimeout { time_to_kill_secs: u64 },
    /// Expires after a period without updates
    Idle { time_to_idle_secs: u64 },
}

impl ExpirationPolicy {
    /// Instant at which a ticket with these timestamps expires, if any
    pub fn expires_at(
        &self,
        creation_time: DateTime<Utc>,
        last_time_used: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match *self {
            ExpirationPolicy::Never => None,
            ExpirationPolicy::HardTimeout { time_to_kill_secs } => {
                deadline(creation_time, time_to_kill_secs)
            }
            ExpirationPolicy::Idle { time_to_idle_secs } => {
                deadline(last_time_used, time_to_idle_secs)
            }
        }
    }

    pub fn is_expired(&self, creation_time: DateTime<Utc>, last_time_used: DateTime<Utc>) -> bool {
        self.expires_at(creation_time, last_time_used).is_some_and(|at| Utc::now() >= at)
    }
}

/// Deadlines past the representable range never arrive
fn deadline(start: DateTime<Utc>, secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs).ok()?;
    start.checked_add_signed(Duration::try_seconds(secs)?)
}

/// A registry-held record of protocol state
pub trait Ticket: Serialize + DeserializeOwned + Send + Sync {
    /// Id prefix identifying the ticket kind
    const PREFIX: &'static str;

    fn id(&self) -> &str;

    fn creation_time(&self) -> DateTime<Utc>;

    fn last_time_used(&self) -> DateTime<Utc>;

    fn expiration_policy(&self) -> &ExpirationPolicy;

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiration_policy().expires_at(self.creation_time(), self.last_time_used())
    }

    fn is_expired(&self) -> bool {
        self.expiration_policy().is_expired(self.creation_time(), self.last_time_used())
    }
}

/// Serialized ticket as stored by a registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,
    /// Ticket kind ([`Ticket::PREFIX`])
    pub prefix: String,
    /// Expiry hint for backends with native TTL support
    pub expires_at: Option<DateTime<Utc>>,
    pub body: serde_json::Value,
}

impl TicketRecord {
    pub fn encode<T: Ticket>(ticket: &T) -> RegistryResult<Self> {
        Ok(Self {
            id: ticket.id().to_string(),
            prefix: T::PREFIX.to_string(),
            expires_at: ticket.expires_at(),
            body: serde_json::to_value(ticket)?,
        })
    }

    /// Deserialize the record as a `T`, refusing records of another kind
    pub fn decode<T: Ticket>(&self) -> RegistryResult<T> {
        if self.prefix != T::PREFIX {
            return Err(RegistryError::KindMismatch {
                id: self.id.clone(),
                expected: T::PREFIX.to_string(),
                found: self.prefix.clone(),
            });
        }
        Ok(serde_json::from_value(self.body.clone())?)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_hard_timeout() {
        let policy = ExpirationPolicy::HardTimeout { time_to_kill_secs: 60 };
        let now = Utc::now();

        assert!(!policy.is_expired(now, now));
        assert!(policy.is_expired(now - Duration::seconds(61), now));
        assert_eq!(policy.expires_at(now, now + Duration::seconds(30)), Some(now + Duration::seconds(60)));
    }

    #[test]
    fn test_idle_timeout_measured_from_last_use() {
        let policy = ExpirationPolicy::Idle { time_to_idle_secs: 60 };
        let now = Utc::now();
        let long_ago = now - Duration::hours(2);

        assert!(!policy.is_expired(long_ago, now));
        assert!(policy.is_expired(long_ago, long_ago));
    }

    #[test]
    fn test_never_and_huge_timeouts() {
        let now = Utc::now();
        assert_eq!(ExpirationPolicy::Never.expires_at(now, now), None);
        assert!(!ExpirationPolicy::HardTimeout { time_to_kill_secs: u64::MAX }.is_expired(now, now));
    }

    #[test]
    fn test_record_kind_check() {
        let ticket = TransientSessionTicket::new("TST-abc", HashMap::new(), ExpirationPolicy::Never);
        let mut record = TicketRecord::encode(&ticket).unwrap();
        assert_eq!(record.prefix, "TST");
        assert_eq!(record.decode::<TransientSessionTicket>().unwrap(), ticket);

        record.prefix = "TGT".to_string();
        assert!(matches!(
            record.decode::<TransientSessionTicket>(),
            Err(RegistryError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_record_expiry_hint() {
        let ticket = TransientSessionTicket::new(
            "TST-abc",
            HashMap::new(),
            ExpirationPolicy::HardTimeout { time_to_kill_secs: 10 },
        );
        let record = TicketRecord::encode(&ticket).unwrap();

        assert!(!record.is_expired_at(Utc::now()));
        assert!(record.is_expired_at(Utc::now() + Duration::seconds(11)));
    }
}
